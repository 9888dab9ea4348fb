//! Configuration option declarations.
//!
//! Every option is addressed by a dotted `url` (`extension.option`) and has a
//! closed set of kinds. Each kind carries its own default and its hard
//! bounds, so validators can match on it exhaustively.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::ConfigValue;

/// An option an extension defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: OptionKind,
}

/// The type of an option with its default and hard bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionKind {
    Number {
        default: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Choice {
        default: String,
        choices: Vec<String>,
    },
    Set {
        #[serde(default)]
        default: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        choices: Option<Vec<String>>,
    },
    Boolean {
        default: bool,
    },
    #[serde(rename = "string")]
    Text {
        #[serde(default)]
        default: String,
    },
    #[serde(rename = "filepath")]
    FilePath {
        #[serde(default)]
        default: String,
    },
}

impl OptionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Choice { .. } => "choice",
            Self::Set { .. } => "set",
            Self::Boolean { .. } => "boolean",
            Self::Text { .. } => "string",
            Self::FilePath { .. } => "filepath",
        }
    }

    pub fn default_value(&self) -> ConfigValue {
        match self {
            Self::Number { default, .. } => ConfigValue::Number(*default),
            Self::Choice { default, .. } => ConfigValue::Text(default.clone()),
            Self::Set { default, .. } => ConfigValue::Set(default.clone()),
            Self::Boolean { default } => ConfigValue::Boolean(*default),
            Self::Text { default } | Self::FilePath { default } => ConfigValue::Text(default.clone()),
        }
    }

    /// Whether `value` has the shape this kind stores.
    pub fn accepts_type(&self, value: &ConfigValue) -> bool {
        matches!(
            (self, value),
            (Self::Number { .. }, ConfigValue::Number(_))
                | (Self::Choice { .. }, ConfigValue::Text(_))
                | (Self::Set { .. }, ConfigValue::Set(_))
                | (Self::Boolean { .. }, ConfigValue::Boolean(_))
                | (Self::Text { .. }, ConfigValue::Text(_))
                | (Self::FilePath { .. }, ConfigValue::Text(_))
        )
    }

    /// Parse a raw command-line string into a value of this kind.
    ///
    /// Sets are comma separated; an empty string is the empty set.
    pub fn parse_value(&self, raw: &str) -> Result<ConfigValue> {
        let invalid = || Error::InvalidValue {
            raw: raw.to_string(),
            expected: self.type_name(),
        };
        match self {
            Self::Number { .. } => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(ConfigValue::Number(n)),
                _ => Err(invalid()),
            },
            Self::Boolean { .. } => raw.trim().parse::<bool>().map(ConfigValue::Boolean).map_err(|_| invalid()),
            Self::Set { .. } => Ok(ConfigValue::Set(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            Self::Choice { .. } | Self::Text { .. } | Self::FilePath { .. } => {
                Ok(ConfigValue::Text(raw.to_string()))
            }
        }
    }
}

impl OptionSpec {
    pub fn new(url: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            url: url.into(),
            name: None,
            description: None,
            kind,
        }
    }

    pub fn default_value(&self) -> ConfigValue {
        self.kind.default_value()
    }

    /// Check that the declaration is self-consistent: bounds ordered and the
    /// default inside them.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidOption {
            url: self.url.clone(),
            reason,
        };

        if self.url.trim().is_empty() {
            return Err(invalid("option url must not be empty".to_string()));
        }

        match &self.kind {
            OptionKind::Number { default, min, max } => {
                if !default.is_finite() {
                    return Err(invalid("default must be a finite number".to_string()));
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(invalid(format!("min {lo} is greater than max {hi}")));
                    }
                }
                if min.is_some_and(|lo| *default < lo) || max.is_some_and(|hi| *default > hi) {
                    return Err(invalid(format!("default {default} is outside the declared bounds")));
                }
            }
            OptionKind::Choice { default, choices } => {
                if choices.is_empty() {
                    return Err(invalid("choice option needs at least one choice".to_string()));
                }
                if !choices.contains(default) {
                    return Err(invalid(format!("default '{default}' is not one of the choices")));
                }
            }
            OptionKind::Set {
                default,
                choices: Some(choices),
            } => {
                if let Some(stray) = default.iter().find(|d| !choices.contains(d)) {
                    return Err(invalid(format!("default element '{stray}' is not one of the choices")));
                }
            }
            OptionKind::Set { choices: None, .. }
            | OptionKind::Boolean { .. }
            | OptionKind::Text { .. }
            | OptionKind::FilePath { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Deserialize)]
    struct Options {
        options: Vec<OptionSpec>,
    }

    fn parse(s: &str) -> Vec<OptionSpec> {
        toml::from_str::<Options>(s).unwrap().options
    }

    #[test]
    fn test_parse_every_kind() {
        let options = parse(
            r#"
            [[options]]
            url = "g.resolution"
            type = "number"
            default = 50
            min = 0
            max = 100

            [[options]]
            url = "g.quality"
            type = "choice"
            default = "high"
            choices = ["low", "high"]

            [[options]]
            url = "g.layers"
            type = "set"
            default = ["a"]

            [[options]]
            url = "g.vsync"
            type = "boolean"
            default = true

            [[options]]
            url = "g.title"
            type = "string"
            default = "Game"

            [[options]]
            url = "g.save"
            type = "filepath"
            "#,
        );

        let kinds: Vec<_> = options.iter().map(|o| o.kind.type_name()).collect();
        assert_eq!(kinds, vec!["number", "choice", "set", "boolean", "string", "filepath"]);
        assert_eq!(
            options[0].kind,
            OptionKind::Number {
                default: 50.0,
                min: Some(0.0),
                max: Some(100.0)
            }
        );
        assert_eq!(options[5].default_value(), ConfigValue::from(""));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = toml::from_str::<Options>(
            r#"
            [[options]]
            url = "g.x"
            type = "colour"
            default = "red"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_bounds() {
        let spec = OptionSpec::new(
            "g.x",
            OptionKind::Number {
                default: 150.0,
                min: Some(0.0),
                max: Some(100.0),
            },
        );
        assert!(matches!(spec.validate(), Err(Error::InvalidOption { .. })));

        let spec = OptionSpec::new(
            "g.q",
            OptionKind::Choice {
                default: "ultra".into(),
                choices: vec!["low".into(), "high".into()],
            },
        );
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_parse_value_per_kind() {
        let number = OptionKind::Number {
            default: 0.0,
            min: None,
            max: None,
        };
        assert_eq!(number.parse_value("70").unwrap(), ConfigValue::from(70));
        assert!(matches!(number.parse_value("seventy"), Err(Error::InvalidValue { .. })));
        for raw in ["NaN", "inf", "-infinity"] {
            assert!(matches!(number.parse_value(raw), Err(Error::InvalidValue { .. })), "{raw}");
        }

        let set = OptionKind::Set {
            default: vec![],
            choices: None,
        };
        assert_eq!(set.parse_value("b, a").unwrap(), ConfigValue::from(vec!["a", "b"]));
        assert_eq!(set.parse_value("").unwrap(), ConfigValue::Set(vec![]));

        let flag = OptionKind::Boolean { default: false };
        assert_eq!(flag.parse_value("true").unwrap(), ConfigValue::from(true));
    }

    #[test]
    fn test_accepts_type() {
        let choice = OptionKind::Choice {
            default: "a".into(),
            choices: vec!["a".into()],
        };
        assert!(choice.accepts_type(&ConfigValue::from("b")));
        assert!(!choice.accepts_type(&ConfigValue::from(1)));
    }
}
