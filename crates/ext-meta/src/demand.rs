//! Demands an extension places on configuration options.
//!
//! In a manifest, demands are grouped per url under `[config."<url>"]`:
//!
//! ```toml
//! [config."graphics.resolution"]
//! required-value = 50
//! suggested-range = { min = 10, max = 20 }
//!
//! [config."graphics.layers"]
//! required-values = ["terrain"]
//! required-exclusive = true
//! ```
//!
//! Each entry expands into zero or more [`ConfigDemand`]s in a fixed order:
//! value, range, values, required before suggested.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{ConfigValue, format_number};

/// How binding a demand is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    Required,
    Suggested,
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::Suggested => f.write_str("suggested"),
        }
    }
}

/// How a `Values` constraint compares against a set value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetMatching {
    /// The value must equal the demanded set.
    Exclusive,
    /// The value must contain every demanded element.
    #[default]
    Inclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constraint {
    Value(ConfigValue),
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
    Values {
        values: Vec<String>,
        matching: SetMatching,
    },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Range { min, max } => {
                let lo = min.map(format_number).unwrap_or_else(|| "-inf".to_string());
                let hi = max.map(format_number).unwrap_or_else(|| "inf".to_string());
                write!(f, "[{lo}, {hi}]")
            }
            Self::Values { values, matching } => {
                let kind = match matching {
                    SetMatching::Exclusive => "exactly",
                    SetMatching::Inclusive => "including",
                };
                write!(f, "{kind} [{}]", values.join(", "))
            }
        }
    }
}

/// One demand on one option url.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDemand {
    pub url: String,
    pub qualifier: Qualifier,
    pub constraint: Constraint,
}

impl ConfigDemand {
    pub fn new(url: impl Into<String>, qualifier: Qualifier, constraint: Constraint) -> Self {
        Self {
            url: url.into(),
            qualifier,
            constraint,
        }
    }

    pub fn required(url: impl Into<String>, constraint: Constraint) -> Self {
        Self::new(url, Qualifier::Required, constraint)
    }

    pub fn suggested(url: impl Into<String>, constraint: Constraint) -> Self {
        Self::new(url, Qualifier::Suggested, constraint)
    }

    pub fn is_required(&self) -> bool {
        self.qualifier == Qualifier::Required
    }
}

/// A `{ min, max }` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeEntry {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// The manifest form of the demands on one url.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DemandEntry {
    pub required_value: Option<ConfigValue>,
    pub required_range: Option<RangeEntry>,
    pub required_min: Option<f64>,
    pub required_max: Option<f64>,
    pub required_values: Option<Vec<String>>,
    pub required_exclusive: Option<bool>,
    pub required_inclusive: Option<bool>,
    pub suggested_value: Option<ConfigValue>,
    pub suggested_range: Option<RangeEntry>,
    pub suggested_min: Option<f64>,
    pub suggested_max: Option<f64>,
    pub suggested_values: Option<Vec<String>>,
    pub suggested_exclusive: Option<bool>,
    pub suggested_inclusive: Option<bool>,
}

/// The keys of one qualifier inside a [`DemandEntry`].
struct Keys<'a> {
    qualifier: Qualifier,
    value: &'a Option<ConfigValue>,
    range: &'a Option<RangeEntry>,
    min: Option<f64>,
    max: Option<f64>,
    values: &'a Option<Vec<String>>,
    exclusive: Option<bool>,
    inclusive: Option<bool>,
}

impl DemandEntry {
    /// Expand into demands on `url`, in value, range, values order with
    /// required demands before suggested ones.
    pub fn to_demands(&self, extension: &str, url: &str) -> Result<Vec<ConfigDemand>> {
        let required = Keys {
            qualifier: Qualifier::Required,
            value: &self.required_value,
            range: &self.required_range,
            min: self.required_min,
            max: self.required_max,
            values: &self.required_values,
            exclusive: self.required_exclusive,
            inclusive: self.required_inclusive,
        };
        let suggested = Keys {
            qualifier: Qualifier::Suggested,
            value: &self.suggested_value,
            range: &self.suggested_range,
            min: self.suggested_min,
            max: self.suggested_max,
            values: &self.suggested_values,
            exclusive: self.suggested_exclusive,
            inclusive: self.suggested_inclusive,
        };

        let mut demands = Vec::new();
        for keys in [required, suggested] {
            expand(&keys, extension, url, &mut demands)?;
        }
        Ok(demands)
    }
}

fn expand(keys: &Keys<'_>, extension: &str, url: &str, out: &mut Vec<ConfigDemand>) -> Result<()> {
    let invalid = |reason: String| Error::InvalidDemand {
        extension: extension.to_string(),
        url: url.to_string(),
        reason,
    };
    let q = keys.qualifier;

    if let Some(value) = keys.value {
        out.push(ConfigDemand::new(url, q, Constraint::Value(value.clone())));
    }

    let split = keys.min.is_some() || keys.max.is_some();
    let range = match (keys.range, split) {
        (Some(_), true) => {
            return Err(invalid(format!("{q}-range cannot be combined with {q}-min/{q}-max")));
        }
        (Some(r), false) => Some(*r),
        (None, true) => Some(RangeEntry {
            min: keys.min,
            max: keys.max,
        }),
        (None, false) => None,
    };
    if let Some(RangeEntry { min, max }) = range {
        if min.is_none() && max.is_none() {
            return Err(invalid(format!("{q}-range needs a min or a max")));
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(invalid(format!("{q}-range min {lo} is greater than max {hi}")));
            }
        }
        out.push(ConfigDemand::new(url, q, Constraint::Range { min, max }));
    }

    match keys.values {
        Some(values) => {
            let matching = if keys.exclusive == Some(true) {
                SetMatching::Exclusive
            } else {
                SetMatching::Inclusive
            };
            out.push(ConfigDemand::new(
                url,
                q,
                Constraint::Values {
                    values: values.clone(),
                    matching,
                },
            ));
        }
        None if keys.exclusive.is_some() || keys.inclusive.is_some() => {
            return Err(invalid(format!("{q}-exclusive/{q}-inclusive need {q}-values")));
        }
        None => {}
    }

    Ok(())
}
