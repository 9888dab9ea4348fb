//! [`ExtensionBuilder`] for in-memory extension fixtures.

use ext_meta::{
    Catalogue, ConfigDemand, ConfigValue, Constraint, DependencyConstraint, Extension, ExtensionId,
    ExtensionKind, HostComponent, OptionKind, OptionSpec, Qualifier, SetMatching, VersionRange, parse_version,
};

/// Fluent builder for [`Extension`] values.
///
/// # Example
///
/// ```rust
/// use ext_test_utils::ExtensionBuilder;
///
/// let b = ExtensionBuilder::new("b", "1.0.0")
///     .depends_on("a ^1.0.0")
///     .number_option("b.x", 50.0, Some(0.0), Some(100.0))
///     .requires_value("b.x", 50)
///     .build();
/// assert_eq!(b.dependencies.len(), 1);
/// ```
pub struct ExtensionBuilder {
    extension: Extension,
}

impl ExtensionBuilder {
    /// # Panics
    ///
    /// Panics if `version` is not a valid version.
    pub fn new(name: &str, version: &str) -> Self {
        let version = parse_version(version)
            .unwrap_or_else(|e| panic!("ExtensionBuilder::new: {e}"));
        Self {
            extension: Extension::new(name, version),
        }
    }

    pub fn kind(mut self, kind: ExtensionKind) -> Self {
        self.extension.kind = kind;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.extension.description = Some(description.to_string());
        self
    }

    /// Add a dependency written as a manifest statement (`"a ^1.0.0"`).
    ///
    /// # Panics
    ///
    /// Panics if the statement does not parse.
    pub fn depends_on(mut self, statement: &str) -> Self {
        let constraint = DependencyConstraint::parse_statement(&self.extension.name, statement)
            .unwrap_or_else(|e| panic!("ExtensionBuilder::depends_on: {e}"));
        self.extension.dependencies.push(constraint);
        self
    }

    /// Declare a range on a host component.
    ///
    /// # Panics
    ///
    /// Panics if the range does not parse.
    pub fn requires_host(mut self, component: HostComponent, range: &str) -> Self {
        let range = VersionRange::parse(range).unwrap_or_else(|e| panic!("ExtensionBuilder::requires_host: {e}"));
        self.extension.host.insert(component, range);
        self
    }

    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.extension.options.push(spec);
        self
    }

    pub fn number_option(self, url: &str, default: f64, min: Option<f64>, max: Option<f64>) -> Self {
        self.option(OptionSpec::new(url, OptionKind::Number { default, min, max }))
    }

    pub fn choice_option(self, url: &str, default: &str, choices: &[&str]) -> Self {
        self.option(OptionSpec::new(
            url,
            OptionKind::Choice {
                default: default.to_string(),
                choices: strings(choices),
            },
        ))
    }

    pub fn set_option(self, url: &str, default: &[&str], choices: Option<&[&str]>) -> Self {
        self.option(OptionSpec::new(
            url,
            OptionKind::Set {
                default: strings(default),
                choices: choices.map(strings),
            },
        ))
    }

    pub fn bool_option(self, url: &str, default: bool) -> Self {
        self.option(OptionSpec::new(url, OptionKind::Boolean { default }))
    }

    pub fn text_option(self, url: &str, default: &str) -> Self {
        self.option(OptionSpec::new(
            url,
            OptionKind::Text {
                default: default.to_string(),
            },
        ))
    }

    pub fn demand(mut self, demand: ConfigDemand) -> Self {
        self.extension.demands.push(demand);
        self
    }

    pub fn requires_value(self, url: &str, value: impl Into<ConfigValue>) -> Self {
        self.demand(ConfigDemand::required(url, Constraint::Value(value.into())))
    }

    pub fn suggests_value(self, url: &str, value: impl Into<ConfigValue>) -> Self {
        self.demand(ConfigDemand::suggested(url, Constraint::Value(value.into())))
    }

    pub fn requires_range(self, url: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.demand(ConfigDemand::required(url, Constraint::Range { min, max }))
    }

    pub fn suggests_range(self, url: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.demand(ConfigDemand::suggested(url, Constraint::Range { min, max }))
    }

    pub fn values_demand(
        self,
        qualifier: Qualifier,
        url: &str,
        values: &[&str],
        matching: SetMatching,
    ) -> Self {
        self.demand(ConfigDemand::new(
            url,
            qualifier,
            Constraint::Values {
                values: strings(values),
                matching,
            },
        ))
    }

    pub fn build(self) -> Extension {
        self.extension
    }
}

/// A bare extension with no dependencies or options.
pub fn ext(name: &str, version: &str) -> Extension {
    ExtensionBuilder::new(name, version).build()
}

/// Parse `name@version`.
///
/// # Panics
///
/// Panics if `s` is not a valid id.
pub fn id(s: &str) -> ExtensionId {
    s.parse()
        .unwrap_or_else(|e| panic!("id({s:?}): {e}"))
}

/// Build a catalogue.
///
/// # Panics
///
/// Panics if the extensions do not form a valid catalogue.
pub fn catalogue(extensions: Vec<Extension>) -> Catalogue {
    Catalogue::new(extensions).unwrap_or_else(|e| panic!("catalogue: {e}"))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
