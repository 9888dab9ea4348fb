//! Values the user has set explicitly.

use std::collections::BTreeMap;

use ext_meta::ConfigValue;
use ext_resolve::ExtensionsState;
use serde::{Deserialize, Serialize};

use crate::derived::DerivedConfiguration;
use crate::error::Result;
use crate::permission::ensure_permitted;
use crate::verdict::PermissionVerdict;

/// User-set values keyed by option url.
///
/// Stored as a flat TOML table:
///
/// ```toml
/// "graphics.resolution" = 60
/// "graphics.layers" = ["terrain", "water"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserConfiguration {
    values: BTreeMap<String, ConfigValue>,
}

impl UserConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `url` without any checks, returning the previous value.
    pub fn set(&mut self, url: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
        self.values.insert(url.into(), value)
    }

    /// Set `url` if the active extensions of `state` permit `value`.
    ///
    /// A `Warning` verdict still sets the value and is returned so the
    /// caller can show it.
    pub fn set_checked(&mut self, state: &ExtensionsState, url: &str, value: ConfigValue) -> Result<PermissionVerdict> {
        let verdict = ensure_permitted(state, url, &value)?;
        self.values.insert(url.to_string(), value);
        Ok(verdict)
    }

    pub fn remove(&mut self, url: &str) -> Option<ConfigValue> {
        self.values.remove(url)
    }

    pub fn get(&self, url: &str) -> Option<&ConfigValue> {
        self.values.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.values.contains_key(url)
    }

    /// Entries sorted by url.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(url, value)| (url.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Derived values with the user's values laid over them. User values
    /// for urls no active extension defines are left out.
    pub fn effective_values(&self, derived: &DerivedConfiguration) -> BTreeMap<String, ConfigValue> {
        derived
            .values
            .iter()
            .map(|(url, value)| (url.clone(), self.values.get(url).unwrap_or(value).clone()))
            .collect()
    }
}

impl FromIterator<(String, ConfigValue)> for UserConfiguration {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::derive_configuration;
    use crate::error::Error;
    use ext_test_utils::{ExtensionBuilder, catalogue, id};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_toml_round_trip_keeps_dotted_urls() {
        let content = r#"
"graphics.resolution" = 60
"graphics.layers" = ["terrain", "water"]
"audio.enabled" = true
"#;
        let user = UserConfiguration::from_toml(content).unwrap();
        assert_eq!(user.get("graphics.resolution"), Some(&ConfigValue::from(60)));
        assert_eq!(user.len(), 3);

        let again = UserConfiguration::from_toml(&user.to_toml().unwrap()).unwrap();
        assert_eq!(again, user);
    }

    #[test]
    fn test_parse_error() {
        let err = UserConfiguration::from_toml("not = [valid").unwrap_err();
        assert!(matches!(err, Error::UserConfigParse(_)));
    }

    #[test]
    fn test_effective_values_prefer_user() {
        let base = ExtensionBuilder::new("base", "1.0.0")
            .number_option("base.x", 1.0, None, None)
            .number_option("base.y", 2.0, None, None)
            .build();
        let derived = derive_configuration(&[base]);

        let mut user = UserConfiguration::new();
        user.set("base.y", ConfigValue::from(7));
        user.set("gone.z", ConfigValue::from(true));

        let effective = user.effective_values(&derived);
        assert_eq!(effective.len(), 2);
        assert_eq!(effective["base.x"], ConfigValue::from(1));
        assert_eq!(effective["base.y"], ConfigValue::from(7));
    }

    #[test]
    fn test_set_checked_refuses_illegal_value() {
        let cat = catalogue(vec![
            ExtensionBuilder::new("base", "1.0.0")
                .number_option("base.x", 1.0, Some(0.0), Some(10.0))
                .build(),
        ]);
        let state = ExtensionsState::from_explicit(cat, &[id("base@1.0.0")]).unwrap();
        let mut user = UserConfiguration::new();

        assert!(user.set_checked(&state, "base.x", ConfigValue::from(5)).unwrap().is_ok());
        let err = user.set_checked(&state, "base.x", ConfigValue::from(11)).unwrap_err();
        assert_eq!(err.to_string(), "illegal value for 'base.x': value (11) too high (10) (by spec)");
        assert_eq!(user.get("base.x"), Some(&ConfigValue::from(5)));

        let err = user.set_checked(&state, "ghost.x", ConfigValue::from(1)).unwrap_err();
        assert!(matches!(err, Error::UnknownOption(_)));
    }
}
