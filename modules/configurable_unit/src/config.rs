use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Caller-facing options for a [`ConfigurableUnit`](crate::ConfigurableUnit).
///
/// Every field is optional. Anything left out falls back to the built-in
/// default when the options are resolved into a [`UnitConfig`]. Unknown keys
/// in the source document are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitOptions {
    #[serde(default)]
    pub param1: Option<String>,
    #[serde(default)]
    pub param2: Option<i64>,
    #[serde(default)]
    pub param3: Option<i64>,
}

impl UnitOptions {
    /// Parse options out of an untyped per-module config value.
    ///
    /// Missing fields stay `None` and default later; a field with a value of
    /// the wrong type is rejected rather than silently coerced.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value.clone()).map_err(ConfigError::Invalid)
    }
}

/// Effective configuration after overlaying caller options on the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitConfig {
    #[serde(default = "default_param1")]
    pub param1: String,
    #[serde(default = "default_param2")]
    pub param2: i64,
    #[serde(default = "default_param3")]
    pub param3: i64,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            param1: default_param1(),
            param2: default_param2(),
            param3: default_param3(),
        }
    }
}

impl UnitConfig {
    /// Shallow merge: each field present in `options` overwrites the
    /// corresponding default; absent fields keep the default value.
    pub fn resolve(options: UnitOptions) -> Self {
        let defaults = Self::default();
        Self {
            param1: options.param1.unwrap_or(defaults.param1),
            param2: options.param2.unwrap_or(defaults.param2),
            param3: options.param3.unwrap_or(defaults.param3),
        }
    }
}

fn default_param1() -> String {
    "hello".to_string()
}

fn default_param2() -> i64 {
    0
}

fn default_param3() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_fills_missing_fields_with_defaults() {
        let cfg = UnitConfig::resolve(UnitOptions::default());

        assert_eq!(cfg.param1, "hello");
        assert_eq!(cfg.param2, 0);
        assert_eq!(cfg.param3, 100);
    }

    #[test]
    fn resolve_keeps_present_fields() {
        let options = UnitOptions {
            param1: Some("hi".to_string()),
            param2: Some(10),
            param3: None,
        };

        let cfg = UnitConfig::resolve(options);

        assert_eq!(cfg.param1, "hi");
        assert_eq!(cfg.param2, 10);
        assert_eq!(cfg.param3, 100); // untouched default
    }

    #[test]
    fn from_value_ignores_unknown_keys() {
        let value = json!({
            "param1": "hi",
            "not_a_param": true
        });

        let options = UnitOptions::from_value(&value).expect("unknown keys must not fail");

        assert_eq!(options.param1.as_deref(), Some("hi"));
        assert_eq!(options.param2, None);
    }

    #[test]
    fn from_value_rejects_wrong_types() {
        let value = json!({ "param2": "ten" });

        let err = UnitOptions::from_value(&value).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn from_value_accepts_empty_mapping() {
        let options = UnitOptions::from_value(&json!({})).expect("empty mapping is valid");
        let cfg = UnitConfig::resolve(options);

        assert_eq!(cfg.param1, "hello");
        assert_eq!(cfg.param2, 0);
        assert_eq!(cfg.param3, 100);
    }
}
