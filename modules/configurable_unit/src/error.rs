use thiserror::Error;

/// Errors raised at the configuration boundary.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The per-module config value could not be deserialized into
    /// [`UnitOptions`](crate::UnitOptions): a field carries a value of the
    /// wrong type, or the value is not a mapping at all.
    #[error("invalid configurable_unit configuration: {0}")]
    Invalid(#[source] serde_json::Error),
}
