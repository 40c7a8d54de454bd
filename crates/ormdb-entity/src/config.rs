//! Model configuration.

use serde::{Deserialize, Serialize};

use crate::catalog::EntityDef;
use crate::error::Result;

/// Default discriminator key read from polymorphic relation values.
pub const DEFAULT_DISCRIMINATOR_FIELD: &str = "type";

/// Default primary key field name.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Default registry scope.
pub const DEFAULT_CONNECTION: &str = "default";

/// Default recursion limit for normalization and instantiation.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration shared by the resolver, normalizer and instantiation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Key holding the concrete entity name inside a polymorphic value.
    pub discriminator_field: String,

    /// Primary key given to definitions started with [`ModelConfig::entity`].
    pub default_primary_key: String,

    /// Registry scope given to definitions started with [`ModelConfig::entity`].
    pub default_connection: String,

    /// Synthesize missing belongs-to foreign keys after normalization.
    pub infer_foreign_keys: bool,

    /// Maximum relation nesting depth. None disables the guard.
    pub max_depth: Option<usize>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            discriminator_field: DEFAULT_DISCRIMINATOR_FIELD.to_string(),
            default_primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            default_connection: DEFAULT_CONNECTION.to_string(),
            infer_foreign_keys: true,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl ModelConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Start an entity definition with the configured primary key and connection.
    pub fn entity(&self, name: impl Into<String>) -> EntityDef {
        EntityDef::new(name)
            .with_primary_key(self.default_primary_key.as_str())
            .with_connection(self.default_connection.as_str())
    }

    /// Set the discriminator field.
    pub fn with_discriminator_field(mut self, field: impl Into<String>) -> Self {
        self.discriminator_field = field.into();
        self
    }

    /// Set the default primary key.
    pub fn with_default_primary_key(mut self, key: impl Into<String>) -> Self {
        self.default_primary_key = key.into();
        self
    }

    /// Set the default connection scope.
    pub fn with_default_connection(mut self, connection: impl Into<String>) -> Self {
        self.default_connection = connection.into();
        self
    }

    /// Disable belongs-to foreign key synthesis.
    pub fn without_foreign_key_inference(mut self) -> Self {
        self.infer_foreign_keys = false;
        self
    }

    /// Set the nesting depth limit.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Disable the nesting depth limit.
    pub fn without_depth_limit(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Fail if `depth` is past the configured limit.
    pub(crate) fn check_depth(&self, depth: usize) -> Result<()> {
        match self.max_depth {
            Some(limit) if depth > limit => Err(crate::error::Error::DepthExceeded { limit }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.discriminator_field, "type");
        assert_eq!(config.default_primary_key, "id");
        assert_eq!(config.default_connection, "default");
        assert!(config.infer_foreign_keys);
        assert_eq!(config.max_depth, Some(DEFAULT_MAX_DEPTH));
    }

    #[test]
    fn test_from_json_partial() {
        let config = ModelConfig::from_json_str(r#"{"discriminator_field": "kind"}"#).unwrap();
        assert_eq!(config.discriminator_field, "kind");
        assert_eq!(config.default_primary_key, "id");
        assert!(config.infer_foreign_keys);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(ModelConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_entity_uses_configured_defaults() {
        let config = ModelConfig::new()
            .with_default_primary_key("uuid")
            .with_default_connection("tenant");
        let entity = config.entity("User");

        assert_eq!(entity.primary_key, "uuid");
        assert_eq!(entity.connection, "tenant");
    }

    #[test]
    fn test_depth_guard() {
        let config = ModelConfig::new().with_max_depth(2);
        assert!(config.check_depth(2).is_ok());
        assert!(config.check_depth(3).is_err());
        assert!(config.without_depth_limit().check_depth(10_000).is_ok());
    }
}
