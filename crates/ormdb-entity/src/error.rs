//! Entity model error types.

use thiserror::Error;

/// Errors raised while resolving, normalizing or instantiating entities.
#[derive(Debug, Error)]
pub enum Error {
    /// An entity name could not be found in the registry scope.
    #[error("unknown entity `{name}` in connection `{connection}`")]
    UnknownEntity { connection: String, name: String },

    /// An entity name was registered twice in the same scope.
    #[error("entity `{name}` already registered in connection `{connection}`")]
    DuplicateEntity { connection: String, name: String },

    /// Two distinct definitions share an entity name within one schema.
    #[error("entity `{name}` is defined twice (connections `{first}` and `{second}`)")]
    ConflictingEntity {
        name: String,
        first: String,
        second: String,
    },

    /// A polymorphic relation value carries no usable discriminator.
    #[error("polymorphic field `{entity}.{field}` has no `{discriminator}` discriminator")]
    MissingDiscriminator {
        entity: String,
        field: String,
        discriminator: String,
    },

    /// A record reached the normalizer without a primary key value.
    #[error("record of `{entity}` has no usable `{primary_key}` value")]
    MissingIdentity { entity: String, primary_key: String },

    /// Input of a shape the normalizer cannot walk.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Nesting went deeper than the configured limit.
    #[error("nesting depth exceeded limit of {limit}")]
    DepthExceeded { limit: usize },

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for entity model operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error stems from a broken entity declaration rather than bad input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnknownEntity { .. }
                | Error::DuplicateEntity { .. }
                | Error::ConflictingEntity { .. }
                | Error::MissingDiscriminator { .. }
        )
    }
}
