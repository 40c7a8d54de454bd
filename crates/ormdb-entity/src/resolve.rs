//! Relation target resolution.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::catalog::{EntityDef, EntityRegistry, FieldDescriptor, RelationField, RelationTarget};
use crate::config::ModelConfig;
use crate::error::{Error, Result};

/// Resolves relation descriptors to concrete entity definitions.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a EntityRegistry,
    config: &'a ModelConfig,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a registry.
    pub fn new(registry: &'a EntityRegistry, config: &'a ModelConfig) -> Self {
        Self { registry, config }
    }

    /// The registry used for name lookups.
    pub fn registry(&self) -> &'a EntityRegistry {
        self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &'a ModelConfig {
        self.config
    }

    /// Resolve a relation field using the descriptor's current value.
    pub fn resolve(
        &self,
        owner: &EntityDef,
        field: &str,
        descriptor: &FieldDescriptor,
    ) -> Result<Arc<EntityDef>> {
        self.resolve_with_value(owner, field, descriptor, descriptor.value())
    }

    /// Resolve a relation field, reading any discriminator from `value`.
    ///
    /// Polymorphic has-many fields are resolved once per element this way.
    pub fn resolve_with_value(
        &self,
        owner: &EntityDef,
        field: &str,
        descriptor: &FieldDescriptor,
        value: &Value,
    ) -> Result<Arc<EntityDef>> {
        let relation = descriptor.relation().ok_or_else(|| {
            Error::InvalidData(format!(
                "field `{}.{}` is not a relation",
                owner.name, field
            ))
        })?;
        self.resolve_relation(owner, field, relation, value)
    }

    fn resolve_relation(
        &self,
        owner: &EntityDef,
        field: &str,
        relation: &RelationField,
        value: &Value,
    ) -> Result<Arc<EntityDef>> {
        if relation.polymorphic {
            let name = self.discriminator(value).ok_or_else(|| Error::MissingDiscriminator {
                entity: owner.name.clone(),
                field: field.to_string(),
                discriminator: self.config.discriminator_field.clone(),
            })?;
            trace!(entity = %owner.name, field, resolved = name, "polymorphic dispatch");
            return self.registry.lookup(&owner.connection, name);
        }

        match &relation.target {
            RelationTarget::Named(name) => self.registry.lookup(&owner.connection, name),
            RelationTarget::Entity(def) => Ok(Arc::clone(def)),
        }
    }

    /// Read the discriminator out of a polymorphic value.
    pub fn discriminator<'v>(&self, value: &'v Value) -> Option<&'v str> {
        value
            .get(&self.config.discriminator_field)
            .and_then(Value::as_str)
    }
}
