//! Caller-facing surface bound to one entity type.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{EntityDef, EntityRegistry, FieldDescriptor, Mutator};
use crate::config::ModelConfig;
use crate::error::Result;
use crate::instance::Instance;
use crate::instantiate::{instantiate, instantiate_many};
use crate::normalize::{normalize, Normalized};
use crate::resolve::Resolver;
use crate::schema::Schema;

/// An entity definition bound to a registry and configuration.
///
/// ```ignore
/// let config = ModelConfig::default();
/// let users = Model::lookup(&registry, &config, "User")?;
/// let flat = users.normalize(&json!({"id": 1, "posts": [{"id": 10}]}))?;
/// let user = users.instantiate(Some(&json!({"id": 1})))?;
/// ```
#[derive(Debug, Clone)]
pub struct Model<'a> {
    entity: Arc<EntityDef>,
    resolver: Resolver<'a>,
}

impl<'a> Model<'a> {
    /// Bind a definition.
    pub fn new(
        entity: Arc<EntityDef>,
        registry: &'a EntityRegistry,
        config: &'a ModelConfig,
    ) -> Self {
        Self {
            entity,
            resolver: Resolver::new(registry, config),
        }
    }

    /// Bind a registered definition from the configured default connection.
    pub fn lookup(
        registry: &'a EntityRegistry,
        config: &'a ModelConfig,
        name: &str,
    ) -> Result<Self> {
        let entity = registry.lookup(&config.default_connection, name)?;
        Ok(Self::new(entity, registry, config))
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.entity.name
    }

    /// The bound definition.
    pub fn entity(&self) -> &Arc<EntityDef> {
        &self.entity
    }

    /// Declared fields.
    pub fn fields(&self) -> &[(String, FieldDescriptor)] {
        self.entity.fields()
    }

    /// Entity-level mutators.
    pub fn mutators(&self) -> &HashMap<String, Mutator> {
        self.entity.mutators()
    }

    /// Build the normalization schema.
    pub fn schema(&self, many: bool) -> Result<Schema> {
        Schema::build(&self.entity, many, &self.resolver)
    }

    /// Flatten nested data into per-entity buckets.
    pub fn normalize(&self, data: &Value) -> Result<Normalized> {
        normalize(&self.entity, data, &self.resolver)
    }

    /// Build an instance from optional raw data.
    pub fn instantiate(&self, data: Option<&Value>) -> Result<Instance> {
        instantiate(&self.entity, data, &self.resolver)
    }

    /// Build one instance per element of a list.
    pub fn instantiate_many(&self, data: &Value) -> Result<Vec<Instance>> {
        instantiate_many(&self.entity, data, &self.resolver)
    }

    /// Serialize an instance to plain nested data.
    pub fn to_json(&self, instance: &Instance) -> Value {
        instance.to_json()
    }
}
