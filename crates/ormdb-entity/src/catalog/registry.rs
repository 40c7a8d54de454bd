//! Entity registry: name lookup for relation targets.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::EntityDef;
use crate::error::{Error, Result};

/// Read-only lookup of entity definitions, scoped by connection.
///
/// Populate it during setup, then share it (`&EntityRegistry` or
/// `Arc<EntityRegistry>`) with every caller.
#[derive(Debug, Default, Clone)]
pub struct EntityRegistry {
    scopes: HashMap<String, HashMap<String, Arc<EntityDef>>>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a set of definitions.
    pub fn from_entities(entities: impl IntoIterator<Item = EntityDef>) -> Result<Self> {
        let mut registry = Self::new();
        for entity in entities {
            registry.register(entity)?;
        }
        Ok(registry)
    }

    /// Register a definition under its connection and name.
    pub fn register(&mut self, entity: EntityDef) -> Result<Arc<EntityDef>> {
        self.register_arc(Arc::new(entity))
    }

    /// Register an already shared definition.
    pub fn register_arc(&mut self, entity: Arc<EntityDef>) -> Result<Arc<EntityDef>> {
        let scope = self.scopes.entry(entity.connection.clone()).or_default();
        if scope.contains_key(&entity.name) {
            return Err(Error::DuplicateEntity {
                connection: entity.connection.clone(),
                name: entity.name.clone(),
            });
        }
        debug!(connection = %entity.connection, entity = %entity.name, "registered entity");
        scope.insert(entity.name.clone(), Arc::clone(&entity));
        Ok(entity)
    }

    /// Get a definition, if registered.
    pub fn get(&self, connection: &str, name: &str) -> Option<&Arc<EntityDef>> {
        self.scopes.get(connection).and_then(|scope| scope.get(name))
    }

    /// Look up a definition. Unknown names are a configuration error.
    pub fn lookup(&self, connection: &str, name: &str) -> Result<Arc<EntityDef>> {
        self.get(connection, name)
            .cloned()
            .ok_or_else(|| Error::UnknownEntity {
                connection: connection.to_string(),
                name: name.to_string(),
            })
    }

    /// Check if a name is registered in a connection.
    pub fn contains(&self, connection: &str, name: &str) -> bool {
        self.get(connection, name).is_some()
    }

    /// All definitions in a connection, ordered by name.
    pub fn entities_in(&self, connection: &str) -> Vec<&Arc<EntityDef>> {
        let mut entities: Vec<_> = self
            .scopes
            .get(connection)
            .map(|scope| scope.values().collect())
            .unwrap_or_default();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        entities
    }

    /// Entity names in a connection, ordered.
    pub fn entity_names(&self, connection: &str) -> Vec<&str> {
        self.entities_in(connection)
            .into_iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Total number of registered definitions.
    pub fn len(&self) -> usize {
        self.scopes.values().map(HashMap::len).sum()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldDescriptor;

    fn sample_registry() -> EntityRegistry {
        let user = EntityDef::new("User")
            .with_field("id", FieldDescriptor::attr(serde_json::Value::Null))
            .with_field("posts", FieldDescriptor::has_many("Post", "user_id", false));
        let post = EntityDef::new("Post")
            .with_field("id", FieldDescriptor::attr(serde_json::Value::Null))
            .with_field("author", FieldDescriptor::belongs_to("User", "user_id", false));

        EntityRegistry::from_entities([user, post]).unwrap()
    }

    #[test]
    fn test_lookup() {
        let registry = sample_registry();

        assert_eq!(registry.lookup("default", "User").unwrap().name, "User");
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_lookup_unknown_fails() {
        let registry = sample_registry();

        let err = registry.lookup("default", "Comment").unwrap_err();
        assert!(matches!(err, Error::UnknownEntity { ref name, .. } if name == "Comment"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_connections_are_isolated() {
        let mut registry = sample_registry();
        registry
            .register(EntityDef::new("User").with_connection("analytics"))
            .unwrap();

        assert!(registry.contains("analytics", "User"));
        assert!(!registry.contains("analytics", "Post"));
        assert!(registry.lookup("analytics", "Post").is_err());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = sample_registry();
        let err = registry.register(EntityDef::new("User")).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntity { .. }));
    }

    #[test]
    fn test_entity_names_sorted() {
        let registry = sample_registry();
        assert_eq!(registry.entity_names("default"), vec!["Post", "User"]);
        assert!(registry.entity_names("missing").is_empty());
    }
}
