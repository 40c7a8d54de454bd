//! Entity definitions.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use super::field::{mutator, FieldDescriptor, Mutator};
use crate::config::{DEFAULT_CONNECTION, DEFAULT_PRIMARY_KEY};

/// Ordered field map of an entity: field name to descriptor.
pub type FieldMap = Vec<(String, FieldDescriptor)>;

/// An entity definition.
///
/// Definitions are built once and then shared read-only (usually behind an
/// `Arc`). Per-call state lives on copies returned by [`EntityDef::clone_fields`].
#[derive(Clone)]
pub struct EntityDef {
    /// Entity name (unique within its connection).
    pub name: String,
    /// Registry scope used to resolve named relation targets.
    pub connection: String,
    /// Name of the primary key field.
    pub primary_key: String,
    fields: FieldMap,
    mutators: HashMap<String, Mutator>,
}

impl EntityDef {
    /// Create an entity with primary key `id` in the default connection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connection: DEFAULT_CONNECTION.to_string(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            fields: Vec::new(),
            mutators: HashMap::new(),
        }
    }

    /// Set the primary key field name.
    pub fn with_primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = key.into();
        self
    }

    /// Set the registry scope.
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = connection.into();
        self
    }

    /// Add a field. Redeclaring a name replaces the earlier descriptor in place.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = field,
            None => self.fields.push((name, field)),
        }
        self
    }

    /// Add multiple fields.
    pub fn with_fields<N: Into<String>>(
        self,
        fields: impl IntoIterator<Item = (N, FieldDescriptor)>,
    ) -> Self {
        fields
            .into_iter()
            .fold(self, |entity, (name, field)| entity.with_field(name, field))
    }

    /// Register an entity-level mutator for an attribute.
    pub fn with_mutator<F>(mut self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.mutators.insert(field.into(), mutator(f));
        self
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[(String, FieldDescriptor)] {
        &self.fields
    }

    /// A private copy of the field map, safe to write values into.
    pub fn clone_fields(&self) -> FieldMap {
        self.fields.clone()
    }

    /// Entity-level mutators keyed by field name.
    pub fn mutators(&self) -> &HashMap<String, Mutator> {
        &self.mutators
    }

    /// Get a mutator registered for a field.
    pub fn get_mutator(&self, field: &str) -> Option<&Mutator> {
        self.mutators.get(field)
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Check if a field is declared.
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Declared field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// All relation fields.
    pub fn relation_fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields
            .iter()
            .filter(|(_, f)| f.is_relation())
            .map(|(n, f)| (n.as_str(), f))
    }

    /// The primary key value of a raw record, if present and non-null.
    pub fn identity_of<'a>(&self, record: &'a Map<String, Value>) -> Option<&'a Value> {
        record.get(&self.primary_key).filter(|v| !v.is_null())
    }
}

impl fmt::Debug for EntityDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mutators: Vec<&String> = self.mutators.keys().collect();
        mutators.sort();
        f.debug_struct("EntityDef")
            .field("name", &self.name)
            .field("connection", &self.connection)
            .field("primary_key", &self.primary_key)
            .field("fields", &self.fields)
            .field("mutators", &mutators)
            .finish()
    }
}
