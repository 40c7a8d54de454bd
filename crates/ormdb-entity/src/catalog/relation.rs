//! Relation descriptors between entities.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::entity::EntityDef;

/// Where a relation points.
///
/// `Named` targets are looked up in the registry at resolution time, which
/// lets two definitions reference each other without ordering constraints.
#[derive(Clone)]
pub enum RelationTarget {
    /// A concrete definition.
    Entity(Arc<EntityDef>),
    /// A registry name, resolved lazily.
    Named(String),
}

impl RelationTarget {
    /// Name of the target entity.
    pub fn name(&self) -> &str {
        match self {
            RelationTarget::Entity(def) => &def.name,
            RelationTarget::Named(name) => name,
        }
    }
}

impl fmt::Debug for RelationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationTarget::Entity(def) => f.debug_tuple("Entity").field(&def.name).finish(),
            RelationTarget::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

impl From<&str> for RelationTarget {
    fn from(name: &str) -> Self {
        RelationTarget::Named(name.to_string())
    }
}

impl From<String> for RelationTarget {
    fn from(name: String) -> Self {
        RelationTarget::Named(name)
    }
}

impl From<Arc<EntityDef>> for RelationTarget {
    fn from(def: Arc<EntityDef>) -> Self {
        RelationTarget::Entity(def)
    }
}

impl From<&Arc<EntityDef>> for RelationTarget {
    fn from(def: &Arc<EntityDef>) -> Self {
        RelationTarget::Entity(Arc::clone(def))
    }
}

/// Payload shared by every relation field kind.
#[derive(Debug, Clone)]
pub struct RelationField {
    /// Target entity.
    pub target: RelationTarget,
    /// Foreign key column. Lives on the other side for has-one/has-many and
    /// on this side for belongs-to.
    pub foreign_key: String,
    /// Current raw relation payload.
    pub value: Value,
    /// Whether the concrete target is read from the value's discriminator.
    pub polymorphic: bool,
}

impl RelationField {
    /// Create a relation payload with a null value.
    pub fn new(
        target: impl Into<RelationTarget>,
        foreign_key: impl Into<String>,
        polymorphic: bool,
    ) -> Self {
        Self {
            target: target.into(),
            foreign_key: foreign_key.into(),
            value: Value::Null,
            polymorphic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_target() {
        let target = RelationTarget::from("Post");
        assert_eq!(target.name(), "Post");
        assert!(matches!(target, RelationTarget::Named(_)));
    }

    #[test]
    fn test_entity_target() {
        let post = Arc::new(EntityDef::new("Post"));
        let target = RelationTarget::from(&post);
        assert_eq!(target.name(), "Post");
        assert_eq!(format!("{target:?}"), "Entity(\"Post\")");
    }

    #[test]
    fn test_relation_defaults_to_null() {
        let rel = RelationField::new("User", "user_id", false);
        assert!(rel.value.is_null());
        assert!(!rel.polymorphic);
        assert_eq!(rel.foreign_key, "user_id");
    }
}
