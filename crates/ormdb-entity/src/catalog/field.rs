//! Field descriptors for entities.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::relation::{RelationField, RelationTarget};
use crate::config::DEFAULT_PRIMARY_KEY;

/// A value transform applied to attributes at instantiation.
pub type Mutator = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Wrap a closure as a [`Mutator`].
pub fn mutator<F>(f: F) -> Mutator
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Kind tag of a field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Plain attribute.
    Attribute,
    /// One related record, foreign key on the other side.
    HasOne,
    /// One related record, foreign key on this side.
    BelongsTo,
    /// Many related records, foreign key on the other side.
    HasMany,
    /// Many related records addressed by a list of keys.
    HasManyBy,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Attribute => "attr",
            FieldKind::HasOne => "has_one",
            FieldKind::BelongsTo => "belongs_to",
            FieldKind::HasMany => "has_many",
            FieldKind::HasManyBy => "has_many_by",
        };
        f.write_str(name)
    }
}

/// A plain attribute: default value plus optional inline mutator.
#[derive(Clone)]
pub struct AttributeField {
    /// Default (or merged) value.
    pub value: Value,
    /// Inline mutator. Takes precedence over entity-level mutators.
    pub mutator: Option<Mutator>,
}

impl fmt::Debug for AttributeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeField")
            .field("value", &self.value)
            .field("mutator", &self.mutator.is_some())
            .finish()
    }
}

/// A field descriptor.
///
/// The kind never changes after construction; only the carried `value` is
/// overwritten, and only on a per-call copy of an entity's field map.
#[derive(Debug, Clone)]
pub enum FieldDescriptor {
    /// Plain attribute.
    Attribute(AttributeField),
    /// One-to-one, foreign key on the related record.
    HasOne(RelationField),
    /// Inverse one-to-one / many-to-one, foreign key on this record.
    BelongsTo(RelationField),
    /// One-to-many, foreign key on the related records.
    HasMany(RelationField),
    /// Many related records referenced through a key list.
    HasManyBy {
        /// Shared relation payload.
        relation: RelationField,
        /// Key on the related records matched against the list.
        other_key: String,
    },
}

impl FieldDescriptor {
    /// Create a plain attribute with a default value.
    pub fn attr(value: impl Into<Value>) -> Self {
        FieldDescriptor::Attribute(AttributeField {
            value: value.into(),
            mutator: None,
        })
    }

    /// Create a plain attribute with a default value and an inline mutator.
    pub fn attr_with<F>(value: impl Into<Value>, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        FieldDescriptor::Attribute(AttributeField {
            value: value.into(),
            mutator: Some(mutator(f)),
        })
    }

    /// Create a has-one relation.
    pub fn has_one(
        target: impl Into<RelationTarget>,
        foreign_key: impl Into<String>,
        polymorphic: bool,
    ) -> Self {
        FieldDescriptor::HasOne(RelationField::new(target, foreign_key, polymorphic))
    }

    /// Create a belongs-to relation.
    pub fn belongs_to(
        target: impl Into<RelationTarget>,
        foreign_key: impl Into<String>,
        polymorphic: bool,
    ) -> Self {
        FieldDescriptor::BelongsTo(RelationField::new(target, foreign_key, polymorphic))
    }

    /// Create a has-many relation.
    pub fn has_many(
        target: impl Into<RelationTarget>,
        foreign_key: impl Into<String>,
        polymorphic: bool,
    ) -> Self {
        FieldDescriptor::HasMany(RelationField::new(target, foreign_key, polymorphic))
    }

    /// Create a has-many-by relation. `other_key` defaults to `"id"`.
    pub fn has_many_by(
        target: impl Into<RelationTarget>,
        foreign_key: impl Into<String>,
        other_key: Option<&str>,
        polymorphic: bool,
    ) -> Self {
        FieldDescriptor::HasManyBy {
            relation: RelationField::new(target, foreign_key, polymorphic),
            other_key: other_key.unwrap_or(DEFAULT_PRIMARY_KEY).to_string(),
        }
    }

    /// The kind tag.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldDescriptor::Attribute(_) => FieldKind::Attribute,
            FieldDescriptor::HasOne(_) => FieldKind::HasOne,
            FieldDescriptor::BelongsTo(_) => FieldKind::BelongsTo,
            FieldDescriptor::HasMany(_) => FieldKind::HasMany,
            FieldDescriptor::HasManyBy { .. } => FieldKind::HasManyBy,
        }
    }

    /// True for every kind except plain attributes.
    pub fn is_relation(&self) -> bool {
        !matches!(self, FieldDescriptor::Attribute(_))
    }

    /// True for relations that hold a list of records.
    pub fn is_many(&self) -> bool {
        matches!(
            self,
            FieldDescriptor::HasMany(_) | FieldDescriptor::HasManyBy { .. }
        )
    }

    /// The relation payload, if this is a relation.
    pub fn relation(&self) -> Option<&RelationField> {
        match self {
            FieldDescriptor::Attribute(_) => None,
            FieldDescriptor::HasOne(rel)
            | FieldDescriptor::BelongsTo(rel)
            | FieldDescriptor::HasMany(rel)
            | FieldDescriptor::HasManyBy { relation: rel, .. } => Some(rel),
        }
    }

    /// Check if this relation dispatches on a discriminator.
    pub fn is_polymorphic(&self) -> bool {
        self.relation().is_some_and(|rel| rel.polymorphic)
    }

    /// Foreign key column of a relation.
    pub fn foreign_key(&self) -> Option<&str> {
        self.relation().map(|rel| rel.foreign_key.as_str())
    }

    /// The current value.
    pub fn value(&self) -> &Value {
        match self {
            FieldDescriptor::Attribute(attr) => &attr.value,
            FieldDescriptor::HasOne(rel)
            | FieldDescriptor::BelongsTo(rel)
            | FieldDescriptor::HasMany(rel)
            | FieldDescriptor::HasManyBy { relation: rel, .. } => &rel.value,
        }
    }

    /// Overwrite the current value. Callers must own a private copy of the
    /// descriptor; shared definitions are never written through.
    pub(crate) fn set_value(&mut self, value: Value) {
        match self {
            FieldDescriptor::Attribute(attr) => attr.value = value,
            FieldDescriptor::HasOne(rel)
            | FieldDescriptor::BelongsTo(rel)
            | FieldDescriptor::HasMany(rel)
            | FieldDescriptor::HasManyBy { relation: rel, .. } => rel.value = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attr_factory() {
        let field = FieldDescriptor::attr("");
        assert_eq!(field.kind(), FieldKind::Attribute);
        assert!(!field.is_relation());
        assert_eq!(field.value(), &json!(""));
        assert!(field.foreign_key().is_none());
    }

    #[test]
    fn test_attr_with_mutator() {
        let field = FieldDescriptor::attr_with(Value::Null, |v| v);
        match field {
            FieldDescriptor::Attribute(attr) => assert!(attr.mutator.is_some()),
            other => panic!("expected attribute, got {other:?}"),
        }
    }

    #[test]
    fn test_relation_factories() {
        let one = FieldDescriptor::has_one("Profile", "user_id", false);
        let owner = FieldDescriptor::belongs_to("User", "user_id", false);
        let many = FieldDescriptor::has_many("Post", "user_id", false);

        assert_eq!(one.kind(), FieldKind::HasOne);
        assert_eq!(owner.kind(), FieldKind::BelongsTo);
        assert_eq!(many.kind(), FieldKind::HasMany);
        assert!(one.is_relation() && owner.is_relation() && many.is_relation());
        assert!(many.is_many());
        assert!(!owner.is_many());
        assert_eq!(owner.foreign_key(), Some("user_id"));
        assert!(owner.value().is_null());
    }

    #[test]
    fn test_has_many_by_default_other_key() {
        let field = FieldDescriptor::has_many_by("Tag", "tag_ids", None, false);
        match &field {
            FieldDescriptor::HasManyBy { other_key, .. } => assert_eq!(other_key, "id"),
            other => panic!("expected has_many_by, got {other:?}"),
        }
        assert!(field.is_many());

        let keyed = FieldDescriptor::has_many_by("Tag", "tag_ids", Some("slug"), false);
        match keyed {
            FieldDescriptor::HasManyBy { other_key, .. } => assert_eq!(other_key, "slug"),
            other => panic!("expected has_many_by, got {other:?}"),
        }
    }

    #[test]
    fn test_polymorphic_flag() {
        let field = FieldDescriptor::belongs_to("Commentable", "commentable_id", true);
        assert!(field.is_polymorphic());
        assert!(!FieldDescriptor::attr(1).is_polymorphic());
    }

    #[test]
    fn test_set_value_keeps_kind() {
        let mut field = FieldDescriptor::has_many("Post", "user_id", false);
        field.set_value(json!([{"id": 1}]));
        assert_eq!(field.kind(), FieldKind::HasMany);
        assert_eq!(field.value(), &json!([{"id": 1}]));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FieldKind::HasManyBy.to_string(), "has_many_by");
        assert_eq!(FieldKind::Attribute.to_string(), "attr");
    }
}
