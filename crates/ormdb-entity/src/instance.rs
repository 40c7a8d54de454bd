//! Live entity instances.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::EntityDef;

/// The content of one instance field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No value.
    Null,
    /// A plain attribute value (never JSON null).
    Value(Value),
    /// One related instance.
    One(Box<Instance>),
    /// Related instances in input order.
    Many(Vec<Instance>),
}

impl FieldValue {
    /// Wrap a plain value, folding JSON null into [`FieldValue::Null`].
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            other => FieldValue::Value(other),
        }
    }

    /// Check for [`FieldValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The plain value, if this is an attribute value.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The related instance, if this holds one.
    pub fn as_one(&self) -> Option<&Instance> {
        match self {
            FieldValue::One(i) => Some(i),
            _ => None,
        }
    }

    /// The related instances, if this holds a list.
    pub fn as_many(&self) -> Option<&[Instance]> {
        match self {
            FieldValue::Many(items) => Some(items),
            _ => None,
        }
    }
}

/// An instantiated entity: one slot per declared field, in declaration order.
///
/// Instances are produced by the instantiation engine and always carry the
/// full field set of their entity.
#[derive(Clone)]
pub struct Instance {
    entity: Arc<EntityDef>,
    values: Vec<(String, FieldValue)>,
}

impl Instance {
    pub(crate) fn from_parts(entity: Arc<EntityDef>, values: Vec<(String, FieldValue)>) -> Self {
        Self { entity, values }
    }

    /// The entity definition this instance was built from.
    pub fn entity(&self) -> &Arc<EntityDef> {
        &self.entity
    }

    /// Entity name.
    pub fn entity_name(&self) -> &str {
        &self.entity.name
    }

    /// Get a field slot.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(n, _)| n == field).map(|(_, v)| v)
    }

    /// Get a plain attribute value.
    pub fn attr(&self, field: &str) -> Option<&Value> {
        self.get(field).and_then(FieldValue::as_value)
    }

    /// Get a single related instance.
    pub fn one(&self, field: &str) -> Option<&Instance> {
        self.get(field).and_then(FieldValue::as_one)
    }

    /// Get related instances.
    pub fn many(&self, field: &str) -> Option<&[Instance]> {
        self.get(field).and_then(FieldValue::as_many)
    }

    /// Primary key value, if set.
    pub fn id(&self) -> Option<&Value> {
        self.attr(&self.entity.primary_key)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    /// All slots in declaration order.
    pub fn values(&self) -> &[(String, FieldValue)] {
        &self.values
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the entity declares no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize to plain nested data.
    pub fn to_json(&self) -> Value {
        crate::serialize::to_json(self)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.entity.name == other.entity.name && self.values == other.values
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(&self.entity.name);
        for (name, value) in &self.values {
            s.field(name, value);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Instance {
        let entity = Arc::new(EntityDef::new("User"));
        Instance::from_parts(
            entity,
            vec![
                ("id".into(), FieldValue::Value(json!(1))),
                ("name".into(), FieldValue::Value(json!("Ada"))),
                ("profile".into(), FieldValue::Null),
            ],
        )
    }

    #[test]
    fn test_accessors() {
        let user = sample();

        assert_eq!(user.entity_name(), "User");
        assert_eq!(user.id(), Some(&json!(1)));
        assert_eq!(user.attr("name"), Some(&json!("Ada")));
        assert!(user.get("profile").unwrap().is_null());
        assert!(user.one("profile").is_none());
        assert!(user.get("missing").is_none());
        assert_eq!(user.field_names().collect::<Vec<_>>(), vec!["id", "name", "profile"]);
        assert_eq!(user.len(), 3);
    }

    #[test]
    fn test_from_value_folds_null() {
        assert!(FieldValue::from_value(Value::Null).is_null());
        assert_eq!(FieldValue::from_value(json!(0)), FieldValue::Value(json!(0)));
    }

    #[test]
    fn test_debug_uses_entity_name() {
        let rendered = format!("{:?}", sample());
        assert!(rendered.starts_with("User {"));
    }
}
