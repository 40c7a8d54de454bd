//! Serialization: live instances back to plain nested data.

use serde_json::{Map, Value};

use crate::catalog::FieldDescriptor;
use crate::instance::{FieldValue, Instance};

/// Serialize an instance to plain nested data.
///
/// Falsy slots (null, false, zero, empty string) pass through unchanged.
/// Relation slots are serialized recursively; attributes are emitted as-is.
/// Mutators applied during instantiation are not reversed.
pub fn to_json(instance: &Instance) -> Value {
    let entity = instance.entity();
    let mut out = Map::with_capacity(instance.len());

    for (name, slot) in instance.values() {
        let value = if is_falsy(slot) {
            plain(slot)
        } else {
            match entity.get_field(name) {
                Some(FieldDescriptor::HasOne(_)) | Some(FieldDescriptor::BelongsTo(_)) => {
                    match slot {
                        FieldValue::One(related) => to_json(related),
                        other => plain(other),
                    }
                }
                Some(FieldDescriptor::HasMany(_)) => match slot {
                    FieldValue::Many(related) => {
                        Value::Array(related.iter().map(to_json).collect())
                    }
                    other => plain(other),
                },
                Some(FieldDescriptor::Attribute(_))
                | Some(FieldDescriptor::HasManyBy { .. })
                | None => plain(slot),
            }
        };
        out.insert(name.clone(), value);
    }

    Value::Object(out)
}

/// Render a slot without relation-specific handling. Live instances have no
/// plain form other than their own serialization.
fn plain(slot: &FieldValue) -> Value {
    match slot {
        FieldValue::Null => Value::Null,
        FieldValue::Value(v) => v.clone(),
        FieldValue::One(related) => to_json(related),
        FieldValue::Many(related) => Value::Array(related.iter().map(to_json).collect()),
    }
}

/// Null, false, numeric zero and the empty string.
pub fn is_falsy(slot: &FieldValue) -> bool {
    match slot {
        FieldValue::Null => true,
        FieldValue::Value(Value::Null) => true,
        FieldValue::Value(Value::Bool(b)) => !b,
        FieldValue::Value(Value::Number(n)) => n.as_f64() == Some(0.0),
        FieldValue::Value(Value::String(s)) => s.is_empty(),
        FieldValue::Value(_) | FieldValue::One(_) | FieldValue::Many(_) => false,
    }
}
