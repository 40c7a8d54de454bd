//! Instantiation: raw or normalized data to live entity instances.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use crate::catalog::{EntityDef, FieldDescriptor, FieldMap};
use crate::error::{Error, Result};
use crate::instance::{FieldValue, Instance};
use crate::resolve::Resolver;

/// Build an instance of `entity` from optional raw data.
///
/// Keys of `data` that match declared fields replace the defaults; other keys
/// are ignored. Relation fields are instantiated recursively. A relation whose
/// value is a bare key (or a list starting with one) becomes null.
#[instrument(skip_all, fields(entity = %entity.name))]
pub fn instantiate(
    entity: &Arc<EntityDef>,
    data: Option<&Value>,
    resolver: &Resolver<'_>,
) -> Result<Instance> {
    let instance = build(entity, data, resolver, 0)?;
    debug!(fields = instance.len(), "instantiated");
    Ok(instance)
}

/// Build one instance per element of a list.
pub fn instantiate_many(
    entity: &Arc<EntityDef>,
    data: &Value,
    resolver: &Resolver<'_>,
) -> Result<Vec<Instance>> {
    let items = data.as_array().ok_or_else(|| {
        Error::InvalidData(format!("expected a list of `{}` records", entity.name))
    })?;
    items
        .iter()
        .map(|item| instantiate(entity, Some(item), resolver))
        .collect()
}

/// Merge raw data over a private copy of the entity's field map.
///
/// The shared definition is never written: values land on the clone
/// returned by [`EntityDef::clone_fields`].
pub fn merge_fields(entity: &EntityDef, data: Option<&Map<String, Value>>) -> FieldMap {
    let mut fields = entity.clone_fields();
    if let Some(data) = data {
        for (name, field) in fields.iter_mut() {
            if let Some(value) = data.get(name.as_str()) {
                field.set_value(value.clone());
            }
        }
    }
    fields
}

fn build(
    entity: &Arc<EntityDef>,
    data: Option<&Value>,
    resolver: &Resolver<'_>,
    depth: usize,
) -> Result<Instance> {
    resolver.config().check_depth(depth)?;

    let object = match data {
        None => None,
        Some(Value::Object(object)) => Some(object),
        Some(other) => {
            return Err(Error::InvalidData(format!(
                "cannot instantiate `{}` from {other}",
                entity.name
            )))
        }
    };

    let fields = merge_fields(entity, object);
    let mut values = Vec::with_capacity(fields.len());

    for (name, field) in &fields {
        let value = field.value();
        if value.is_null() {
            values.push((name.clone(), FieldValue::Null));
            continue;
        }

        let slot = match field {
            FieldDescriptor::Attribute(attr) => {
                let mutator = attr.mutator.as_ref().or_else(|| entity.get_mutator(name));
                let value = match mutator {
                    Some(m) => m(value.clone()),
                    None => value.clone(),
                };
                FieldValue::from_value(value)
            }
            _ if is_key_placeholder(field, value) => {
                trace!(entity = %entity.name, field = %name, "relation holds bare keys");
                FieldValue::Null
            }
            FieldDescriptor::HasOne(_) | FieldDescriptor::BelongsTo(_) => {
                let target = resolver.resolve_with_value(entity, name, field, value)?;
                FieldValue::One(Box::new(build(&target, Some(value), resolver, depth + 1)?))
            }
            FieldDescriptor::HasMany(_) | FieldDescriptor::HasManyBy { .. } => {
                let items = value.as_array().ok_or_else(|| {
                    Error::InvalidData(format!(
                        "field `{}.{}` expects a list",
                        entity.name, name
                    ))
                })?;
                let mut related = Vec::with_capacity(items.len());
                for item in items {
                    let target = resolver.resolve_with_value(entity, name, field, item)?;
                    related.push(build(&target, Some(item), resolver, depth + 1)?);
                }
                FieldValue::Many(related)
            }
        };
        values.push((name.clone(), slot));
    }

    Ok(Instance::from_parts(Arc::clone(entity), values))
}

/// A relation value that is a key rather than embedded data: a scalar, or for
/// a list-valued relation, a list whose first element is a scalar.
fn is_key_placeholder(field: &FieldDescriptor, value: &Value) -> bool {
    let is_key = |v: &Value| matches!(v, Value::Number(_) | Value::String(_));
    if is_key(value) {
        return true;
    }
    let first = value.as_array().and_then(|items| items.first());
    field.is_many() && first.is_some_and(is_key)
}
