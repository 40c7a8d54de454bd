//! Belongs-to foreign key synthesis.

use serde_json::Value;
use tracing::{debug, trace};

use super::graph::{Entities, Record};
use crate::catalog::{EntityDef, FieldDescriptor};
use crate::schema::Schema;

/// Fill in missing belongs-to foreign keys on every normalized record.
///
/// Each bucket is checked against its own entity definition. A belongs-to
/// field whose foreign key column is absent (or null) gets the field's
/// normalized key copied into that column. Returns the number of keys
/// written.
pub fn attach_foreign_keys(schema: &Schema, entities: &mut Entities) -> usize {
    let mut attached = 0;
    for (name, bucket) in entities.iter_mut() {
        let Some(entity) = schema.entity(name) else {
            trace!(bucket = %name, "no definition for bucket");
            continue;
        };
        for (key, record) in bucket.iter_mut() {
            let written = attach_record(entity, record);
            if written > 0 {
                debug!(entity = %name, key = %key, written, "synthesized foreign keys");
            }
            attached += written;
        }
    }
    attached
}

fn attach_record(entity: &EntityDef, record: &mut Record) -> usize {
    let pending: Vec<(String, Value)> = record
        .iter()
        .filter_map(|(field, value)| match entity.get_field(field) {
            Some(FieldDescriptor::BelongsTo(rel)) => {
                let missing = match record.get(&rel.foreign_key) {
                    None => true,
                    Some(Value::Null) => !value.is_null(),
                    Some(_) => false,
                };
                missing.then(|| (rel.foreign_key.clone(), value.clone()))
            }
            _ => None,
        })
        .collect();

    let written = pending.len();
    record.extend(pending);
    written
}
