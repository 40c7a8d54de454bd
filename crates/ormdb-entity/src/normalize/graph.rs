//! Graph normalization primitive.
//!
//! Walks nested data against a [`Schema`], stores every entity record in a
//! per-type bucket keyed by primary key, and replaces embedded relation
//! objects with the primary key (or key list) of the related records.
//! Records seen more than once are merged field by field, later values
//! overwriting earlier ones.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::trace;

use crate::catalog::EntityDef;
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::schema::{NodeId, Schema, SchemaLink, SchemaRef};

/// A flat record: relation fields hold keys, never nested objects.
pub type Record = Map<String, Value>;

/// Records of one entity type keyed by primary key.
pub type Bucket = BTreeMap<String, Record>;

/// Buckets keyed by entity name.
pub type Entities = BTreeMap<String, Bucket>;

/// Output of a normalization run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Primary key of the root record, or the key list for a collection root.
    pub result: Value,
    /// Flat records per entity type.
    pub entities: Entities,
}

impl Normalized {
    /// Records of one entity type.
    pub fn bucket(&self, entity: &str) -> Option<&Bucket> {
        self.entities.get(entity)
    }

    /// A single record by entity name and primary key.
    pub fn record(&self, entity: &str, key: &Value) -> Option<&Record> {
        self.bucket(entity)?.get(&identity_key(key))
    }

    /// Total number of records across buckets.
    pub fn record_count(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    /// Render the buckets as a JSON object.
    pub fn entities_json(&self) -> Value {
        Value::Object(
            self.entities
                .iter()
                .map(|(name, bucket)| {
                    let records = bucket
                        .iter()
                        .map(|(key, record)| (key.clone(), Value::Object(record.clone())))
                        .collect();
                    (name.clone(), Value::Object(records))
                })
                .collect(),
        )
    }

    /// Render as `{"result": ..., "entities": ...}`.
    pub fn into_json(self) -> Value {
        let entities = self.entities_json();
        let mut out = Map::new();
        out.insert("result".to_string(), self.result);
        out.insert("entities".to_string(), entities);
        Value::Object(out)
    }
}

/// Bucket key for a primary key value.
pub fn identity_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize `data` against `schema`.
///
/// A collection schema requires an array; a single schema requires one
/// record (or a bare key, which passes through untouched).
pub fn normalize(schema: &Schema, data: &Value, config: &ModelConfig) -> Result<Normalized> {
    let mut walker = Walker {
        schema,
        config,
        entities: Entities::new(),
    };

    let result = if schema.is_many() {
        let items = data.as_array().ok_or_else(|| {
            Error::InvalidData(format!(
                "expected a list of `{}` records",
                schema.root_entity().name
            ))
        })?;
        let keys = items
            .iter()
            .map(|item| walker.visit_entity(schema.root(), item, 0))
            .collect::<Result<Vec<_>>>()?;
        Value::Array(keys)
    } else {
        walker.visit_entity(schema.root(), data, 0)?
    };

    Ok(Normalized {
        result,
        entities: walker.entities,
    })
}

struct Walker<'s> {
    schema: &'s Schema,
    config: &'s ModelConfig,
    entities: Entities,
}

impl<'s> Walker<'s> {
    fn visit_entity(&mut self, node_id: NodeId, data: &Value, depth: usize) -> Result<Value> {
        self.config.check_depth(depth)?;

        let schema = self.schema;
        let node = schema
            .node(node_id)
            .ok_or_else(|| Error::InvalidData(format!("dangling schema node {node_id}")))?;
        let entity = &node.entity;

        // Non-objects are already keys.
        let Some(object) = data.as_object() else {
            return Ok(data.clone());
        };

        let id = entity
            .identity_of(object)
            .cloned()
            .ok_or_else(|| Error::MissingIdentity {
                entity: entity.name.clone(),
                primary_key: entity.primary_key.clone(),
            })?;

        let mut record = object.clone();
        for link in &node.links {
            let Some(value) = object.get(&link.field) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let normalized = self.visit_link(entity, link, value, depth + 1)?;
            record.insert(link.field.clone(), normalized);
        }

        let key = identity_key(&id);
        trace!(entity = %entity.name, key = %key, "normalized record");
        self.entities
            .entry(entity.name.clone())
            .or_default()
            .entry(key)
            .or_default()
            .extend(record);

        Ok(id)
    }

    fn visit_link(
        &mut self,
        owner: &EntityDef,
        link: &SchemaLink,
        value: &Value,
        depth: usize,
    ) -> Result<Value> {
        if !link.many {
            return self.visit_target(owner, link, value, depth);
        }

        let items = value.as_array().ok_or_else(|| {
            Error::InvalidData(format!(
                "field `{}.{}` expects a list",
                owner.name, link.field
            ))
        })?;
        let keys = items
            .iter()
            .map(|item| self.visit_target(owner, link, item, depth))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(keys))
    }

    fn visit_target(
        &mut self,
        owner: &EntityDef,
        link: &SchemaLink,
        value: &Value,
        depth: usize,
    ) -> Result<Value> {
        match &link.target {
            SchemaRef::Entity(id) => self.visit_entity(*id, value, depth),
            SchemaRef::Union(union) => {
                if !value.is_object() {
                    return Ok(value.clone());
                }
                let name = value
                    .get(&union.discriminator)
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::MissingDiscriminator {
                        entity: owner.name.clone(),
                        field: link.field.clone(),
                        discriminator: union.discriminator.clone(),
                    })?;
                let id = union.candidate(name).ok_or_else(|| Error::UnknownEntity {
                    connection: owner.connection.clone(),
                    name: name.to_string(),
                })?;
                self.visit_entity(id, value, depth)
            }
        }
    }
}
