//! Normalization pipeline.
//!
//! Builds the schema for an entity, flattens the input through the graph
//! normalizer and then repairs belongs-to foreign keys on the result.

pub mod foreign_key;
pub mod graph;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

pub use foreign_key::attach_foreign_keys;
pub use graph::{identity_key, Bucket, Entities, Normalized, Record};

use crate::catalog::EntityDef;
use crate::error::Result;
use crate::resolve::Resolver;
use crate::schema::Schema;

/// Normalize `data` as one `entity` record, or as a list of them when `data`
/// is an array.
#[instrument(skip_all, fields(entity = %entity.name))]
pub fn normalize(
    entity: &Arc<EntityDef>,
    data: &Value,
    resolver: &Resolver<'_>,
) -> Result<Normalized> {
    let many = data.is_array();
    let schema = Schema::build(entity, many, resolver)?;
    let mut normalized = graph::normalize(&schema, data, resolver.config())?;

    let attached = if resolver.config().infer_foreign_keys {
        attach_foreign_keys(&schema, &mut normalized.entities)
    } else {
        0
    };

    debug!(
        many,
        buckets = normalized.entities.len(),
        records = normalized.record_count(),
        attached,
        "normalized"
    );
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityRegistry, FieldDescriptor};
    use crate::config::ModelConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> EntityRegistry {
        let user = EntityDef::new("User")
            .with_field("id", FieldDescriptor::attr(Value::Null))
            .with_field("name", FieldDescriptor::attr(""));
        let post = EntityDef::new("Post")
            .with_field("id", FieldDescriptor::attr(Value::Null))
            .with_field("title", FieldDescriptor::attr(""))
            .with_field("author", FieldDescriptor::belongs_to("User", "user_id", false));
        EntityRegistry::from_entities([user, post]).unwrap()
    }

    #[test]
    fn test_normalize_infers_foreign_key() {
        let registry = registry();
        let config = ModelConfig::default();
        let resolver = Resolver::new(&registry, &config);
        let post = registry.lookup("default", "Post").unwrap();

        let out = normalize(
            &post,
            &json!({"id": 10, "title": "Hi", "author": {"id": 1, "name": "Ada"}}),
            &resolver,
        )
        .unwrap();

        assert_eq!(
            out.entities_json(),
            json!({
                "Post": {"10": {"id": 10, "title": "Hi", "author": 1, "user_id": 1}},
                "User": {"1": {"id": 1, "name": "Ada"}}
            })
        );
    }

    #[test]
    fn test_normalize_list_input() {
        let registry = registry();
        let config = ModelConfig::default();
        let resolver = Resolver::new(&registry, &config);
        let post = registry.lookup("default", "Post").unwrap();

        let out = normalize(&post, &json!([{"id": 1}, {"id": 2}]), &resolver).unwrap();
        assert_eq!(out.result, json!([1, 2]));
        assert_eq!(out.bucket("Post").unwrap().len(), 2);
    }

    #[test]
    fn test_normalize_without_inference() {
        let registry = registry();
        let config = ModelConfig::new().without_foreign_key_inference();
        let resolver = Resolver::new(&registry, &config);
        let post = registry.lookup("default", "Post").unwrap();

        let out = normalize(&post, &json!({"id": 10, "author": {"id": 1}}), &resolver).unwrap();
        assert!(out.record("Post", &json!(10)).unwrap().get("user_id").is_none());
    }
}
