//! ORMDB Entity - declarative entity-relationship modeling.
//!
//! Describe entities as ordered field maps of attributes and relations, then:
//!
//! - [`normalize`] nested data into flat per-entity buckets keyed by primary
//!   key, with relations replaced by keys and belongs-to foreign keys filled in;
//! - [`instantiate`] raw or normalized data into a live [`Instance`] graph;
//! - [`serialize`] instances back into plain nested data.
//!
//! Relation targets can be named instead of referenced directly. Names are
//! resolved through an [`EntityRegistry`] when the relation is used, so
//! definitions may refer to each other in any order.

pub mod catalog;
pub mod config;
pub mod error;
pub mod instance;
pub mod instantiate;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod schema;
pub mod serialize;

pub use catalog::{
    mutator, AttributeField, EntityDef, EntityRegistry, FieldDescriptor, FieldKind, FieldMap,
    Mutator, RelationField, RelationTarget,
};
pub use config::ModelConfig;
pub use error::{Error, Result};
pub use instance::{FieldValue, Instance};
pub use model::Model;
pub use normalize::{Bucket, Entities, Normalized, Record};
pub use resolve::Resolver;
pub use schema::{EntityNode, NodeId, Schema, SchemaLink, SchemaRef, UnionSchema};
