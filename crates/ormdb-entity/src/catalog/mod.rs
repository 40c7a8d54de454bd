//! Entity catalog.
//!
//! Field descriptors, entity definitions and the registry used to resolve
//! relation targets by name.

mod entity;
mod field;
mod registry;
mod relation;

pub use entity::{EntityDef, FieldMap};
pub use field::{mutator, AttributeField, FieldDescriptor, FieldKind, Mutator};
pub use registry::EntityRegistry;
pub use relation::{RelationField, RelationTarget};
