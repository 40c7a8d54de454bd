//! Normalization schema built from entity field maps.
//!
//! A schema is an arena of entity nodes. Each entity appears once, keyed by
//! name, and relation links point at node ids, so self-referential and
//! mutually recursive definitions produce a finite graph instead of an
//! infinite expansion. Polymorphic relations link to a union whose target is
//! chosen per record from its discriminator.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::catalog::EntityDef;
use crate::error::{Error, Result};
use crate::resolve::Resolver;

/// Index of a node in a [`Schema`].
pub type NodeId = usize;

/// Target of a relation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRef {
    /// A fixed entity node.
    Entity(NodeId),
    /// Dispatch per record on a discriminator.
    Union(UnionSchema),
}

/// Candidate nodes for a polymorphic relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionSchema {
    /// Key read from each record to pick a candidate.
    pub discriminator: String,
    /// Candidate nodes by entity name.
    pub candidates: BTreeMap<String, NodeId>,
}

impl UnionSchema {
    /// Node for a discriminator value.
    pub fn candidate(&self, name: &str) -> Option<NodeId> {
        self.candidates.get(name).copied()
    }
}

/// A relation field of an entity node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLink {
    /// Field name on the owning entity.
    pub field: String,
    /// Where the field points.
    pub target: SchemaRef,
    /// Whether the field holds a collection.
    pub many: bool,
}

/// One entity type in the schema graph.
#[derive(Debug, Clone)]
pub struct EntityNode {
    /// The entity definition behind this node.
    pub entity: Arc<EntityDef>,
    /// Relation fields; plain attributes are omitted.
    pub links: Vec<SchemaLink>,
}

/// A normalization schema rooted at one entity.
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: Vec<EntityNode>,
    index: HashMap<String, NodeId>,
    root: NodeId,
    many: bool,
}

impl Schema {
    /// Build the schema for `entity`. `many` selects a collection root.
    pub fn build(entity: &Arc<EntityDef>, many: bool, resolver: &Resolver<'_>) -> Result<Self> {
        let mut builder = SchemaBuilder {
            resolver,
            nodes: Vec::new(),
            index: HashMap::new(),
        };
        let root = builder.node_for(Arc::clone(entity))?;
        debug!(
            entity = %entity.name,
            many,
            nodes = builder.nodes.len(),
            "built normalization schema"
        );
        Ok(Self {
            nodes: builder.nodes,
            index: builder.index,
            root,
            many,
        })
    }

    /// Root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Root entity definition.
    pub fn root_entity(&self) -> &Arc<EntityDef> {
        &self.nodes[self.root].entity
    }

    /// Whether the root is a collection.
    pub fn is_many(&self) -> bool {
        self.many
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&EntityNode> {
        self.nodes.get(id)
    }

    /// Node id of an entity name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Entity definition behind a bucket name.
    pub fn entity(&self, name: &str) -> Option<&Arc<EntityDef>> {
        self.node_id(name).map(|id| &self.nodes[id].entity)
    }

    /// Number of entity nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of relation links across all nodes.
    pub fn link_count(&self) -> usize {
        self.nodes.iter().map(|n| n.links.len()).sum()
    }

    /// All entity names in the graph, ordered.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

struct SchemaBuilder<'r, 'a> {
    resolver: &'r Resolver<'a>,
    nodes: Vec<EntityNode>,
    index: HashMap<String, NodeId>,
}

impl SchemaBuilder<'_, '_> {
    fn node_for(&mut self, entity: Arc<EntityDef>) -> Result<NodeId> {
        if let Some(&id) = self.index.get(&entity.name) {
            // Buckets are keyed by name, so a name maps to exactly one definition.
            let existing = &self.nodes[id].entity;
            if !Arc::ptr_eq(existing, &entity) {
                return Err(Error::ConflictingEntity {
                    name: entity.name.clone(),
                    first: existing.connection.clone(),
                    second: entity.connection.clone(),
                });
            }
            return Ok(id);
        }

        // Register before expanding links so cycles land on this id.
        let id = self.nodes.len();
        self.index.insert(entity.name.clone(), id);
        self.nodes.push(EntityNode {
            entity: Arc::clone(&entity),
            links: Vec::new(),
        });

        let mut links = Vec::new();
        for (name, field) in entity.relation_fields() {
            let target = if field.is_polymorphic() {
                SchemaRef::Union(self.union_for(&entity)?)
            } else {
                let def = self.resolver.resolve(&entity, name, field)?;
                SchemaRef::Entity(self.node_for(def)?)
            };
            links.push(SchemaLink {
                field: name.to_string(),
                target,
                many: field.is_many(),
            });
        }
        self.nodes[id].links = links;

        Ok(id)
    }

    /// Every entity in the owner's connection is a union candidate.
    fn union_for(&mut self, owner: &EntityDef) -> Result<UnionSchema> {
        let registry = self.resolver.registry();
        let mut candidates = BTreeMap::new();
        for def in registry.entities_in(&owner.connection) {
            let id = self.node_for(Arc::clone(def))?;
            candidates.insert(def.name.clone(), id);
        }
        Ok(UnionSchema {
            discriminator: self.resolver.config().discriminator_field.clone(),
            candidates,
        })
    }
}
