//! Mapping document model.
//!
//! A [`Document`] is the normalized tree a mapping-definition session produces:
//! zero-or-one of each singleton node (identity, version, discriminator, cache,
//! composite identity) plus keyed category mappings grouped in a [`Body`].
//! Insertion is always add-or-replace: a node whose key already exists in its
//! category displaces the prior node, it never merges with it and never errors.
//!
//! Category maps are `BTreeMap` so iteration is deterministic; the order is
//! not meaningful to the document itself, ordering for presentation is the
//! renderer's concern.
//!
//! # Usage
//!
//! ```
//! use relmap::model::{Document, nodes::PropertyNode};
//!
//! let mut doc = Document::new("Person");
//! let node = PropertyNode {
//!     name: "Name".into(),
//!     column: "nm".into(),
//!     not_null: false,
//!     length: None,
//!     unique: false,
//! };
//!
//! assert!(doc.body_mut().add_or_replace_property(node).is_none());
//! assert_eq!(doc.body().property("Name").unwrap().column, "nm");
//! ```

pub mod nodes;


use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use self::nodes::{
    AnyNode, CacheNode, CollectionNode, ComponentNode, CompositeIdNode, DiscriminatorNode,
    IdentityNode, JoinNode, JoinedSubclassNode, Keyed, PropertyNode, ReferenceNode, SubclassNode,
    VersionNode,
};

/// Position of a document within an inheritance hierarchy.
///
/// Identity, version and composite-identity nodes belong to root documents
/// only; subtype documents inherit them from their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Root,
    Subclass,
    JoinedSubclass,
}

/// Keyed node categories shared by root documents, subtype documents and
/// component sub-documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    properties: BTreeMap<String, PropertyNode>,
    collections: BTreeMap<String, CollectionNode>,
    components: BTreeMap<String, ComponentNode>,
    references: BTreeMap<String, ReferenceNode>,
    anys: BTreeMap<String, AnyNode>,
}

/// Inserts a node under its key, returning the displaced node if the key was
/// already present. Key identity, not content identity.
fn add_or_replace<N: Keyed>(map: &mut BTreeMap<String, N>, node: N) -> Option<N> {
    map.insert(node.key().to_string(), node)
}

impl Body {
    /// Creates an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no category holds any node.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.collections.is_empty()
            && self.components.is_empty()
            && self.references.is_empty()
            && self.anys.is_empty()
    }

    /// Total node count across all categories.
    pub fn len(&self) -> usize {
        self.properties.len()
            + self.collections.len()
            + self.components.len()
            + self.references.len()
            + self.anys.len()
    }

    pub fn add_or_replace_property(&mut self, node: PropertyNode) -> Option<PropertyNode> {
        add_or_replace(&mut self.properties, node)
    }

    pub fn add_or_replace_collection(&mut self, node: CollectionNode) -> Option<CollectionNode> {
        add_or_replace(&mut self.collections, node)
    }

    pub fn add_or_replace_component(&mut self, node: ComponentNode) -> Option<ComponentNode> {
        add_or_replace(&mut self.components, node)
    }

    pub fn add_or_replace_reference(&mut self, node: ReferenceNode) -> Option<ReferenceNode> {
        add_or_replace(&mut self.references, node)
    }

    pub fn add_or_replace_any(&mut self, node: AnyNode) -> Option<AnyNode> {
        add_or_replace(&mut self.anys, node)
    }

    pub fn property(&self, key: &str) -> Option<&PropertyNode> {
        self.properties.get(key)
    }

    pub fn collection(&self, key: &str) -> Option<&CollectionNode> {
        self.collections.get(key)
    }

    pub fn component(&self, key: &str) -> Option<&ComponentNode> {
        self.components.get(key)
    }

    pub fn reference(&self, key: &str) -> Option<&ReferenceNode> {
        self.references.get(key)
    }

    pub fn any(&self, key: &str) -> Option<&AnyNode> {
        self.anys.get(key)
    }

    /// Property nodes in key order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyNode> {
        self.properties.values()
    }

    /// Collection nodes in key order.
    pub fn collections(&self) -> impl Iterator<Item = &CollectionNode> {
        self.collections.values()
    }

    /// Component nodes in key order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentNode> {
        self.components.values()
    }

    /// Reference nodes in key order.
    pub fn references(&self) -> impl Iterator<Item = &ReferenceNode> {
        self.references.values()
    }

    /// Any-nodes in key order.
    pub fn anys(&self) -> impl Iterator<Item = &AnyNode> {
        self.anys.values()
    }
}

/// The normalized mapping document for one entity.
///
/// Built incrementally over one mapping-definition session and read out once
/// as an immutable snapshot. Subtype documents use the same type, nested
/// inside [`SubclassNode`] / [`JoinedSubclassNode`] entries, so documents
/// compose recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    kind: DocumentKind,
    entity: String,
    id: Option<IdentityNode>,
    composite_id: Option<CompositeIdNode>,
    version: Option<VersionNode>,
    discriminator: Option<DiscriminatorNode>,
    cache: Option<CacheNode>,
    body: Body,
    joins: BTreeMap<String, JoinNode>,
    subclasses: BTreeMap<String, SubclassNode>,
    joined_subclasses: BTreeMap<String, JoinedSubclassNode>,
}

impl Document {
    /// Creates an empty root document for the named entity.
    pub fn new(entity: impl Into<String>) -> Self {
        Self::new_subtype(DocumentKind::Root, entity)
    }

    /// Creates an empty document of the given kind for the named entity.
    pub fn new_subtype(kind: DocumentKind, entity: impl Into<String>) -> Self {
        Self {
            kind,
            entity: entity.into(),
            id: None,
            composite_id: None,
            version: None,
            discriminator: None,
            cache: None,
            body: Body::new(),
            joins: BTreeMap::new(),
            subclasses: BTreeMap::new(),
            joined_subclasses: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn is_root(&self) -> bool {
        self.kind == DocumentKind::Root
    }

    /// Sets the identity singleton, returning the displaced node if any.
    pub fn set_id(&mut self, node: IdentityNode) -> Option<IdentityNode> {
        self.id.replace(node)
    }

    pub fn id(&self) -> Option<&IdentityNode> {
        self.id.as_ref()
    }

    /// Sets the composite-identity singleton, returning the displaced node if any.
    pub fn set_composite_id(&mut self, node: CompositeIdNode) -> Option<CompositeIdNode> {
        self.composite_id.replace(node)
    }

    pub fn composite_id(&self) -> Option<&CompositeIdNode> {
        self.composite_id.as_ref()
    }

    /// Sets the version singleton, returning the displaced node if any.
    pub fn set_version(&mut self, node: VersionNode) -> Option<VersionNode> {
        self.version.replace(node)
    }

    pub fn version(&self) -> Option<&VersionNode> {
        self.version.as_ref()
    }

    /// Sets the discriminator singleton, returning the displaced node if any.
    pub fn set_discriminator(&mut self, node: DiscriminatorNode) -> Option<DiscriminatorNode> {
        self.discriminator.replace(node)
    }

    pub fn discriminator(&self) -> Option<&DiscriminatorNode> {
        self.discriminator.as_ref()
    }

    /// Sets the cache singleton, returning the displaced node if any.
    pub fn set_cache(&mut self, node: CacheNode) -> Option<CacheNode> {
        self.cache.replace(node)
    }

    pub fn cache(&self) -> Option<&CacheNode> {
        self.cache.as_ref()
    }

    /// The keyed category mappings.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Mutable access to the keyed category mappings.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn add_or_replace_join(&mut self, node: JoinNode) -> Option<JoinNode> {
        add_or_replace(&mut self.joins, node)
    }

    pub fn join(&self, table: &str) -> Option<&JoinNode> {
        self.joins.get(table)
    }

    /// Join nodes in table order.
    pub fn joins(&self) -> impl Iterator<Item = &JoinNode> {
        self.joins.values()
    }

    pub fn add_or_replace_subclass(&mut self, node: SubclassNode) -> Option<SubclassNode> {
        add_or_replace(&mut self.subclasses, node)
    }

    pub fn subclass(&self, entity: &str) -> Option<&SubclassNode> {
        self.subclasses.get(entity)
    }

    /// Subclass nodes in entity-name order.
    pub fn subclasses(&self) -> impl Iterator<Item = &SubclassNode> {
        self.subclasses.values()
    }

    pub fn add_or_replace_joined_subclass(
        &mut self,
        node: JoinedSubclassNode,
    ) -> Option<JoinedSubclassNode> {
        add_or_replace(&mut self.joined_subclasses, node)
    }

    pub fn joined_subclass(&self, entity: &str) -> Option<&JoinedSubclassNode> {
        self.joined_subclasses.get(entity)
    }

    /// Joined-subclass nodes in entity-name order.
    pub fn joined_subclasses(&self) -> impl Iterator<Item = &JoinedSubclassNode> {
        self.joined_subclasses.values()
    }
}
