//! Document node contracts.
//!
//! One struct per mapping concept. Nodes are value objects: shape only, no
//! behavior beyond the [`Keyed`] identity contract. Within a category mapping
//! two nodes are the same entry when their keys match, regardless of content;
//! full-content equality (`PartialEq`) exists for snapshot comparison.

use serde::{Deserialize, Serialize};

use super::{Body, Document};

/// Identity of a node within its category mapping.
///
/// Replacement semantics operate on this key, never on node content.
pub trait Keyed {
    /// The deduplication key within the node's category.
    fn key(&self) -> &str;
}

/// Identity declaration for the root document. At most one per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityNode {
    pub name: String,
    pub column: String,
    pub generator: Option<String>,
}

/// Optimistic-concurrency version column. At most one per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionNode {
    pub name: String,
    pub column: String,
}

/// One property participating in a composite identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPropertyNode {
    pub name: String,
    pub column: String,
}

/// Composite identity spanning several key properties. At most one per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeIdNode {
    pub key_properties: Vec<KeyPropertyNode>,
}

/// Column discriminating subclass rows in a single-table hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscriminatorNode {
    pub column: String,
}

/// Second-level cache concurrency strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheUsage {
    ReadOnly,
    ReadWrite,
    NonstrictReadWrite,
}

/// Cache declaration for the root document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheNode {
    pub usage: CacheUsage,
}

/// Plain column-mapped property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyNode {
    pub name: String,
    pub column: String,
    pub not_null: bool,
    pub length: Option<u32>,
    pub unique: bool,
}

impl Keyed for PropertyNode {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Value-object property mapped over a set of columns in the owning table.
///
/// `dynamic` marks the dynamic-component flavor, whose attribute set is not
/// fixed at mapping time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub name: String,
    pub dynamic: bool,
    pub body: Body,
}

impl Keyed for ComponentNode {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Cardinality of a collection mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionKind {
    OneToMany,
    ManyToMany,
}

/// Composite element of a collection: a value-object element type mapped over
/// columns of the collection table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeElementNode {
    pub class: String,
    pub properties: Vec<PropertyNode>,
}

/// Collection-valued property (one-to-many or many-to-many).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionNode {
    pub name: String,
    pub kind: CollectionKind,
    /// Stable entity name of the element type.
    pub element: String,
    pub key_column: Option<String>,
    pub table: Option<String>,
    pub composite_element: Option<CompositeElementNode>,
}

impl Keyed for CollectionNode {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Cardinality of a single-valued reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    ManyToOne,
    OneToOne,
}

/// Single-valued reference to another entity (many-to-one or one-to-one).
///
/// Both kinds share one keyed category: a property holds at most one
/// reference, whichever kind was declared last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceNode {
    pub name: String,
    pub kind: ReferenceKind,
    /// Stable entity name of the referenced type.
    pub target: String,
    pub column: Option<String>,
    pub cascade: Option<String>,
}

impl Keyed for ReferenceNode {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Polymorphic reference resolved through an identifier column and a type column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyNode {
    pub name: String,
    pub id_column: String,
    pub type_column: String,
}

impl Keyed for AnyNode {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Auxiliary table joined to the root document's table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinNode {
    pub table: String,
    pub key_column: Option<String>,
}

impl Keyed for JoinNode {
    fn key(&self) -> &str {
        &self.table
    }
}

/// Discriminator-based subclass document, nested under its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubclassNode {
    pub entity: String,
    pub discriminator_value: String,
    pub document: Document,
}

impl Keyed for SubclassNode {
    fn key(&self) -> &str {
        &self.entity
    }
}

/// Joined-table subclass document, nested under its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedSubclassNode {
    pub entity: String,
    pub key_column: String,
    pub document: Document,
}

impl Keyed for JoinedSubclassNode {
    fn key(&self) -> &str {
        &self.entity
    }
}
