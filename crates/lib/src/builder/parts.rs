//! Per-kind builder parts.
//!
//! A part accumulates the configuration for exactly one node and renders it on
//! demand through `node()`. Parts are handed out as `&mut` references by the
//! session's declarations so configuration can be chained; they never touch
//! the ledger themselves, the session records consumption before a part is
//! created.

use std::collections::BTreeMap;

use crate::meta::{Entity, Property};
use crate::model::Body;
use crate::model::nodes::{
    AnyNode, CacheNode, CacheUsage, CollectionKind, CollectionNode, ComponentNode,
    CompositeElementNode, CompositeIdNode, IdentityNode, JoinNode, KeyPropertyNode, PropertyNode,
    ReferenceKind, ReferenceNode, VersionNode,
};

/// Builds the identity singleton.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityPart {
    name: String,
    column: Option<String>,
    generator: Option<String>,
}

impl IdentityPart {
    pub(crate) fn new(property: Property) -> Self {
        Self { name: property.name().to_string(), column: None, generator: None }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Maps the identity to an explicit column. Defaults to the property name.
    pub fn column(&mut self, column: impl Into<String>) -> &mut Self {
        self.column = Some(column.into());
        self
    }

    /// Names the identifier generation strategy.
    pub fn generated_by(&mut self, generator: impl Into<String>) -> &mut Self {
        self.generator = Some(generator.into());
        self
    }

    pub fn node(&self) -> IdentityNode {
        IdentityNode {
            name: self.name.clone(),
            column: self.column.clone().unwrap_or_else(|| self.name.clone()),
            generator: self.generator.clone(),
        }
    }
}

/// Builds the version singleton.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionPart {
    name: String,
    column: Option<String>,
}

impl VersionPart {
    pub(crate) fn new(property: Property) -> Self {
        Self { name: property.name().to_string(), column: None }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Maps the version to an explicit column. Defaults to the property name.
    pub fn column(&mut self, column: impl Into<String>) -> &mut Self {
        self.column = Some(column.into());
        self
    }

    pub fn node(&self) -> VersionNode {
        VersionNode {
            name: self.name.clone(),
            column: self.column.clone().unwrap_or_else(|| self.name.clone()),
        }
    }
}

/// Builds the composite-identity singleton.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeIdPart {
    key_properties: Vec<KeyPropertyNode>,
}

impl CompositeIdPart {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_key_property(&mut self, name: String, column: Option<String>) {
        let column = column.unwrap_or_else(|| name.clone());
        self.key_properties.push(KeyPropertyNode { name, column });
    }

    pub fn node(&self) -> CompositeIdNode {
        CompositeIdNode { key_properties: self.key_properties.clone() }
    }
}

/// Builds one plain property node.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPart {
    name: String,
    column: Option<String>,
    not_null: bool,
    length: Option<u32>,
    unique: bool,
}

impl PropertyPart {
    pub(crate) fn new(property: Property) -> Self {
        Self {
            name: property.name().to_string(),
            column: None,
            not_null: false,
            length: None,
            unique: false,
        }
    }

    /// Maps the property to an explicit column. Defaults to the property name.
    pub fn column(&mut self, column: impl Into<String>) -> &mut Self {
        self.column = Some(column.into());
        self
    }

    pub fn not_null(&mut self) -> &mut Self {
        self.not_null = true;
        self
    }

    pub fn length(&mut self, length: u32) -> &mut Self {
        self.length = Some(length);
        self
    }

    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    pub fn node(&self) -> PropertyNode {
        PropertyNode {
            name: self.name.clone(),
            column: self.column.clone().unwrap_or_else(|| self.name.clone()),
            not_null: self.not_null,
            length: self.length,
            unique: self.unique,
        }
    }
}

/// Builds one single-valued reference node (many-to-one or one-to-one).
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePart {
    name: String,
    kind: ReferenceKind,
    target: String,
    column: Option<String>,
    cascade: Option<String>,
}

impl ReferencePart {
    pub(crate) fn new(property: Property, kind: ReferenceKind, target: &'static str) -> Self {
        Self {
            name: property.name().to_string(),
            kind,
            target: target.to_string(),
            column: None,
            cascade: None,
        }
    }

    /// Maps the foreign-key column.
    pub fn column(&mut self, column: impl Into<String>) -> &mut Self {
        self.column = Some(column.into());
        self
    }

    /// Names the cascade style applied through this reference.
    pub fn cascade(&mut self, cascade: impl Into<String>) -> &mut Self {
        self.cascade = Some(cascade.into());
        self
    }

    pub fn node(&self) -> ReferenceNode {
        ReferenceNode {
            name: self.name.clone(),
            kind: self.kind,
            target: self.target.clone(),
            column: self.column.clone(),
            cascade: self.cascade.clone(),
        }
    }
}

/// Builds the composite element of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeElementPart {
    class: String,
    properties: BTreeMap<String, PropertyPart>,
}

impl CompositeElementPart {
    pub(crate) fn new(class: &'static str) -> Self {
        Self { class: class.to_string(), properties: BTreeMap::new() }
    }

    /// Declares a property of the element type, mapped over a collection-table column.
    pub fn map(&mut self, property: Property) -> &mut PropertyPart {
        let name = property.name().to_string();
        self.properties.insert(name.clone(), PropertyPart::new(property));
        self.properties.get_mut(&name).expect("part inserted above")
    }

    pub fn node(&self) -> CompositeElementNode {
        CompositeElementNode {
            class: self.class.clone(),
            properties: self.properties.values().map(PropertyPart::node).collect(),
        }
    }
}

/// Builds one collection node (one-to-many or many-to-many).
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPart {
    name: String,
    kind: CollectionKind,
    element: String,
    key_column: Option<String>,
    table: Option<String>,
    composite_element: Option<CompositeElementPart>,
}

impl CollectionPart {
    pub(crate) fn new(property: Property, kind: CollectionKind, element: &'static str) -> Self {
        Self {
            name: property.name().to_string(),
            kind,
            element: element.to_string(),
            key_column: None,
            table: None,
            composite_element: None,
        }
    }

    /// Maps the foreign-key column on the collection side.
    pub fn key_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.key_column = Some(column.into());
        self
    }

    /// Names the collection (link) table.
    pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    /// Declares the collection's element as a composite value object of type `E`.
    ///
    /// Replaces any prior composite-element declaration on this collection.
    pub fn composite_element<E: Entity>(
        &mut self,
        configure: impl FnOnce(&mut CompositeElementPart),
    ) -> &mut Self {
        let mut part = CompositeElementPart::new(E::NAME);
        configure(&mut part);
        self.composite_element = Some(part);
        self
    }

    pub fn node(&self) -> CollectionNode {
        CollectionNode {
            name: self.name.clone(),
            kind: self.kind,
            element: self.element.clone(),
            key_column: self.key_column.clone(),
            table: self.table.clone(),
            composite_element: self.composite_element.as_ref().map(CompositeElementPart::node),
        }
    }
}

/// Builds one component node and its nested sub-document.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentPart {
    name: String,
    dynamic: bool,
    pub(crate) properties: BTreeMap<String, PropertyPart>,
    pub(crate) references: BTreeMap<String, ReferencePart>,
}

impl ComponentPart {
    pub(crate) fn new(property: Property, dynamic: bool) -> Self {
        Self {
            name: property.name().to_string(),
            dynamic,
            properties: BTreeMap::new(),
            references: BTreeMap::new(),
        }
    }

    pub fn node(&self) -> ComponentNode {
        let mut body = Body::new();
        for part in self.properties.values() {
            body.add_or_replace_property(part.node());
        }
        for part in self.references.values() {
            body.add_or_replace_reference(part.node());
        }
        ComponentNode { name: self.name.clone(), dynamic: self.dynamic, body }
    }
}

/// Builds one polymorphic-reference node.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyPart {
    name: String,
    id_column: Option<String>,
    type_column: Option<String>,
}

impl AnyPart {
    pub(crate) fn new(property: Property) -> Self {
        Self { name: property.name().to_string(), id_column: None, type_column: None }
    }

    /// Maps the column holding the referenced identifier.
    pub fn identifier_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.id_column = Some(column.into());
        self
    }

    /// Maps the column holding the referenced type.
    pub fn type_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.type_column = Some(column.into());
        self
    }

    pub fn node(&self) -> AnyNode {
        AnyNode {
            name: self.name.clone(),
            id_column: self.id_column.clone().unwrap_or_else(|| format!("{}_id", self.name)),
            type_column: self.type_column.clone().unwrap_or_else(|| format!("{}_type", self.name)),
        }
    }
}

/// Builds one auxiliary join-table node.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPart {
    table: String,
    key_column: Option<String>,
}

impl JoinPart {
    pub(crate) fn new(table: String) -> Self {
        Self { table, key_column: None }
    }

    /// Maps the foreign-key column joining back to the owning table.
    pub fn key_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.key_column = Some(column.into());
        self
    }

    pub fn node(&self) -> JoinNode {
        JoinNode { table: self.table.clone(), key_column: self.key_column.clone() }
    }
}

/// Builds the cache singleton.
#[derive(Debug, Clone, PartialEq)]
pub struct CachePart {
    usage: CacheUsage,
}

impl CachePart {
    pub(crate) fn new() -> Self {
        Self { usage: CacheUsage::ReadWrite }
    }

    pub fn read_only(&mut self) -> &mut Self {
        self.usage = CacheUsage::ReadOnly;
        self
    }

    pub fn read_write(&mut self) -> &mut Self {
        self.usage = CacheUsage::ReadWrite;
        self
    }

    pub fn nonstrict_read_write(&mut self) -> &mut Self {
        self.usage = CacheUsage::NonstrictReadWrite;
        self
    }

    pub fn node(&self) -> CacheNode {
        CacheNode { usage: self.usage }
    }
}
