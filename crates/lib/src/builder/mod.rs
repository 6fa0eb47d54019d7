//! Merge engine: the mapping-definition session.
//!
//! [`ClassBuilder`] owns a partially-built document's state: singleton part
//! slots, keyed category part maps, the consumed-properties [`Ledger`] and the
//! two type-keyed subtype registries. Every declaration records the touched
//! property in the ledger *before* the per-kind part is produced — the ledger
//! is the only signal the external convention engine has for skipping a
//! property, so recording late would let it race ahead and double-map.
//!
//! [`ClassBuilder::alter_document`] merges the accumulated state into a target
//! [`Document`] with add-or-replace semantics per category: last write wins at
//! the node-key level, singletons are overwritten unconditionally, and the
//! call is idempotent.
//!
//! # Usage
//!
//! ```
//! use relmap::{ClassBuilder, Entity, Property};
//!
//! struct Order;
//! impl Entity for Order {
//!     const NAME: &'static str = "Order";
//!     fn properties() -> &'static [Property] {
//!         const PROPS: &[Property] = &[
//!             Property::new("Id", "i64"),
//!             Property::new("Total", "f64"),
//!             Property::new("Scratch", "String"),
//!         ];
//!         PROPS
//!     }
//! }
//!
//! let mut mapping = ClassBuilder::<Order>::new();
//! mapping.id(Property::new("Id", "i64"));
//! mapping.map(Property::new("Total", "f64")).not_null();
//! mapping.ignore_property(Property::new("Scratch", "String"));
//!
//! // The convention collaborator sees all three names as consumed.
//! assert!(Order::properties().iter().all(|p| mapping.is_mapped(p.name())));
//!
//! let doc = mapping.document();
//! assert!(doc.body().property("Scratch").is_none());
//! ```

mod errors;
mod ledger;
mod parts;

pub use errors::BuilderError;
pub use ledger::Ledger;
pub use parts::{
    AnyPart, CachePart, CollectionPart, ComponentPart, CompositeElementPart, CompositeIdPart,
    IdentityPart, JoinPart, PropertyPart, ReferencePart, VersionPart,
};

use std::collections::BTreeMap;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::Result;
use crate::meta::{Entity, EntityToken, Property};
use crate::model::Document;
use crate::model::nodes::{CollectionKind, DiscriminatorNode, ReferenceKind};
use crate::subtype::{JoinedSubclassBuilder, SubclassBuilder, Subtype, SubtypeNode};

/// How a session treats the redefinition of an already-defined key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedefinitionPolicy {
    /// Last write wins; re-declaring a key silently replaces the earlier
    /// definition.
    #[default]
    Replace,
    /// Replacements are recorded and reported as errors when the session is
    /// validated or snapshotted.
    Deny,
}

/// One recorded replacement of an existing definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redefinition {
    pub category: &'static str,
    pub key: String,
}

fn note_redefinition(log: &mut Vec<Redefinition>, category: &'static str, key: &str) {
    trace!(category, key, "definition replaced");
    log.push(Redefinition { category, key: key.to_string() });
}

/// Object-safe capability shared by root and subtype sessions: enumerate what
/// has been consumed, declare the discriminator column, and merge the session
/// state into a target document. A document assembled this way can itself be
/// merged into an enclosing document's subclass list.
pub trait Classlike {
    /// Stable name of the entity this session maps.
    fn entity_name(&self) -> &'static str;

    /// Property names consumed so far, in name order.
    fn properties_mapped(&self) -> Vec<String>;

    /// Declares the column discriminating subclass rows.
    fn discriminate_on_column(&mut self, column: &str);

    /// Merges the session's accumulated state into `target`.
    fn alter_document(&self, target: &mut Document);
}

/// The mapping-definition session for entity `T`.
pub struct ClassBuilder<T: Entity> {
    ledger: Ledger,
    policy: RedefinitionPolicy,
    redefinitions: Vec<Redefinition>,
    id: Option<IdentityPart>,
    composite_id: Option<CompositeIdPart>,
    version: Option<VersionPart>,
    discriminator: Option<DiscriminatorNode>,
    cache: Option<CachePart>,
    properties: BTreeMap<String, PropertyPart>,
    references: BTreeMap<String, ReferencePart>,
    collections: BTreeMap<String, CollectionPart>,
    components: BTreeMap<String, ComponentPart>,
    anys: BTreeMap<String, AnyPart>,
    joins: BTreeMap<String, JoinPart>,
    subclasses: BTreeMap<&'static str, Box<dyn Subtype>>,
    joined_subclasses: BTreeMap<&'static str, Box<dyn Subtype>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> ClassBuilder<T> {
    /// Creates an empty session with the default [`RedefinitionPolicy::Replace`].
    pub fn new() -> Self {
        Self::with_policy(RedefinitionPolicy::default())
    }

    /// Creates an empty session with an explicit redefinition policy.
    pub fn with_policy(policy: RedefinitionPolicy) -> Self {
        Self {
            ledger: Ledger::new(),
            policy,
            redefinitions: Vec::new(),
            id: None,
            composite_id: None,
            version: None,
            discriminator: None,
            cache: None,
            properties: BTreeMap::new(),
            references: BTreeMap::new(),
            collections: BTreeMap::new(),
            components: BTreeMap::new(),
            anys: BTreeMap::new(),
            joins: BTreeMap::new(),
            subclasses: BTreeMap::new(),
            joined_subclasses: BTreeMap::new(),
            _entity: PhantomData,
        }
    }

    pub fn policy(&self) -> RedefinitionPolicy {
        self.policy
    }

    /// Replacements recorded so far, in declaration order.
    pub fn redefinitions(&self) -> &[Redefinition] {
        &self.redefinitions
    }

    /// The consumed-properties ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Check whether a property name has been consumed (mapped or ignored).
    ///
    /// This is the contract the convention collaborator must respect: never
    /// synthesize a default for a name this returns true for.
    pub fn is_mapped(&self, name: &str) -> bool {
        self.ledger.contains(name)
    }

    /// Declares the identity property.
    pub fn id(&mut self, property: Property) -> &mut IdentityPart {
        self.ledger.consume(property.name());
        if self.id.is_some() {
            note_redefinition(&mut self.redefinitions, "identity", property.name());
        }
        self.id = Some(IdentityPart::new(property));
        self.id.as_mut().expect("slot set above")
    }

    /// Declares a composite identity; each key property declared inside the
    /// closure is recorded in the session ledger.
    pub fn composite_id(
        &mut self,
        configure: impl FnOnce(&mut CompositeIdBuilder<'_>),
    ) -> &mut CompositeIdPart {
        if self.composite_id.is_some() {
            note_redefinition(&mut self.redefinitions, "composite-id", "composite-id");
        }
        let mut part = CompositeIdPart::new();
        let mut scope = CompositeIdBuilder { part: &mut part, ledger: &mut self.ledger };
        configure(&mut scope);
        self.composite_id = Some(part);
        self.composite_id.as_mut().expect("slot set above")
    }

    /// Declares the version property.
    pub fn version(&mut self, property: Property) -> &mut VersionPart {
        self.ledger.consume(property.name());
        if self.version.is_some() {
            note_redefinition(&mut self.redefinitions, "version", property.name());
        }
        self.version = Some(VersionPart::new(property));
        self.version.as_mut().expect("slot set above")
    }

    /// Declares a plain column-mapped property.
    pub fn map(&mut self, property: Property) -> &mut PropertyPart {
        self.ledger.consume(property.name());
        let name = property.name().to_string();
        if self.properties.contains_key(&name) {
            note_redefinition(&mut self.redefinitions, "property", &name);
        }
        self.properties.insert(name.clone(), PropertyPart::new(property));
        self.properties.get_mut(&name).expect("part inserted above")
    }

    /// Declares a many-to-one reference to entity `O`.
    pub fn references<O: Entity>(&mut self, property: Property) -> &mut ReferencePart {
        self.insert_reference(property, ReferenceKind::ManyToOne, O::NAME)
    }

    /// Declares a one-to-one reference to entity `O`.
    pub fn has_one<O: Entity>(&mut self, property: Property) -> &mut ReferencePart {
        self.insert_reference(property, ReferenceKind::OneToOne, O::NAME)
    }

    fn insert_reference(
        &mut self,
        property: Property,
        kind: ReferenceKind,
        target: &'static str,
    ) -> &mut ReferencePart {
        self.ledger.consume(property.name());
        let name = property.name().to_string();
        if self.references.contains_key(&name) {
            note_redefinition(&mut self.redefinitions, "reference", &name);
        }
        self.references.insert(name.clone(), ReferencePart::new(property, kind, target));
        self.references.get_mut(&name).expect("part inserted above")
    }

    /// Declares a one-to-many collection of entity `C`.
    pub fn has_many<C: Entity>(&mut self, property: Property) -> &mut CollectionPart {
        self.insert_collection(property, CollectionKind::OneToMany, C::NAME)
    }

    /// Declares a many-to-many collection of entity `C`.
    pub fn has_many_to_many<C: Entity>(&mut self, property: Property) -> &mut CollectionPart {
        self.insert_collection(property, CollectionKind::ManyToMany, C::NAME)
    }

    fn insert_collection(
        &mut self,
        property: Property,
        kind: CollectionKind,
        element: &'static str,
    ) -> &mut CollectionPart {
        self.ledger.consume(property.name());
        let name = property.name().to_string();
        if self.collections.contains_key(&name) {
            note_redefinition(&mut self.redefinitions, "collection", &name);
        }
        self.collections.insert(name.clone(), CollectionPart::new(property, kind, element));
        self.collections.get_mut(&name).expect("part inserted above")
    }

    /// Declares a component property; declarations inside the closure flow
    /// through this session's ledger.
    pub fn component(
        &mut self,
        property: Property,
        configure: impl FnOnce(&mut ComponentBuilder<'_>),
    ) -> &mut ComponentPart {
        self.insert_component(property, false, configure)
    }

    /// Declares a dynamic-component property.
    pub fn dynamic_component(
        &mut self,
        property: Property,
        configure: impl FnOnce(&mut ComponentBuilder<'_>),
    ) -> &mut ComponentPart {
        self.insert_component(property, true, configure)
    }

    fn insert_component(
        &mut self,
        property: Property,
        dynamic: bool,
        configure: impl FnOnce(&mut ComponentBuilder<'_>),
    ) -> &mut ComponentPart {
        self.ledger.consume(property.name());
        let name = property.name().to_string();
        if self.components.contains_key(&name) {
            note_redefinition(&mut self.redefinitions, "component", &name);
        }
        self.components.insert(name.clone(), ComponentPart::new(property, dynamic));
        let part = self.components.get_mut(&name).expect("part inserted above");
        let mut scope = ComponentBuilder {
            part,
            ledger: &mut self.ledger,
            redefinitions: &mut self.redefinitions,
        };
        configure(&mut scope);
        self.components.get_mut(&name).expect("part inserted above")
    }

    /// Declares a polymorphic reference.
    pub fn any(&mut self, property: Property) -> &mut AnyPart {
        self.ledger.consume(property.name());
        let name = property.name().to_string();
        if self.anys.contains_key(&name) {
            note_redefinition(&mut self.redefinitions, "any", &name);
        }
        self.anys.insert(name.clone(), AnyPart::new(property));
        self.anys.get_mut(&name).expect("part inserted above")
    }

    /// Declares an auxiliary joined table, keyed by table name.
    pub fn join(&mut self, table: impl Into<String>) -> &mut JoinPart {
        let table = table.into();
        if self.joins.contains_key(&table) {
            note_redefinition(&mut self.redefinitions, "join", &table);
        }
        self.joins.insert(table.clone(), JoinPart::new(table.clone()));
        self.joins.get_mut(&table).expect("part inserted above")
    }

    /// Declares the cache strategy, creating the part on first use.
    pub fn cache(&mut self) -> &mut CachePart {
        self.cache.get_or_insert_with(CachePart::new)
    }

    /// Declares the column discriminating subclass rows.
    pub fn discriminate_on_column(&mut self, column: impl Into<String>) -> &mut Self {
        let column = column.into();
        if self.discriminator.is_some() {
            note_redefinition(&mut self.redefinitions, "discriminator", &column);
        }
        self.discriminator = Some(DiscriminatorNode { column });
        self
    }

    /// Suppresses automatic mapping of a property without producing any node.
    ///
    /// The name is recorded in the ledger so the convention engine skips it,
    /// and any node-producing declaration previously recorded for the name is
    /// erased — a property is never both ignored and mapped.
    pub fn ignore_property(&mut self, property: Property) {
        let name = property.name();
        self.ledger.ignore(name);

        let mut erased = self.properties.remove(name).is_some();
        erased |= self.references.remove(name).is_some();
        erased |= self.collections.remove(name).is_some();
        erased |= self.components.remove(name).is_some();
        erased |= self.anys.remove(name).is_some();
        if self.id.as_ref().is_some_and(|part| part.name() == name) {
            self.id = None;
            erased = true;
        }
        if self.version.as_ref().is_some_and(|part| part.name() == name) {
            self.version = None;
            erased = true;
        }
        if erased {
            note_redefinition(&mut self.redefinitions, "ignore", name);
        }
        trace!(property = name, "property ignored");
    }

    /// Registers a discriminator-based subclass document for `S`, replacing
    /// any prior registration for the same type.
    pub fn subclass<S: Entity>(
        &mut self,
        discriminator_value: impl Into<String>,
        configure: impl FnOnce(&mut SubclassBuilder<S>),
    ) -> &mut SubclassBuilder<S> {
        let mut sub = SubclassBuilder::<S>::new(discriminator_value.into());
        configure(&mut sub);
        self.register_subclass(S::NAME, Box::new(sub))
            .as_any_mut()
            .downcast_mut::<SubclassBuilder<S>>()
            .expect("registry holds the builder stored above")
    }

    /// Registers a joined-table subclass document for `S`, replacing any prior
    /// registration for the same type.
    pub fn joined_subclass<S: Entity>(
        &mut self,
        key_column: impl Into<String>,
        configure: impl FnOnce(&mut JoinedSubclassBuilder<S>),
    ) -> &mut JoinedSubclassBuilder<S> {
        let mut sub = JoinedSubclassBuilder::<S>::new(key_column.into());
        configure(&mut sub);
        self.register_joined_subclass(S::NAME, Box::new(sub))
            .as_any_mut()
            .downcast_mut::<JoinedSubclassBuilder<S>>()
            .expect("registry holds the builder stored above")
    }

    /// Runtime-typed counterpart of [`ClassBuilder::subclass`]: the subtype is
    /// supplied as a token instead of a type parameter. Behaviorally identical
    /// to the statically typed path.
    pub fn subclass_of(
        &mut self,
        token: EntityToken,
        discriminator_value: impl Into<String>,
    ) -> &mut dyn Subtype {
        let sub = token.new_subclass(discriminator_value.into());
        self.register_subclass(token.name(), sub).as_mut()
    }

    /// Runtime-typed counterpart of [`ClassBuilder::joined_subclass`].
    pub fn joined_subclass_of(
        &mut self,
        token: EntityToken,
        key_column: impl Into<String>,
    ) -> &mut dyn Subtype {
        let sub = token.new_joined_subclass(key_column.into());
        self.register_joined_subclass(token.name(), sub).as_mut()
    }

    fn register_subclass(
        &mut self,
        name: &'static str,
        sub: Box<dyn Subtype>,
    ) -> &mut Box<dyn Subtype> {
        // One inheritance strategy per type: displace the other registry's entry.
        if self.joined_subclasses.remove(name).is_some() {
            note_redefinition(&mut self.redefinitions, "subclass", name);
        }
        if self.subclasses.contains_key(name) {
            note_redefinition(&mut self.redefinitions, "subclass", name);
        }
        debug!(entity = name, "subclass registered");
        self.subclasses.insert(name, sub);
        self.subclasses.get_mut(name).expect("subtype inserted above")
    }

    fn register_joined_subclass(
        &mut self,
        name: &'static str,
        sub: Box<dyn Subtype>,
    ) -> &mut Box<dyn Subtype> {
        if self.subclasses.remove(name).is_some() {
            note_redefinition(&mut self.redefinitions, "joined-subclass", name);
        }
        if self.joined_subclasses.contains_key(name) {
            note_redefinition(&mut self.redefinitions, "joined-subclass", name);
        }
        debug!(entity = name, "joined subclass registered");
        self.joined_subclasses.insert(name, sub);
        self.joined_subclasses.get_mut(name).expect("subtype inserted above")
    }

    /// The registered discriminator-based subclass for `entity`, if any.
    pub fn get_subclass(&self, entity: &str) -> Option<&dyn Subtype> {
        self.subclasses.get(entity).map(|sub| sub.as_ref())
    }

    /// The registered joined-table subclass for `entity`, if any.
    pub fn get_joined_subclass(&self, entity: &str) -> Option<&dyn Subtype> {
        self.joined_subclasses.get(entity).map(|sub| sub.as_ref())
    }

    /// Registered discriminator-based subclasses, in entity-name order.
    pub fn subclasses(&self) -> impl Iterator<Item = &dyn Subtype> {
        self.subclasses.values().map(|sub| sub.as_ref())
    }

    /// Registered joined-table subclasses, in entity-name order.
    pub fn joined_subclasses(&self) -> impl Iterator<Item = &dyn Subtype> {
        self.joined_subclasses.values().map(|sub| sub.as_ref())
    }

    /// Merges the session's accumulated state into `target`.
    ///
    /// Singletons the session holds overwrite the target's slots
    /// unconditionally; identity, version and composite identity apply to root
    /// targets only. Keyed categories insert with add-or-replace semantics.
    /// Calling twice with unchanged session state reproduces the same
    /// document content.
    pub fn alter_document(&self, target: &mut Document) {
        if target.is_root() {
            if let Some(part) = &self.id {
                target.set_id(part.node());
            }
            if let Some(part) = &self.composite_id {
                target.set_composite_id(part.node());
            }
            if let Some(part) = &self.version {
                target.set_version(part.node());
            }
        }
        if let Some(node) = &self.discriminator {
            target.set_discriminator(node.clone());
        }
        if let Some(part) = &self.cache {
            target.set_cache(part.node());
        }

        for part in self.properties.values() {
            target.body_mut().add_or_replace_property(part.node());
        }
        for part in self.collections.values() {
            target.body_mut().add_or_replace_collection(part.node());
        }
        for part in self.components.values() {
            target.body_mut().add_or_replace_component(part.node());
        }
        for part in self.references.values() {
            target.body_mut().add_or_replace_reference(part.node());
        }
        for part in self.anys.values() {
            target.body_mut().add_or_replace_any(part.node());
        }
        for part in self.joins.values() {
            target.add_or_replace_join(part.node());
        }

        for sub in self.subclasses.values().chain(self.joined_subclasses.values()) {
            match sub.node() {
                SubtypeNode::Subclass(node) => {
                    target.add_or_replace_subclass(node);
                }
                SubtypeNode::Joined(node) => {
                    target.add_or_replace_joined_subclass(node);
                }
            }
        }

        debug!(entity = T::NAME, "session merged into document");
    }

    /// Checks the session against its redefinition policy.
    pub fn validate(&self) -> Result<()> {
        if self.policy == RedefinitionPolicy::Deny {
            if let Some(redefinition) = self.redefinitions.first() {
                return Err(BuilderError::DuplicateDefinition {
                    category: redefinition.category,
                    key: redefinition.key.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Renders the session into a fresh root document.
    pub fn document(&self) -> Document {
        let mut doc = Document::new(T::NAME);
        self.alter_document(&mut doc);
        doc
    }

    /// Validates the session, then renders it into a fresh root document.
    pub fn build(&self) -> Result<Document> {
        self.validate()?;
        Ok(self.document())
    }
}

impl<T: Entity> Default for ClassBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Classlike for ClassBuilder<T> {
    fn entity_name(&self) -> &'static str {
        T::NAME
    }

    fn properties_mapped(&self) -> Vec<String> {
        self.ledger.iter().map(String::from).collect()
    }

    fn discriminate_on_column(&mut self, column: &str) {
        ClassBuilder::discriminate_on_column(self, column);
    }

    fn alter_document(&self, target: &mut Document) {
        ClassBuilder::alter_document(self, target);
    }
}

/// Scoped builder for a component's nested sub-document.
///
/// Declarations made here flow through the owning session's ledger, so nested
/// properties are consumed exactly like top-level ones.
pub struct ComponentBuilder<'a> {
    part: &'a mut ComponentPart,
    ledger: &'a mut Ledger,
    redefinitions: &'a mut Vec<Redefinition>,
}

impl ComponentBuilder<'_> {
    /// Declares a column-mapped property of the component.
    pub fn map(&mut self, property: Property) -> &mut PropertyPart {
        self.ledger.consume(property.name());
        let name = property.name().to_string();
        if self.part.properties.contains_key(&name) {
            note_redefinition(self.redefinitions, "property", &name);
        }
        self.part.properties.insert(name.clone(), PropertyPart::new(property));
        self.part.properties.get_mut(&name).expect("part inserted above")
    }

    /// Declares a many-to-one reference of the component to entity `O`.
    pub fn references<O: Entity>(&mut self, property: Property) -> &mut ReferencePart {
        self.ledger.consume(property.name());
        let name = property.name().to_string();
        if self.part.references.contains_key(&name) {
            note_redefinition(self.redefinitions, "reference", &name);
        }
        self.part
            .references
            .insert(name.clone(), ReferencePart::new(property, ReferenceKind::ManyToOne, O::NAME));
        self.part.references.get_mut(&name).expect("part inserted above")
    }
}

/// Scoped builder for a composite identity.
pub struct CompositeIdBuilder<'a> {
    part: &'a mut CompositeIdPart,
    ledger: &'a mut Ledger,
}

impl CompositeIdBuilder<'_> {
    /// Declares one key property, mapped to a column of the same name.
    pub fn key_property(&mut self, property: Property) -> &mut Self {
        self.ledger.consume(property.name());
        self.part.push_key_property(property.name().to_string(), None);
        self
    }

    /// Declares one key property with an explicit column.
    pub fn key_property_column(
        &mut self,
        property: Property,
        column: impl Into<String>,
    ) -> &mut Self {
        self.ledger.consume(property.name());
        self.part.push_key_property(property.name().to_string(), Some(column.into()));
        self
    }
}
