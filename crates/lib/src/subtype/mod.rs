//! Type-keyed subtype documents.
//!
//! A root session owns two registries of subtype documents, one per
//! inheritance strategy: discriminator-based subclasses and joined-table
//! subclasses. Entries are keyed by the subtype's stable entity name and
//! replaced wholesale on re-registration — each redefinition starts from a
//! clean subtype document.
//!
//! Both builders wrap a full [`ClassBuilder`] session for the subtype, so the
//! entire declaration surface is available against a subtype document; `Deref`
//! exposes it directly:
//!
//! ```
//! use relmap::{ClassBuilder, Entity, Property};
//!
//! struct Vehicle;
//! impl Entity for Vehicle {
//!     const NAME: &'static str = "Vehicle";
//!     fn properties() -> &'static [Property] {
//!         &[]
//!     }
//! }
//!
//! struct Truck;
//! impl Entity for Truck {
//!     const NAME: &'static str = "Truck";
//!     fn properties() -> &'static [Property] {
//!         const PROPS: &[Property] = &[Property::new("Payload", "f64")];
//!         PROPS
//!     }
//! }
//!
//! let mut mapping = ClassBuilder::<Vehicle>::new();
//! mapping.discriminate_on_column("kind");
//! mapping.subclass::<Truck>("truck", |sub| {
//!     sub.map(Property::new("Payload", "f64")).not_null();
//! });
//!
//! let doc = mapping.document();
//! let truck = doc.subclass("Truck").unwrap();
//! assert_eq!(truck.discriminator_value, "truck");
//! assert!(truck.document.body().property("Payload").is_some());
//! ```

mod errors;
pub use errors::SubtypeError;

use std::any::Any;
use std::ops::{Deref, DerefMut};

use crate::builder::{ClassBuilder, Classlike};
use crate::meta::Entity;
use crate::model::nodes::{JoinedSubclassNode, SubclassNode};
use crate::model::{Document, DocumentKind};

/// Finished node produced by a subtype builder, one variant per inheritance
/// strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum SubtypeNode {
    Subclass(SubclassNode),
    Joined(JoinedSubclassNode),
}

/// Object-safe capability of a registered subtype document builder.
///
/// The statically typed and runtime-typed registration paths both store this;
/// `as_any_mut` lets the static path recover the concrete builder it just
/// stored so callers keep a typed handle.
pub trait Subtype: Classlike {
    /// Renders the finished subtype node from the current session state.
    fn node(&self) -> SubtypeNode;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Builder for a discriminator-based subclass document of entity `S`.
pub struct SubclassBuilder<S: Entity> {
    class: ClassBuilder<S>,
    discriminator_value: String,
}

impl<S: Entity> SubclassBuilder<S> {
    pub(crate) fn new(discriminator_value: String) -> Self {
        Self { class: ClassBuilder::new(), discriminator_value }
    }

    /// The discriminator value selecting rows of this subtype.
    pub fn discriminator_value(&self) -> &str {
        &self.discriminator_value
    }
}

impl<S: Entity> Deref for SubclassBuilder<S> {
    type Target = ClassBuilder<S>;

    fn deref(&self) -> &Self::Target {
        &self.class
    }
}

impl<S: Entity> DerefMut for SubclassBuilder<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.class
    }
}

impl<S: Entity> Classlike for SubclassBuilder<S> {
    fn entity_name(&self) -> &'static str {
        S::NAME
    }

    fn properties_mapped(&self) -> Vec<String> {
        Classlike::properties_mapped(&self.class)
    }

    fn discriminate_on_column(&mut self, column: &str) {
        Classlike::discriminate_on_column(&mut self.class, column);
    }

    fn alter_document(&self, target: &mut Document) {
        Classlike::alter_document(&self.class, target);
    }
}

impl<S: Entity> Subtype for SubclassBuilder<S> {
    fn node(&self) -> SubtypeNode {
        let mut document = Document::new_subtype(DocumentKind::Subclass, S::NAME);
        self.class.alter_document(&mut document);
        SubtypeNode::Subclass(SubclassNode {
            entity: S::NAME.to_string(),
            discriminator_value: self.discriminator_value.clone(),
            document,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Builder for a joined-table subclass document of entity `S`.
pub struct JoinedSubclassBuilder<S: Entity> {
    class: ClassBuilder<S>,
    key_column: String,
}

impl<S: Entity> JoinedSubclassBuilder<S> {
    pub(crate) fn new(key_column: String) -> Self {
        Self { class: ClassBuilder::new(), key_column }
    }

    /// The foreign-key column joining the subtype table back to its parent.
    pub fn key_column(&self) -> &str {
        &self.key_column
    }
}

impl<S: Entity> Deref for JoinedSubclassBuilder<S> {
    type Target = ClassBuilder<S>;

    fn deref(&self) -> &Self::Target {
        &self.class
    }
}

impl<S: Entity> DerefMut for JoinedSubclassBuilder<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.class
    }
}

impl<S: Entity> Classlike for JoinedSubclassBuilder<S> {
    fn entity_name(&self) -> &'static str {
        S::NAME
    }

    fn properties_mapped(&self) -> Vec<String> {
        Classlike::properties_mapped(&self.class)
    }

    fn discriminate_on_column(&mut self, column: &str) {
        Classlike::discriminate_on_column(&mut self.class, column);
    }

    fn alter_document(&self, target: &mut Document) {
        Classlike::alter_document(&self.class, target);
    }
}

impl<S: Entity> Subtype for JoinedSubclassBuilder<S> {
    fn node(&self) -> SubtypeNode {
        let mut document = Document::new_subtype(DocumentKind::JoinedSubclass, S::NAME);
        self.class.alter_document(&mut document);
        SubtypeNode::Joined(JoinedSubclassNode {
            entity: S::NAME.to_string(),
            key_column: self.key_column.clone(),
            document,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Type-erased constructor wired into [`crate::EntityToken`]; the runtime-typed
/// registration path instantiates through this instead of a type parameter.
pub(crate) fn make_subclass<S: Entity>(discriminator_value: String) -> Box<dyn Subtype> {
    Box::new(SubclassBuilder::<S>::new(discriminator_value))
}

/// Joined-table counterpart of [`make_subclass`].
pub(crate) fn make_joined_subclass<S: Entity>(key_column: String) -> Box<dyn Subtype> {
    Box::new(JoinedSubclassBuilder::<S>::new(key_column))
}
