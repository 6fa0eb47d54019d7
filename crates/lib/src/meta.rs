//! Property metadata and runtime type tokens.
//!
//! This module is the boundary between the construction engine and whatever
//! knows the shape of the mapped types. [`Property`] is the stable descriptor a
//! declaration hands the engine, [`Entity`] is the metadata extractor contract,
//! and [`EntityToken`] / [`Catalog`] stand in for reflective instantiation on
//! the runtime-typed subtype path.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::subtype::{self, Subtype, SubtypeError};

/// Descriptor of one mapped property: a stable name plus its type name.
///
/// Values are cheap to copy and usually declared as constants next to the
/// entity they describe:
///
/// ```
/// use relmap::Property;
///
/// const NAME: Property = Property::new("Name", "String");
/// assert_eq!(NAME.name(), "Name");
/// assert_eq!(NAME.type_name(), "String");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Property {
    name: &'static str,
    ty: &'static str,
}

impl Property {
    /// Creates a descriptor from a stable property name and a type name.
    pub const fn new(name: &'static str, ty: &'static str) -> Self {
        Self { name, ty }
    }

    /// The stable property name, used as the node key in document categories.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The name of the property's in-memory type.
    pub const fn type_name(&self) -> &'static str {
        self.ty
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// A type that can be mapped to persistent storage.
///
/// This is the property-metadata extractor boundary: the engine itself never
/// inspects the type, it only consumes the stable entity name and the property
/// descriptors. An external convention engine walks [`Entity::properties`] and
/// synthesizes default mappings for every property the session's ledger has
/// not consumed.
pub trait Entity: 'static {
    /// Stable entity name used in documents and subtype registries.
    const NAME: &'static str;

    /// Descriptors for every persistent property, in declaration order.
    fn properties() -> &'static [Property];
}

/// A runtime type value for an [`Entity`].
///
/// Tokens carry the entity's `TypeId`, its stable name, and type-erased
/// constructor functions for both subtype builder kinds, so a caller that
/// only learns the subtype at runtime can still create the exact builder the
/// statically typed path would have created.
///
/// ```
/// use relmap::{Entity, EntityToken, Property};
///
/// struct Truck;
/// impl Entity for Truck {
///     const NAME: &'static str = "Truck";
///     fn properties() -> &'static [Property] {
///         &[]
///     }
/// }
///
/// let token = EntityToken::of::<Truck>();
/// assert_eq!(token.name(), "Truck");
/// assert!(token.is::<Truck>());
/// ```
#[derive(Clone, Copy)]
pub struct EntityToken {
    type_id: TypeId,
    name: &'static str,
    make_subclass: fn(String) -> Box<dyn Subtype>,
    make_joined_subclass: fn(String) -> Box<dyn Subtype>,
}

impl EntityToken {
    /// Creates the token for a compile-time-known entity.
    pub fn of<S: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: S::NAME,
            make_subclass: subtype::make_subclass::<S>,
            make_joined_subclass: subtype::make_joined_subclass::<S>,
        }
    }

    /// The stable entity name this token stands for.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The `TypeId` of the underlying entity type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Check whether this token stands for `S`.
    pub fn is<S: Entity>(&self) -> bool {
        self.type_id == TypeId::of::<S>()
    }

    /// Instantiates a discriminator-based subclass builder for this token's type.
    pub(crate) fn new_subclass(&self, discriminator_value: String) -> Box<dyn Subtype> {
        (self.make_subclass)(discriminator_value)
    }

    /// Instantiates a joined-table subclass builder for this token's type.
    pub(crate) fn new_joined_subclass(&self, key_column: String) -> Box<dyn Subtype> {
        (self.make_joined_subclass)(key_column)
    }
}

impl fmt::Debug for EntityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityToken")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .finish()
    }
}

impl PartialEq for EntityToken {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityToken {}

/// A startup-populated registry of entity tokens, keyed by entity name.
///
/// This is the factory registry the runtime-typed subtype path resolves
/// against when all it has is a name. Asking for a name that was never
/// registered is a configuration error, fatal to the session.
///
/// ```
/// use relmap::{Catalog, Entity, Property};
///
/// struct Car;
/// impl Entity for Car {
///     const NAME: &'static str = "Car";
///     fn properties() -> &'static [Property] {
///         &[]
///     }
/// }
///
/// let mut catalog = Catalog::new();
/// catalog.register::<Car>();
///
/// assert!(catalog.token("Car").is_ok());
/// assert!(catalog.token("Boat").is_err());
/// ```
#[derive(Debug, Default)]
pub struct Catalog {
    entries: BTreeMap<&'static str, EntityToken>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity, replacing any earlier registration under the same name.
    pub fn register<S: Entity>(&mut self) -> &mut Self {
        self.entries.insert(S::NAME, EntityToken::of::<S>());
        self
    }

    /// Resolves a name to its token.
    pub fn token(&self, name: &str) -> crate::Result<EntityToken> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| SubtypeError::UnknownEntity { name: name.to_string() }.into())
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered entity names, in name order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}
