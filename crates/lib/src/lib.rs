//!
//! Relmap: a fluent construction engine for normalized object/relational
//! mapping documents.
//!
//! ## Core Concepts
//!
//! The library is built around several key concepts:
//!
//! * **Documents (`model::Document`)**: The normalized, tree-shaped description of how an
//!   entity's properties correspond to persistent storage constructs (columns, references,
//!   collections, inheritance hierarchies). Read out once, as an immutable snapshot, by a
//!   downstream renderer.
//! * **Nodes (`model::nodes`)**: The addressable units within a document. Each node kind
//!   carries a stable key (property name, table name, or entity name) used for
//!   last-write-wins replacement within its category.
//! * **Sessions (`builder::ClassBuilder`)**: The mapping-definition session. Builder
//!   declarations record each touched property in the consumed-properties ledger and
//!   accumulate per-kind parts; `alter_document` merges the accumulated state into a
//!   target document with add-or-replace semantics.
//! * **Ledger (`builder::Ledger`)**: The set of property names already represented in the
//!   document. An external convention engine consults it to synthesize defaults only for
//!   properties no explicit declaration has touched.
//! * **Subtypes (`subtype`)**: Type-keyed registries of subtype documents, one per
//!   inheritance strategy (discriminator-based and joined-table), reachable both through
//!   statically typed builders and through runtime [`EntityToken`] values.
//!
//! ## Example
//!
//! ```
//! use relmap::{ClassBuilder, Entity, Property};
//!
//! struct Person;
//!
//! impl Entity for Person {
//!     const NAME: &'static str = "Person";
//!     fn properties() -> &'static [Property] {
//!         const PROPS: &[Property] = &[
//!             Property::new("Id", "i64"),
//!             Property::new("Name", "String"),
//!         ];
//!         PROPS
//!     }
//! }
//!
//! let mut mapping = ClassBuilder::<Person>::new();
//! mapping.id(Property::new("Id", "i64"));
//! mapping.map(Property::new("Name", "String")).column("nm");
//!
//! let document = mapping.document();
//! assert!(document.id().is_some());
//! assert_eq!(document.body().property("Name").unwrap().column, "nm");
//! ```

pub mod builder;
pub mod meta;
pub mod model;
pub mod subtype;
pub mod testing;

pub use builder::{ClassBuilder, Classlike, RedefinitionPolicy};
pub use meta::{Catalog, Entity, EntityToken, Property};
pub use model::Document;
pub use subtype::{JoinedSubclassBuilder, SubclassBuilder, Subtype};

/// Result type used throughout the relmap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the relmap library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured session errors from the builder module
    #[error(transparent)]
    Builder(builder::BuilderError),

    /// Structured registry errors from the subtype module
    #[error(transparent)]
    Subtype(subtype::SubtypeError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Builder(_) => "builder",
            Error::Subtype(_) => "subtype",
        }
    }

    /// Check if this error reports a redefinition rejected by the session policy.
    pub fn is_duplicate_definition(&self) -> bool {
        match self {
            Error::Builder(builder_err) => builder_err.is_duplicate(),
            _ => false,
        }
    }

    /// Check if this error reports an entity name the catalog does not know.
    pub fn is_unknown_entity(&self) -> bool {
        match self {
            Error::Subtype(subtype_err) => subtype_err.is_unknown_entity(),
            _ => false,
        }
    }
}
