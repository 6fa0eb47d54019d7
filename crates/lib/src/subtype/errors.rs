//! Error types for the subtype registries.

use thiserror::Error;

/// Structured error types for the runtime-typed subtype path.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SubtypeError {
    /// A runtime type name was supplied that no entity was registered under.
    /// Fatal to the session: the engine cannot construct a subtype document
    /// for a type it has no constructor for.
    #[error("no entity registered under name '{name}'")]
    UnknownEntity { name: String },
}

impl SubtypeError {
    /// Check if this error reports an unregistered entity name.
    pub fn is_unknown_entity(&self) -> bool {
        matches!(self, SubtypeError::UnknownEntity { .. })
    }
}

impl From<SubtypeError> for crate::Error {
    fn from(err: SubtypeError) -> Self {
        crate::Error::Subtype(err)
    }
}
