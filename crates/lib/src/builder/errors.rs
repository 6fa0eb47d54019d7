//! Error types for the mapping-definition session.

use thiserror::Error;

/// Structured error types for session validation.
///
/// The merge engine itself has no failure modes; errors only arise when the
/// session's redefinition policy denies replacement and a snapshot is taken.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BuilderError {
    /// A definition was replaced while the session policy denies redefinition
    #[error("duplicate {category} definition for key '{key}'")]
    DuplicateDefinition { category: &'static str, key: String },
}

impl BuilderError {
    /// Check if this error reports a rejected redefinition.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, BuilderError::DuplicateDefinition { .. })
    }

    /// The category the rejected redefinition belongs to.
    pub fn category(&self) -> Option<&str> {
        match self {
            BuilderError::DuplicateDefinition { category, .. } => Some(category),
        }
    }
}

impl From<BuilderError> for crate::Error {
    fn from(err: BuilderError) -> Self {
        crate::Error::Builder(err)
    }
}
