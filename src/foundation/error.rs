/// Result alias used across the crate.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error taxonomy for timeline loading, scene composition, element lifecycles and export.
///
/// Only [`ReelError::Composition`] is meant to reach a host unhandled: spec validation errors are
/// recovered by the loader's fallback and element errors are swallowed per element by the
/// pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Malformed timeline document.
    #[error("validation error: {0}")]
    Validation(String),

    /// Overlapping or duration-mismatched scenes in a program.
    #[error("composition error: {0}")]
    Composition(String),

    /// An element failed during mount, update, dispose or destroy.
    #[error("element error: {0}")]
    Element(String),

    /// Export configuration or sink failure.
    #[error("export error: {0}")]
    Export(String),

    /// JSON encode/decode failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else (IO, host errors).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Composition`].
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`ReelError::Element`].
    pub fn element(msg: impl Into<String>) -> Self {
        Self::Element(msg.into())
    }

    /// Build a [`ReelError::Export`].
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`ReelError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
