//! Error types for save and load.

use thiserror::Error;

/// Result type for save and load operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while transcoding objects to and from document trees.
///
/// Every variant is fatal to the enclosing `save`/`load` call. A target that
/// failed mid-load may be partially populated and should be reloaded or reset.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A node had the wrong kind, or a scalar could not be converted.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A polymorphic container was asked to build an element without a factory.
    #[error("no factory configured for polymorphic container")]
    MissingFactory,

    /// The factory could not produce an instance for this discriminator.
    #[error("unknown discriminator: {0}")]
    UnknownDiscriminator(String),

    /// A declared key was absent from the node being loaded.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// Two bindings in one declaration used the same name.
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    /// A polymorphic element was already borrowed when the container needed it.
    #[error("element handle is busy: {0}")]
    HandleBusy(String),

    /// Parsing or stringifying a document failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    pub(crate) fn expected(expected: &str, found: &serde_json::Value) -> Self {
        Self::TypeMismatch(format!(
            "expected {expected}, found {}",
            crate::document::kind(found)
        ))
    }
}
