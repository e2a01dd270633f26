use thiserror::Error;

/// Errors raised while parsing paths or importing namespace documents.
#[derive(Debug, Error)]
pub enum NamespaceError {
    /// The path contains no non-empty segment.
    #[error("invalid path: {0:?} has no segments")]
    InvalidPath(String),

    /// A compact document failed validation; nothing was imported.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NamespaceError>;
