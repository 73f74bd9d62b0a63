/// Errors surfaced by a metric or rule store.
///
/// An unreachable store must never be mistaken for "no data": callers map
/// [`StorageError::Unavailable`] to an "evaluation unavailable" outcome
/// instead of a healthy score.
///
/// # Examples
///
/// ```rust
/// use hostscore_storage::error::StorageError;
///
/// let err = StorageError::Unavailable {
///     store: "metrics",
///     reason: "connection refused".to_string(),
/// };
/// assert!(err.to_string().contains("metrics"));
/// assert!(err.is_unavailable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store could not be reached or did not answer.
    #[error("Storage: {store} store unavailable: {reason}")]
    Unavailable { store: &'static str, reason: String },

    /// A record was not found.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// A rule was refused on insert because it is malformed.
    #[error("Storage: rejected rule {id}: {reason}")]
    RejectedRule { id: String, reason: String },

    /// Reading a seed file failed.
    #[error("Storage: I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization failure while loading seed data.
    #[error("Storage: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::Unavailable { .. })
    }
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
