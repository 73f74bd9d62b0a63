use hostscore_storage::error::StorageError;

/// Errors returned by [`crate::engine::HealthEngine`].
///
/// Absence (no sample, missing field, no rules) is never an error; only a
/// failing collaborator is.
///
/// # Examples
///
/// ```rust
/// use hostscore_alert::error::EvalError;
/// use hostscore_storage::error::StorageError;
///
/// let err: EvalError = StorageError::Unavailable {
///     store: "rules",
///     reason: "timeout".to_string(),
/// }
/// .into();
/// assert!(err.is_unavailable());
/// assert!(err.to_string().starts_with("Evaluation unavailable"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// A store could not be reached; the result is unknown, not healthy.
    #[error("Evaluation unavailable: {0}")]
    Unavailable(#[source] StorageError),

    /// A store answered with an error other than unavailability.
    #[error("Evaluation failed: {0}")]
    Storage(#[source] StorageError),
}

impl EvalError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, EvalError::Unavailable(_))
    }
}

impl From<StorageError> for EvalError {
    fn from(err: StorageError) -> Self {
        if err.is_unavailable() {
            EvalError::Unavailable(err)
        } else {
            EvalError::Storage(err)
        }
    }
}

/// Convenience `Result` alias for engine operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Reasons a rule definition is refused at creation time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("rule name must not be empty")]
    EmptyName,

    #[error("specific rule must name a target host")]
    MissingTarget,

    #[error("global rule must not name a target host")]
    UnexpectedTarget,

    #[error("unknown condition operator '{0}'")]
    UnknownOperator(String),

    #[error("unknown condition field '{0}'")]
    UnknownField(String),

    #[error("threshold must be a finite number")]
    NonFiniteThreshold,

    #[error("validity window starts at {start} after it ends at {end}")]
    InvertedValidity { start: i64, end: i64 },
}
