use thiserror::Error;

pub type TimelineResult<T> = Result<T, TimelineError>;

/// Failure kinds surfaced by the chain generator and matcher. None of these
/// are retried internally: the capability errors are permanent and the input
/// errors are caller policy violations.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("hashing capability unavailable: {0}")]
    HashUnavailable(String),
    #[error("hash invocation failed: {0}")]
    HashFailure(String),
    #[error("chain walk exceeded {limit} steps before reaching target {target_ms} ms; narrow the target")]
    ResourceExhausted { limit: u64, target_ms: i64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TimelineError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        TimelineError::InvalidInput(msg.into())
    }

    pub fn hash_failure<S: Into<String>>(msg: S) -> Self {
        TimelineError::HashFailure(msg.into())
    }
}
