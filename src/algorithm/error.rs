use thiserror::Error;

/// Failure kinds surfaced by the packer. None of them are retried: the
/// engine stops, the driver reports and returns what was placed so far.
#[derive(Debug, Error)]
pub enum PackError {
    /// the remaining uncut piece cannot accommodate the next detail with
    /// its slack gap; placement cannot proceed
    #[error("unable to cut a new stripe, LRP is too small")]
    LrpTooSmall,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("box storage backend failure: {0}")]
    Storage(#[from] tokio_postgres::Error),
    #[error("unknown detail type tag: {0}")]
    UnknownKind(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
