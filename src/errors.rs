use thiserror::Error;

/// Errors surfaced by the replica's WAL and in-memory store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found")]
    KeyNotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt WAL record: {0}")]
    CorruptLog(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("recover() called more than once")]
    AlreadyRecovered,
}

/// Errors surfaced by the proxy's placement and fan-out layer.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("quorum not reached")]
    QuorumFailed,

    #[error("no replicas configured")]
    NoReplicas,

    #[error("key not found on any replica")]
    NotFound,

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("ring configuration error: {0}")]
    Ring(#[from] crate::ring::RingError),
}
