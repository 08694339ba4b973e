//! Error types for skipdrift

use thiserror::Error;

/// Errors that can occur while aligning and tracking cluster distributions
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A local cluster id in `[0, K)` has no member sessions, so its mean
    /// profile is undefined. Downstream code assumes exactly K profile rows
    /// in fixed position order, so loading aborts instead of substituting a
    /// default vector.
    #[error("period {period}: cluster {cluster} has no member sessions")]
    MissingCluster { period: String, cluster: usize },

    /// Two periods disagree on the cluster count K, or vectors within a
    /// profile set are not of uniform length L.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Fewer than 2 periods supplied; matching requires at least one
    /// adjacent pair.
    #[error("period sequence too short: got {0}, need at least 2")]
    EmptySequence(usize),

    /// The storage backend has no data for the requested period.
    #[error("unknown period: {0}")]
    UnknownPeriod(String),

    /// A session record is malformed (e.g. a label outside `[0, K)`).
    #[error("invalid session record: {0}")]
    InvalidSession(String),

    /// Invalid JSON in a period record, config, or report.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure while reading period data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
