use std::time::Duration;

/// Errors that can occur while assembling a package.
#[derive(Debug, thiserror::Error)]
pub enum IpkError {
    /// `buffer()` was called before package metadata was supplied.
    #[error("package metadata not set")]
    MetadataNotSet,

    /// Metadata was supplied twice with different values.
    #[error("package metadata already set to {id} {version}")]
    MetadataAlreadySet { id: String, version: String },

    /// The package id cannot be used as a directory name or control value.
    #[error("invalid package id {id:?}: {reason}")]
    InvalidPackageId { id: String, reason: &'static str },

    /// The package version cannot be used in a file name or control value.
    #[error("invalid package version {version:?}: {reason}")]
    InvalidVersion {
        version: String,
        reason: &'static str,
    },

    /// A namespace id cannot be used as a directory name.
    #[error("invalid namespace id {id:?}: {reason}")]
    InvalidNamespaceId { id: String, reason: &'static str },

    /// An asset path is not a relative posix path.
    #[error("invalid asset path {path:?}: {reason}")]
    InvalidAssetPath { path: String, reason: &'static str },

    /// `ar` container encoding failed.
    #[error("archive error: {0}")]
    Archive(#[from] ipkpack_ar::ArError),

    /// Tar or gzip encoding failed.
    #[error("section error: {0}")]
    Section(#[from] ipkpack_section::SectionError),

    /// JSON serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The same namespace id was registered with the aggregator twice.
    #[error("namespace {0} registered twice")]
    DuplicateNamespace(String),

    /// A producer reported a failure instead of its assets.
    #[error("producer for namespace {namespace} failed: {message}")]
    ProducerFailed { namespace: String, message: String },

    /// A producer went away without reporting.
    #[error("producer for namespace {0} finished without contributing assets")]
    ProducerDropped(String),

    /// The aggregator was dropped before the producer reported.
    #[error("aggregator closed before namespace {0} reported")]
    AggregatorClosed(String),

    /// Producers did not all report before the join deadline.
    #[error("join deadline of {deadline:?} exceeded; waiting on: {}", .pending.join(", "))]
    DeadlineExceeded {
        deadline: Duration,
        pending: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, IpkError>;
