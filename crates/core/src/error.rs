use serde::Serialize;
use thiserror::Error;

/// Why a page fetch produced no data.
///
/// All variants are recovered by the fetch controller: the page is replaced
/// with an empty collection and the error is kept for the empty-state view.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout.
    #[error("network failure: {0}")]
    NetworkFailure(String),
    /// The endpoint answered with a non-2xx status.
    #[error("server returned status {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },
    /// The body was not a JSON array of snapshot records.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Rejected snapshot or builder selection. State is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Builder index outside `0..len`.
    #[error("builder index {index} out of range for {len} builders")]
    InvalidSelection {
        /// Requested index.
        index: usize,
        /// Number of builders on the snapshot.
        len: usize,
    },
    /// Snapshot position outside the current page.
    #[error("no snapshot at position {position} (page holds {len})")]
    UnknownSnapshot {
        /// Requested position.
        position: usize,
        /// Number of snapshots on the page.
        len: usize,
    },
}

/// Invalid pagination setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Offset/limit pagination needs at least one entry per page.
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}
