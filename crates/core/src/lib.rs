#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared records and state machines for the build dashboard.
//!
//! Nothing in this crate performs I/O. The client crate drives these types
//! from network completions and user callbacks.

pub mod error;
pub mod model;
pub mod pagination;
pub mod projection;
pub mod snapshot;
pub mod view;

mod util;

pub use error::{FetchError, PaginationError, SelectionError};
pub use model::{BuildSnapshotRecord, BuildStatus, BuildStepRecord, BuilderRecord, Timestamp};
pub use pagination::{compute_source, has_next, PaginationController, RequestDescriptor};
pub use snapshot::{CurrentBuilder, Disclosure, SnapshotBoard, SnapshotState};
pub use util::now_ms;
