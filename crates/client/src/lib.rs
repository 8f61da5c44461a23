#![forbid(unsafe_code)]

//! Fetch side of the build dashboard: the HTTP snapshot source, the
//! stale-aware fetch controller and the [`Dashboard`] that wires them to the
//! core state machines.

pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod source;

pub use config::{ClientConfig, ConfigError, RouteStyle};
pub use dashboard::Dashboard;
pub use fetch::{CompletionOutcome, FetchController, FetchPhase, FetchTicket};
pub use source::{page_url, HttpSource, SnapshotSource};
