//! Data handed to the rendering collaborator.
//!
//! These are plain owned values; a renderer reads them and answers with
//! callbacks on the dashboard, never by mutating them.

use serde::Serialize;

use crate::error::FetchError;
use crate::model::{BuildSnapshotRecord, BuildStatus, BuildStepRecord, Timestamp};
use crate::snapshot::{CurrentBuilder, SnapshotState};

/// Collapsed snapshot row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    pub position: usize,
    pub is_open: bool,
    pub commit_hash: String,
    pub description: String,
    pub repository: String,
    pub status: BuildStatus,
}

/// One entry of the builder grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderChip {
    pub index: usize,
    pub name: String,
    pub status: BuildStatus,
}

/// Step table source for the tray.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurrentBuilderView {
    Builder {
        name: String,
        status: BuildStatus,
        build_steps: Vec<BuildStepRecord>,
    },
    /// Explicit marker instead of indexing into an empty builder list.
    NoBuilder,
}

/// Detail panel of an expanded snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrayView {
    pub position: usize,
    pub is_open: bool,
    pub timestamp: Option<Timestamp>,
    pub builders: Vec<BuilderChip>,
    pub selected_builder_index: usize,
    pub current: CurrentBuilderView,
}

/// Prev/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub page_number: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

/// What to show when the page holds no snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EmptyState {
    /// No fetch has completed yet for the wanted page.
    Loading,
    /// The endpoint answered with zero records.
    NoRevisions { as_of_ms: i64 },
    /// The last fetch failed.
    Unavailable(FetchError),
}

pub fn header_view(position: usize, record: &BuildSnapshotRecord, state: &SnapshotState) -> HeaderView {
    HeaderView {
        position,
        is_open: state.is_open(),
        commit_hash: record.commit_hash.clone(),
        description: record.description.clone(),
        repository: record.repository.clone(),
        status: record.status.clone(),
    }
}

pub fn tray_view(position: usize, record: &BuildSnapshotRecord, state: &SnapshotState) -> TrayView {
    let current = match state.current_builder(record) {
        CurrentBuilder::Selected { builder, .. } => CurrentBuilderView::Builder {
            name: builder.name.clone(),
            status: builder.status.clone(),
            build_steps: builder.build_steps.clone(),
        },
        CurrentBuilder::Unavailable => CurrentBuilderView::NoBuilder,
    };
    TrayView {
        position,
        is_open: state.is_open(),
        timestamp: record.timestamp.clone(),
        builders: record
            .builders
            .iter()
            .enumerate()
            .map(|(index, b)| BuilderChip {
                index,
                name: b.name.clone(),
                status: b.status.clone(),
            })
            .collect(),
        selected_builder_index: state.selected_builder_index(),
        current,
    }
}
