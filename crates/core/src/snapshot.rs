use std::collections::BTreeMap;

use crate::error::SelectionError;
use crate::model::{BuildSnapshotRecord, BuilderRecord};

/// Open/closed state of a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Disclosure {
    #[default]
    Collapsed,
    Expanded,
}

/// Per-snapshot UI state.
///
/// Two orthogonal pieces: the disclosure, flipped only by [`toggle`], and the
/// selected builder, changed only by [`select_builder`]. Selection survives
/// collapsing.
///
/// [`toggle`]: SnapshotState::toggle
/// [`select_builder`]: SnapshotState::select_builder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotState {
    disclosure: Disclosure,
    selected_builder_index: usize,
}

/// The builder whose step table the tray shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentBuilder<'a> {
    Selected {
        index: usize,
        builder: &'a BuilderRecord,
    },
    /// The snapshot has no builders (or none at the selected index).
    Unavailable,
}

impl SnapshotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disclosure(&self) -> Disclosure {
        self.disclosure
    }

    pub fn is_open(&self) -> bool {
        self.disclosure == Disclosure::Expanded
    }

    /// Flips the disclosure and returns the new `is_open`.
    pub fn toggle(&mut self) -> bool {
        self.disclosure = match self.disclosure {
            Disclosure::Collapsed => Disclosure::Expanded,
            Disclosure::Expanded => Disclosure::Collapsed,
        };
        self.is_open()
    }

    pub fn selected_builder_index(&self) -> usize {
        self.selected_builder_index
    }

    /// Selects builder `index` out of `builder_count`.
    ///
    /// Out-of-range requests are rejected and leave the selection untouched.
    pub fn select_builder(&mut self, index: usize, builder_count: usize) -> Result<(), SelectionError> {
        if index >= builder_count {
            return Err(SelectionError::InvalidSelection {
                index,
                len: builder_count,
            });
        }
        self.selected_builder_index = index;
        Ok(())
    }

    pub fn current_builder<'a>(&self, record: &'a BuildSnapshotRecord) -> CurrentBuilder<'a> {
        match record.builders.get(self.selected_builder_index) {
            Some(builder) => CurrentBuilder::Selected {
                index: self.selected_builder_index,
                builder,
            },
            None => CurrentBuilder::Unavailable,
        }
    }
}

/// UI state for every snapshot on the current page, keyed by position.
///
/// Entries are created on first access and dropped wholesale by [`reset`]
/// whenever the page of records is replaced.
///
/// [`reset`]: SnapshotBoard::reset
#[derive(Debug, Clone, Default)]
pub struct SnapshotBoard {
    states: BTreeMap<usize, SnapshotState>,
}

impl SnapshotBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// State at `position`; default when never touched.
    pub fn get(&self, position: usize) -> SnapshotState {
        self.states.get(&position).copied().unwrap_or_default()
    }

    /// Toggles the snapshot at `position` on a page of `page_len` records.
    pub fn toggle(&mut self, position: usize, page_len: usize) -> Result<bool, SelectionError> {
        if position >= page_len {
            return Err(SelectionError::UnknownSnapshot {
                position,
                len: page_len,
            });
        }
        Ok(self.states.entry(position).or_default().toggle())
    }

    /// Selects builder `index` on the snapshot at `position` of `page`.
    pub fn select_builder(
        &mut self,
        position: usize,
        page: &[BuildSnapshotRecord],
        index: usize,
    ) -> Result<(), SelectionError> {
        let record = page.get(position).ok_or(SelectionError::UnknownSnapshot {
            position,
            len: page.len(),
        })?;
        let builder_count = record.builders.len();
        // Validate before touching the map so a rejected call creates no entry.
        if index >= builder_count {
            return Err(SelectionError::InvalidSelection {
                index,
                len: builder_count,
            });
        }
        self.states
            .entry(position)
            .or_default()
            .select_builder(index, builder_count)
    }

    pub fn reset(&mut self) {
        self.states.clear();
    }

    /// Number of snapshots that have been touched since the last reset.
    pub fn tracked(&self) -> usize {
        self.states.len()
    }
}
