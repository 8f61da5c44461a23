use std::collections::HashMap;

use buildboard_core::view::EmptyState;
use buildboard_core::{now_ms, BuildSnapshotRecord, FetchError, RequestDescriptor};
use tracing::{debug, info, warn};

/// Where the fetch lifecycle currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request for the wanted page is outstanding.
    Loading,
    /// The wanted page arrived (possibly empty).
    Loaded,
    /// The wanted page failed; data was cleared.
    Failed(FetchError),
}

/// Tag carried by an issued request and handed back with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    descriptor: RequestDescriptor,
}

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn descriptor(&self) -> RequestDescriptor {
        self.descriptor
    }
}

/// What applying a completion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Data replaced with `records` entries.
    Applied { records: usize },
    /// Data cleared after a failed fetch.
    Failed(FetchError),
    /// The answer was for a page nobody wants any more; ignored.
    Stale,
}

/// Owns the page data and decides which completions may touch it.
///
/// Completions are applied only when their descriptor matches the latest
/// desired descriptor, so a slow answer for an older page can never overwrite
/// a newer one. At most one request per descriptor is outstanding.
#[derive(Debug, Default)]
pub struct FetchController {
    data: Vec<BuildSnapshotRecord>,
    phase: FetchPhase,
    latest: Option<RequestDescriptor>,
    in_flight: HashMap<RequestDescriptor, u64>,
    next_id: u64,
    loaded_at_ms: Option<i64>,
}

impl FetchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `descriptor` as the wanted page.
    ///
    /// Returns a ticket when the caller must issue a request, or `None` when a
    /// request for the same descriptor is already outstanding.
    pub fn begin(&mut self, descriptor: RequestDescriptor) -> Option<FetchTicket> {
        self.latest = Some(descriptor);
        self.phase = FetchPhase::Loading;

        if let Some(id) = self.in_flight.get(&descriptor) {
            debug!(
                id,
                limit = descriptor.limit,
                offset = descriptor.offset,
                "request already in flight"
            );
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.in_flight.insert(descriptor, id);
        info!(
            id,
            limit = descriptor.limit,
            offset = descriptor.offset,
            "requesting page"
        );
        Some(FetchTicket { id, descriptor })
    }

    /// Applies the result for `ticket`. Never fails; errors degrade to an
    /// empty page.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<BuildSnapshotRecord>, FetchError>,
    ) -> CompletionOutcome {
        if self.in_flight.get(&ticket.descriptor) == Some(&ticket.id) {
            self.in_flight.remove(&ticket.descriptor);
        }

        if self.latest != Some(ticket.descriptor) {
            debug!(
                id = ticket.id,
                offset = ticket.descriptor.offset,
                "discarding stale response"
            );
            return CompletionOutcome::Stale;
        }

        self.loaded_at_ms = Some(now_ms());
        match result {
            Ok(records) => {
                let count = records.len();
                info!(id = ticket.id, offset = ticket.descriptor.offset, count, "page loaded");
                self.data = records;
                self.phase = FetchPhase::Loaded;
                CompletionOutcome::Applied { records: count }
            }
            Err(e) => {
                warn!(
                    id = ticket.id,
                    offset = ticket.descriptor.offset,
                    error = %e,
                    "page fetch failed"
                );
                self.data.clear();
                self.phase = FetchPhase::Failed(e.clone());
                CompletionOutcome::Failed(e)
            }
        }
    }

    pub fn data(&self) -> &[BuildSnapshotRecord] {
        &self.data
    }

    pub fn phase(&self) -> &FetchPhase {
        &self.phase
    }

    /// Descriptor of the page currently wanted.
    pub fn latest(&self) -> Option<RequestDescriptor> {
        self.latest
    }

    pub fn is_in_flight(&self, descriptor: RequestDescriptor) -> bool {
        self.in_flight.contains_key(&descriptor)
    }

    /// Outstanding requests, superseded ones included.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// `None` while there is data to show.
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.data.is_empty() {
            return None;
        }
        Some(match &self.phase {
            FetchPhase::Idle | FetchPhase::Loading => EmptyState::Loading,
            FetchPhase::Loaded => EmptyState::NoRevisions {
                as_of_ms: self.loaded_at_ms.unwrap_or_else(now_ms),
            },
            FetchPhase::Failed(e) => EmptyState::Unavailable(e.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildboard_core::compute_source;

    fn records(n: usize) -> Vec<BuildSnapshotRecord> {
        (0..n)
            .map(|i| BuildSnapshotRecord {
                commit_hash: format!("c{i}"),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn starts_idle_and_empty() {
        let f = FetchController::new();
        assert_eq!(f.phase(), &FetchPhase::Idle);
        assert!(f.data().is_empty());
        assert_eq!(f.empty_state(), Some(EmptyState::Loading));
    }

    #[test]
    fn same_descriptor_is_not_reissued_while_in_flight() {
        let mut f = FetchController::new();
        let d = compute_source(2, 0);
        let first = f.begin(d);
        assert!(first.is_some());
        assert!(f.begin(d).is_none());
        assert_eq!(f.in_flight_count(), 1);

        f.complete(first.unwrap(), Ok(records(2)));
        assert!(!f.is_in_flight(d));
        assert!(f.begin(d).is_some());
    }

    #[test]
    fn older_answer_is_discarded() {
        let mut f = FetchController::new();
        let p0 = f.begin(compute_source(2, 0)).unwrap();
        let p1 = f.begin(compute_source(2, 1)).unwrap();

        assert_eq!(f.complete(p1, Ok(records(1))), CompletionOutcome::Applied { records: 1 });
        assert_eq!(f.complete(p0, Ok(records(2))), CompletionOutcome::Stale);
        assert_eq!(f.data().len(), 1);
        assert_eq!(f.in_flight_count(), 0);
    }

    #[test]
    fn stale_failure_does_not_clear_data() {
        let mut f = FetchController::new();
        let p0 = f.begin(compute_source(2, 0)).unwrap();
        let p1 = f.begin(compute_source(2, 1)).unwrap();
        f.complete(p1, Ok(records(2)));

        let out = f.complete(p0, Err(FetchError::ServerError { status: 502 }));
        assert_eq!(out, CompletionOutcome::Stale);
        assert_eq!(f.data().len(), 2);
        assert_eq!(f.phase(), &FetchPhase::Loaded);
    }

    #[test]
    fn failure_clears_data() {
        let mut f = FetchController::new();
        let t = f.begin(compute_source(2, 0)).unwrap();
        f.complete(t, Ok(records(2)));

        let t = f.begin(compute_source(2, 1)).unwrap();
        let err = FetchError::NetworkFailure("connection refused".into());
        assert_eq!(f.complete(t, Err(err.clone())), CompletionOutcome::Failed(err.clone()));
        assert!(f.data().is_empty());
        assert_eq!(f.empty_state(), Some(EmptyState::Unavailable(err)));
    }

    #[test]
    fn loaded_empty_page_is_no_revisions() {
        let mut f = FetchController::new();
        let t = f.begin(compute_source(2, 0)).unwrap();
        f.complete(t, Ok(vec![]));
        assert!(matches!(f.empty_state(), Some(EmptyState::NoRevisions { .. })));
    }
}
