//! Dashboard behaviour against an in-memory source with controllable latency.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use buildboard_client::{ClientConfig, CompletionOutcome, Dashboard, FetchPhase, SnapshotSource};
use buildboard_core::view::EmptyState;
use buildboard_core::{
    BuildSnapshotRecord, BuilderRecord, FetchError, RequestDescriptor, SelectionError,
};

#[derive(Default)]
struct FakeSource {
    pages: HashMap<u64, Vec<BuildSnapshotRecord>>,
    delays: HashMap<u64, Duration>,
    failures: HashMap<u64, FetchError>,
    calls: Arc<Mutex<Vec<RequestDescriptor>>>,
}

impl FakeSource {
    fn page(mut self, offset: u64, hashes: &[&str]) -> Self {
        let records = hashes
            .iter()
            .map(|h| BuildSnapshotRecord {
                commit_hash: h.to_string(),
                builders: vec![
                    BuilderRecord {
                        name: "linux".into(),
                        ..Default::default()
                    },
                    BuilderRecord {
                        name: "windows".into(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            })
            .collect();
        self.pages.insert(offset, records);
        self
    }

    fn delay(mut self, offset: u64, delay: Duration) -> Self {
        self.delays.insert(offset, delay);
        self
    }

    fn recorder(&self) -> Arc<Mutex<Vec<RequestDescriptor>>> {
        Arc::clone(&self.calls)
    }

    fn fail(mut self, offset: u64, err: FetchError) -> Self {
        self.failures.insert(offset, err);
        self
    }
}

impl SnapshotSource for FakeSource {
    async fn fetch_page(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<Vec<BuildSnapshotRecord>, FetchError> {
        self.calls.lock().unwrap().push(descriptor);
        if let Some(delay) = self.delays.get(&descriptor.offset) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = self.failures.get(&descriptor.offset) {
            return Err(err.clone());
        }
        Ok(self
            .pages
            .get(&descriptor.offset)
            .cloned()
            .unwrap_or_default())
    }
}

fn config(page_size: u32) -> ClientConfig {
    ClientConfig {
        page_size,
        ..ClientConfig::default()
    }
}

fn hashes<S: SnapshotSource>(dash: &Dashboard<S>) -> Vec<String> {
    dash.data().iter().map(|r| r.commit_hash.clone()).collect()
}

#[tokio::test]
async fn pages_forward_with_offset_and_availability() {
    let source = FakeSource::default()
        .page(0, &["a1", "a2"])
        .page(2, &["b1"]);
    let mut dash = Dashboard::new(source, &config(2)).unwrap();

    assert!(dash.mount());
    dash.settle().await;
    assert_eq!(hashes(&dash), ["a1", "a2"]);
    let view = dash.pagination_view();
    assert_eq!(view.page_number, 0);
    assert!(view.has_next);
    assert!(!view.has_previous);

    assert_eq!(dash.next_page(), 1);
    dash.settle().await;
    assert_eq!(hashes(&dash), ["b1"]);
    let view = dash.pagination_view();
    assert_eq!(view.page_number, 1);
    assert!(!view.has_next);
    assert!(view.has_previous);
}

#[tokio::test]
async fn requests_carry_limit_and_offset() {
    let source = FakeSource::default();
    let calls = source.recorder();
    let mut dash = Dashboard::new(source, &config(2)).unwrap();

    dash.mount();
    dash.settle().await;
    dash.next_page();
    dash.settle().await;
    dash.next_page();
    dash.settle().await;

    assert_eq!(
        *calls.lock().unwrap(),
        [
            RequestDescriptor { limit: 2, offset: 0 },
            RequestDescriptor { limit: 2, offset: 2 },
            RequestDescriptor { limit: 2, offset: 4 },
        ]
    );
}

#[tokio::test]
async fn network_failure_empties_data() {
    let source = FakeSource::default()
        .page(0, &["a1", "a2"])
        .fail(2, FetchError::NetworkFailure("connection reset".into()));
    let mut dash = Dashboard::new(source, &config(2)).unwrap();

    dash.mount();
    dash.settle().await;
    assert_eq!(dash.data().len(), 2);

    dash.next_page();
    let outcomes = dash.settle().await;
    assert!(matches!(
        outcomes.as_slice(),
        [CompletionOutcome::Failed(FetchError::NetworkFailure(_))]
    ));
    assert!(dash.data().is_empty());
    assert!(matches!(dash.phase(), FetchPhase::Failed(_)));
    assert!(matches!(dash.empty_state(), Some(EmptyState::Unavailable(_))));
    assert!(!dash.pagination_view().has_next);
}

#[tokio::test(start_paused = true)]
async fn slow_older_page_does_not_overwrite_newer() {
    let source = FakeSource::default()
        .page(0, &["a1", "a2"])
        .page(2, &["b1"])
        .delay(0, Duration::from_millis(500))
        .delay(2, Duration::from_millis(10));
    let mut dash = Dashboard::new(source, &config(2)).unwrap();

    dash.mount();
    dash.next_page();

    let outcomes = dash.settle().await;
    assert_eq!(
        outcomes,
        [CompletionOutcome::Applied { records: 1 }, CompletionOutcome::Stale]
    );
    assert_eq!(hashes(&dash), ["b1"]);
    assert_eq!(dash.phase(), &FetchPhase::Loaded);
}

#[tokio::test(start_paused = true)]
async fn in_flight_page_is_not_requested_twice() {
    let source = FakeSource::default()
        .page(0, &["a1", "a2"])
        .page(2, &["b1"])
        .delay(0, Duration::from_millis(500))
        .delay(2, Duration::from_millis(10));
    let calls = source.recorder();
    let mut dash = Dashboard::new(source, &config(2)).unwrap();

    assert!(dash.mount());
    dash.next_page();
    dash.previous_page();
    assert!(!dash.refresh());
    assert_eq!(dash.fetch().in_flight_count(), 2);

    let outcomes = dash.settle().await;
    assert_eq!(
        outcomes,
        [CompletionOutcome::Stale, CompletionOutcome::Applied { records: 2 }]
    );
    assert_eq!(hashes(&dash), ["a1", "a2"]);
    assert_eq!(dash.page_number(), 0);
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_source_times_out_as_network_failure() {
    let source = FakeSource::default()
        .page(0, &["a1"])
        .delay(0, Duration::from_secs(60));
    let cfg = ClientConfig {
        page_size: 2,
        request_timeout_ms: 1_000,
        ..ClientConfig::default()
    };
    let mut dash = Dashboard::new(source, &cfg).unwrap();

    dash.mount();
    let outcome = dash.apply_next_completion().await;
    match outcome {
        Some(CompletionOutcome::Failed(FetchError::NetworkFailure(msg))) => {
            assert!(msg.contains("timed out"), "{msg}");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(dash.data().is_empty());
}

#[tokio::test]
async fn snapshot_state_resets_when_page_changes() {
    let source = FakeSource::default()
        .page(0, &["a1", "a2"])
        .page(2, &["b1", "b2"]);
    let mut dash = Dashboard::new(source, &config(2)).unwrap();
    dash.mount();
    dash.settle().await;

    assert!(dash.toggle(0).unwrap());
    dash.select_builder(0, 1).unwrap();
    let tray = dash.tray(0).unwrap();
    assert!(tray.is_open);
    assert_eq!(tray.selected_builder_index, 1);

    dash.next_page();
    dash.settle().await;
    assert!(dash.headers().iter().all(|h| !h.is_open));
    assert_eq!(dash.tray(0).unwrap().selected_builder_index, 0);
}

#[tokio::test]
async fn invalid_selection_leaves_state_unchanged() {
    let source = FakeSource::default().page(0, &["a1"]);
    let mut dash = Dashboard::new(source, &config(2)).unwrap();
    dash.mount();
    dash.settle().await;

    dash.select_builder(0, 1).unwrap();
    assert_eq!(
        dash.select_builder(0, 5),
        Err(SelectionError::InvalidSelection { index: 5, len: 2 })
    );
    assert_eq!(dash.tray(0).unwrap().selected_builder_index, 1);
    assert_eq!(
        dash.toggle(3),
        Err(SelectionError::UnknownSnapshot { position: 3, len: 1 })
    );
}

#[tokio::test]
async fn nothing_is_requested_before_mount_or_below_page_zero() {
    let mut dash = Dashboard::new(FakeSource::default(), &config(2)).unwrap();
    assert_eq!(dash.previous_page(), 0);
    assert_eq!(dash.fetch().in_flight_count(), 0);
    assert_eq!(dash.empty_state(), Some(EmptyState::Loading));
    assert!(dash.apply_next_completion().await.is_none());

    dash.mount();
    dash.settle().await;
    assert!(matches!(dash.empty_state(), Some(EmptyState::NoRevisions { .. })));

    assert_eq!(dash.previous_page(), 0);
    assert_eq!(dash.fetch().in_flight_count(), 0);
}

/// Source whose first `panics` calls blow up.
#[derive(Default)]
struct FlakySource {
    panics: usize,
    calls: Mutex<usize>,
}

impl SnapshotSource for FlakySource {
    async fn fetch_page(
        &self,
        _descriptor: RequestDescriptor,
    ) -> Result<Vec<BuildSnapshotRecord>, FetchError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if call <= self.panics {
            panic!("source exploded");
        }
        Ok(vec![BuildSnapshotRecord {
            commit_hash: "c1".into(),
            ..Default::default()
        }])
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_source_degrades_to_failure_and_can_retry() {
    let source = FlakySource {
        panics: 1,
        ..Default::default()
    };
    let mut dash = Dashboard::new(source, &config(2)).unwrap();

    dash.mount();
    let outcomes = tokio::time::timeout(Duration::from_secs(3600), dash.settle())
        .await
        .expect("settle finishes after a panicking fetch");
    assert!(matches!(
        outcomes.as_slice(),
        [CompletionOutcome::Failed(FetchError::NetworkFailure(_))]
    ));
    assert!(matches!(dash.phase(), FetchPhase::Failed(_)));
    assert_eq!(dash.fetch().in_flight_count(), 0);
    assert!(dash.data().is_empty());

    assert!(dash.refresh());
    dash.settle().await;
    assert_eq!(hashes(&dash), ["c1"]);
}

#[test]
fn zero_page_size_is_rejected() {
    assert!(Dashboard::new(FakeSource::default(), &config(0)).is_err());
}
