use std::sync::Arc;
use std::time::Duration;

use buildboard_core::view::{header_view, tray_view, EmptyState, HeaderView, PaginationView, TrayView};
use buildboard_core::{
    BuildSnapshotRecord, FetchError, PaginationController, PaginationError, SelectionError,
    SnapshotBoard,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::fetch::{CompletionOutcome, FetchController, FetchPhase, FetchTicket};
use crate::source::SnapshotSource;

#[derive(Debug)]
struct Completion {
    ticket: FetchTicket,
    result: Result<Vec<BuildSnapshotRecord>, FetchError>,
}

/// One dashboard screen: pagination, the fetched page and per-snapshot state.
///
/// All state changes go through `&mut self`. Network requests run on spawned
/// tasks and report back over a channel; nothing they return is visible until
/// [`apply_next_completion`], [`apply_ready_completions`] or [`settle`] is
/// called. Must be used inside a tokio runtime.
///
/// [`apply_next_completion`]: Dashboard::apply_next_completion
/// [`apply_ready_completions`]: Dashboard::apply_ready_completions
/// [`settle`]: Dashboard::settle
pub struct Dashboard<S> {
    source: Arc<S>,
    request_timeout: Duration,
    pagination: PaginationController,
    fetch: FetchController,
    board: SnapshotBoard,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    mounted: bool,
}

impl<S: SnapshotSource> Dashboard<S> {
    pub fn new(source: S, config: &ClientConfig) -> Result<Self, PaginationError> {
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            source: Arc::new(source),
            request_timeout: config.request_timeout(),
            pagination: PaginationController::new(config.page_size)?,
            fetch: FetchController::new(),
            board: SnapshotBoard::new(),
            tx,
            rx,
            mounted: false,
        })
    }

    /// Requests the current page. Returns whether a request was issued.
    pub fn mount(&mut self) -> bool {
        self.mounted = true;
        self.request_current()
    }

    /// Re-requests the current page unless a request for it is outstanding.
    pub fn refresh(&mut self) -> bool {
        self.request_current()
    }

    /// Moves by `delta` pages (clamped at 0) and requests the new page if it
    /// changed. Returns the page number.
    pub fn change_page(&mut self, delta: i64) -> u64 {
        let before = self.pagination.page_number();
        let after = self.pagination.change_page(delta);
        if after != before && self.mounted {
            self.request_current();
        }
        after
    }

    pub fn previous_page(&mut self) -> u64 {
        self.change_page(-1)
    }

    pub fn next_page(&mut self) -> u64 {
        self.change_page(1)
    }

    pub fn toggle(&mut self, position: usize) -> Result<bool, SelectionError> {
        self.board.toggle(position, self.fetch.data().len())
    }

    pub fn select_builder(&mut self, position: usize, index: usize) -> Result<(), SelectionError> {
        self.board.select_builder(position, self.fetch.data(), index)
    }

    /// Waits for the next completion and applies it.
    ///
    /// Returns `None` without waiting when nothing is in flight.
    pub async fn apply_next_completion(&mut self) -> Option<CompletionOutcome> {
        if self.fetch.in_flight_count() == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Applies completions that have already arrived, without waiting.
    pub fn apply_ready_completions(&mut self) -> Vec<CompletionOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            outcomes.push(self.apply(completion));
        }
        outcomes
    }

    /// Applies completions until no request is outstanding.
    pub async fn settle(&mut self) -> Vec<CompletionOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.apply_next_completion().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    pub fn data(&self) -> &[BuildSnapshotRecord] {
        self.fetch.data()
    }

    pub fn phase(&self) -> &FetchPhase {
        self.fetch.phase()
    }

    pub fn page_number(&self) -> u64 {
        self.pagination.page_number()
    }

    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    pub fn fetch(&self) -> &FetchController {
        &self.fetch
    }

    pub fn pagination_view(&self) -> PaginationView {
        PaginationView {
            page_number: self.pagination.page_number(),
            has_previous: self.pagination.has_previous(),
            has_next: self.pagination.has_next(self.fetch.data().len()),
        }
    }

    pub fn headers(&self) -> Vec<HeaderView> {
        self.fetch
            .data()
            .iter()
            .enumerate()
            .map(|(pos, rec)| header_view(pos, rec, &self.board.get(pos)))
            .collect()
    }

    pub fn tray(&self, position: usize) -> Option<TrayView> {
        let rec = self.fetch.data().get(position)?;
        Some(tray_view(position, rec, &self.board.get(position)))
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        self.fetch.empty_state()
    }

    fn request_current(&mut self) -> bool {
        let descriptor = self.pagination.descriptor();
        let Some(ticket) = self.fetch.begin(descriptor) else {
            return false;
        };

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let limit = self.request_timeout;
        tokio::spawn(async move {
            let descriptor = ticket.descriptor();
            // Runs on its own task so a panicking source still yields a completion.
            let mut fetch = tokio::spawn(async move { source.fetch_page(descriptor).await });
            let result = match tokio::time::timeout(limit, &mut fetch).await {
                Ok(Ok(result)) => result,
                Ok(Err(join)) => {
                    warn!(offset = descriptor.offset, error = %join, "fetch task failed");
                    Err(FetchError::NetworkFailure(format!("fetch task failed: {join}")))
                }
                Err(_) => {
                    fetch.abort();
                    Err(FetchError::NetworkFailure(format!(
                        "timed out after {}ms",
                        limit.as_millis()
                    )))
                }
            };
            // The receiver only goes away with the dashboard itself.
            let _ = tx.send(Completion { ticket, result });
        });
        true
    }

    fn apply(&mut self, completion: Completion) -> CompletionOutcome {
        let outcome = self.fetch.complete(completion.ticket, completion.result);
        if outcome != CompletionOutcome::Stale {
            debug!(tracked = self.board.tracked(), "page replaced; resetting snapshot state");
            self.board.reset();
        }
        outcome
    }
}
