// SPDX-License-Identifier: Apache-2.0

//! Incremental load controller.
//!
//! One controller per result list. Each filter state gets a fresh
//! [`LoadedCollection`]; batches are issued as [`BatchTicket`]s, at most one
//! at a time, and a completed batch is merged only if its ticket still
//! matches the current state.

use crate::collection::LoadedCollection;
use crate::config::BrowseConfig;
use crate::fetcher::CardFetcher;
use crate::load_policy::LoadSizePolicy;
use cardex_model::{CanonicalKey, Card, Page};
use cardex_query::{compile, FacetRegistry, FilterState, PageWindow, QueryError, QueryPlan};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Idle,
    Loading,
    /// Everything the source reported has been loaded.
    Exhausted,
    /// The per-filter batch cap was reached first.
    Capped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTicket {
    pub key: CanonicalKey,
    pub generation: u64,
    pub plan: QueryPlan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Appended { added: usize, loaded: usize, total: u64 },
    /// Result belonged to a superseded ticket and was dropped.
    Stale,
    Failed(QueryError),
}

pub struct IncrementalLoadController {
    registry: FacetRegistry,
    policy: LoadSizePolicy,
    max_batches: usize,
    proximity_rows: usize,
    state: FilterState,
    base_plan: QueryPlan,
    collection: LoadedCollection,
    status: LoadStatus,
    generation: u64,
    in_flight: bool,
    batches_taken: usize,
    restore_target: Option<usize>,
    last_error: Option<QueryError>,
}

impl IncrementalLoadController {
    #[must_use]
    pub fn new(registry: FacetRegistry, config: &BrowseConfig) -> Self {
        let state = FilterState::default();
        let base_plan = compile(&registry, &state, PageWindow::new(0, 1)).plan;
        Self {
            registry,
            policy: config.load_policy,
            max_batches: config.max_batches,
            proximity_rows: config.proximity_rows,
            collection: LoadedCollection::new(state.canonical_key()),
            state,
            base_plan,
            status: LoadStatus::Idle,
            generation: 0,
            in_flight: false,
            batches_taken: 0,
            restore_target: None,
            last_error: None,
        }
    }

    /// Switches to `state`. A different canonical key resets the collection
    /// and invalidates any outstanding ticket; the same key is a no-op.
    /// Returns whether a reset happened.
    pub fn set_filter(&mut self, state: FilterState) -> bool {
        let key = state.canonical_key();
        if key == *self.collection.key() && self.generation > 0 {
            return false;
        }
        self.reset_to(state);
        true
    }

    /// Unconditional reset, used when re-entering a list.
    pub fn reset_to(&mut self, state: FilterState) {
        let compiled = compile(&self.registry, &state, PageWindow::new(0, 1));
        self.generation += 1;
        info!(
            key = %state.canonical_key(),
            generation = self.generation,
            diagnostics = compiled.diagnostics.len(),
            "filter state changed; list reset"
        );
        self.collection = LoadedCollection::new(state.canonical_key());
        self.base_plan = compiled.plan;
        self.state = state;
        self.status = LoadStatus::Idle;
        self.in_flight = false;
        self.batches_taken = 0;
        self.restore_target = None;
        self.last_error = None;
    }

    #[must_use]
    pub fn can_load(&self) -> bool {
        !self.in_flight
            && matches!(self.status, LoadStatus::Idle | LoadStatus::Loading)
            && self.batches_taken < self.max_batches
            && !self.collection.is_complete()
    }

    fn next_batch_size(&self) -> usize {
        match self.restore_target {
            Some(target) => {
                let remaining = target.saturating_sub(self.collection.len());
                self.policy.restore_batch_size(self.batches_taken, remaining)
            }
            None => self.policy.batch_size(self.batches_taken),
        }
    }

    /// Issues the next batch request, or `None` when a batch is in flight or
    /// the list can not grow.
    pub fn begin_batch(&mut self) -> Option<BatchTicket> {
        if !self.can_load() {
            return None;
        }
        let window = PageWindow::new(self.collection.len(), self.next_batch_size());
        self.in_flight = true;
        self.status = LoadStatus::Loading;
        debug!(
            offset = window.offset,
            limit = window.limit,
            batch = self.batches_taken,
            "batch requested"
        );
        Some(BatchTicket {
            key: self.collection.key().clone(),
            generation: self.generation,
            plan: self.base_plan.with_window(window),
        })
    }

    fn is_current(&self, ticket: &BatchTicket) -> bool {
        self.in_flight
            && ticket.generation == self.generation
            && ticket.key == *self.collection.key()
    }

    pub fn complete_batch(
        &mut self,
        ticket: &BatchTicket,
        result: Result<Page, QueryError>,
    ) -> BatchOutcome {
        if !self.is_current(ticket) {
            debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "stale batch dropped"
            );
            return BatchOutcome::Stale;
        }
        self.in_flight = false;
        self.batches_taken += 1;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, key = %ticket.key, "batch failed; loading stopped");
                self.collection.mark_total_unknown();
                self.status = LoadStatus::Failed;
                self.restore_target = None;
                self.last_error = Some(err.clone());
                return BatchOutcome::Failed(err);
            }
        };

        let returned = page.items.len();
        let added = self.collection.merge(page);
        let loaded = self.collection.len();
        let total = self.collection.total();
        if self.restore_target.is_some_and(|target| loaded >= target) {
            self.restore_target = None;
        }

        self.status = if self.collection.is_complete() || returned == 0 {
            LoadStatus::Exhausted
        } else if self.batches_taken >= self.max_batches {
            warn!(
                batches = self.batches_taken,
                loaded, total, "batch cap reached before total"
            );
            LoadStatus::Capped
        } else {
            LoadStatus::Idle
        };
        debug!(added, loaded, total, status = ?self.status, "batch merged");
        BatchOutcome::Appended {
            added,
            loaded,
            total,
        }
    }

    /// Releases an issued ticket whose result will never arrive, so the
    /// next request can go out. Returns whether the ticket was current.
    pub fn abandon_batch(&mut self, ticket: &BatchTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight = false;
        self.restore_target = None;
        if self.status == LoadStatus::Loading {
            self.status = LoadStatus::Idle;
        }
        debug!(
            offset = ticket.plan.window.offset,
            generation = ticket.generation,
            "batch abandoned"
        );
        true
    }

    /// Fetches and merges one batch. Dropping the returned future before it
    /// completes abandons the batch.
    pub async fn load_next(&mut self, fetcher: &dyn CardFetcher) -> Option<BatchOutcome> {
        let ticket = self.begin_batch()?;
        let plan = ticket.plan.clone();
        let mut pending = PendingBatch {
            controller: self,
            ticket: Some(ticket),
        };
        let result = fetcher.fetch(&plan).await;
        let ticket = pending.ticket.take()?;
        Some(pending.controller.complete_batch(&ticket, result))
    }

    /// Loads batches until at least `count` cards are present or loading
    /// stops. Batch sizes are clamped to the remaining distance.
    pub async fn load_until(&mut self, fetcher: &dyn CardFetcher, count: usize) -> LoadStatus {
        self.restore_target = Some(count);
        while self.collection.len() < count {
            if self.load_next(fetcher).await.is_none() {
                break;
            }
        }
        self.restore_target = None;
        self.status
    }

    /// Proximity trigger: the last rendered row is within `proximity_rows`
    /// of the end of the loaded list.
    #[must_use]
    pub fn near_end(&self, rendered_last_index: usize) -> bool {
        self.can_load()
            && rendered_last_index.saturating_add(self.proximity_rows) >= self.collection.len()
    }

    #[must_use]
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    #[must_use]
    pub fn key(&self) -> &CanonicalKey {
        self.collection.key()
    }

    #[must_use]
    pub fn filter_state(&self) -> &FilterState {
        &self.state
    }

    #[must_use]
    pub fn collection(&self) -> &LoadedCollection {
        &self.collection
    }

    #[must_use]
    pub fn items(&self) -> &[Card] {
        self.collection.items()
    }

    #[must_use]
    pub fn batches_taken(&self) -> usize {
        self.batches_taken
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&QueryError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn registry(&self) -> &FacetRegistry {
        &self.registry
    }
}

/// Armed while a fetch is awaited; abandons the ticket if dropped armed.
struct PendingBatch<'a> {
    controller: &'a mut IncrementalLoadController,
    ticket: Option<BatchTicket>,
}

impl Drop for PendingBatch<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.controller.abandon_batch(&ticket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchOutcome, IncrementalLoadController, LoadStatus};
    use crate::config::BrowseConfig;
    use cardex_model::{Card, Page};
    use cardex_query::{FacetRegistry, FilterState};
    use serde_json::json;

    fn page(start: usize, n: usize, total: u64) -> Page {
        Page {
            items: (start..start + n)
                .map(|i| Card::from_json(json!({ "card_id": format!("c{i}") })).expect("card"))
                .collect(),
            total,
        }
    }

    fn controller() -> IncrementalLoadController {
        let mut c = IncrementalLoadController::new(FacetRegistry::cards(), &BrowseConfig::default());
        c.set_filter(FilterState::default());
        c
    }

    #[test]
    fn one_ticket_at_a_time() {
        let mut c = controller();
        let ticket = c.begin_batch().expect("first");
        assert_eq!(ticket.plan.window.offset, 0);
        assert_eq!(ticket.plan.window.limit, 30);
        assert!(c.begin_batch().is_none());
        c.complete_batch(&ticket, Ok(page(0, 30, 100)));
        let next = c.begin_batch().expect("second");
        assert_eq!(next.plan.window.offset, 30);
        assert_eq!(next.plan.window.limit, 60);
    }

    #[test]
    fn stale_ticket_is_dropped_after_filter_change() {
        let mut c = controller();
        let ticket = c.begin_batch().expect("ticket");
        assert!(c.set_filter(FilterState::from_params([("colors", "red")])));
        assert_eq!(
            c.complete_batch(&ticket, Ok(page(0, 30, 100))),
            BatchOutcome::Stale
        );
        assert!(c.items().is_empty());
        assert!(c.begin_batch().is_some());
    }

    #[test]
    fn same_key_does_not_reset() {
        let mut c = controller();
        let ticket = c.begin_batch().expect("ticket");
        c.complete_batch(&ticket, Ok(page(0, 30, 100)));
        assert!(!c.set_filter(FilterState::default()));
        assert_eq!(c.items().len(), 30);
    }

    #[test]
    fn empty_page_exhausts_even_if_total_claims_more() {
        let mut c = controller();
        let ticket = c.begin_batch().expect("ticket");
        c.complete_batch(&ticket, Ok(page(0, 0, 50)));
        assert_eq!(c.status(), LoadStatus::Exhausted);
        assert!(c.begin_batch().is_none());
    }

    #[test]
    fn abandoned_ticket_frees_the_slot() {
        let mut c = controller();
        let ticket = c.begin_batch().expect("ticket");
        assert!(c.abandon_batch(&ticket));
        assert_eq!(c.status(), LoadStatus::Idle);
        let again = c.begin_batch().expect("reissued");
        assert_eq!(again.plan.window, ticket.plan.window);
        assert!(c.begin_batch().is_none());
    }
}
