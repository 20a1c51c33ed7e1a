//! Wires filter changes, the load controller and the scroll persistor into
//! the operations a result-list view performs.

use crate::config::BrowseConfig;
use crate::debounce::Debouncer;
use crate::fetcher::CardFetcher;
use crate::loader::{BatchOutcome, IncrementalLoadController, LoadStatus};
use crate::scroll::{
    capture, restore_offset, RenderedNodes, Restoration, ScrollPersistor, Viewport,
};
use crate::session::{SessionError, SessionStore};
use cardex_model::{Card, ScrollRestoreRecord};
use cardex_query::controls::Params;
use cardex_query::{prune_defaults, FacetRegistry, FilterState, QueryError};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseError {
    Query(QueryError),
    Session(SessionError),
}

impl std::fmt::Display for BrowseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query(e) => write!(f, "query: {e}"),
            Self::Session(e) => write!(f, "session: {e}"),
        }
    }
}

impl std::error::Error for BrowseError {}

impl From<QueryError> for BrowseError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<SessionError> for BrowseError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

/// What a `tick` committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub params_applied: bool,
    pub scroll_saved: bool,
}

pub struct CatalogBrowser<F, S> {
    fetcher: F,
    controller: IncrementalLoadController,
    persistor: ScrollPersistor<S>,
    text_input: Debouncer<Params>,
    scroll_settle: Debouncer<ScrollRestoreRecord>,
}

impl<F: CardFetcher, S: SessionStore> CatalogBrowser<F, S> {
    #[must_use]
    pub fn new(config: &BrowseConfig, registry: FacetRegistry, fetcher: F, store: S) -> Self {
        Self {
            fetcher,
            controller: IncrementalLoadController::new(registry, config),
            persistor: ScrollPersistor::new(store),
            text_input: Debouncer::new(config.text_debounce),
            scroll_settle: Debouncer::new(config.scroll_settle),
        }
    }

    fn filter_state(&self, params: &Params) -> FilterState {
        prune_defaults(
            self.controller.registry(),
            &FilterState::from_params(params.iter()),
        )
    }

    /// Applies a parameter set. A changed canonical key resets the list and
    /// loads the first batch; an unchanged key keeps what is loaded.
    pub async fn apply_params(&mut self, params: &Params) -> Option<BatchOutcome> {
        let state = self.filter_state(params);
        if !self.controller.set_filter(state) && !self.controller.collection().is_empty() {
            return None;
        }
        self.scroll_settle.cancel();
        self.controller.load_next(&self.fetcher).await
    }

    /// Queues a parameter change coming from a text input.
    pub fn on_text_input(&mut self, params: Params, now: Instant) {
        self.text_input.push(params, now);
    }

    /// Records the viewport; the record is persisted once scrolling settles.
    pub fn on_scroll(&mut self, viewport: Viewport, nodes: &dyn RenderedNodes, now: Instant) {
        let record = capture(
            self.controller.key(),
            viewport,
            self.controller.items().len(),
            &nodes.nodes(),
        );
        self.scroll_settle.push(record, now);
    }

    /// Commits debounced work that is due at `now`.
    pub async fn tick(&mut self, now: Instant) -> Result<TickOutcome, BrowseError> {
        let mut outcome = TickOutcome::default();
        if let Some(record) = self.scroll_settle.poll(now) {
            outcome.scroll_saved = self.persistor.persist(&record)?;
        }
        if let Some(params) = self.text_input.poll(now) {
            self.apply_params(&params).await;
            outcome.params_applied = true;
        }
        Ok(outcome)
    }

    pub async fn on_proximity(&mut self, rendered_last_index: usize) -> Option<BatchOutcome> {
        if !self.controller.near_end(rendered_last_index) {
            return None;
        }
        self.controller.load_next(&self.fetcher).await
    }

    /// Persists the current position immediately, ahead of navigation.
    pub fn leave_for_detail(
        &mut self,
        viewport: Viewport,
        nodes: &dyn RenderedNodes,
    ) -> Result<ScrollRestoreRecord, BrowseError> {
        self.scroll_settle.cancel();
        let record = capture(
            self.controller.key(),
            viewport,
            self.controller.items().len(),
            &nodes.nodes(),
        );
        self.persistor.persist(&record)?;
        info!(
            key = %record.canonical_key,
            loaded = record.loaded_count,
            anchor = record.anchor_card_id.as_ref().map(|id| id.as_str()),
            "leaving list for detail view"
        );
        Ok(record)
    }

    /// Re-enters the list. With a remembered record for the same key,
    /// replays batches up to the remembered count and returns the scroll
    /// offset to apply; `layout` is read after the replay, measured at
    /// `current_scroll`.
    pub async fn reenter(
        &mut self,
        params: &Params,
        current_scroll: f64,
        layout: &dyn RenderedNodes,
    ) -> Result<Option<Restoration>, BrowseError> {
        let state = self.filter_state(params);
        let key = state.canonical_key();
        self.scroll_settle.cancel();
        self.controller.reset_to(state);

        let Some(record) = self.persistor.take(&key)? else {
            self.controller.load_next(&self.fetcher).await;
            return Ok(None);
        };

        self.persistor.suspend();
        let status = self
            .controller
            .load_until(&self.fetcher, record.loaded_count.max(1))
            .await;
        let restoration = restore_offset(&record, current_scroll, &layout.nodes());
        self.persistor.resume();
        debug!(
            ?status,
            loaded = self.controller.items().len(),
            target = record.loaded_count,
            ?restoration,
            "list restored"
        );
        if status == LoadStatus::Failed {
            if let Some(err) = self.controller.last_error() {
                return Err(err.clone().into());
            }
        }
        Ok(Some(restoration))
    }

    #[must_use]
    pub fn items(&self) -> &[Card] {
        self.controller.items()
    }

    #[must_use]
    pub fn controller(&self) -> &IncrementalLoadController {
        &self.controller
    }

    #[must_use]
    pub fn persistor(&self) -> &ScrollPersistor<S> {
        &self.persistor
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}
