#![allow(dead_code)]

use async_trait::async_trait;
use cardex_browse::{CardFetcher, RenderedNode};
use cardex_model::{Card, CardId, Page};
use cardex_query::{
    execute, ExecError, MemoryCatalog, PageWindow, QueryError, QueryLimits, QueryPlan,
};
use serde_json::json;
use std::cell::{Cell, RefCell};

pub fn catalog(n: usize) -> MemoryCatalog {
    MemoryCatalog::new((0..n).map(|i| {
        Card::from_json(json!({
            "card_id": format!("ABC-{i:03}"),
            "name": format!("Card {i}"),
            "colors": [if i % 2 == 0 { "red" } else { "blue" }],
            "set_order": (i / 10) as i64,
        }))
        .expect("fixture card")
    }))
}

/// Memory-backed fetcher that records every window it serves and can be
/// switched into a failing or a never-answering state.
pub struct RecordingFetcher {
    pub catalog: MemoryCatalog,
    pub windows: RefCell<Vec<PageWindow>>,
    pub failing: Cell<bool>,
    pub stalled: Cell<bool>,
}

impl RecordingFetcher {
    pub fn new(catalog: MemoryCatalog) -> Self {
        Self {
            catalog,
            windows: RefCell::new(Vec::new()),
            failing: Cell::new(false),
            stalled: Cell::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.windows.borrow().len()
    }

    pub fn limits(&self) -> Vec<usize> {
        self.windows.borrow().iter().map(|w| w.limit).collect()
    }
}

#[async_trait(?Send)]
impl CardFetcher for RecordingFetcher {
    async fn fetch(&self, plan: &QueryPlan) -> Result<Page, QueryError> {
        self.windows.borrow_mut().push(plan.window);
        if self.stalled.get() {
            std::future::pending::<()>().await;
        }
        if self.failing.get() {
            return Err(ExecError::Unavailable("source offline".to_string()).into());
        }
        execute(&self.catalog, plan, &QueryLimits::default())
    }
}

/// Uniform rows in item order, measured at scroll offset 0.
pub fn layout(items: &[Card], row_height: f64) -> Vec<RenderedNode> {
    items
        .iter()
        .enumerate()
        .map(|(i, card)| RenderedNode {
            card_id: card.card_id.clone(),
            top: i as f64 * row_height,
            height: row_height,
        })
        .collect()
}

pub fn id(text: &str) -> CardId {
    CardId::parse(text).expect("card id")
}
