use async_trait::async_trait;
use cardex_model::{Card, CardId, Page};
use cardex_query::{execute, DataSource, MemoryCatalog, QueryError, QueryLimits, QueryPlan};
use std::cell::RefCell;

/// Async fetch boundary. Browsing is single-threaded, so futures need not be
/// `Send`.
#[async_trait(?Send)]
pub trait CardFetcher {
    async fn fetch(&self, plan: &QueryPlan) -> Result<Page, QueryError>;
}

/// Adapts a synchronous [`DataSource`] to the fetch seam.
pub struct SourceFetcher<D> {
    source: D,
    limits: QueryLimits,
}

impl<D: DataSource> SourceFetcher<D> {
    #[must_use]
    pub fn new(source: D, limits: QueryLimits) -> Self {
        Self { source, limits }
    }

    #[must_use]
    pub fn source(&self) -> &D {
        &self.source
    }
}

#[async_trait(?Send)]
impl<D: DataSource> CardFetcher for SourceFetcher<D> {
    async fn fetch(&self, plan: &QueryPlan) -> Result<Page, QueryError> {
        execute(&self.source, plan, &self.limits)
    }
}

/// Keeps every record an inner fetcher returned, so a detail view can be
/// filled without another round trip. Cached records are never served as
/// list pages.
pub struct CachingFetcher<F> {
    inner: F,
    seen: RefCell<MemoryCatalog>,
}

impl<F: CardFetcher> CachingFetcher<F> {
    #[must_use]
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            seen: RefCell::new(MemoryCatalog::default()),
        }
    }

    #[must_use]
    pub fn cached(&self, id: &CardId) -> Option<Card> {
        self.seen.borrow().get(id).cloned()
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.seen.borrow().len()
    }

    #[must_use]
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait(?Send)]
impl<F: CardFetcher> CardFetcher for CachingFetcher<F> {
    async fn fetch(&self, plan: &QueryPlan) -> Result<Page, QueryError> {
        let page = self.inner.fetch(plan).await?;
        self.seen.borrow_mut().absorb(&page);
        Ok(page)
    }
}
