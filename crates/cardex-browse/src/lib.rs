#![forbid(unsafe_code)]

//! Incremental loading and scroll restoration for cardex result lists.
//!
//! Nothing here talks to storage directly: batches go through the
//! [`CardFetcher`] seam and scroll records through [`SessionStore`]. Time is
//! supplied by the caller, so debouncing is deterministic under test.

pub mod browser;
pub mod collection;
pub mod config;
pub mod debounce;
pub mod fetcher;
pub mod load_policy;
pub mod loader;
pub mod scroll;
pub mod session;

pub const CRATE_NAME: &str = "cardex-browse";

pub use browser::{BrowseError, CatalogBrowser, TickOutcome};
pub use collection::LoadedCollection;
pub use config::BrowseConfig;
pub use debounce::Debouncer;
pub use fetcher::{CachingFetcher, CardFetcher, SourceFetcher};
pub use load_policy::LoadSizePolicy;
pub use loader::{BatchOutcome, BatchTicket, IncrementalLoadController, LoadStatus};
pub use scroll::{RenderedNode, RenderedNodes, Restoration, ScrollPersistor, Viewport};
pub use session::{MemorySessionStore, SessionError, SessionStore};
