#![forbid(unsafe_code)]

//! Facet registry, parameter normalization, facet compilation and query
//! execution for the cardex catalog.
//!
//! `planner`, `registry`, `normalize`, `compiler` and `controls` are pure:
//! they never touch SQLite or the filesystem. Storage lives in `db` and
//! `memory` behind the [`DataSource`] seam.

pub mod compiler;
pub mod controls;
pub mod db;
pub mod executor;
pub mod limits;
pub mod memory;
pub mod normalize;
pub mod planner;
mod query_error;
pub mod registry;
pub mod text;
pub mod tristate;

pub const CRATE_NAME: &str = "cardex-query";

pub use compiler::{compile, compile_plan, prune_defaults, CompileError, CompiledQuery};
pub use db::SqliteCatalog;
pub use executor::{execute, DataSource, ExecError};
pub use limits::QueryLimits;
pub use memory::MemoryCatalog;
pub use normalize::{canonical_key_from_pairs, normalize, FilterState};
pub use planner::{
    Combinator, Condition, NullOrder, OrderTerm, PageWindow, Predicate, QueryPlan, SortDirection,
};
pub use query_error::{QueryError, QueryErrorCode};
pub use registry::{FacetDefinition, FacetKind, FacetRegistry, EMPTY_SENTINEL};
pub use tristate::{TriState, TriStateMembers};

/// Normalizes, compiles and executes one page for a raw parameter map.
pub fn query_page(
    source: &dyn DataSource,
    registry: &FacetRegistry,
    params: &std::collections::BTreeMap<String, String>,
    window: PageWindow,
    limits: &QueryLimits,
) -> Result<(CompiledQuery, cardex_model::Page), QueryError> {
    let state = FilterState::from_params(params.iter());
    let compiled = compile(registry, &state, window);
    let page = execute(source, &compiled.plan, limits)?;
    Ok((compiled, page))
}
