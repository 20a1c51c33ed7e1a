use crate::helpers::{collect_params, emit_ok, read_cards};
use crate::{OutputMode, ParamArgs};
use cardex_browse::{
    BrowseConfig, CatalogBrowser, MemorySessionStore, RenderedNode, RenderedNodes, SourceFetcher,
    Viewport,
};
use cardex_core::canonical::stable_json_hash_hex;
use cardex_model::CardId;
use cardex_query::{
    compile, prune_defaults, query_page, FacetRegistry, FilterState, PageWindow, QueryLimits,
    SqliteCatalog,
};
use serde_json::json;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub(crate) enum CommandError {
    /// Bad arguments, parameters or input files.
    Input(String),
    /// The catalog could not be opened or queried.
    Source(String),
}

fn input(message: String) -> CommandError {
    CommandError::Input(message)
}

fn source(message: impl ToString) -> CommandError {
    CommandError::Source(message.to_string())
}

fn limits() -> Result<QueryLimits, CommandError> {
    let limits = QueryLimits::from_env();
    limits.validate().map_err(input)?;
    Ok(limits)
}

fn open(db: &Path) -> Result<SqliteCatalog, CommandError> {
    SqliteCatalog::open(db).map_err(|e| source(format!("{}: {e}", db.display())))
}

pub(crate) fn plan(
    args: &ParamArgs,
    offset: usize,
    limit: usize,
    output_mode: OutputMode,
) -> Result<(), CommandError> {
    let registry = FacetRegistry::cards();
    let params = collect_params(args).map_err(input)?;
    let state = prune_defaults(&registry, &FilterState::from_params(params.iter()));
    let compiled = compile(&registry, &state, PageWindow::new(offset, limit));
    let plan_hash = stable_json_hash_hex(&compiled.plan).map_err(|e| input(e.to_string()))?;
    emit_ok(
        output_mode,
        &json!({
            "command": "plan",
            "canonical_key": state.canonical_key(),
            "plan_hash": plan_hash,
            "plan": compiled.plan,
            "diagnostics": compiled.diagnostics,
        }),
    )
    .map_err(input)
}

pub(crate) fn import(db: &Path, cards: &Path, output_mode: OutputMode) -> Result<(), CommandError> {
    let cards = read_cards(cards).map_err(input)?;
    let mut catalog = open(db)?;
    let inserted = catalog.insert_cards(&cards).map_err(source)?;
    info!(inserted, db = %db.display(), "cards imported");
    emit_ok(
        output_mode,
        &json!({ "command": "import", "status": "ok", "inserted": inserted }),
    )
    .map_err(input)
}

pub(crate) fn query(
    db: &Path,
    args: &ParamArgs,
    offset: usize,
    limit: usize,
    output_mode: OutputMode,
) -> Result<(), CommandError> {
    let registry = FacetRegistry::cards();
    let params = collect_params(args).map_err(input)?;
    let limits = limits()?;
    let catalog = open(db)?;
    let (compiled, page) = query_page(
        &catalog,
        &registry,
        &params,
        PageWindow::new(offset, limit),
        &limits,
    )
    .map_err(|e| match e.code {
        cardex_query::QueryErrorCode::Validation => input(e.to_string()),
        _ => source(e),
    })?;
    let key = prune_defaults(&registry, &FilterState::from_params(params.iter())).canonical_key();
    emit_ok(
        output_mode,
        &json!({
            "command": "query",
            "canonical_key": key,
            "total": page.total,
            "items": page.items.iter().map(cardex_model::Card::to_json).collect::<Vec<_>>(),
            "diagnostics": compiled.diagnostics,
        }),
    )
    .map_err(input)
}

pub(crate) struct BrowseShape {
    pub(crate) rows: usize,
    pub(crate) row_height: f64,
    pub(crate) scroll: f64,
    pub(crate) viewport: f64,
}

/// Fixed-height rows, positioned relative to a viewport scrolled to `scroll`.
struct RowLayout {
    ids: Vec<CardId>,
    row_height: f64,
    scroll: f64,
}

impl RenderedNodes for RowLayout {
    fn nodes(&self) -> Vec<RenderedNode> {
        self.ids
            .iter()
            .enumerate()
            .map(|(i, id)| RenderedNode {
                card_id: id.clone(),
                top: i as f64 * self.row_height - self.scroll,
                height: self.row_height,
            })
            .collect()
    }
}

pub(crate) fn browse(
    db: &Path,
    args: &ParamArgs,
    shape: BrowseShape,
    output_mode: OutputMode,
) -> Result<(), CommandError> {
    let limits = limits()?;
    let config = BrowseConfig::from_env();
    config.validate_for(&limits).map_err(input)?;
    if !(shape.row_height > 0.0 && shape.viewport > 0.0 && shape.scroll >= 0.0) {
        return Err(input(
            "row-height and viewport must be > 0 and scroll >= 0".to_string(),
        ));
    }
    let params = collect_params(args).map_err(input)?;
    let fetcher = SourceFetcher::new(open(db)?, limits);
    let mut browser = CatalogBrowser::new(
        &config,
        FacetRegistry::cards(),
        fetcher,
        MemorySessionStore::new(),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(source)?;
    let payload = runtime.block_on(async {
        browser.apply_params(&params).await;
        while browser.items().len() < shape.rows {
            let last = browser.items().len().saturating_sub(1);
            if browser.on_proximity(last).await.is_none() {
                break;
            }
        }
        let first_pass = browser.controller().batches_taken();
        let ids: Vec<CardId> = browser.items().iter().map(|c| c.card_id.clone()).collect();

        let saved = browser
            .leave_for_detail(
                Viewport {
                    scroll_offset: shape.scroll,
                    height: shape.viewport,
                },
                &RowLayout {
                    ids: ids.clone(),
                    row_height: shape.row_height,
                    scroll: shape.scroll,
                },
            )
            .map_err(source)?;
        let restoration = browser
            .reenter(
                &params,
                0.0,
                &RowLayout {
                    ids,
                    row_height: shape.row_height,
                    scroll: 0.0,
                },
            )
            .await
            .map_err(source)?;

        Ok::<_, CommandError>(json!({
            "command": "browse",
            "canonical_key": browser.controller().key(),
            "first_pass_batches": first_pass,
            "replay_batches": browser.controller().batches_taken(),
            "loaded": browser.items().len(),
            "total": browser.controller().collection().total(),
            "status": browser.controller().status(),
            "saved": saved,
            "restoration": restoration,
        }))
    })?;
    emit_ok(output_mode, &payload).map_err(input)
}
