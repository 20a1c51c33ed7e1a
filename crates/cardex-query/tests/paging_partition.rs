mod support;

use cardex_model::Card;
use cardex_query::{
    compile_plan, execute, DataSource, FacetDefinition, FacetRegistry, FilterState,
    MemoryCatalog, PageWindow, QueryLimits, SqliteCatalog,
};
use serde_json::json;
use proptest::prelude::*;
use std::collections::BTreeSet;

const FILTERS: [&[(&str, &str)]; 6] = [
    &[],
    &[("colors", "red")],
    &[("cost_max", "4"), ("cost_include_null", "1")],
    &[("sort_by", "cost"), ("sort_dir", "desc")],
    &[("sort_by", "power"), ("keywords_exc", "haste")],
    &[("effect_include", "draw"), ("effect_scope", "all"), ("sort_by", "name")],
];

fn sqlite_catalog(n: usize) -> SqliteCatalog {
    let mut db = SqliteCatalog::open_in_memory().expect("sqlite");
    db.insert_cards(&support::cards(n)).expect("insert");
    db
}

fn page_through(source: &dyn DataSource, state: &FilterState, batch: usize) -> (Vec<String>, u64) {
    let registry = FacetRegistry::cards();
    let limits = QueryLimits::default();
    let mut seen = Vec::new();
    let total = loop {
        let plan = compile_plan(&registry, state, PageWindow::new(seen.len(), batch));
        let page = execute(source, &plan, &limits).expect("page");
        if page.items.is_empty() {
            break page.total;
        }
        seen.extend(page.items.iter().map(|c| c.card_id.to_string()));
    };
    (seen, total)
}

fn all_at_once(source: &dyn DataSource, state: &FilterState) -> Vec<String> {
    let plan = compile_plan(&FacetRegistry::cards(), state, PageWindow::new(0, 500));
    source
        .execute(&plan)
        .expect("page")
        .items
        .iter()
        .map(|c| c.card_id.to_string())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn batches_partition_the_result(batch in 1usize..40, filter in 0usize..FILTERS.len()) {
        let state = FilterState::from_params(FILTERS[filter].iter().copied());
        let memory = MemoryCatalog::new(support::cards(90));
        let sqlite = sqlite_catalog(90);

        for source in [&memory as &dyn DataSource, &sqlite as &dyn DataSource] {
            let (paged, total) = page_through(source, &state, batch);
            let unique: BTreeSet<&String> = paged.iter().collect();
            prop_assert_eq!(unique.len(), paged.len());
            prop_assert_eq!(paged.len() as u64, total);
            prop_assert_eq!(&paged, &all_at_once(source, &state));
        }
    }
}

#[test]
fn memory_and_sqlite_agree_on_every_filter() {
    let memory = MemoryCatalog::new(support::cards(90));
    let sqlite = sqlite_catalog(90);
    for filter in FILTERS {
        let state = FilterState::from_params(filter.iter().copied());
        assert_eq!(
            all_at_once(&memory, &state),
            all_at_once(&sqlite, &state),
            "filter {filter:?}"
        );
    }
}

#[test]
fn count_uses_the_same_predicates_as_items() {
    let sqlite = sqlite_catalog(90);
    let state = FilterState::from_params([("colors", "red,blue"), ("colors_mode", "or")]);
    let plan = compile_plan(&FacetRegistry::cards(), &state, PageWindow::new(0, 500));
    let page = sqlite.execute(&plan).expect("page");
    assert_eq!(page.total, page.items.len() as u64);
    assert!(page.total > 0);
    assert!(page.items.iter().all(|c| {
        let colors = c.attribute("colors").and_then(|v| v.as_array()).expect("colors");
        colors.iter().any(|v| v == "red" || v == "blue")
    }));
}

#[test]
fn on_disk_catalog_reopens_with_same_results() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cards.sqlite");
    {
        let mut db = SqliteCatalog::open(&path).expect("open");
        db.insert_cards(&support::cards(20)).expect("insert");
    }
    let reopened = SqliteCatalog::open(&path).expect("reopen");
    let state = FilterState::from_params([("symbols", "__none__")]);
    let ids = all_at_once(&reopened, &state);
    assert_eq!(ids, vec!["C-000".to_string(), "C-007".to_string(), "C-014".to_string()]);
}

#[test]
fn oversized_window_is_rejected() {
    let memory = MemoryCatalog::new(support::cards(3));
    let plan = compile_plan(
        &FacetRegistry::cards(),
        &FilterState::default(),
        PageWindow::new(0, 501),
    );
    assert!(execute(&memory, &plan, &QueryLimits::default()).is_err());
    let plan = plan.with_window(PageWindow::new(0, 0));
    assert!(execute(&memory, &plan, &QueryLimits::default()).is_err());
}

#[test]
fn text_filters_on_numeric_fields_agree_across_catalogs() {
    let cards: Vec<Card> = [
        ("R-1", json!(2.0)),
        ("R-2", json!(2.5)),
        ("R-3", json!(3)),
        ("R-4", json!(true)),
    ]
    .into_iter()
    .map(|(id, rating)| Card::from_json(json!({ "card_id": id, "rating": rating })).expect("card"))
    .collect();
    let memory = MemoryCatalog::new(cards.clone());
    let mut sqlite = SqliteCatalog::open_in_memory().expect("sqlite");
    sqlite.insert_cards(&cards).expect("insert");

    let registry = FacetRegistry::new(vec![FacetDefinition::text("rating", "rating")]);
    let matching = |source: &dyn DataSource, needle: &str| -> Vec<String> {
        let state = FilterState::from_params([("rating_include", needle)]);
        let plan = compile_plan(&registry, &state, PageWindow::new(0, 10));
        let page = execute(source, &plan, &QueryLimits::default()).expect("page");
        page.items.iter().map(|c| c.card_id.to_string()).collect()
    };

    for (needle, expected) in [
        ("2.0", vec![]),
        ("2", vec!["R-1", "R-2"]),
        (".5", vec!["R-2"]),
        ("1", vec!["R-4"]),
    ] {
        assert_eq!(matching(&memory, needle), expected, "memory {needle}");
        assert_eq!(matching(&sqlite, needle), expected, "sqlite {needle}");
    }
}
