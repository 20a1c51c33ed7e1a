use cardex_query::{
    canonical_key_from_pairs, compile, normalize, prune_defaults, FacetRegistry, FilterState,
    PageWindow,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn param_pair() -> impl Strategy<Value = (String, String)> {
    let keys = prop::sample::select(vec![
        "name_include",
        "name_exclude",
        "name_phrase",
        "effect_include",
        "effect_scope",
        "keywords_inc",
        "keywords_exc",
        "colors",
        "colors_mode",
        "colors_exclude",
        "colors_exclude_mode",
        "symbols",
        "cost_min",
        "cost_max",
        "cost_include_null",
        "cost_only_null",
        "cost_include_variable",
        "cost_only_variable",
        "power_min",
        "power_include_null",
        "level_max",
        "sort_by",
        "sort_dir",
        "offset",
        "view",
    ]);
    let values = prop::sample::select(vec![
        "", " ", "0", "1", "3", "12", "-4", "99999", "abc", "2.5", "true", "and", "or", "all",
        "highlight", "red", "red,blue", "blue, red ,red", "__none__", "draw,discard",
        "50% & more=fun", "cost", "desc",
    ]);
    (keys, values).prop_map(|(k, v)| (k.to_string(), v.to_string()))
}

proptest! {
    #[test]
    fn canonical_key_is_commutative(
        (pairs, shuffled) in prop::collection::vec(param_pair(), 0..12)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        prop_assert_eq!(
            canonical_key_from_pairs(pairs.clone()),
            canonical_key_from_pairs(shuffled)
        );
        let distinct: BTreeMap<String, String> = pairs.into_iter().collect();
        let mut entries: Vec<(String, String)> = distinct.clone().into_iter().collect();
        entries.reverse();
        prop_assert_eq!(normalize(&distinct), FilterState::from_params(entries).canonical_key());
    }

    #[test]
    fn canonical_key_is_idempotent(pairs in prop::collection::vec(param_pair(), 0..12)) {
        let state = FilterState::from_params(pairs);
        let key = state.canonical_key();
        let reparsed = FilterState::parse_canonical(key.as_str());
        prop_assert_eq!(&reparsed, &state);
        prop_assert_eq!(reparsed.canonical_key(), key);
    }

    #[test]
    fn pruning_preserves_the_compiled_plan(pairs in prop::collection::vec(param_pair(), 0..12)) {
        let registry = FacetRegistry::cards();
        let state = FilterState::from_params(pairs);
        let pruned = prune_defaults(&registry, &state);
        let window = PageWindow::new(0, 30);
        prop_assert_eq!(
            compile(&registry, &pruned, window).plan,
            compile(&registry, &state, window).plan
        );
        prop_assert_eq!(prune_defaults(&registry, &pruned), pruned);
    }

    #[test]
    fn compile_never_panics(pairs in prop::collection::vec(("[a-z_]{1,20}", ".{0,20}"), 0..10)) {
        let state = FilterState::from_params(pairs);
        let _ = compile(&FacetRegistry::cards(), &state, PageWindow::new(0, 30));
    }
}

#[test]
fn input_order_does_not_change_the_plan() {
    let registry = FacetRegistry::cards();
    let a = FilterState::from_params([
        ("level_max", "4"),
        ("colors", "red"),
        ("name_include", "bolt"),
    ]);
    let b = FilterState::from_params([
        ("name_include", "bolt"),
        ("colors", "red"),
        ("level_max", "4"),
    ]);
    let window = PageWindow::new(0, 30);
    assert_eq!(
        compile(&registry, &a, window).plan,
        compile(&registry, &b, window).plan
    );
    assert_eq!(a.canonical_key(), b.canonical_key());
}
