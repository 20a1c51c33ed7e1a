use cardex_query::{
    compile, Combinator, Condition, FacetRegistry, FilterState, PageWindow, Predicate,
};

fn predicates(params: &[(&str, &str)]) -> Vec<Predicate> {
    compile(
        &FacetRegistry::cards(),
        &FilterState::from_params(params.iter().copied()),
        PageWindow::new(0, 30),
    )
    .plan
    .predicates
}

#[test]
fn range_at_absolute_bounds_is_a_no_op() {
    for (lo_key, hi_key, hi) in [
        ("cost_min", "cost_max", "10"),
        ("power_min", "power_max", "15000"),
        ("level_min", "level_max", "12"),
    ] {
        assert!(
            predicates(&[(lo_key, "0"), (hi_key, hi)]).is_empty(),
            "{lo_key}..{hi_key} should compile to nothing"
        );
    }
}

#[test]
fn only_null_takes_precedence_over_bounds() {
    assert_eq!(
        predicates(&[("cost_min", "5"), ("cost_only_null", "1")]),
        vec![Predicate::single(
            "cost",
            Condition::IsNull {
                field: "cost".to_string()
            }
        )]
    );
}

#[test]
fn none_sentinel_means_empty_array() {
    let preds = predicates(&[("symbols", "__none__")]);
    assert_eq!(preds.len(), 1);
    assert_eq!(
        preds[0].conditions,
        vec![Condition::ArrayEmpty {
            field: "symbols".to_string()
        }]
    );
    assert!(!preds[0]
        .conditions
        .iter()
        .any(|c| matches!(c, Condition::ArrayContains { .. })));
}

#[test]
fn effect_scope_all_produces_two_or_predicates() {
    let preds = predicates(&[("effect_include", "draw,discard"), ("effect_scope", "all")]);
    assert_eq!(preds.len(), 2);
    for pred in &preds {
        assert_eq!(pred.combinator, Combinator::Or);
        assert_eq!(pred.conditions.len(), 2);
    }
}

#[test]
fn empty_state_compiles_to_default_order_only() {
    let compiled = compile(
        &FacetRegistry::cards(),
        &FilterState::default(),
        PageWindow::new(0, 30),
    );
    assert!(compiled.plan.predicates.is_empty());
    assert!(compiled.diagnostics.is_empty());
    let fields: Vec<&str> = compiled.plan.order.iter().map(|t| t.field.as_str()).collect();
    assert_eq!(fields, vec!["set_order", "card_id"]);
}
