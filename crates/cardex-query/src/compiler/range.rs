use super::CompileError;
use crate::normalize::FilterState;
use crate::planner::{Combinator, Condition, Predicate};
use crate::registry::RangeFacet;

/// A range facet's parameters after coercion: bounds clamped and ordered,
/// sentinel precedence applied (only-null over only-variable over range).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeState {
    pub lo: i64,
    pub hi: i64,
    pub include_null: bool,
    pub only_null: bool,
    pub include_variable: bool,
    pub only_variable: bool,
}

impl RangeState {
    #[must_use]
    pub fn unbounded(facet: &RangeFacet) -> Self {
        Self {
            lo: facet.abs_min,
            hi: facet.abs_max,
            include_null: false,
            only_null: false,
            include_variable: false,
            only_variable: false,
        }
    }

    #[must_use]
    pub fn is_full_range(&self, facet: &RangeFacet) -> bool {
        self.lo == facet.abs_min && self.hi == facet.abs_max
    }

    /// `None` when neither bound narrows the facet.
    #[must_use]
    pub fn bound_condition(&self, facet: &RangeFacet) -> Option<Condition> {
        let min = (self.lo != facet.abs_min).then_some(self.lo);
        let max = (self.hi != facet.abs_max).then_some(self.hi);
        (min.is_some() || max.is_some()).then(|| Condition::NumberRange {
            field: facet.field.clone(),
            min,
            max,
        })
    }
}

#[must_use]
pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true")
}

pub(crate) fn flag_on(state: &FilterState, key: Option<&str>) -> bool {
    key.and_then(|k| state.get(k)).is_some_and(parse_flag)
}

pub(crate) fn parse_bound(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    // "2.0" from a slider; saturating cast, clamped below.
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
}

fn read_bound(
    facet: &RangeFacet,
    state: &FilterState,
    key: &str,
    fallback: i64,
    diagnostics: &mut Vec<CompileError>,
) -> i64 {
    let Some(raw) = state.get(key) else {
        return fallback;
    };
    let Some(value) = parse_bound(raw) else {
        diagnostics.push(CompileError::NonNumericBound {
            param: key.to_string(),
            value: raw.to_string(),
        });
        return fallback;
    };
    let clamped = facet.clamp(value);
    if clamped != value {
        diagnostics.push(CompileError::BoundClamped {
            param: key.to_string(),
            value: raw.to_string(),
            clamped_to: clamped,
        });
    }
    clamped
}

pub fn resolve_range(
    name: &str,
    facet: &RangeFacet,
    state: &FilterState,
    diagnostics: &mut Vec<CompileError>,
) -> RangeState {
    let mut out = RangeState::unbounded(facet);

    if flag_on(state, facet.only_null_key.as_deref()) {
        out.only_null = true;
        return out;
    }
    if facet.variable_field.is_some() && flag_on(state, facet.only_variable_key.as_deref()) {
        out.only_variable = true;
        return out;
    }

    let mut lo = read_bound(facet, state, &facet.min_key, facet.abs_min, diagnostics);
    let mut hi = read_bound(facet, state, &facet.max_key, facet.abs_max, diagnostics);
    if lo > hi {
        diagnostics.push(CompileError::InvertedRange {
            facet: name.to_string(),
            lo,
            hi,
        });
        std::mem::swap(&mut lo, &mut hi);
    }
    out.lo = lo;
    out.hi = hi;

    if flag_on(state, facet.include_null_key.as_deref()) {
        if lo > 0 {
            diagnostics.push(CompileError::IncludeNullCleared {
                facet: name.to_string(),
                lo,
            });
        } else {
            out.include_null = true;
        }
    }
    out.include_variable =
        facet.variable_field.is_some() && flag_on(state, facet.include_variable_key.as_deref());
    out
}

pub(super) fn compile_range(
    name: &str,
    facet: &RangeFacet,
    state: &FilterState,
    diagnostics: &mut Vec<CompileError>,
) -> Vec<Predicate> {
    let resolved = resolve_range(name, facet, state, diagnostics);

    if resolved.only_null {
        return vec![Predicate::single(
            name,
            Condition::IsNull {
                field: facet.field.clone(),
            },
        )];
    }
    if resolved.only_variable {
        return facet
            .variable_field
            .iter()
            .map(|flag| {
                Predicate::single(
                    name,
                    Condition::IsTrue {
                        field: flag.clone(),
                    },
                )
            })
            .collect();
    }

    // A full range admits everything, so inclusion sentinels add nothing.
    let Some(bounds) = resolved.bound_condition(facet) else {
        return Vec::new();
    };
    let mut conditions = vec![bounds];
    if resolved.include_null {
        conditions.push(Condition::IsNull {
            field: facet.field.clone(),
        });
    }
    if resolved.include_variable {
        conditions.extend(facet.variable_field.iter().map(|flag| Condition::IsTrue {
            field: flag.clone(),
        }));
    }
    vec![Predicate::group(name, Combinator::Or, conditions)]
}

#[cfg(test)]
mod tests {
    use crate::compiler::{compile, CompileError};
    use crate::normalize::FilterState;
    use crate::planner::{Combinator, Condition, PageWindow, Predicate};
    use crate::registry::FacetRegistry;

    fn compile_params(params: &[(&str, &str)]) -> (Vec<Predicate>, Vec<CompileError>) {
        let compiled = compile(
            &FacetRegistry::cards(),
            &FilterState::from_params(params.iter().copied()),
            PageWindow::new(0, 30),
        );
        (compiled.plan.predicates, compiled.diagnostics)
    }

    #[test]
    fn absolute_bounds_compile_to_nothing() {
        let (preds, diags) = compile_params(&[("cost_min", "0"), ("cost_max", "10")]);
        assert!(preds.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn only_null_wins_over_bounds() {
        let (preds, _) = compile_params(&[("cost_min", "5"), ("cost_only_null", "1")]);
        assert_eq!(
            preds,
            vec![Predicate::single(
                "cost",
                Condition::IsNull {
                    field: "cost".to_string()
                }
            )]
        );
    }

    #[test]
    fn only_variable_targets_flag_field() {
        let (preds, _) = compile_params(&[("cost_max", "3"), ("cost_only_variable", "true")]);
        assert_eq!(
            preds[0].conditions,
            vec![Condition::IsTrue {
                field: "cost_is_variable".to_string()
            }]
        );
    }

    #[test]
    fn only_variable_is_ignored_on_facets_without_flag() {
        let (preds, diags) = compile_params(&[("power_only_variable", "1")]);
        assert!(preds.is_empty());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn one_sided_bound_keeps_other_side_open() {
        let (preds, _) = compile_params(&[("power_min", "2000")]);
        assert_eq!(
            preds[0].conditions,
            vec![Condition::NumberRange {
                field: "power".to_string(),
                min: Some(2000),
                max: None
            }]
        );
    }

    #[test]
    fn include_null_and_variable_widen_the_range() {
        let (preds, _) = compile_params(&[
            ("cost_max", "2"),
            ("cost_include_null", "1"),
            ("cost_include_variable", "1"),
        ]);
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].combinator, Combinator::Or);
        assert_eq!(preds[0].conditions.len(), 3);
    }

    #[test]
    fn include_null_cleared_above_zero() {
        let (preds, diags) = compile_params(&[("cost_min", "3"), ("cost_include_null", "1")]);
        assert_eq!(preds[0].conditions.len(), 1);
        assert!(matches!(
            diags.as_slice(),
            [CompileError::IncludeNullCleared { lo: 3, .. }]
        ));
    }

    #[test]
    fn bad_bounds_are_coerced() {
        let (preds, diags) = compile_params(&[("level_min", "abc"), ("level_max", "99")]);
        assert!(preds.is_empty());
        assert_eq!(diags.len(), 2);

        let (preds, diags) = compile_params(&[("level_min", "9"), ("level_max", "4")]);
        assert_eq!(
            preds[0].conditions,
            vec![Condition::NumberRange {
                field: "level".to_string(),
                min: Some(4),
                max: Some(9)
            }]
        );
        assert!(matches!(diags.as_slice(), [CompileError::InvertedRange { .. }]));
    }
}
