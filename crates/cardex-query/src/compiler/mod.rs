// SPDX-License-Identifier: Apache-2.0

//! Facet compiler: [`FilterState`] to [`QueryPlan`].
//!
//! Compilation never fails. Values that violate a facet's own constraints are
//! clamped or coerced where a sane default exists and dropped otherwise; each
//! such decision is reported as a [`CompileError`] diagnostic.

mod prune;
mod range;
mod sort;

pub use prune::prune_defaults;
pub(crate) use range::parse_bound;
pub use range::{parse_flag, resolve_range, RangeState};
pub use sort::{compile_order, default_order, SortField, DEFAULT_TIEBREAKERS};

use crate::normalize::FilterState;
use crate::planner::{Combinator, Condition, PageWindow, Predicate, QueryPlan};
use crate::registry::{
    FacetDefinition, FacetKind, FacetRegistry, MultiSelectFacet, SelectMode, TextFacet, TextScope,
    TriStateFacet,
};
use crate::text::{fold_text, split_list};
use crate::tristate::TriStateMembers;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum CompileError {
    NonNumericBound { param: String, value: String },
    BoundClamped { param: String, value: String, clamped_to: i64 },
    InvertedRange { facet: String, lo: i64, hi: i64 },
    IncludeNullCleared { facet: String, lo: i64 },
    UnknownMode { param: String, value: String },
    UnknownScope { param: String, value: String },
    UnknownSort { param: String, value: String },
    UnknownParam { param: String },
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonNumericBound { param, value } => {
                write!(f, "{param}: non-numeric bound `{value}` ignored")
            }
            Self::BoundClamped {
                param,
                value,
                clamped_to,
            } => write!(f, "{param}: `{value}` clamped to {clamped_to}"),
            Self::InvertedRange { facet, lo, hi } => {
                write!(f, "{facet}: inverted range {lo}..{hi} swapped")
            }
            Self::IncludeNullCleared { facet, lo } => {
                write!(f, "{facet}: include-null ignored because min {lo} > 0")
            }
            Self::UnknownMode { param, value } => {
                write!(f, "{param}: unknown mode `{value}`, default used")
            }
            Self::UnknownScope { param, value } => {
                write!(f, "{param}: unknown scope `{value}`, primary field used")
            }
            Self::UnknownSort { param, value } => {
                write!(f, "{param}: unknown sort `{value}` ignored")
            }
            Self::UnknownParam { param } => write!(f, "{param}: not a registered facet parameter"),
        }
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub plan: QueryPlan,
    pub diagnostics: Vec<CompileError>,
}

pub fn compile(registry: &FacetRegistry, state: &FilterState, window: PageWindow) -> CompiledQuery {
    let mut diagnostics = Vec::new();
    let mut predicates = Vec::new();

    for facet in registry.facets() {
        predicates.extend(compile_facet(facet, state, &mut diagnostics));
    }
    for (key, _) in state.iter() {
        if !registry.is_known_param(key) {
            diagnostics.push(CompileError::UnknownParam {
                param: key.to_string(),
            });
        }
    }
    let order = compile_order(state, &mut diagnostics);

    for diagnostic in &diagnostics {
        debug!(diagnostic = %diagnostic, "facet value coerced");
    }
    debug!(
        predicates = predicates.len(),
        order_terms = order.len(),
        offset = window.offset,
        limit = window.limit,
        "filter state compiled"
    );

    CompiledQuery {
        plan: QueryPlan {
            predicates,
            order,
            window,
        },
        diagnostics,
    }
}

#[must_use]
pub fn compile_plan(registry: &FacetRegistry, state: &FilterState, window: PageWindow) -> QueryPlan {
    compile(registry, state, window).plan
}

pub fn compile_facet(
    facet: &FacetDefinition,
    state: &FilterState,
    diagnostics: &mut Vec<CompileError>,
) -> Vec<Predicate> {
    match &facet.kind {
        FacetKind::Text(t) => compile_text(&facet.name, t, state, diagnostics),
        FacetKind::TriState(t) => compile_tri_state(&facet.name, t, state),
        FacetKind::MultiSelect(m) => compile_multi_select(&facet.name, m, state, diagnostics),
        FacetKind::Range(r) => range::compile_range(&facet.name, r, state, diagnostics),
    }
}

pub(crate) fn text_scope(
    facet: &TextFacet,
    state: &FilterState,
    diagnostics: &mut Vec<CompileError>,
) -> TextScope {
    let Some(key) = facet.scope_key.as_deref() else {
        return TextScope::Primary;
    };
    let Some(raw) = state.get(key) else {
        return TextScope::Primary;
    };
    TextScope::parse(raw).unwrap_or_else(|| {
        diagnostics.push(CompileError::UnknownScope {
            param: key.to_string(),
            value: raw.to_string(),
        });
        TextScope::Primary
    })
}

fn compile_text(
    name: &str,
    facet: &TextFacet,
    state: &FilterState,
    diagnostics: &mut Vec<CompileError>,
) -> Vec<Predicate> {
    let fields = facet.fields_for(text_scope(facet, state, diagnostics));
    let contains = |needle: &str| -> Predicate {
        let needle = fold_text(needle);
        let conditions = fields
            .iter()
            .map(|field| Condition::TextContains {
                field: (*field).to_string(),
                needle: needle.clone(),
            })
            .collect();
        Predicate::group(name, Combinator::Or, conditions)
    };
    let absent = |needle: &str| -> Predicate {
        let needle = fold_text(needle);
        let conditions = fields
            .iter()
            .map(|field| Condition::TextNotContains {
                field: (*field).to_string(),
                needle: needle.clone(),
            })
            .collect();
        Predicate::group(name, Combinator::And, conditions)
    };

    let mut out = Vec::new();
    if let Some(raw) = state.get(&facet.include_key) {
        out.extend(split_list(raw).iter().map(|w| contains(w.as_str())));
    }
    if let Some(raw) = state.get(&facet.exclude_key) {
        out.extend(split_list(raw).iter().map(|w| absent(w.as_str())));
    }
    if let Some(phrase) = state.get(&facet.phrase_key).map(str::trim) {
        if !phrase.is_empty() {
            out.push(contains(phrase));
        }
    }
    out
}

fn compile_tri_state(name: &str, facet: &TriStateFacet, state: &FilterState) -> Vec<Predicate> {
    let members = TriStateMembers::read(facet, |k| state.get(k).map(str::to_string));
    let include = members.include.iter().map(|m| {
        Predicate::single(
            name,
            Condition::ArrayContains {
                field: facet.field.clone(),
                value: m.clone(),
            },
        )
    });
    let exclude = members.exclude.iter().map(|m| {
        Predicate::single(
            name,
            Condition::ArrayNotContains {
                field: facet.field.clone(),
                value: m.clone(),
            },
        )
    });
    include.chain(exclude).collect()
}

pub(crate) fn select_mode(
    state: &FilterState,
    key: &str,
    default: SelectMode,
    diagnostics: &mut Vec<CompileError>,
) -> SelectMode {
    match state.get(key) {
        None => default,
        Some(raw) => SelectMode::parse(raw).unwrap_or_else(|| {
            diagnostics.push(CompileError::UnknownMode {
                param: key.to_string(),
                value: raw.to_string(),
            });
            default
        }),
    }
}

fn compile_multi_select(
    name: &str,
    facet: &MultiSelectFacet,
    state: &FilterState,
    diagnostics: &mut Vec<CompileError>,
) -> Vec<Predicate> {
    let mut out = Vec::new();

    let include = state.get(&facet.include_key).map(split_list).unwrap_or_default();
    if !include.is_empty() {
        let mode = select_mode(
            state,
            &facet.mode_key,
            MultiSelectFacet::DEFAULT_INCLUDE_MODE,
            diagnostics,
        );
        let conditions = include
            .iter()
            .map(|v| {
                if facet.is_empty_sentinel(v) {
                    Condition::ArrayEmpty {
                        field: facet.field.clone(),
                    }
                } else {
                    Condition::ArrayContains {
                        field: facet.field.clone(),
                        value: v.clone(),
                    }
                }
            })
            .collect();
        let combinator = match mode {
            SelectMode::And => Combinator::And,
            SelectMode::Or => Combinator::Or,
        };
        out.push(Predicate::group(name, combinator, conditions));
    }

    let exclude = state.get(&facet.exclude_key).map(split_list).unwrap_or_default();
    if !exclude.is_empty() {
        let mode = select_mode(
            state,
            &facet.exclude_mode_key,
            MultiSelectFacet::DEFAULT_EXCLUDE_MODE,
            diagnostics,
        );
        let conditions = exclude
            .iter()
            .map(|v| {
                if facet.is_empty_sentinel(v) {
                    Condition::ArrayNotEmpty {
                        field: facet.field.clone(),
                    }
                } else {
                    Condition::ArrayNotContains {
                        field: facet.field.clone(),
                        value: v.clone(),
                    }
                }
            })
            .collect();
        // Conditions are already negated: "excluded if any" keeps records
        // lacking every value, "excluded if all" keeps records lacking one.
        let combinator = match mode {
            SelectMode::Or => Combinator::And,
            SelectMode::And => Combinator::Or,
        };
        out.push(Predicate::group(name, combinator, conditions));
    }
    out
}
