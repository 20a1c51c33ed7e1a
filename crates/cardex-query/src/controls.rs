//! Edits applied to a raw parameter map by filter controls.
//!
//! Each function mutates the map the way the matching control would and
//! leaves it ready to be pushed back to the parameter source. Sentinel
//! exclusivity for range facets is maintained here as well as in the
//! compiler, so the address bar never shows contradictory flags.

use crate::compiler::{parse_bound, parse_flag};
use crate::registry::{MultiSelectFacet, RangeFacet, SelectMode, TextFacet, TextScope, TriStateFacet};
use crate::text::{join_list, split_list};
use crate::tristate::{TriState, TriStateMembers};
use std::collections::BTreeMap;

pub type Params = BTreeMap<String, String>;

const FLAG_ON: &str = "1";

fn put_list(params: &mut Params, key: &str, items: &[String]) {
    let items: Vec<String> = items
        .iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if items.is_empty() {
        params.remove(key);
    } else {
        params.insert(key.to_string(), join_list(&items));
    }
}

fn put_flag(params: &mut Params, key: Option<&str>, on: bool) {
    let Some(key) = key else { return };
    if on {
        params.insert(key.to_string(), FLAG_ON.to_string());
    } else {
        params.remove(key);
    }
}

fn flag(params: &Params, key: Option<&str>) -> bool {
    key.and_then(|k| params.get(k)).is_some_and(|v| parse_flag(v))
}

/// Advances `member` one step along neutral -> include -> exclude -> neutral
/// and returns its new state.
pub fn cycle_tri_state(params: &mut Params, facet: &TriStateFacet, member: &str) -> TriState {
    let member = member.trim();
    let mut members = TriStateMembers::from_params(facet, params);
    let next = members.state_of(member).next();
    members.set_state(member, next);
    put_list(params, &facet.include_key, &members.include);
    put_list(params, &facet.exclude_key, &members.exclude);
    next
}

/// Mode flags are written when they differ from the default or when their
/// list is non-empty; an empty list at the default mode leaves no trace.
pub fn set_multi_select(
    params: &mut Params,
    facet: &MultiSelectFacet,
    include: &[String],
    include_mode: SelectMode,
    exclude: &[String],
    exclude_mode: SelectMode,
) {
    let sides = [
        (
            &facet.include_key,
            &facet.mode_key,
            include,
            include_mode,
            MultiSelectFacet::DEFAULT_INCLUDE_MODE,
        ),
        (
            &facet.exclude_key,
            &facet.exclude_mode_key,
            exclude,
            exclude_mode,
            MultiSelectFacet::DEFAULT_EXCLUDE_MODE,
        ),
    ];
    for (list_key, mode_key, items, mode, default) in sides {
        put_list(params, list_key, items);
        if mode != default || params.contains_key(list_key.as_str()) {
            params.insert(mode_key.clone(), mode.as_str().to_string());
        } else {
            params.remove(mode_key.as_str());
        }
    }
}

/// Toggles one value in a multi-select include list.
pub fn toggle_multi_select_value(params: &mut Params, facet: &MultiSelectFacet, value: &str) {
    let value = value.trim();
    let mut items = params
        .get(&facet.include_key)
        .map(|raw| split_list(raw))
        .unwrap_or_default();
    if let Some(pos) = items.iter().position(|i| i == value) {
        items.remove(pos);
    } else {
        items.push(value.to_string());
    }
    put_list(params, &facet.include_key, &items);
    if items.is_empty() {
        params.remove(&facet.mode_key);
    }
}

fn current_min(params: &Params, facet: &RangeFacet) -> i64 {
    params
        .get(&facet.min_key)
        .and_then(|v| parse_bound(v))
        .map_or(facet.abs_min, |v| facet.clamp(v))
}

/// Sets both bounds of a range. Bounds equal to the absolute facet bounds are
/// removed, and include-null is cleared once the lower bound rises above 0.
pub fn set_range(params: &mut Params, facet: &RangeFacet, lo: Option<i64>, hi: Option<i64>) {
    let lo = lo.map_or(facet.abs_min, |v| facet.clamp(v));
    let hi = hi.map_or(facet.abs_max, |v| facet.clamp(v));
    let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };

    if lo == facet.abs_min {
        params.remove(&facet.min_key);
    } else {
        params.insert(facet.min_key.clone(), lo.to_string());
    }
    if hi == facet.abs_max {
        params.remove(&facet.max_key);
    } else {
        params.insert(facet.max_key.clone(), hi.to_string());
    }
    if lo > 0 {
        put_flag(params, facet.include_null_key.as_deref(), false);
    }
}

/// Returns whether the flag is set afterwards: include-null is only
/// selectable while the lower bound is 0.
pub fn set_include_null(params: &mut Params, facet: &RangeFacet, on: bool) -> bool {
    let on = on && current_min(params, facet) <= 0;
    put_flag(params, facet.include_null_key.as_deref(), on);
    if on {
        put_flag(params, facet.only_null_key.as_deref(), false);
        put_flag(params, facet.only_variable_key.as_deref(), false);
    }
    on
}

pub fn set_only_null(params: &mut Params, facet: &RangeFacet, on: bool) {
    put_flag(params, facet.only_null_key.as_deref(), on);
    if on {
        put_flag(params, facet.include_null_key.as_deref(), false);
        put_flag(params, facet.include_variable_key.as_deref(), false);
        put_flag(params, facet.only_variable_key.as_deref(), false);
    }
}

pub fn set_only_variable(params: &mut Params, facet: &RangeFacet, on: bool) {
    put_flag(params, facet.only_variable_key.as_deref(), on);
    if on {
        put_flag(params, facet.only_null_key.as_deref(), false);
        put_flag(params, facet.include_null_key.as_deref(), false);
        put_flag(params, facet.include_variable_key.as_deref(), false);
    }
}

pub fn set_include_variable(params: &mut Params, facet: &RangeFacet, on: bool) {
    put_flag(params, facet.include_variable_key.as_deref(), on);
    if on {
        put_flag(params, facet.only_null_key.as_deref(), false);
        put_flag(params, facet.only_variable_key.as_deref(), false);
    }
}

#[must_use]
pub fn range_flags(params: &Params, facet: &RangeFacet) -> [bool; 4] {
    [
        flag(params, facet.include_null_key.as_deref()),
        flag(params, facet.only_null_key.as_deref()),
        flag(params, facet.include_variable_key.as_deref()),
        flag(params, facet.only_variable_key.as_deref()),
    ]
}

/// Writes one of a text facet's word lists; `key` must be its include or
/// exclude key.
pub fn set_text_list(params: &mut Params, key: &str, words: &[String]) {
    put_list(params, key, words);
}

pub fn set_text_phrase(params: &mut Params, facet: &TextFacet, phrase: &str) {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        params.remove(&facet.phrase_key);
    } else {
        params.insert(facet.phrase_key.clone(), phrase.to_string());
    }
}

pub fn set_text_scope(params: &mut Params, facet: &TextFacet, scope: TextScope) {
    let Some(key) = facet.scope_key.as_deref() else {
        return;
    };
    match scope {
        TextScope::Primary => {
            params.remove(key);
        }
        TextScope::Highlight => {
            params.insert(key.to_string(), "highlight".to_string());
        }
        TextScope::All => {
            params.insert(key.to_string(), "all".to_string());
        }
    }
}
