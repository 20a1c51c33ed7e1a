use super::range::resolve_range;
use super::sort::{parse_direction, SortField};
use super::{select_mode, text_scope};
use crate::normalize::FilterState;
use crate::planner::SortDirection;
use crate::registry::{
    FacetKind, FacetRegistry, MultiSelectFacet, RangeFacet, TextFacet, TextScope, TriStateFacet,
    SORT_BY_KEY, SORT_DIR_KEY,
};
use crate::text::{join_list, split_list};
use crate::tristate::TriStateMembers;

/// Rewrites `state` into its minimal equivalent: every value that compiles to
/// the facet default is removed and the rest are written in canonical form.
/// Default UI states therefore key exactly like "no filter". Parameters the
/// registry does not know are kept as-is.
#[must_use]
pub fn prune_defaults(registry: &FacetRegistry, state: &FilterState) -> FilterState {
    let mut out = state.clone();
    let mut scratch = Vec::new();
    for facet in registry.facets() {
        match &facet.kind {
            FacetKind::Text(t) => prune_text(t, state, &mut out, &mut scratch),
            FacetKind::TriState(t) => prune_tri_state(t, state, &mut out),
            FacetKind::MultiSelect(m) => prune_multi_select(m, state, &mut out, &mut scratch),
            FacetKind::Range(r) => prune_range(&facet.name, r, state, &mut out, &mut scratch),
        }
    }
    prune_sort(state, &mut out);
    out
}

fn write_list(out: &mut FilterState, key: &str, items: &[String]) {
    if items.is_empty() {
        out.remove(key);
    } else {
        out.set(key, join_list(items));
    }
}

fn list_of(state: &FilterState, key: &str) -> Vec<String> {
    state.get(key).map(split_list).unwrap_or_default()
}

fn prune_text(
    facet: &TextFacet,
    state: &FilterState,
    out: &mut FilterState,
    scratch: &mut Vec<super::CompileError>,
) {
    let include = list_of(state, &facet.include_key);
    let exclude = list_of(state, &facet.exclude_key);
    write_list(out, &facet.include_key, &include);
    write_list(out, &facet.exclude_key, &exclude);
    let has_phrase = state.get(&facet.phrase_key).is_some();

    let Some(scope_key) = facet.scope_key.as_deref() else {
        return;
    };
    let has_terms = !include.is_empty() || !exclude.is_empty() || has_phrase;
    match text_scope(facet, state, scratch) {
        TextScope::Highlight if has_terms => out.set(scope_key, "highlight".to_string()),
        TextScope::All if has_terms => out.set(scope_key, "all".to_string()),
        _ => out.remove(scope_key),
    }
}

fn prune_tri_state(facet: &TriStateFacet, state: &FilterState, out: &mut FilterState) {
    let members = TriStateMembers::read(facet, |k| state.get(k).map(str::to_string));
    write_list(out, &facet.include_key, &members.include);
    write_list(out, &facet.exclude_key, &members.exclude);
}

fn prune_multi_select(
    facet: &MultiSelectFacet,
    state: &FilterState,
    out: &mut FilterState,
    scratch: &mut Vec<super::CompileError>,
) {
    let sides = [
        (
            &facet.include_key,
            &facet.mode_key,
            MultiSelectFacet::DEFAULT_INCLUDE_MODE,
        ),
        (
            &facet.exclude_key,
            &facet.exclude_mode_key,
            MultiSelectFacet::DEFAULT_EXCLUDE_MODE,
        ),
    ];
    for (list_key, mode_key, default) in sides {
        let items = list_of(state, list_key);
        write_list(out, list_key, &items);
        let mode = select_mode(state, mode_key, default, scratch);
        if items.len() < 2 || mode == default {
            out.remove(mode_key);
        } else {
            out.set(mode_key, mode.as_str().to_string());
        }
    }
}

fn prune_range(
    name: &str,
    facet: &RangeFacet,
    state: &FilterState,
    out: &mut FilterState,
    scratch: &mut Vec<super::CompileError>,
) {
    let resolved = resolve_range(name, facet, state, scratch);
    let all_keys = [
        Some(facet.min_key.as_str()),
        Some(facet.max_key.as_str()),
        facet.include_null_key.as_deref(),
        facet.only_null_key.as_deref(),
        facet.include_variable_key.as_deref(),
        facet.only_variable_key.as_deref(),
    ];
    for key in all_keys.into_iter().flatten() {
        out.remove(key);
    }

    if resolved.only_null {
        if let Some(key) = facet.only_null_key.as_deref() {
            out.set(key, "1".to_string());
        }
        return;
    }
    if resolved.only_variable {
        if let Some(key) = facet.only_variable_key.as_deref() {
            out.set(key, "1".to_string());
        }
        return;
    }
    if resolved.is_full_range(facet) {
        return;
    }
    if resolved.lo != facet.abs_min {
        out.set(&facet.min_key, resolved.lo.to_string());
    }
    if resolved.hi != facet.abs_max {
        out.set(&facet.max_key, resolved.hi.to_string());
    }
    if resolved.include_null {
        if let Some(key) = facet.include_null_key.as_deref() {
            out.set(key, "1".to_string());
        }
    }
    if resolved.include_variable {
        if let Some(key) = facet.include_variable_key.as_deref() {
            out.set(key, "1".to_string());
        }
    }
}

fn prune_sort(state: &FilterState, out: &mut FilterState) {
    match state.get(SORT_BY_KEY).and_then(SortField::parse) {
        None => {
            out.remove(SORT_BY_KEY);
            out.remove(SORT_DIR_KEY);
        }
        Some(field) => {
            let desc = matches!(
                state.get(SORT_DIR_KEY).and_then(parse_direction),
                Some(SortDirection::Desc)
            );
            // Ascending set order is the default ordering itself.
            if field == SortField::Set && !desc {
                out.remove(SORT_BY_KEY);
                out.remove(SORT_DIR_KEY);
                return;
            }
            out.set(SORT_BY_KEY, field.as_param().to_string());
            if desc {
                out.set(SORT_DIR_KEY, "desc".to_string());
            } else {
                out.remove(SORT_DIR_KEY);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::prune_defaults;
    use crate::normalize::FilterState;
    use crate::registry::FacetRegistry;

    fn pruned(params: &[(&str, &str)]) -> String {
        let state = FilterState::from_params(params.iter().copied());
        prune_defaults(&FacetRegistry::cards(), &state)
            .canonical_key()
            .as_str()
            .to_string()
    }

    #[test]
    fn default_ui_state_keys_like_no_filter() {
        assert_eq!(
            pruned(&[
                ("cost_min", "0"),
                ("cost_max", "10"),
                ("cost_include_null", "0"),
                ("colors_mode", "and"),
                ("colors_exclude_mode", "or"),
                ("effect_scope", "all"),
                ("sort_dir", "asc"),
            ]),
            ""
        );
    }

    #[test]
    fn canonical_forms_are_written_back() {
        assert_eq!(
            pruned(&[
                ("cost_min", "2.0"),
                ("cost_include_null", "true"),
                ("colors", "red, blue,red"),
                ("colors_mode", "OR"),
                ("effect_include", "draw"),
                ("effect_scope", "highlight-only"),
            ]),
            "colors=red,blue&colors_mode=or&cost_min=2&effect_include=draw&effect_scope=highlight"
        );
    }

    #[test]
    fn only_null_drops_the_rest_of_the_facet() {
        assert_eq!(
            pruned(&[
                ("cost_min", "5"),
                ("cost_include_variable", "1"),
                ("cost_only_null", "1"),
            ]),
            "cost_only_null=1"
        );
    }

    #[test]
    fn ascending_set_sort_is_the_default_order() {
        assert_eq!(pruned(&[("sort_by", "set")]), "");
        assert_eq!(pruned(&[("sort_by", "set"), ("sort_dir", "ASC")]), "");
        assert_eq!(
            pruned(&[("sort_by", "set"), ("sort_dir", "desc")]),
            "sort_by=set&sort_dir=desc"
        );
        assert_eq!(pruned(&[("sort_by", "cost")]), "sort_by=cost");
    }

    #[test]
    fn unknown_params_survive() {
        assert_eq!(pruned(&[("rarity", "mythic")]), "rarity=mythic");
    }
}
