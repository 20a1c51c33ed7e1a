use super::CompileError;
use crate::normalize::FilterState;
use crate::planner::{NullOrder, OrderTerm, SortDirection};
use crate::registry::{SORT_BY_KEY, SORT_DIR_KEY};
use serde::Serialize;

/// Appended to every ordering so that paging over the result is a partition.
pub const DEFAULT_TIEBREAKERS: [&str; 2] = ["set_order", "card_id"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Cost,
    Power,
    Level,
    Set,
}

impl SortField {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "cost" => Some(Self::Cost),
            "power" => Some(Self::Power),
            "level" => Some(Self::Level),
            "set" => Some(Self::Set),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Cost => "cost",
            Self::Power => "power",
            Self::Level => "level",
            Self::Set => "set",
        }
    }

    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Cost => "cost",
            Self::Power => "power",
            Self::Level => "level",
            Self::Set => "set_order",
        }
    }
}

#[must_use]
pub fn default_order() -> Vec<OrderTerm> {
    DEFAULT_TIEBREAKERS.iter().map(|f| OrderTerm::asc(f)).collect()
}

pub(crate) fn parse_direction(raw: &str) -> Option<SortDirection> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "asc" => Some(SortDirection::Asc),
        "desc" => Some(SortDirection::Desc),
        _ => None,
    }
}

pub fn compile_order(state: &FilterState, diagnostics: &mut Vec<CompileError>) -> Vec<OrderTerm> {
    let explicit = state.get(SORT_BY_KEY).and_then(|raw| {
        SortField::parse(raw).or_else(|| {
            diagnostics.push(CompileError::UnknownSort {
                param: SORT_BY_KEY.to_string(),
                value: raw.to_string(),
            });
            None
        })
    });
    let Some(sort_field) = explicit else {
        return default_order();
    };

    let direction = match state.get(SORT_DIR_KEY) {
        None => SortDirection::Asc,
        Some(raw) => parse_direction(raw).unwrap_or_else(|| {
            diagnostics.push(CompileError::UnknownSort {
                param: SORT_DIR_KEY.to_string(),
                value: raw.to_string(),
            });
            SortDirection::Asc
        }),
    };

    let mut order = vec![OrderTerm {
        field: sort_field.field().to_string(),
        direction,
        nulls: NullOrder::Last,
    }];
    order.extend(
        DEFAULT_TIEBREAKERS
            .iter()
            .filter(|f| **f != sort_field.field())
            .map(|f| OrderTerm::asc(f)),
    );
    order
}

#[cfg(test)]
mod tests {
    use super::{compile_order, default_order};
    use crate::normalize::FilterState;
    use crate::planner::{NullOrder, SortDirection};

    #[test]
    fn default_order_is_set_then_id() {
        let mut diags = Vec::new();
        let order = compile_order(&FilterState::default(), &mut diags);
        assert_eq!(order, default_order());
        assert!(diags.is_empty());
    }

    #[test]
    fn explicit_sort_keeps_tiebreakers_and_nulls_last() {
        let mut diags = Vec::new();
        let state = FilterState::from_params([("sort_by", "cost"), ("sort_dir", "DESC")]);
        let order = compile_order(&state, &mut diags);
        let fields: Vec<&str> = order.iter().map(|t| t.field.as_str()).collect();
        assert_eq!(fields, vec!["cost", "set_order", "card_id"]);
        assert_eq!(order[0].direction, SortDirection::Desc);
        assert!(order.iter().all(|t| t.nulls == NullOrder::Last));
    }

    #[test]
    fn set_sort_is_not_duplicated() {
        let mut diags = Vec::new();
        let state = FilterState::from_params([("sort_by", "set"), ("sort_dir", "desc")]);
        let fields: Vec<String> = compile_order(&state, &mut diags)
            .into_iter()
            .map(|t| t.field)
            .collect();
        assert_eq!(fields, vec!["set_order".to_string(), "card_id".to_string()]);
    }

    #[test]
    fn unknown_sort_falls_back_to_default() {
        let mut diags = Vec::new();
        let state = FilterState::from_params([("sort_by", "rarity")]);
        assert_eq!(compile_order(&state, &mut diags), default_order());
        assert_eq!(diags.len(), 1);
    }
}
