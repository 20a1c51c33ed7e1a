// SPDX-License-Identifier: Apache-2.0

//! Static catalog of supported filter dimensions.
//!
//! Declaration order is significant: the compiler emits predicates grouped by
//! the order facets appear here, never by parameter-map order.

use serde::Serialize;

/// Include-list token meaning "the array field is empty".
pub const EMPTY_SENTINEL: &str = "__none__";

pub const SORT_BY_KEY: &str = "sort_by";
pub const SORT_DIR_KEY: &str = "sort_dir";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    And,
    Or,
}

impl SelectMode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextScope {
    Primary,
    Highlight,
    All,
}

impl TextScope {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "highlight" | "highlight-only" | "highlight_only" => Some(Self::Highlight),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFacet {
    pub include_key: String,
    pub exclude_key: String,
    pub phrase_key: String,
    pub scope_key: Option<String>,
    pub primary_field: String,
    pub highlight_field: Option<String>,
}

impl TextFacet {
    /// Fields a condition targets under `scope`; facets without a highlight
    /// field always use the primary one.
    #[must_use]
    pub fn fields_for(&self, scope: TextScope) -> Vec<&str> {
        match (&self.highlight_field, scope) {
            (Some(h), TextScope::Highlight) => vec![h.as_str()],
            (Some(h), TextScope::All) => vec![self.primary_field.as_str(), h.as_str()],
            _ => vec![self.primary_field.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriStateFacet {
    pub include_key: String,
    pub exclude_key: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiSelectFacet {
    pub include_key: String,
    pub exclude_key: String,
    pub mode_key: String,
    pub exclude_mode_key: String,
    pub field: String,
    pub empty_sentinel: Option<String>,
}

impl MultiSelectFacet {
    pub const DEFAULT_INCLUDE_MODE: SelectMode = SelectMode::And;
    pub const DEFAULT_EXCLUDE_MODE: SelectMode = SelectMode::Or;

    #[must_use]
    pub fn is_empty_sentinel(&self, value: &str) -> bool {
        self.empty_sentinel.as_deref() == Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeFacet {
    pub min_key: String,
    pub max_key: String,
    pub include_null_key: Option<String>,
    pub only_null_key: Option<String>,
    pub include_variable_key: Option<String>,
    pub only_variable_key: Option<String>,
    pub field: String,
    pub variable_field: Option<String>,
    pub abs_min: i64,
    pub abs_max: i64,
}

impl RangeFacet {
    #[must_use]
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.abs_min, self.abs_max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FacetKind {
    Text(TextFacet),
    TriState(TriStateFacet),
    MultiSelect(MultiSelectFacet),
    Range(RangeFacet),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetDefinition {
    pub name: String,
    pub kind: FacetKind,
}

impl FacetDefinition {
    #[must_use]
    pub fn text(name: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FacetKind::Text(TextFacet {
                include_key: format!("{name}_include"),
                exclude_key: format!("{name}_exclude"),
                phrase_key: format!("{name}_phrase"),
                scope_key: None,
                primary_field: field.to_string(),
                highlight_field: None,
            }),
        }
    }

    /// Text facet with an effect-scope switch between a primary and a
    /// highlight field.
    #[must_use]
    pub fn scoped_text(name: &str, primary_field: &str, highlight_field: &str) -> Self {
        let mut def = Self::text(name, primary_field);
        if let FacetKind::Text(t) = &mut def.kind {
            t.scope_key = Some(format!("{name}_scope"));
            t.highlight_field = Some(highlight_field.to_string());
        }
        def
    }

    #[must_use]
    pub fn tri_state(name: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FacetKind::TriState(TriStateFacet {
                include_key: format!("{name}_inc"),
                exclude_key: format!("{name}_exc"),
                field: field.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn multi_select(name: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FacetKind::MultiSelect(MultiSelectFacet {
                include_key: name.to_string(),
                exclude_key: format!("{name}_exclude"),
                mode_key: format!("{name}_mode"),
                exclude_mode_key: format!("{name}_exclude_mode"),
                field: field.to_string(),
                empty_sentinel: None,
            }),
        }
    }

    #[must_use]
    pub fn with_empty_sentinel(mut self, token: &str) -> Self {
        if let FacetKind::MultiSelect(m) = &mut self.kind {
            m.empty_sentinel = Some(token.to_string());
        }
        self
    }

    #[must_use]
    pub fn range(name: &str, field: &str, abs_min: i64, abs_max: i64) -> Self {
        Self {
            name: name.to_string(),
            kind: FacetKind::Range(RangeFacet {
                min_key: format!("{name}_min"),
                max_key: format!("{name}_max"),
                include_null_key: None,
                only_null_key: None,
                include_variable_key: None,
                only_variable_key: None,
                field: field.to_string(),
                variable_field: None,
                abs_min: abs_min.min(abs_max),
                abs_max: abs_max.max(abs_min),
            }),
        }
    }

    #[must_use]
    pub fn with_null_sentinels(mut self) -> Self {
        let name = self.name.clone();
        if let FacetKind::Range(r) = &mut self.kind {
            r.include_null_key = Some(format!("{name}_include_null"));
            r.only_null_key = Some(format!("{name}_only_null"));
        }
        self
    }

    #[must_use]
    pub fn with_variable_sentinels(mut self, flag_field: &str) -> Self {
        let name = self.name.clone();
        if let FacetKind::Range(r) = &mut self.kind {
            r.include_variable_key = Some(format!("{name}_include_variable"));
            r.only_variable_key = Some(format!("{name}_only_variable"));
            r.variable_field = Some(flag_field.to_string());
        }
        self
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextFacet> {
        match &self.kind {
            FacetKind::Text(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tri_state(&self) -> Option<&TriStateFacet> {
        match &self.kind {
            FacetKind::TriState(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_multi_select(&self) -> Option<&MultiSelectFacet> {
        match &self.kind {
            FacetKind::MultiSelect(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_range(&self) -> Option<&RangeFacet> {
        match &self.kind {
            FacetKind::Range(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.kind {
            FacetKind::Text(_) => "text-include-exclude-phrase",
            FacetKind::TriState(_) => "tri-state-multi",
            FacetKind::MultiSelect(_) => "multi-select-containment",
            FacetKind::Range(_) => "range-with-sentinels",
        }
    }

    #[must_use]
    pub fn param_keys(&self) -> Vec<&str> {
        match &self.kind {
            FacetKind::Text(t) => {
                let mut keys = vec![
                    t.include_key.as_str(),
                    t.exclude_key.as_str(),
                    t.phrase_key.as_str(),
                ];
                keys.extend(t.scope_key.as_deref());
                keys
            }
            FacetKind::TriState(t) => vec![t.include_key.as_str(), t.exclude_key.as_str()],
            FacetKind::MultiSelect(m) => vec![
                m.include_key.as_str(),
                m.exclude_key.as_str(),
                m.mode_key.as_str(),
                m.exclude_mode_key.as_str(),
            ],
            FacetKind::Range(r) => {
                let mut keys = vec![r.min_key.as_str(), r.max_key.as_str()];
                keys.extend(r.include_null_key.as_deref());
                keys.extend(r.only_null_key.as_deref());
                keys.extend(r.include_variable_key.as_deref());
                keys.extend(r.only_variable_key.as_deref());
                keys
            }
        }
    }

    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        match &self.kind {
            FacetKind::Text(t) => {
                let mut fields = vec![t.primary_field.as_str()];
                fields.extend(t.highlight_field.as_deref());
                fields
            }
            FacetKind::TriState(t) => vec![t.field.as_str()],
            FacetKind::MultiSelect(m) => vec![m.field.as_str()],
            FacetKind::Range(r) => {
                let mut fields = vec![r.field.as_str()];
                fields.extend(r.variable_field.as_deref());
                fields
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetRegistry {
    facets: Vec<FacetDefinition>,
}

impl FacetRegistry {
    #[must_use]
    pub fn new(facets: Vec<FacetDefinition>) -> Self {
        Self { facets }
    }

    /// The card catalog's facets, in compile order.
    #[must_use]
    pub fn cards() -> Self {
        Self::new(vec![
            FacetDefinition::text("name", "name"),
            FacetDefinition::scoped_text("effect", "effect_text", "highlight_text"),
            FacetDefinition::tri_state("keywords", "keywords"),
            FacetDefinition::multi_select("colors", "colors"),
            FacetDefinition::multi_select("types", "types"),
            FacetDefinition::multi_select("symbols", "symbols").with_empty_sentinel(EMPTY_SENTINEL),
            FacetDefinition::range("cost", "cost", 0, 10)
                .with_null_sentinels()
                .with_variable_sentinels("cost_is_variable"),
            FacetDefinition::range("power", "power", 0, 15_000).with_null_sentinels(),
            FacetDefinition::range("level", "level", 0, 12),
        ])
    }

    #[must_use]
    pub fn facets(&self) -> &[FacetDefinition] {
        &self.facets
    }

    #[must_use]
    pub fn facet(&self, name: &str) -> Option<&FacetDefinition> {
        self.facets.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn facet_for_param(&self, key: &str) -> Option<&FacetDefinition> {
        self.facets.iter().find(|f| f.param_keys().contains(&key))
    }

    #[must_use]
    pub fn is_known_param(&self, key: &str) -> bool {
        key == SORT_BY_KEY || key == SORT_DIR_KEY || self.facet_for_param(key).is_some()
    }
}

impl Default for FacetRegistry {
    fn default() -> Self {
        Self::cards()
    }
}
