// SPDX-License-Identifier: Apache-2.0

//! Query plan shapes produced by the facet compiler.
//!
//! A plan is pure data: predicates are ANDed at the top level, and each
//! predicate joins its own conditions with its combinator. Executors must
//! apply the same predicate list to both the item window and the total count.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Case-insensitive substring match; `needle` is already folded.
    TextContains { field: String, needle: String },
    TextNotContains { field: String, needle: String },
    ArrayContains { field: String, value: String },
    ArrayNotContains { field: String, value: String },
    ArrayEmpty { field: String },
    ArrayNotEmpty { field: String },
    /// Inclusive numeric bounds; a missing side is unbounded.
    NumberRange {
        field: String,
        min: Option<i64>,
        max: Option<i64>,
    },
    IsNull { field: String },
    IsTrue { field: String },
}

impl Condition {
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::TextContains { field, .. }
            | Self::TextNotContains { field, .. }
            | Self::ArrayContains { field, .. }
            | Self::ArrayNotContains { field, .. }
            | Self::ArrayEmpty { field }
            | Self::ArrayNotEmpty { field }
            | Self::NumberRange { field, .. }
            | Self::IsNull { field }
            | Self::IsTrue { field } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Predicate {
    pub facet: String,
    pub combinator: Combinator,
    pub conditions: Vec<Condition>,
}

impl Predicate {
    #[must_use]
    pub fn single(facet: &str, condition: Condition) -> Self {
        Self {
            facet: facet.to_string(),
            combinator: Combinator::And,
            conditions: vec![condition],
        }
    }

    /// Joins `conditions` with `combinator`, collapsing to `And` for a single
    /// condition so equivalent predicates compare equal.
    #[must_use]
    pub fn group(facet: &str, combinator: Combinator, conditions: Vec<Condition>) -> Self {
        let combinator = if conditions.len() > 1 {
            combinator
        } else {
            Combinator::And
        };
        Self {
            facet: facet.to_string(),
            combinator,
            conditions,
        }
    }

    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for condition in &self.conditions {
            let field = condition.field();
            if !out.contains(&field) {
                out.push(field);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderTerm {
    pub field: String,
    pub direction: SortDirection,
    pub nulls: NullOrder,
}

impl OrderTerm {
    #[must_use]
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
            nulls: NullOrder::Last,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    #[must_use]
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryPlan {
    pub predicates: Vec<Predicate>,
    pub order: Vec<OrderTerm>,
    pub window: PageWindow,
}

impl QueryPlan {
    /// Same predicates and ordering over a different page window.
    #[must_use]
    pub fn with_window(&self, window: PageWindow) -> Self {
        Self {
            predicates: self.predicates.clone(),
            order: self.order.clone(),
            window,
        }
    }

    #[must_use]
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for field in self.predicates.iter().flat_map(Predicate::fields) {
            if !out.contains(&field) {
                out.push(field);
            }
        }
        out
    }
}
