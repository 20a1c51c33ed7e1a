//! In-process [`DataSource`] that evaluates plans over a card vector.
//!
//! Semantics mirror the SQLite adapter: missing and `null` attributes are
//! absent, a scalar string in an array position counts as a one-element
//! array, numbers sort before text and nulls always sort last.

use crate::executor::{DataSource, ExecError};
use crate::planner::{Combinator, Condition, OrderTerm, Predicate, QueryPlan, SortDirection};
use crate::text::{fold_text, real_text};
use cardex_model::{Card, CardId, Page};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    cards: Vec<Card>,
    index: BTreeMap<CardId, usize>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut out = Self::default();
        for card in cards {
            out.upsert(card);
        }
        out
    }

    /// Replaces a card with the same id in place, otherwise appends.
    pub fn upsert(&mut self, card: Card) {
        match self.index.get(&card.card_id) {
            Some(&pos) => self.cards[pos] = card,
            None => {
                self.index.insert(card.card_id.clone(), self.cards.len());
                self.cards.push(card);
            }
        }
    }

    pub fn absorb(&mut self, page: &Page) {
        for card in &page.items {
            self.upsert(card.clone());
        }
    }

    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&Card> {
        self.index.get(id).map(|&pos| &self.cards[pos])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// All matching cards in plan order, ignoring the window.
    #[must_use]
    pub fn select(&self, plan: &QueryPlan) -> Vec<&Card> {
        let mut hits: Vec<&Card> = self
            .cards
            .iter()
            .filter(|card| plan.predicates.iter().all(|p| predicate_matches(card, p)))
            .collect();
        hits.sort_by(|a, b| compare_cards(a, b, &plan.order));
        hits
    }
}

impl DataSource for MemoryCatalog {
    fn execute(&self, plan: &QueryPlan) -> Result<Page, ExecError> {
        let hits = self.select(plan);
        let total = hits.len() as u64;
        let items = hits
            .into_iter()
            .skip(plan.window.offset)
            .take(plan.window.limit)
            .cloned()
            .collect();
        Ok(Page { items, total })
    }
}

#[must_use]
pub fn predicate_matches(card: &Card, predicate: &Predicate) -> bool {
    let mut results = predicate
        .conditions
        .iter()
        .map(|c| condition_matches(card, c));
    match predicate.combinator {
        Combinator::And => results.all(|hit| hit),
        Combinator::Or => results.any(|hit| hit),
    }
}

/// Matches what `json_extract` hands the SQLite fold function: booleans
/// arrive as integers and reals as doubles.
fn text_of(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => fold_text(s),
        Some(Value::Bool(b)) => u8::from(*b).to_string(),
        Some(Value::Number(n)) if n.is_f64() => n.as_f64().map(real_text).unwrap_or_default(),
        Some(other) => fold_text(&other.to_string()),
    }
}

fn array_items(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).collect(),
        Some(scalar) => vec![scalar],
    }
}

#[must_use]
pub fn condition_matches(card: &Card, condition: &Condition) -> bool {
    let value = card.attribute(condition.field());
    match condition {
        Condition::TextContains { needle, .. } => text_of(value).contains(needle.as_str()),
        Condition::TextNotContains { needle, .. } => !text_of(value).contains(needle.as_str()),
        Condition::ArrayContains { value: wanted, .. } => array_items(value)
            .iter()
            .any(|v| v.as_str() == Some(wanted.as_str())),
        Condition::ArrayNotContains { value: wanted, .. } => !array_items(value)
            .iter()
            .any(|v| v.as_str() == Some(wanted.as_str())),
        Condition::ArrayEmpty { .. } => array_items(value).is_empty(),
        Condition::ArrayNotEmpty { .. } => !array_items(value).is_empty(),
        Condition::NumberRange { min, max, .. } => {
            let Some(n) = value.and_then(Value::as_f64) else {
                return false;
            };
            min.map_or(true, |lo| n >= lo as f64) && max.map_or(true, |hi| n <= hi as f64)
        }
        Condition::IsNull { .. } => value.is_none(),
        Condition::IsTrue { .. } => match value {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64() == Some(1.0),
            _ => false,
        },
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey<'a> {
    Num(f64),
    Text(Cow<'a, str>),
}

fn sort_key<'a>(card: &'a Card, field: &str) -> Option<SortKey<'a>> {
    if field == "card_id" {
        return Some(SortKey::Text(Cow::Borrowed(card.card_id.as_str())));
    }
    match card.attribute(field)? {
        Value::Number(n) => n.as_f64().map(SortKey::Num),
        Value::Bool(b) => Some(SortKey::Num(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => Some(SortKey::Text(Cow::Borrowed(s.as_str()))),
        other => Some(SortKey::Text(Cow::Owned(other.to_string()))),
    }
}

fn compare_term(a: &Card, b: &Card, term: &OrderTerm) -> Ordering {
    match (sort_key(a, &term.field), sort_key(b, &term.field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            match term.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

fn compare_cards(a: &Card, b: &Card, order: &[OrderTerm]) -> Ordering {
    order
        .iter()
        .map(|term| compare_term(a, b, term))
        .find(|ord| ord.is_ne())
        .unwrap_or_else(|| a.card_id.cmp(&b.card_id))
}
