use cardex_model::{CanonicalKey, Card, CardId, Page};
use std::collections::HashSet;

/// Cards loaded so far for one filter state, in fetch order, unique by id.
#[derive(Debug, Clone, Default)]
pub struct LoadedCollection {
    key: CanonicalKey,
    items: Vec<Card>,
    seen: HashSet<CardId>,
    total: Option<u64>,
}

impl LoadedCollection {
    #[must_use]
    pub fn new(key: CanonicalKey) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    /// Appends cards not already present and records the reported total.
    /// Returns how many cards were added.
    pub fn merge(&mut self, page: Page) -> usize {
        let before = self.items.len();
        for card in page.items {
            if self.seen.insert(card.card_id.clone()) {
                self.items.push(card);
            }
        }
        self.total = Some(page.total);
        self.items.len() - before
    }

    pub fn mark_total_unknown(&mut self) {
        self.total = None;
    }

    #[must_use]
    pub fn key(&self) -> &CanonicalKey {
        &self.key
    }

    #[must_use]
    pub fn items(&self) -> &[Card] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reported total, or 0 while unknown.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.unwrap_or(0)
    }

    #[must_use]
    pub fn total_known(&self) -> bool {
        self.total.is_some()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|t| self.items.len() as u64 >= t)
    }

    #[must_use]
    pub fn position(&self, id: &CardId) -> Option<usize> {
        if !self.seen.contains(id) {
            return None;
        }
        self.items.iter().position(|c| &c.card_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::LoadedCollection;
    use cardex_model::{CanonicalKey, Card, Page};
    use serde_json::json;

    fn page(ids: &[&str], total: u64) -> Page {
        Page {
            items: ids
                .iter()
                .map(|id| Card::from_json(json!({ "card_id": id })).expect("card"))
                .collect(),
            total,
        }
    }

    #[test]
    fn merge_skips_duplicates_and_tracks_total() {
        let mut c = LoadedCollection::new(CanonicalKey::default());
        assert!(!c.total_known());
        assert_eq!(c.merge(page(&["a", "b"], 3)), 2);
        assert_eq!(c.merge(page(&["b", "c"], 3)), 1);
        assert_eq!(c.len(), 3);
        assert!(c.is_complete());
        c.mark_total_unknown();
        assert_eq!(c.total(), 0);
        assert!(!c.is_complete());
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn position_follows_merge_order() {
        let mut c = LoadedCollection::new(CanonicalKey::default());
        c.merge(page(&["a", "b"], 0));
        c.merge(page(&["c", "a"], 0));
        let id = |s: &str| cardex_model::CardId::parse(s).expect("id");
        assert_eq!(c.position(&id("c")), Some(2));
        assert_eq!(c.position(&id("a")), Some(0));
        assert_eq!(c.position(&id("z")), None);
    }
}
