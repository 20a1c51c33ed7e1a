// SPDX-License-Identifier: Apache-2.0

//! Scroll position persistence keyed by canonical filter key.
//!
//! A record is written on scroll-settle and right before navigating to a
//! detail view, and consumed exactly once when the same key is re-entered.

use crate::session::{SessionError, SessionStore};
use cardex_core::canonical::short_digest;
use cardex_model::{CanonicalKey, CardId, ScrollRestoreRecord};
use serde::Serialize;
use tracing::{debug, warn};

pub const SESSION_KEY_PREFIX: &str = "cardex.scroll.";
const SESSION_DIGEST_LEN: usize = 16;

/// A rendered list row, positioned relative to the viewport top.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNode {
    pub card_id: CardId,
    pub top: f64,
    pub height: f64,
}

/// Rendered-node collaborator (the list's layout).
pub trait RenderedNodes {
    fn nodes(&self) -> Vec<RenderedNode>;
}

impl RenderedNodes for Vec<RenderedNode> {
    fn nodes(&self) -> Vec<RenderedNode> {
        self.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_offset: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Restoration {
    /// Anchor found; offset adjusted so it sits where it was.
    Anchored { scroll_offset: f64 },
    /// Anchor missing; the remembered raw offset is used.
    RawOffset { scroll_offset: f64 },
}

impl Restoration {
    #[must_use]
    pub const fn scroll_offset(self) -> f64 {
        match self {
            Self::Anchored { scroll_offset } | Self::RawOffset { scroll_offset } => scroll_offset,
        }
    }
}

#[must_use]
pub fn session_key(key: &CanonicalKey) -> String {
    format!(
        "{SESSION_KEY_PREFIX}{}",
        short_digest(key.as_str(), SESSION_DIGEST_LEN)
    )
}

/// First node whose box intersects the viewport.
#[must_use]
pub fn find_anchor(nodes: &[RenderedNode], viewport_height: f64) -> Option<&RenderedNode> {
    nodes
        .iter()
        .filter(|n| n.top + n.height > 0.0 && n.top < viewport_height)
        .min_by(|a, b| a.top.total_cmp(&b.top))
}

#[must_use]
pub fn capture(
    key: &CanonicalKey,
    viewport: Viewport,
    loaded_count: usize,
    nodes: &[RenderedNode],
) -> ScrollRestoreRecord {
    let anchor = find_anchor(nodes, viewport.height);
    ScrollRestoreRecord {
        canonical_key: key.clone(),
        scroll_offset: viewport.scroll_offset,
        loaded_count,
        anchor_card_id: anchor.map(|n| n.card_id.clone()),
        anchor_pixel_offset: anchor.map_or(0.0, |n| n.top),
    }
}

/// Scroll offset that puts the remembered anchor back at its pixel offset.
/// `current_scroll` is the offset the node tops were measured at.
#[must_use]
pub fn restore_offset(
    record: &ScrollRestoreRecord,
    current_scroll: f64,
    nodes: &[RenderedNode],
) -> Restoration {
    let anchor = record
        .anchor_card_id
        .as_ref()
        .and_then(|id| nodes.iter().find(|n| &n.card_id == id));
    match anchor {
        Some(node) => Restoration::Anchored {
            scroll_offset: (current_scroll + (node.top - record.anchor_pixel_offset)).max(0.0),
        },
        None => Restoration::RawOffset {
            scroll_offset: record.scroll_offset,
        },
    }
}

pub struct ScrollPersistor<S> {
    store: S,
    suspended: bool,
}

impl<S: SessionStore> ScrollPersistor<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            suspended: false,
        }
    }

    /// Stops writes while a restoration is replaying batches.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Returns `false` when suspended and nothing was written.
    pub fn persist(&mut self, record: &ScrollRestoreRecord) -> Result<bool, SessionError> {
        if self.suspended {
            return Ok(false);
        }
        let value = serde_json::to_value(record).map_err(|e| SessionError(e.to_string()))?;
        self.store.put(&session_key(&record.canonical_key), value)?;
        debug!(
            key = %record.canonical_key,
            loaded = record.loaded_count,
            offset = record.scroll_offset,
            "scroll position saved"
        );
        Ok(true)
    }

    /// Removes and returns the record for `key`. A record that fails to
    /// decode or belongs to another key is discarded.
    pub fn take(
        &mut self,
        key: &CanonicalKey,
    ) -> Result<Option<ScrollRestoreRecord>, SessionError> {
        let slot = session_key(key);
        let Some(value) = self.store.get(&slot)? else {
            return Ok(None);
        };
        self.store.remove(&slot)?;
        match serde_json::from_value::<ScrollRestoreRecord>(value) {
            Ok(record) if record.canonical_key == *key => Ok(Some(record)),
            Ok(record) => {
                warn!(stored = %record.canonical_key, wanted = %key, "scroll record key mismatch");
                Ok(None)
            }
            Err(err) => {
                warn!(error = %err, "scroll record discarded");
                Ok(None)
            }
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::{capture, find_anchor, restore_offset, RenderedNode, Restoration, Viewport};
    use cardex_model::{CanonicalKey, CardId};

    fn node(id: &str, top: f64) -> RenderedNode {
        RenderedNode {
            card_id: CardId::parse(id).expect("id"),
            top,
            height: 100.0,
        }
    }

    #[test]
    fn anchor_is_first_intersecting_node() {
        let nodes = vec![node("a", -150.0), node("b", -40.0), node("c", 60.0)];
        assert_eq!(
            find_anchor(&nodes, 600.0).map(|n| n.card_id.as_str()),
            Some("b")
        );
        assert!(find_anchor(&[node("z", 700.0)], 600.0).is_none());
    }

    #[test]
    fn anchored_restore_compensates_layout_shift() {
        let key = CanonicalKey::default();
        let nodes = vec![node("b", -40.0), node("c", 60.0)];
        let record = capture(
            &key,
            Viewport {
                scroll_offset: 2440.0,
                height: 600.0,
            },
            90,
            &nodes,
        );
        assert_eq!(record.anchor_pixel_offset, -40.0);

        let after = vec![node("b", 2460.0)];
        assert_eq!(
            restore_offset(&record, 0.0, &after),
            Restoration::Anchored {
                scroll_offset: 2500.0
            }
        );
        assert_eq!(
            restore_offset(&record, 0.0, &[]),
            Restoration::RawOffset {
                scroll_offset: 2440.0
            }
        );
    }
}
