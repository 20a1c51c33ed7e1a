use crate::{CanonicalKey, CardId};
use serde::{Deserialize, Serialize};

/// Snapshot of the list viewport taken before leaving for a detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrollRestoreRecord {
    pub canonical_key: CanonicalKey,
    pub scroll_offset: f64,
    pub loaded_count: usize,
    #[serde(default)]
    pub anchor_card_id: Option<CardId>,
    #[serde(default)]
    pub anchor_pixel_offset: f64,
}
