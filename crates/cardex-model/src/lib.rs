#![forbid(unsafe_code)]
//! Cardex model SSOT: the record, page and restore-record shapes shared by
//! the query and browse crates.

mod card;
mod key;
mod restore;

pub use card::{Card, CardId, Page, ValidationError, ID_MAX_LEN};
pub use key::CanonicalKey;
pub use restore::ScrollRestoreRecord;

pub const CRATE_NAME: &str = "cardex-model";
