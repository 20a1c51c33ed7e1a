use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Order-independent identity of a filter state.
///
/// Only the parameter normalizer builds these; the empty key means "no
/// active filters".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    #[must_use]
    pub fn from_canonical(text: String) -> Self {
        Self(text)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for CanonicalKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
