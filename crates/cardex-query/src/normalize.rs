//! Parameter normalizer: raw navigation parameters to a [`FilterState`] and
//! its order-independent [`CanonicalKey`].

use cardex_model::CanonicalKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PAGINATION_KEYS: [&str; 4] = ["offset", "limit", "page", "pageSize"];
pub const NAVIGATION_KEYS: [&str; 2] = ["from", "view"];

#[must_use]
pub fn is_filter_key(key: &str) -> bool {
    !PAGINATION_KEYS.contains(&key) && !NAVIGATION_KEYS.contains(&key)
}

/// Active filter parameters with pagination, navigation and blank entries
/// removed. Keys iterate in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState(BTreeMap<String, String>);

impl FilterState {
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut out = BTreeMap::new();
        for (key, value) in params {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();
            if key.is_empty() || value.is_empty() || !is_filter_key(key) {
                continue;
            }
            out.insert(key.to_string(), value.to_string());
        }
        Self(out)
    }

    /// Rebuilds a state from a canonical key string (inverse of
    /// [`FilterState::canonical_key`]).
    #[must_use]
    pub fn parse_canonical(text: &str) -> Self {
        Self::from_params(decode_pairs(text))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }

    pub(crate) fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), value);
    }

    #[must_use]
    pub fn canonical_key(&self) -> CanonicalKey {
        canonical_key_from_pairs(self.iter())
    }
}

/// Canonical key for an arbitrary pair list. Repeated keys are kept and
/// ordered by value, so multi-valued query strings key deterministically.
pub fn canonical_key_from_pairs<I, K, V>(pairs: I) -> CanonicalKey
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut kept: Vec<(String, String)> = pairs
        .into_iter()
        .filter_map(|(k, v)| {
            let key = k.as_ref().trim();
            let value = v.as_ref().trim();
            (!key.is_empty() && !value.is_empty() && is_filter_key(key))
                .then(|| (key.to_string(), value.to_string()))
        })
        .collect();
    kept.sort();
    kept.dedup();
    let encoded = kept
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&");
    CanonicalKey::from_canonical(encoded)
}

#[must_use]
pub fn normalize(params: &BTreeMap<String, String>) -> CanonicalKey {
    canonical_key_from_pairs(params.iter())
}

fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            _ => out.push(c),
        }
    }
    out
}

fn decode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        let decoded = match tail.get(..3) {
            Some("%25") => Some('%'),
            Some("%26") => Some('&'),
            Some(code) if code.eq_ignore_ascii_case("%3D") => Some('='),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_pairs(text: &str) -> Vec<(String, String)> {
    text.split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let (k, v) = part.split_once('=')?;
            Some((decode_component(k), decode_component(v)))
        })
        .collect()
}
