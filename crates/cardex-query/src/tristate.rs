use crate::registry::TriStateFacet;
use crate::text::split_list;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    Neutral,
    Include,
    Exclude,
}

impl TriState {
    /// neutral -> include -> exclude -> neutral
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Neutral => Self::Include,
            Self::Include => Self::Exclude,
            Self::Exclude => Self::Neutral,
        }
    }
}

/// Include and exclude member lists of a tri-state facet, made disjoint.
/// A member listed on both sides counts as included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TriStateMembers {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl TriStateMembers {
    #[must_use]
    pub fn read(facet: &TriStateFacet, get: impl Fn(&str) -> Option<String>) -> Self {
        let include = get(&facet.include_key)
            .map(|raw| split_list(&raw))
            .unwrap_or_default();
        let exclude = get(&facet.exclude_key)
            .map(|raw| split_list(&raw))
            .unwrap_or_default()
            .into_iter()
            .filter(|m| !include.contains(m))
            .collect();
        Self { include, exclude }
    }

    #[must_use]
    pub fn from_params(facet: &TriStateFacet, params: &BTreeMap<String, String>) -> Self {
        Self::read(facet, |k| params.get(k).cloned())
    }

    #[must_use]
    pub fn state_of(&self, member: &str) -> TriState {
        if self.include.iter().any(|m| m == member) {
            TriState::Include
        } else if self.exclude.iter().any(|m| m == member) {
            TriState::Exclude
        } else {
            TriState::Neutral
        }
    }

    pub fn set_state(&mut self, member: &str, state: TriState) {
        self.include.retain(|m| m != member);
        self.exclude.retain(|m| m != member);
        match state {
            TriState::Include => self.include.push(member.to_string()),
            TriState::Exclude => self.exclude.push(member.to_string()),
            TriState::Neutral => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TriState, TriStateMembers};

    #[test]
    fn cycle_returns_to_neutral_after_three_steps() {
        let mut s = TriState::Neutral;
        for expected in [TriState::Include, TriState::Exclude, TriState::Neutral] {
            s = s.next();
            assert_eq!(s, expected);
        }
    }

    #[test]
    fn member_in_both_lists_counts_as_included() {
        let facet = crate::registry::TriStateFacet {
            include_key: "keywords_inc".to_string(),
            exclude_key: "keywords_exc".to_string(),
            field: "keywords".to_string(),
        };
        let members = TriStateMembers::read(&facet, |k| match k {
            "keywords_inc" => Some("flying".to_string()),
            "keywords_exc" => Some("flying, haste".to_string()),
            _ => None,
        });
        assert_eq!(members.state_of("flying"), TriState::Include);
        assert_eq!(members.state_of("haste"), TriState::Exclude);
        assert_eq!(members.state_of("reach"), TriState::Neutral);
        assert_eq!(members.exclude, vec!["haste".to_string()]);
    }
}
