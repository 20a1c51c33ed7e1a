use cardex_core::env::env_usize;
use serde::{Deserialize, Serialize};

pub const ENV_CARDEX_MAX_LIMIT: &str = "CARDEX_MAX_LIMIT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct QueryLimits {
    pub max_limit: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self { max_limit: 500 }
    }
}

impl QueryLimits {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_limit: env_usize(ENV_CARDEX_MAX_LIMIT, defaults.max_limit),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_limit == 0 {
            return Err("max_limit must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::QueryLimits;

    #[test]
    fn default_limits_are_valid() {
        assert!(QueryLimits::default().validate().is_ok());
        assert!(QueryLimits { max_limit: 0 }.validate().is_err());
    }
}
