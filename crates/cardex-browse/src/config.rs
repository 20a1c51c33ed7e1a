use crate::debounce::{SCROLL_SETTLE_DEBOUNCE, TEXT_INPUT_DEBOUNCE};
use crate::load_policy::LoadSizePolicy;
use cardex_core::env::{env_duration_ms, env_usize};
use cardex_query::QueryLimits;
use serde::Serialize;
use std::time::Duration;

pub const ENV_CARDEX_FIRST_BATCH: &str = "CARDEX_FIRST_BATCH";
pub const ENV_CARDEX_MAX_BATCH: &str = "CARDEX_MAX_BATCH";
pub const ENV_CARDEX_MAX_BATCHES: &str = "CARDEX_MAX_BATCHES";
pub const ENV_CARDEX_PROXIMITY_ROWS: &str = "CARDEX_PROXIMITY_ROWS";
pub const ENV_CARDEX_TEXT_DEBOUNCE_MS: &str = "CARDEX_TEXT_DEBOUNCE_MS";
pub const ENV_CARDEX_SCROLL_SETTLE_MS: &str = "CARDEX_SCROLL_SETTLE_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseConfig {
    pub load_policy: LoadSizePolicy,
    /// Batches allowed per filter state before loading stops.
    pub max_batches: usize,
    /// Rows from the end of the loaded list that trigger the next batch.
    pub proximity_rows: usize,
    pub text_debounce: Duration,
    pub scroll_settle: Duration,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            load_policy: LoadSizePolicy::default(),
            max_batches: 200,
            proximity_rows: 12,
            text_debounce: TEXT_INPUT_DEBOUNCE,
            scroll_settle: SCROLL_SETTLE_DEBOUNCE,
        }
    }
}

impl BrowseConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            load_policy: LoadSizePolicy {
                initial: env_usize(ENV_CARDEX_FIRST_BATCH, d.load_policy.initial),
                max: env_usize(ENV_CARDEX_MAX_BATCH, d.load_policy.max),
                ..d.load_policy
            },
            max_batches: env_usize(ENV_CARDEX_MAX_BATCHES, d.max_batches),
            proximity_rows: env_usize(ENV_CARDEX_PROXIMITY_ROWS, d.proximity_rows),
            text_debounce: env_duration_ms(ENV_CARDEX_TEXT_DEBOUNCE_MS, d.text_debounce),
            scroll_settle: env_duration_ms(ENV_CARDEX_SCROLL_SETTLE_MS, d.scroll_settle),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.load_policy.validate()?;
        if self.max_batches == 0 {
            return Err("max_batches must be > 0".to_string());
        }
        if self.text_debounce.is_zero() || self.scroll_settle.is_zero() {
            return Err("debounce delays must be > 0".to_string());
        }
        Ok(())
    }

    /// Validates against the source's window limit as well: a policy that
    /// grows past `max_limit` would eventually request a rejected window.
    pub fn validate_for(&self, limits: &QueryLimits) -> Result<(), String> {
        self.validate()?;
        if self.load_policy.max > limits.max_limit {
            return Err(format!(
                "max batch size {} exceeds max_limit {}",
                self.load_policy.max, limits.max_limit
            ));
        }
        Ok(())
    }
}
