use serde::Serialize;

/// Batch sizing: small first batch for fast first paint, then geometric
/// growth up to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSizePolicy {
    pub initial: usize,
    pub growth: usize,
    pub max: usize,
}

impl Default for LoadSizePolicy {
    fn default() -> Self {
        Self {
            initial: 30,
            growth: 2,
            max: 120,
        }
    }
}

impl LoadSizePolicy {
    /// Size of the batch following `batches_taken` completed batches.
    #[must_use]
    pub fn batch_size(&self, batches_taken: usize) -> usize {
        let mut size = self.initial.max(1);
        for _ in 0..batches_taken {
            if size >= self.max {
                break;
            }
            size = size.saturating_mul(self.growth.max(1));
        }
        size.min(self.max).max(1)
    }

    /// Batch size while replaying towards a remembered count: never more than
    /// the distance left to the target.
    #[must_use]
    pub fn restore_batch_size(&self, batches_taken: usize, remaining: usize) -> usize {
        self.batch_size(batches_taken).min(remaining).max(1)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.initial == 0 || self.max == 0 {
            return Err("batch sizes must be > 0".to_string());
        }
        if self.growth == 0 {
            return Err("batch growth must be >= 1".to_string());
        }
        if self.initial > self.max {
            return Err("load policy requires initial <= max".to_string());
        }
        Ok(())
    }
}
