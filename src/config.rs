//! Construction-time settings for `ChainHashMap`.

use crate::error::{Result, TableError};

/// Smallest bucket count a table is ever created with.
pub const MIN_CAPACITY: usize = 3;

/// Bucket count used by `TableConfig::default()`.
pub const DEFAULT_CAPACITY: usize = 16;

/// Whether and when the bucket array grows.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum GrowthPolicy {
    /// Capacity never changes after creation.
    #[default]
    Fixed,
    /// Double the bucket count once `len / capacity` exceeds the threshold.
    MaxLoadFactor(f64),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableConfig {
    capacity: usize,
    growth: GrowthPolicy,
}

impl TableConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            growth: GrowthPolicy::Fixed,
        }
    }

    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// The bucket count as requested.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The bucket count a table built from this config will have.
    pub fn effective_capacity(&self) -> usize {
        self.capacity.max(MIN_CAPACITY)
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    pub fn validate(&self) -> Result<()> {
        if let GrowthPolicy::MaxLoadFactor(lf) = self.growth {
            if !lf.is_finite() || lf <= 0.0 {
                return Err(TableError::invalid_argument(format!(
                    "max load factor must be finite and positive, got {lf}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
