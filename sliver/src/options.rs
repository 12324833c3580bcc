use crate::Direction;

/// How unmeasured children are sized until they are realized and measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Estimate {
    /// Always use `estimate_size`.
    Fixed,
    /// Use the most recently measured child, or `estimate_size` before the first measurement.
    LastMeasured,
    /// Use the mean of all measured visible children, or `estimate_size` before the first
    /// measurement.
    #[default]
    Average,
}

/// Configuration for [`crate::Sliver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SliverOptions {
    pub direction: Direction,

    pub estimate: Estimate,

    /// Fallback main-axis size for unmeasured children. Treated as at least 1.
    pub estimate_size: u32,

    /// Look-ahead margin (on both sides of the viewport) within which children are realized
    /// before they become visible.
    pub cache_extent: u32,
}

impl Default for SliverOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Column,
            estimate: Estimate::Average,
            estimate_size: 50,
            cache_extent: 0,
        }
    }
}

impl SliverOptions {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_estimate(mut self, estimate: Estimate) -> Self {
        self.estimate = estimate;
        self
    }

    /// Clamped to at least 1.
    pub fn with_estimate_size(mut self, estimate_size: u32) -> Self {
        self.estimate_size = estimate_size.max(1);
        self
    }

    pub fn with_cache_extent(mut self, cache_extent: u32) -> Self {
        self.cache_extent = cache_extent;
        self
    }
}
