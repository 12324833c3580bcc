use sliver::{Direction, Estimate, SliverOptions};

/// How text nodes directly inside a sliver contribute to its extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextExtent {
    /// Text children keep their position but take no space.
    #[default]
    Zero,
    /// Non-empty text children are sized by the oracle's inline box.
    InlineBox,
}

/// Engine-wide settings applied to every sliver container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub text_extent: TextExtent,
    /// Look-ahead margin realized on both sides of the viewport.
    pub cache_extent: u32,
    pub estimate: Estimate,
    /// Size assumed for children before anything has been measured. Treated as at least 1.
    pub estimate_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let options = SliverOptions::default();
        Self {
            text_extent: TextExtent::default(),
            cache_extent: options.cache_extent,
            estimate: options.estimate,
            estimate_size: options.estimate_size,
        }
    }
}

impl EngineConfig {
    pub fn with_text_extent(mut self, text_extent: TextExtent) -> Self {
        self.text_extent = text_extent;
        self
    }

    pub fn with_cache_extent(mut self, cache_extent: u32) -> Self {
        self.cache_extent = cache_extent;
        self
    }

    pub fn with_estimate(mut self, estimate: Estimate) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn with_estimate_size(mut self, estimate_size: u32) -> Self {
        self.estimate_size = estimate_size.max(1);
        self
    }

    /// Options for a new sliver container scrolling along `direction`.
    pub fn sliver_options(&self, direction: Direction) -> SliverOptions {
        SliverOptions::new(direction)
            .with_estimate(self.estimate)
            .with_estimate_size(self.estimate_size)
            .with_cache_extent(self.cache_extent)
    }
}
