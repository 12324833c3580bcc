use alloc::vec::Vec;

use crate::extent::Extent;
use crate::scroll::ScrollController;
use crate::{
    Align, Direction, Estimate, FrameState, LayoutWindow, Rect, ScrollDirection, ScrollState,
    SliverOptions, SlotRange, ViewportState, WindowChange, WindowEntry,
};

/// A headless sliver: an ordered list of children laid out along one axis, of which only the
/// ones intersecting the viewport (plus `cache_extent`) are realized and measured.
///
/// This type holds no UI objects. The embedder:
/// - mirrors child insertions/removals/visibility with [`Self::insert`], [`Self::remove`] and
///   [`Self::set_hidden`],
/// - provides the viewport size with [`Self::set_viewport`],
/// - drives layout with a measure callback (`FnMut(index, &key) -> Option<Rect>`), which is
///   only called for unmeasured children inside the window. Returning `None` means the child
///   has no box and contributes nothing.
///
/// Every mutation leaves the window stale until the next [`Self::layout`] (or scroll call),
/// which re-clamps the offset and recomputes the window.
#[derive(Clone, Debug)]
pub struct Sliver<K> {
    options: SliverOptions,
    viewport: Rect,
    keys: Vec<K>,
    extent: Extent,
    scroll: ScrollController,
    window: LayoutWindow<K>,
    needs_layout: bool,
}

impl<K: Clone + PartialEq> Sliver<K> {
    pub fn new(mut options: SliverOptions) -> Self {
        options.estimate_size = options.estimate_size.max(1);
        slog!(debug,
            direction = ?options.direction,
            estimate = ?options.estimate,
            estimate_size = options.estimate_size,
            cache_extent = options.cache_extent,
            "Sliver::new"
        );
        Self {
            extent: Extent::new(options.estimate, options.estimate_size),
            options,
            viewport: Rect::default(),
            keys: Vec::new(),
            scroll: ScrollController::default(),
            window: LayoutWindow::default(),
            needs_layout: true,
        }
    }

    /// Creates a sliver pre-populated with `keys` (all visible, all unmeasured).
    pub fn with_children(options: SliverOptions, keys: impl IntoIterator<Item = K>) -> Self {
        let mut sliver = Self::new(options);
        for key in keys {
            sliver.push(key, false);
        }
        sliver
    }

    pub fn options(&self) -> &SliverOptions {
        &self.options
    }

    pub fn direction(&self) -> Direction {
        self.options.direction
    }

    /// Switches the main axis. All measurements are dropped and the offset returns to 0,
    /// since every cached size refers to the old axis.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.options.direction == direction {
            return;
        }
        slog!(debug, ?direction, "Sliver::set_direction");
        self.options.direction = direction;
        self.extent.invalidate_all();
        self.scroll.reset();
        self.needs_layout = true;
    }

    /// Changes the estimate used for unmeasured children. Measured sizes are kept;
    /// `estimate_size` is clamped to at least 1.
    pub fn set_estimate(&mut self, estimate: Estimate, estimate_size: u32) {
        let estimate_size = estimate_size.max(1);
        self.options.estimate = estimate;
        self.options.estimate_size = estimate_size;
        self.extent.set_estimate(estimate, estimate_size);
        self.needs_layout = true;
    }

    pub fn set_cache_extent(&mut self, cache_extent: u32) {
        if self.options.cache_extent == cache_extent {
            return;
        }
        self.options.cache_extent = cache_extent;
        self.needs_layout = true;
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn key(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Whether a mutation happened since the last layout.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    pub fn push(&mut self, key: K, hidden: bool) {
        let index = self.keys.len();
        self.insert(index, key, hidden);
    }

    /// Inserts a child slot at `index` (clamped to `len()`). The new child is unmeasured and
    /// sized by the current estimate until it is realized.
    pub fn insert(&mut self, index: usize, key: K, hidden: bool) {
        let index = index.min(self.keys.len());
        slog!(trace, index, hidden, "Sliver::insert");
        self.keys.insert(index, key);
        self.extent.insert(index, hidden);
        self.needs_layout = true;
    }

    pub fn remove(&mut self, index: usize) -> Option<K> {
        if index >= self.keys.len() {
            slog!(warn, index, len = self.keys.len(), "Sliver::remove: out of bounds");
            return None;
        }
        slog!(trace, index, "Sliver::remove");
        self.extent.remove(index);
        self.needs_layout = true;
        Some(self.keys.remove(index))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.extent.clear();
        self.needs_layout = true;
    }

    /// Hides or shows a child. Hidden children keep their slot (and any measurement) but
    /// contribute nothing to the extent and are never realized.
    pub fn set_hidden(&mut self, index: usize, hidden: bool) -> bool {
        let changed = self.extent.set_hidden(index, hidden);
        if changed {
            slog!(trace, index, hidden, "Sliver::set_hidden");
            self.needs_layout = true;
        }
        changed
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.extent.is_hidden(index)
    }

    /// Drops the cached measurement of one child; it is re-measured when next realized.
    pub fn invalidate(&mut self, index: usize) -> bool {
        let changed = self.extent.invalidate(index);
        if changed {
            slog!(trace, index, "Sliver::invalidate");
            self.needs_layout = true;
        }
        changed
    }

    pub fn invalidate_all(&mut self) {
        self.extent.invalidate_all();
        self.needs_layout = true;
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.extent.is_measured(index)
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) -> bool {
        if self.viewport == viewport {
            return false;
        }
        self.viewport = viewport;
        self.needs_layout = true;
        true
    }

    /// Total scrollable extent along the main axis (measured sizes plus estimates).
    pub fn total_extent(&self) -> u64 {
        self.extent.total()
    }

    /// The size currently assumed for unmeasured children.
    pub fn estimated_size(&self) -> u32 {
        self.extent.basis()
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll.offset()
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll.direction()
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.extent
            .total()
            .saturating_sub(self.viewport.main as u64)
    }

    /// Scrolls relative to the current offset (clamped), then re-windows.
    pub fn scroll_by(
        &mut self,
        delta: i64,
        measure: impl FnMut(usize, &K) -> Option<Rect>,
    ) -> WindowChange<K> {
        let max = self.max_scroll_offset();
        if self.scroll.scroll_by(delta, max) {
            slog!(trace, delta, offset = self.scroll.offset(), "Sliver::scroll_by");
            self.needs_layout = true;
        }
        self.layout(measure)
    }

    /// Scrolls to an absolute offset (clamped), then re-windows.
    pub fn scroll_to(
        &mut self,
        offset: i64,
        measure: impl FnMut(usize, &K) -> Option<Rect>,
    ) -> WindowChange<K> {
        let max = self.max_scroll_offset();
        if self.scroll.scroll_to(offset, max) {
            slog!(trace, offset = self.scroll.offset(), "Sliver::scroll_to");
            self.needs_layout = true;
        }
        self.layout(measure)
    }

    /// Computes the offset that brings `index` into view with the given alignment, based on
    /// current (possibly estimated) sizes. The result is clamped.
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        if self.keys.is_empty() {
            return 0;
        }
        let index = index.min(self.keys.len() - 1);
        let start = self.extent.start_of(index);
        let size = self.extent.size_of(index) as u64;
        let end = start.saturating_add(size);
        let view = self.viewport.main as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => start.saturating_add(size / 2).saturating_sub(view / 2),
            Align::Auto => {
                let cur = self.scroll.offset();
                let cur_end = cur.saturating_add(view);
                if start >= cur && end <= cur_end {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        target.min(self.max_scroll_offset())
    }

    pub fn scroll_to_index(
        &mut self,
        index: usize,
        align: Align,
        measure: impl FnMut(usize, &K) -> Option<Rect>,
    ) -> WindowChange<K> {
        let offset = self.scroll_to_index_offset(index, align);
        self.scroll_to(offset.min(i64::MAX as u64) as i64, measure)
    }

    /// Main-axis offset of a child, in content coordinates.
    pub fn item_start(&self, index: usize) -> Option<u64> {
        (index < self.keys.len()).then(|| self.extent.start_of(index))
    }

    /// Effective main-axis size of a child (0 when hidden, the estimate when unmeasured).
    pub fn item_size(&self, index: usize) -> Option<u32> {
        (index < self.keys.len()).then(|| self.extent.size_of(index))
    }

    /// The window produced by the most recent layout.
    pub fn window(&self) -> &LayoutWindow<K> {
        &self.window
    }

    /// Hit-tests the current window at a viewport-local point, without re-windowing.
    pub fn hit_test(&self, main: u64, cross: u64) -> Option<&WindowEntry<K>> {
        self.window.hit_test(main, cross)
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.state()
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: ViewportState {
                rect: self.viewport,
            },
            scroll: self.scroll.state(),
        }
    }

    /// Restores viewport and offset from a snapshot, then re-windows.
    pub fn restore_frame_state(
        &mut self,
        frame: FrameState,
        measure: impl FnMut(usize, &K) -> Option<Rect>,
    ) -> WindowChange<K> {
        self.set_viewport(frame.viewport.rect);
        let offset = frame.scroll.offset.min(i64::MAX as u64) as i64;
        self.scroll_to(offset, measure)
    }

    /// Forgets the offset and every measurement, keeping the child slots.
    pub fn reset(&mut self) {
        slog!(debug, len = self.keys.len(), "Sliver::reset");
        self.scroll.reset();
        self.extent.invalidate_all();
        self.window = LayoutWindow::default();
        self.needs_layout = true;
    }

    /// Recomputes the layout window.
    ///
    /// Unmeasured children that intersect the window are measured; since that can change the
    /// extent (and therefore the clamp bound and which children intersect), the pass repeats
    /// until no new child needs measuring. Each repetition measures at least one more child,
    /// so this terminates.
    pub fn layout(
        &mut self,
        mut measure: impl FnMut(usize, &K) -> Option<Rect>,
    ) -> WindowChange<K> {
        self.extent.refresh();

        loop {
            self.scroll.clamp(self.max_scroll_offset());
            let range = self.realized_range();
            let mut measured = 0usize;
            for index in range.start_index..range.end_index {
                if !self.extent.needs_measure(index) {
                    continue;
                }
                let size = measure(index, &self.keys[index]).unwrap_or_default();
                self.extent.measure(index, size);
                measured += 1;
            }
            if measured == 0 {
                break;
            }
            slog!(trace, measured, "Sliver::layout: measured");
        }

        self.rebuild_window()
    }

    /// The contiguous index range intersecting `[offset - cache, offset + view + cache)`.
    pub fn realized_range(&self) -> SlotRange {
        let len = self.keys.len();
        let view = self.viewport.main as u64;
        if len == 0 || view == 0 {
            return SlotRange::default();
        }

        let margin = self.options.cache_extent as u64;
        let offset = self.scroll.offset();
        let lo = offset.saturating_sub(margin);
        let hi = offset.saturating_add(view).saturating_add(margin);

        let start = self.extent.index_at_offset(lo);
        if start >= len {
            return SlotRange {
                start_index: len,
                end_index: len,
            };
        }
        let end = self
            .extent
            .index_at_offset(hi.saturating_sub(1))
            .saturating_add(1)
            .min(len);

        SlotRange {
            start_index: start,
            end_index: end.max(start),
        }
    }

    fn rebuild_window(&mut self) -> WindowChange<K> {
        let range = self.realized_range();
        let mut entries = Vec::with_capacity(range.len());
        let mut offset = self.extent.start_of(range.start_index);
        for index in range.start_index..range.end_index {
            let size = self.extent.size_of(index);
            if size > 0 {
                entries.push(WindowEntry {
                    key: self.keys[index].clone(),
                    index,
                    offset,
                    size,
                    cross: self.extent.cross_of(index),
                });
            }
            offset = offset.saturating_add(size as u64);
        }

        let next = LayoutWindow {
            entries,
            scroll_offset: self.scroll.offset(),
            viewport: self.viewport,
            extent: self.extent.total(),
        };
        let prev = core::mem::replace(&mut self.window, next);
        self.needs_layout = false;

        let change = WindowChange::between(&prev, &self.window);
        slog!(trace,
            start = range.start_index,
            end = range.end_index,
            realized = self.window.len(),
            entered = change.entered.len(),
            exited = change.exited.len(),
            "Sliver::layout"
        );
        change
    }
}
