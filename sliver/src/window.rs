use alloc::vec::Vec;

use crate::{Rect, WindowChange};

/// A realized child: its identity, logical index and main-axis placement.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowEntry<K> {
    pub key: K,
    /// Logical index among all children of the sliver (hidden ones included).
    pub index: usize,
    /// Start offset along the main axis, in content coordinates.
    pub offset: u64,
    /// Size along the main axis.
    pub size: u32,
    /// Size along the cross axis.
    pub cross: u32,
}

impl<K> WindowEntry<K> {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size as u64)
    }
}

/// The ordered set of children realized for the current scroll offset.
///
/// This is the only input a paint pass needs: entries are sorted by offset, never overlap and
/// leave no gaps between consecutive visible children.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutWindow<K> {
    pub(crate) entries: Vec<WindowEntry<K>>,
    pub(crate) scroll_offset: u64,
    pub(crate) viewport: Rect,
    pub(crate) extent: u64,
}

impl<K> Default for LayoutWindow<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            scroll_offset: 0,
            viewport: Rect::default(),
            extent: 0,
        }
    }
}

impl<K> LayoutWindow<K> {
    pub fn entries(&self) -> &[WindowEntry<K>] {
        &self.entries
    }

    pub fn iter(&self) -> core::slice::Iter<'_, WindowEntry<K>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The scroll offset this window was computed for.
    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Total extent at the time the window was computed.
    pub fn extent(&self) -> u64 {
        self.extent
    }

    /// Position of an entry relative to the viewport's leading edge (negative when it starts
    /// above/left of the viewport).
    pub fn viewport_offset(&self, entry: &WindowEntry<K>) -> i64 {
        entry.offset as i64 - self.scroll_offset as i64
    }

    /// Fraction of the entry's main-axis interval that lies inside the viewport.
    pub fn intersection_ratio(&self, entry: &WindowEntry<K>) -> f32 {
        if entry.size == 0 {
            return 0.0;
        }
        let view_start = self.scroll_offset;
        let view_end = view_start.saturating_add(self.viewport.main as u64);
        let start = entry.offset.max(view_start);
        let end = entry.end().min(view_end);
        if end <= start {
            return 0.0;
        }
        ((end - start) as f32 / entry.size as f32).clamp(0.0, 1.0)
    }

    /// Finds the entry under a viewport-local point (`main` along the scroll axis, `cross`
    /// across it). Points outside the viewport hit nothing.
    pub fn hit_test(&self, main: u64, cross: u64) -> Option<&WindowEntry<K>> {
        if main >= self.viewport.main as u64 || cross >= self.viewport.cross as u64 {
            return None;
        }
        let target = self.scroll_offset.saturating_add(main);
        let pos = self.entries.partition_point(|e| e.end() <= target);
        let entry = self.entries.get(pos)?;
        (entry.offset <= target && cross < entry.cross as u64).then_some(entry)
    }
}

impl<K: PartialEq> LayoutWindow<K> {
    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|e| &e.key == key)
    }

    pub fn get(&self, key: &K) -> Option<&WindowEntry<K>> {
        self.entries.iter().find(|e| &e.key == key)
    }
}

impl<K: Clone + PartialEq> WindowChange<K> {
    pub(crate) fn between(prev: &LayoutWindow<K>, next: &LayoutWindow<K>) -> Self {
        let entered = next
            .entries
            .iter()
            .filter(|e| !prev.contains(&e.key))
            .map(|e| e.key.clone())
            .collect();
        let exited = prev
            .entries
            .iter()
            .filter(|e| !next.contains(&e.key))
            .map(|e| e.key.clone())
            .collect();
        Self { entered, exited }
    }
}
