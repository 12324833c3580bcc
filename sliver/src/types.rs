use alloc::vec::Vec;

/// The axis a sliver scrolls along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Horizontal main axis.
    Row,
    /// Vertical main axis.
    #[default]
    Column,
}

impl Direction {
    /// Parses a `sliverDirection` keyword. Returns `None` for unsupported values.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        if keyword.eq_ignore_ascii_case("row") {
            Some(Self::Row)
        } else if keyword.eq_ignore_ascii_case("column") {
            Some(Self::Column)
        } else {
            None
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// A size expressed in sliver axes rather than width/height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub main: u32,
    pub cross: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl SlotRange {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }
}

/// Children that entered or left the layout window during one re-windowing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowChange<K> {
    pub entered: Vec<K>,
    pub exited: Vec<K>,
}

impl<K> WindowChange<K> {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

impl<K> Default for WindowChange<K> {
    fn default() -> Self {
        Self {
            entered: Vec::new(),
            exited: Vec::new(),
        }
    }
}
