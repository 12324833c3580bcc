use core::cmp;

use crate::{ScrollDirection, ScrollState};

/// Owns the main-axis scroll offset of one sliver.
///
/// Every operation clamps into `[0, max]`; out-of-range requests are never an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ScrollController {
    offset: u64,
    direction: Option<ScrollDirection>,
}

impl ScrollController {
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    pub(crate) fn state(&self) -> ScrollState {
        ScrollState {
            offset: self.offset,
            direction: self.direction,
        }
    }

    pub(crate) fn scroll_by(&mut self, delta: i64, max: u64) -> bool {
        let target = self.offset as i128 + delta as i128;
        self.set(clamp_offset(target, max))
    }

    pub(crate) fn scroll_to(&mut self, target: i64, max: u64) -> bool {
        self.set(clamp_offset(target as i128, max))
    }

    /// Pulls the offset back inside `[0, max]` after the extent shrank.
    pub(crate) fn clamp(&mut self, max: u64) -> bool {
        if self.offset <= max {
            return false;
        }
        slog!(trace, from = self.offset, to = max, "scroll: clamp");
        self.offset = max;
        true
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    fn set(&mut self, offset: u64) -> bool {
        if self.offset == offset {
            return false;
        }
        self.direction = match offset.cmp(&self.offset) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.direction,
        };
        self.offset = offset;
        true
    }
}

fn clamp_offset(target: i128, max: u64) -> u64 {
    target.clamp(0, max as i128) as u64
}
