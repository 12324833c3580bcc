use alloc::vec::Vec;

use crate::fenwick::Fenwick;
use crate::{Estimate, Rect};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Slot {
    size: u32,
    cross: u32,
    measured: bool,
    hidden: bool,
}

impl Slot {
    fn measured_value(&self) -> u64 {
        if self.measured && !self.hidden {
            self.size as u64
        } else {
            0
        }
    }

    fn pending_value(&self) -> u64 {
        u64::from(!self.measured && !self.hidden)
    }

    /// Boxless (zero-sized) measurements stay out of the estimate.
    fn informs_estimate(&self) -> bool {
        self.measured && !self.hidden && self.size > 0
    }
}

/// Running main-axis extent of a sliver's children.
///
/// Measured sizes and unmeasured (pending) slots are kept in two prefix-sum trees, so the
/// estimate used for pending slots can change in `O(1)`:
/// `start_of(i) = measured.prefix(i) + basis * pending.prefix(i)`.
///
/// Positional inserts/removals mark the trees stale. Queries stay correct while stale (they
/// fall back to a linear walk over cached sizes); `refresh` rebuilds the trees without
/// re-measuring anything.
#[derive(Clone, Debug)]
pub(crate) struct Extent {
    slots: Vec<Slot>,
    measured: Fenwick,
    pending: Fenwick,
    stale: bool,

    measured_total: u64,
    measured_visible: u64,
    pending_count: u64,
    last_measured: Option<u32>,

    estimate: Estimate,
    estimate_size: u32,
}

impl Extent {
    pub(crate) fn new(estimate: Estimate, estimate_size: u32) -> Self {
        Self {
            slots: Vec::new(),
            measured: Fenwick::new(),
            pending: Fenwick::new(),
            stale: false,
            measured_total: 0,
            measured_visible: 0,
            pending_count: 0,
            last_measured: None,
            estimate,
            estimate_size: estimate_size.max(1),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn set_estimate(&mut self, estimate: Estimate, estimate_size: u32) {
        self.estimate = estimate;
        self.estimate_size = estimate_size.max(1);
    }

    /// The main-axis size currently assumed for every pending slot. Never 0.
    pub(crate) fn basis(&self) -> u32 {
        let basis = match self.estimate {
            Estimate::Fixed => self.estimate_size,
            Estimate::LastMeasured => self.last_measured.unwrap_or(self.estimate_size),
            Estimate::Average => {
                if self.measured_visible == 0 {
                    self.estimate_size
                } else {
                    let half = self.measured_visible / 2;
                    let avg = self.measured_total.saturating_add(half) / self.measured_visible;
                    avg.min(u32::MAX as u64) as u32
                }
            }
        };
        match basis {
            0 => self.estimate_size,
            basis => basis,
        }
    }

    pub(crate) fn total(&self) -> u64 {
        self.measured_total
            .saturating_add(self.pending_count.saturating_mul(self.basis() as u64))
    }

    pub(crate) fn insert(&mut self, index: usize, hidden: bool) {
        let index = index.min(self.slots.len());
        let slot = Slot {
            hidden,
            ..Slot::default()
        };
        self.account(&slot);
        if index == self.slots.len() && !self.stale {
            self.measured.push_value(slot.measured_value());
            self.pending.push_value(slot.pending_value());
        } else {
            self.stale = true;
        }
        self.slots.insert(index, slot);
    }

    pub(crate) fn remove(&mut self, index: usize) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        let slot = self.slots.remove(index);
        self.unaccount(&slot);
        if index == self.slots.len() && !self.stale {
            self.measured.truncate(index);
            self.pending.truncate(index);
        } else {
            self.stale = true;
        }
        true
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.estimate, self.estimate_size);
    }

    /// Returns `true` when the visibility actually changed.
    pub(crate) fn set_hidden(&mut self, index: usize, hidden: bool) -> bool {
        if self.slots.get(index).is_none_or(|s| s.hidden == hidden) {
            return false;
        }
        self.update(index, |s| s.hidden = hidden);
        true
    }

    /// Drops the measurement of a slot so it is sized by the estimate until re-measured.
    pub(crate) fn invalidate(&mut self, index: usize) -> bool {
        if self.slots.get(index).is_none_or(|s| !s.measured) {
            return false;
        }
        self.update(index, |s| {
            s.measured = false;
            s.size = 0;
            s.cross = 0;
        });
        true
    }

    pub(crate) fn invalidate_all(&mut self) {
        for slot in &mut self.slots {
            slot.measured = false;
            slot.size = 0;
            slot.cross = 0;
        }
        self.last_measured = None;
        self.recount();
        self.stale = true;
        self.refresh();
    }

    pub(crate) fn measure(&mut self, index: usize, size: Rect) {
        let Some(slot) = self.slots.get(index) else {
            return;
        };
        let hidden = slot.hidden;
        self.update(index, |s| {
            s.size = size.main;
            s.cross = size.cross;
            s.measured = true;
        });
        if !hidden && size.main > 0 {
            self.last_measured = Some(size.main);
        }
    }

    pub(crate) fn needs_measure(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|s| !s.measured && !s.hidden)
    }

    pub(crate) fn is_measured(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.measured)
    }

    pub(crate) fn is_hidden(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.hidden)
    }

    /// Effective main-axis size: 0 for hidden slots, the estimate for pending ones.
    pub(crate) fn size_of(&self, index: usize) -> u32 {
        match self.slots.get(index) {
            None => 0,
            Some(s) if s.hidden => 0,
            Some(s) if s.measured => s.size,
            Some(_) => self.basis(),
        }
    }

    pub(crate) fn cross_of(&self, index: usize) -> u32 {
        self.slots.get(index).map_or(0, |s| s.cross)
    }

    /// Main-axis offset of the slot at `index` (the sum of everything before it).
    pub(crate) fn start_of(&self, index: usize) -> u64 {
        let index = index.min(self.slots.len());
        if self.stale {
            return (0..index).map(|i| self.size_of(i) as u64).sum();
        }
        let basis = self.basis() as u64;
        self.measured
            .prefix_sum(index)
            .saturating_add(self.pending.prefix_sum(index).saturating_mul(basis))
    }

    /// Index of the first slot whose end lies beyond `offset`, or `len()` when `offset` is at
    /// or past the total extent. Zero-sized slots are never returned.
    pub(crate) fn index_at_offset(&self, offset: u64) -> usize {
        if self.stale {
            let mut end = 0u64;
            for i in 0..self.slots.len() {
                end = end.saturating_add(self.size_of(i) as u64);
                if end > offset {
                    return i;
                }
            }
            return self.slots.len();
        }
        self.measured
            .lower_bound_weighted(&self.pending, self.basis() as u64, offset)
    }

    /// Rebuilds the prefix-sum trees after positional mutations.
    pub(crate) fn refresh(&mut self) {
        if !self.stale {
            return;
        }
        slog!(trace, slots = self.slots.len(), "extent: rebuild prefix sums");
        self.measured = Fenwick::from_values(self.slots.iter().map(Slot::measured_value));
        self.pending = Fenwick::from_values(self.slots.iter().map(Slot::pending_value));
        self.stale = false;
        debug_assert_eq!(self.measured.total(), self.measured_total);
        debug_assert_eq!(self.pending.total(), self.pending_count);
    }

    fn update(&mut self, index: usize, f: impl FnOnce(&mut Slot)) {
        let old = self.slots[index];
        let mut new = old;
        f(&mut new);
        self.unaccount(&old);
        self.account(&new);
        self.slots[index] = new;
        if !self.stale {
            let dm = new.measured_value() as i64 - old.measured_value() as i64;
            let dp = new.pending_value() as i64 - old.pending_value() as i64;
            self.measured.add(index, dm);
            self.pending.add(index, dp);
        }
    }

    fn account(&mut self, slot: &Slot) {
        self.measured_total = self.measured_total.saturating_add(slot.measured_value());
        self.pending_count = self.pending_count.saturating_add(slot.pending_value());
        if slot.informs_estimate() {
            self.measured_visible = self.measured_visible.saturating_add(1);
        }
    }

    fn unaccount(&mut self, slot: &Slot) {
        self.measured_total = self.measured_total.saturating_sub(slot.measured_value());
        self.pending_count = self.pending_count.saturating_sub(slot.pending_value());
        if slot.informs_estimate() {
            self.measured_visible = self.measured_visible.saturating_sub(1);
        }
    }

    fn recount(&mut self) {
        self.measured_total = 0;
        self.measured_visible = 0;
        self.pending_count = 0;
        let slots = core::mem::take(&mut self.slots);
        for slot in &slots {
            self.account(slot);
        }
        self.slots = slots;
    }
}
