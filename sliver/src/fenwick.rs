use alloc::vec::Vec;

/// Binary indexed tree over `u64` slot values.
///
/// Node `i` (1-based) holds the sum of the `lsb(i)` slots ending at slot `i`; node 0 is unused.
#[derive(Clone, Debug)]
pub(crate) struct Fenwick {
    nodes: Vec<u64>,
    total: u64,
}

impl Fenwick {
    pub(crate) fn new() -> Self {
        Self {
            nodes: alloc::vec![0],
            total: 0,
        }
    }

    /// Bulk build: each node pushes its partial sum up to its parent once.
    pub(crate) fn from_values(values: impl IntoIterator<Item = u64>) -> Self {
        let mut nodes = alloc::vec![0u64];
        nodes.extend(values);
        let total = nodes.iter().fold(0u64, |acc, &v| acc.saturating_add(v));

        let n = nodes.len() - 1;
        for i in 1..=n {
            let parent = i + lsb(i);
            if parent <= n {
                nodes[parent] = nodes[parent].saturating_add(nodes[i]);
            }
        }
        Self { nodes, total }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Keeps the first `len` slots. Surviving nodes only cover surviving slots.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.total = self.prefix_sum(len);
            self.nodes.truncate(len + 1);
        }
    }

    pub(crate) fn push_value(&mut self, value: u64) {
        let i = self.nodes.len();
        let stop = i - lsb(i);
        let mut covered = value;
        let mut j = i - 1;
        while j > stop {
            covered = covered.saturating_add(self.nodes[j]);
            j -= lsb(j);
        }
        self.nodes.push(covered);
        self.total = self.total.saturating_add(value);
    }

    pub(crate) fn add(&mut self, index: usize, delta: i64) {
        if delta == 0 || index >= self.len() {
            return;
        }
        self.total = self.total.saturating_add_signed(delta);
        let mut i = index + 1;
        while i < self.nodes.len() {
            debug_assert!(
                self.nodes[i].checked_add_signed(delta).is_some(),
                "slot {index} out of range after adding {delta}"
            );
            self.nodes[i] = self.nodes[i].saturating_add_signed(delta);
            i += lsb(i);
        }
    }

    /// Sum of the first `count` slots.
    pub(crate) fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = count.min(self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.nodes[i]);
            i -= lsb(i);
        }
        sum
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Number of leading slots whose combined span fits in `target`, where slot `i` spans
    /// `self[i] + weight * counts[i]`.
    ///
    /// Both trees must have the same length. With `weight = 0` this is a plain lower bound.
    pub(crate) fn lower_bound_weighted(
        &self,
        counts: &Fenwick,
        weight: u64,
        mut target: u64,
    ) -> usize {
        let n = self.len();
        debug_assert_eq!(n, counts.len(), "weighted search over trees of different lengths");
        if n == 0 || n != counts.len() {
            return 0;
        }

        let mut pos = 0usize;
        let mut step = 1usize << n.ilog2();
        while step > 0 {
            let next = pos + step;
            if next <= n {
                let span = counts.nodes[next]
                    .saturating_mul(weight)
                    .saturating_add(self.nodes[next]);
                if span <= target {
                    target -= span;
                    pos = next;
                }
            }
            step /= 2;
        }
        pos
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}
