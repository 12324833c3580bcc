//! A headless sliver layout engine.
//!
//! A sliver is a scrolling container that only realizes the children intersecting its
//! viewport (plus an optional look-ahead margin). This crate holds the algorithmic core:
//!
//! - a running main-axis extent built from measured sizes and estimates, with `O(log n)`
//!   offset lookups (two prefix-sum trees, so changing the estimate is `O(1)`),
//! - a clamped scroll offset with relative/absolute scrolling,
//! - the [`LayoutWindow`]: the ordered `(child, offset, size)` tuples realized for the current
//!   offset, which is also what hit testing consults.
//!
//! It is tree-agnostic. An embedder (see the `sliver-dom` crate) is expected to provide:
//! - child identities in logical order, and their visibility
//! - the viewport size
//! - per-child measurements, on demand, for children entering the window
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod extent;
mod fenwick;
mod options;
mod scroll;
mod sliver;
mod state;
mod types;
mod window;


pub use options::{Estimate, SliverOptions};
pub use sliver::Sliver;
pub use state::{FrameState, ScrollState, ViewportState};
pub use types::{Align, Direction, Rect, ScrollDirection, SlotRange, WindowChange};
pub use window::{LayoutWindow, WindowEntry};
