//! A retained, DOM-like node tree with virtualized `display: sliver` containers.
//!
//! The [`sliver`] crate does the windowing math; this crate embeds it:
//!
//! - [`NodeTree`]: an arena of element/text/comment nodes with ordered children,
//! - [`Engine`]: mirrors child mutations and styles onto one [`sliver::Sliver`] per container,
//!   exposes DOM-style scrolling (`scroll_by`, `scroll_top`, `scroll_height`, ...), and routes
//!   clicks and intersection changes to handlers,
//! - [`LayoutOracle`]: the external layout system, asked for box sizes only for children that
//!   enter a container's window.
//!
//! ```
//! use sliver_dom::{Engine, Point};
//!
//! let mut engine = Engine::new();
//! let list = engine.create_element("div");
//! for _ in 0..100 {
//!     let item = engine.create_element("div");
//!     engine.set_style(item, "height", "99px").unwrap();
//!     engine.set_style(item, "width", "99px").unwrap();
//!     engine.append_child(list, item).unwrap();
//! }
//! engine.set_style(list, "display", "sliver").unwrap();
//! engine.set_style(list, "width", "100px").unwrap();
//! engine.set_style(list, "height", "150px").unwrap();
//! engine.append_child(engine.body(), list).unwrap();
//!
//! assert_eq!(engine.scroll_height(list), 9900);
//! engine.scroll_by(list, 0, 3000).unwrap();
//! let hit = engine.hit_test(list, Point::new(50, 20));
//! assert_eq!(hit, Some(engine.child_nodes(list)[30]));
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod config;
mod engine;
mod error;
mod events;
mod oracle;
mod style;
mod tree;

#[cfg(test)]
mod tests;

pub use config::{EngineConfig, TextExtent};
pub use engine::Engine;
pub use error::{Result, TreeError};
pub use events::{ClickEvent, ClickHandler, IntersectionChangeEvent, IntersectionHandler, Point};
pub use oracle::{BoxSize, LayoutOracle, StyleOracle};
pub use style::{
    Display, Length, Style, StyleProperty, parse_direction, parse_display, parse_length,
};
pub use tree::{Detached, Inserted, Node, NodeId, NodeKind, NodeTree};

pub use sliver::{Align, Direction, Estimate, FrameState, LayoutWindow, WindowEntry};
