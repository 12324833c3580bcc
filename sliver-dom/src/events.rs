use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use slotmap::SecondaryMap;

use crate::NodeId;

/// A point in a container's viewport-local coordinates (pixels from its top-left corner).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Delivered to the sliver child under a clicked point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickEvent {
    pub target: NodeId,
    /// The sliver container that routed the event.
    pub container: NodeId,
    /// The clicked point, local to the container's viewport.
    pub point: Point,
    /// The clicked point, local to the target's box.
    pub offset: Point,
}

/// Delivered when a sliver child enters or leaves its container's layout window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionChangeEvent {
    pub target: NodeId,
    pub container: NodeId,
    /// `true` when the child entered the window, `false` when it left.
    pub entered: bool,
    /// Visible fraction of the child's main-axis extent. Always 0.0 on leaving, and also 0.0
    /// for a child entering through the cache extent outside the viewport.
    pub intersection_ratio: f32,
}

pub type ClickHandler = Box<dyn FnMut(&ClickEvent)>;
pub type IntersectionHandler = Box<dyn FnMut(&IntersectionChangeEvent)>;

/// Event listeners, keyed by node outside of the nodes themselves.
#[derive(Default)]
pub(crate) struct HandlerTable {
    click: SecondaryMap<NodeId, Vec<ClickHandler>>,
    intersection: SecondaryMap<NodeId, Vec<IntersectionHandler>>,
}

impl HandlerTable {
    pub(crate) fn add_click(&mut self, node: NodeId, handler: ClickHandler) {
        push_handler(&mut self.click, node, handler);
    }

    pub(crate) fn add_intersection(&mut self, node: NodeId, handler: IntersectionHandler) {
        push_handler(&mut self.intersection, node, handler);
    }

    pub(crate) fn remove(&mut self, node: NodeId) {
        self.click.remove(node);
        self.intersection.remove(node);
    }

    /// Invokes the target's click handlers in registration order. No bubbling.
    pub(crate) fn dispatch_click(&mut self, event: &ClickEvent) {
        if let Some(handlers) = self.click.get_mut(event.target) {
            for handler in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    pub(crate) fn dispatch_intersection(&mut self, event: &IntersectionChangeEvent) {
        if let Some(handlers) = self.intersection.get_mut(event.target) {
            for handler in handlers.iter_mut() {
                handler(event);
            }
        }
    }
}

fn push_handler<H>(map: &mut SecondaryMap<NodeId, Vec<H>>, node: NodeId, handler: H) {
    match map.get_mut(node) {
        Some(handlers) => handlers.push(handler),
        None => {
            map.insert(node, alloc::vec![handler]);
        }
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("click", &self.click.len())
            .field("intersection", &self.intersection.len())
            .finish()
    }
}
