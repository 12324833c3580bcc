use alloc::boxed::Box;
use alloc::vec::Vec;

use slotmap::SecondaryMap;
use sliver::{Align, Direction, FrameState, LayoutWindow, Rect, Sliver, WindowChange};

use crate::events::HandlerTable;
use crate::style::{parse_direction, parse_display, parse_length};
use crate::{
    ClickEvent, Display, EngineConfig, IntersectionChangeEvent, LayoutOracle, Length, NodeId,
    NodeKind, NodeTree, Point, Result, Style, StyleOracle, StyleProperty, TextExtent, TreeError,
};

enum ScrollRequest {
    By(i64),
    To(i64),
    Index(usize, Align),
    Frame(FrameState),
}

/// The embedding context: a node tree whose `display: sliver` elements are virtualized.
///
/// There is no global document. Every operation goes through an `Engine` value, which owns:
/// - the node arena, rooted at [`Self::body`],
/// - one [`Sliver`] per sliver container, keyed by node, mirroring the container's children,
/// - the event handler table,
/// - the [`LayoutOracle`] answering box sizes.
///
/// Layout is lazy: mutations only mark metrics stale, and reads that depend on geometry
/// (`scroll_*`, hit testing, [`Self::layout_window`]) bring the container up to date first.
/// Intersection change events are dispatched whenever that re-windows a container.
#[derive(Debug)]
pub struct Engine<O = StyleOracle> {
    tree: NodeTree,
    body: NodeId,
    slivers: SecondaryMap<NodeId, Sliver<NodeId>>,
    handlers: HandlerTable,
    oracle: O,
    config: EngineConfig,
}

impl Engine<StyleOracle> {
    pub fn new() -> Self {
        Self::with_oracle(StyleOracle::default(), EngineConfig::default())
    }
}

impl Default for Engine<StyleOracle> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: LayoutOracle> Engine<O> {
    pub fn with_oracle(oracle: O, config: EngineConfig) -> Self {
        dlog!(debug, ?config, "Engine::new");
        let mut tree = NodeTree::new();
        let body = tree.create_element("body");
        Self {
            tree,
            body,
            slivers: SecondaryMap::new(),
            handlers: HandlerTable::default(),
            oracle,
            config,
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Call [`Self::invalidate`] for nodes whose answers change.
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.tree.create_text(data)
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.tree.create_comment(data)
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.tree.kind(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    pub fn child_nodes(&self, node: NodeId) -> &[NodeId] {
        self.tree.children(node)
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.tree.first_child(node)
    }

    pub fn node_text(&self, node: NodeId) -> Option<&str> {
        self.tree.text(node)
    }

    pub fn style(&self, node: NodeId) -> Option<&Style> {
        self.tree.style(node)
    }

    pub fn is_sliver(&self, node: NodeId) -> bool {
        self.slivers.contains_key(node)
    }

    /// The headless state of a sliver container, as of its last layout.
    pub fn sliver(&self, node: NodeId) -> Option<&Sliver<NodeId>> {
        self.slivers.get(node)
    }

    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        self.insert_before(parent, node, None)
    }

    /// Inserts `node` before `reference`, or appends it when `reference` is `None`.
    ///
    /// A node that already has a parent is moved. Inserting a node before itself does nothing.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if node == self.body {
            return Err(TreeError::HierarchyRequest { parent, node });
        }
        let Some(inserted) = self.tree.insert_before(parent, node, reference)? else {
            return Ok(());
        };
        if let Some(from) = inserted.detached {
            self.child_removed(from.parent, from.index, node);
        }
        self.child_inserted(parent, inserted.index, node);
        Ok(())
    }

    /// Removes `node` from `parent`. The node stays alive (detached) and can be re-inserted;
    /// sliver state inside it starts fresh.
    pub fn remove_child(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        let index = self.tree.remove_child(parent, node)?;
        self.child_removed(parent, index, node);
        Ok(())
    }

    pub fn set_text(&mut self, node: NodeId, data: &str) -> Result<()> {
        if self.tree.set_text(node, data)? {
            self.refresh_child(node);
        }
        Ok(())
    }

    /// Detaches `node` if needed and frees it with its whole subtree, along with the handlers
    /// and sliver state of every freed node. The body cannot be disposed.
    pub fn dispose(&mut self, node: NodeId) -> Result<()> {
        self.require(node)?;
        if node == self.body {
            return Err(TreeError::HierarchyRequest {
                parent: self.body,
                node,
            });
        }
        if let Some(from) = self.tree.detach(node) {
            self.child_removed(from.parent, from.index, node);
        }
        let freed = self.tree.free(node);
        dlog!(debug, ?node, freed = freed.len(), "Engine::dispose");
        for id in freed {
            self.slivers.remove(id);
            self.handlers.remove(id);
        }
        Ok(())
    }

    /// Sets a style property from its textual form.
    ///
    /// Supported properties are `display`, `sliverDirection` (or `sliver-direction`), `width`
    /// and `height`. Unknown properties and unparsable lengths are ignored.
    pub fn set_style(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let current = self.element_style(node)?;
        let Some(property) = StyleProperty::from_name(name) else {
            dlog!(debug, name, "ignoring unsupported style property");
            return Ok(());
        };
        match property {
            StyleProperty::Display => {
                self.set_display(node, parse_display(value, current.direction))
            }
            StyleProperty::SliverDirection => {
                self.set_sliver_direction(node, parse_direction(value))
            }
            StyleProperty::Width | StyleProperty::Height => {
                let Some(length) = parse_length(value) else {
                    dlog!(warn, name, value, "ignoring invalid length");
                    return Ok(());
                };
                if property == StyleProperty::Width {
                    self.set_size(node, length, current.height)
                } else {
                    self.set_size(node, current.width, length)
                }
            }
        }
    }

    /// Switching to `Display::Sliver` creates the container state; switching away destroys it.
    pub fn set_display(&mut self, node: NodeId, display: Display) -> Result<()> {
        let style = self.tree.style_mut(node)?;
        let before = style.display;
        style.set_display(display);
        let after = style.display;
        if before != after {
            self.display_changed(node, before, after);
        }
        Ok(())
    }

    pub fn set_sliver_direction(&mut self, node: NodeId, direction: Direction) -> Result<()> {
        let style = self.tree.style_mut(node)?;
        let before = style.display;
        style.set_direction(direction);
        let after = style.display;
        if before != after {
            self.display_changed(node, before, after);
        }
        Ok(())
    }

    pub fn set_size(&mut self, node: NodeId, width: Length, height: Length) -> Result<()> {
        let style = self.tree.style_mut(node)?;
        if style.width == width && style.height == height {
            return Ok(());
        }
        style.width = width;
        style.height = height;
        self.refresh_child(node);
        Ok(())
    }

    /// Drops cached metrics after the oracle's answer for `node` changed. For a sliver
    /// container this also drops the metrics of all its children.
    pub fn invalidate(&mut self, node: NodeId) -> Result<()> {
        self.require(node)?;
        if let Some(sliver) = self.slivers.get_mut(node) {
            sliver.invalidate_all();
        }
        self.refresh_child(node);
        Ok(())
    }

    pub fn on_click(
        &mut self,
        node: NodeId,
        handler: impl FnMut(&ClickEvent) + 'static,
    ) -> Result<()> {
        self.require(node)?;
        self.handlers.add_click(node, Box::new(handler));
        Ok(())
    }

    pub fn on_intersection_change(
        &mut self,
        node: NodeId,
        handler: impl FnMut(&IntersectionChangeEvent) + 'static,
    ) -> Result<()> {
        self.require(node)?;
        self.handlers.add_intersection(node, Box::new(handler));
        Ok(())
    }

    pub fn clear_handlers(&mut self, node: NodeId) {
        self.handlers.remove(node);
    }

    /// Lays out a sliver container if anything changed since its last layout.
    /// Returns `false` for nodes that are not sliver containers.
    pub fn layout(&mut self, container: NodeId) -> bool {
        let Self {
            ref tree,
            ref mut slivers,
            ref mut handlers,
            ref oracle,
            ..
        } = *self;
        let Some(sliver) = slivers.get_mut(container) else {
            return false;
        };
        let direction = sliver.direction();
        let viewport = oracle
            .box_size(tree, container)
            .map(|b| b.to_rect(direction))
            .unwrap_or_default();
        sliver.set_viewport(viewport);
        if sliver.needs_layout() {
            let change =
                sliver.layout(|_, &child| measure_child(tree, oracle, container, child, direction));
            dispatch_intersections(handlers, container, sliver.window(), &change);
        }
        true
    }

    /// Lays out every sliver container.
    pub fn flush(&mut self) {
        let containers: Vec<NodeId> = self.slivers.keys().collect();
        for container in containers {
            self.layout(container);
        }
    }

    /// Relative scroll. Only the main-axis component applies (`dy` for column, `dx` for row);
    /// scrolling a non-sliver element does nothing.
    pub fn scroll_by(&mut self, node: NodeId, dx: i64, dy: i64) -> Result<()> {
        self.scroll(node, |direction| ScrollRequest::By(main_of(direction, dx, dy)))
    }

    /// Absolute scroll, with the same axis rules as [`Self::scroll_by`].
    pub fn scroll_to(&mut self, node: NodeId, x: i64, y: i64) -> Result<()> {
        self.scroll(node, |direction| ScrollRequest::To(main_of(direction, x, y)))
    }

    /// Scrolls so that `child` is aligned in the viewport, based on current (possibly
    /// estimated) offsets.
    pub fn scroll_to_child(
        &mut self,
        container: NodeId,
        child: NodeId,
        align: Align,
    ) -> Result<()> {
        self.require(child)?;
        let index = self
            .tree
            .index_of(container, child)
            .ok_or(TreeError::NotAChild { parent: container, child })?;
        self.scroll(container, |_| ScrollRequest::Index(index, align))
    }

    pub fn scroll_top(&mut self, node: NodeId) -> u64 {
        self.scroll_offset_along(node, Direction::Column)
    }

    pub fn scroll_left(&mut self, node: NodeId) -> u64 {
        self.scroll_offset_along(node, Direction::Row)
    }

    /// Total extent for a column sliver, the viewport height for a row sliver, and the box
    /// height for anything else.
    pub fn scroll_height(&mut self, node: NodeId) -> u64 {
        self.scroll_size_along(node, Direction::Column)
    }

    pub fn scroll_width(&mut self, node: NodeId) -> u64 {
        self.scroll_size_along(node, Direction::Row)
    }

    pub fn layout_window(&mut self, container: NodeId) -> Option<&LayoutWindow<NodeId>> {
        self.layout(container);
        self.slivers.get(container).map(Sliver::window)
    }

    /// Main-axis offset of `child` in its container's content, measured or estimated.
    pub fn child_offset(&mut self, container: NodeId, child: NodeId) -> Option<u64> {
        self.layout(container);
        let index = self.tree.index_of(container, child)?;
        self.slivers.get(container)?.item_start(index)
    }

    pub fn is_measured(&self, container: NodeId, child: NodeId) -> bool {
        self.tree
            .index_of(container, child)
            .zip(self.slivers.get(container))
            .is_some_and(|(index, sliver)| sliver.is_measured(index))
    }

    pub fn frame_state(&mut self, container: NodeId) -> Option<FrameState> {
        self.layout(container);
        self.slivers.get(container).map(Sliver::frame_state)
    }

    pub fn restore_frame_state(&mut self, container: NodeId, frame: FrameState) -> Result<()> {
        self.scroll(container, |_| ScrollRequest::Frame(frame))
    }

    /// The sliver child under a viewport-local point, if any.
    pub fn hit_test(&mut self, container: NodeId, point: Point) -> Option<NodeId> {
        self.locate(container, point).map(|(target, _)| target)
    }

    /// Hit-tests `point` and dispatches a [`ClickEvent`] to the handlers of the child under it.
    /// Returns the target.
    pub fn click(&mut self, container: NodeId, point: Point) -> Option<NodeId> {
        let Some((target, offset)) = self.locate(container, point) else {
            dlog!(trace, ?container, ?point, "Engine::click: no target");
            return None;
        };
        let event = ClickEvent {
            target,
            container,
            point,
            offset,
        };
        dlog!(trace, ?target, ?point, "Engine::click");
        self.handlers.dispatch_click(&event);
        Some(target)
    }

    fn require(&self, node: NodeId) -> Result<()> {
        if self.tree.contains(node) {
            Ok(())
        } else {
            Err(TreeError::NodeNotFound(node))
        }
    }

    fn element_style(&self, node: NodeId) -> Result<Style> {
        match self.tree.kind(node) {
            None => Err(TreeError::NodeNotFound(node)),
            Some(NodeKind::Element) => Ok(self.tree.style(node).copied().unwrap_or_default()),
            Some(_) => Err(TreeError::NotAnElement(node)),
        }
    }

    fn scroll(
        &mut self,
        container: NodeId,
        request: impl FnOnce(Direction) -> ScrollRequest,
    ) -> Result<()> {
        self.require(container)?;
        if !self.layout(container) {
            dlog!(debug, ?container, "scroll on a non-sliver element ignored");
            return Ok(());
        }
        let Self {
            ref tree,
            ref mut slivers,
            ref mut handlers,
            ref oracle,
            ..
        } = *self;
        let Some(sliver) = slivers.get_mut(container) else {
            return Ok(());
        };
        let direction = sliver.direction();
        let measure =
            |_: usize, child: &NodeId| measure_child(tree, oracle, container, *child, direction);
        let change = match request(direction) {
            ScrollRequest::By(delta) => sliver.scroll_by(delta, measure),
            ScrollRequest::To(offset) => sliver.scroll_to(offset, measure),
            ScrollRequest::Index(index, align) => sliver.scroll_to_index(index, align, measure),
            ScrollRequest::Frame(frame) => sliver.restore_frame_state(frame, measure),
        };
        dlog!(trace, ?container, offset = sliver.scroll_offset(), "Engine::scroll");
        dispatch_intersections(handlers, container, sliver.window(), &change);
        Ok(())
    }

    fn scroll_offset_along(&mut self, node: NodeId, axis: Direction) -> u64 {
        self.layout(node);
        self.slivers
            .get(node)
            .filter(|s| s.direction() == axis)
            .map_or(0, Sliver::scroll_offset)
    }

    fn scroll_size_along(&mut self, node: NodeId, axis: Direction) -> u64 {
        self.layout(node);
        match self.slivers.get(node) {
            Some(sliver) if sliver.direction() == axis => sliver.total_extent(),
            Some(sliver) => sliver.viewport().cross as u64,
            None => self
                .oracle
                .box_size(&self.tree, node)
                .map_or(0, |b| b.main(axis) as u64),
        }
    }

    fn locate(&mut self, container: NodeId, point: Point) -> Option<(NodeId, Point)> {
        if !self.layout(container) {
            return None;
        }
        let sliver = self.slivers.get(container)?;
        let direction = sliver.direction();
        let (main, cross) = match direction {
            Direction::Column => (point.y, point.x),
            Direction::Row => (point.x, point.y),
        };
        let main = u64::try_from(main).ok()?;
        let cross = u64::try_from(cross).ok()?;
        let window = sliver.window();
        let entry = window.hit_test(main, cross)?;

        let local_main = window.scroll_offset() + main - entry.offset;
        let (local_main, cross) = (local_main as i64, cross as i64);
        let offset = match direction {
            Direction::Column => Point::new(cross, local_main),
            Direction::Row => Point::new(local_main, cross),
        };
        Some((entry.key, offset))
    }

    fn child_inserted(&mut self, parent: NodeId, index: usize, node: NodeId) {
        let hidden = hidden_in_sliver(&self.tree, self.config.text_extent, node);
        match self.slivers.get_mut(parent) {
            Some(sliver) => sliver.insert(index, node, hidden),
            None => self.invalidate_containing(parent),
        }
    }

    fn child_removed(&mut self, parent: NodeId, index: usize, node: NodeId) {
        match self.slivers.get_mut(parent) {
            Some(sliver) => {
                let removed = sliver.remove(index);
                debug_assert_eq!(removed, Some(node), "sliver slots out of sync with the tree");
            }
            None => self.invalidate_containing(parent),
        }
        self.reset_slivers(node);
    }

    /// Re-derives the slot of `node` after its own box may have changed.
    fn refresh_child(&mut self, node: NodeId) {
        if let Some(parent) = self.tree.parent(node) {
            if let (Some(sliver), Some(index)) =
                (self.slivers.get_mut(parent), self.tree.index_of(parent, node))
            {
                let hidden = hidden_in_sliver(&self.tree, self.config.text_extent, node);
                sliver.set_hidden(index, hidden);
            }
        }
        self.invalidate_containing(node);
    }

    /// Invalidates the metrics of the sliver child that is, or contains, `node`. Only the
    /// nearest enclosing sliver is affected.
    fn invalidate_containing(&mut self, node: NodeId) {
        let mut cur = node;
        while let Some(parent) = self.tree.parent(cur) {
            if let Some(sliver) = self.slivers.get_mut(parent) {
                if let Some(index) = self.tree.index_of(parent, cur) {
                    sliver.invalidate(index);
                }
                return;
            }
            cur = parent;
        }
    }

    fn display_changed(&mut self, node: NodeId, before: Display, after: Display) {
        dlog!(trace, ?node, ?before, ?after, "Engine::display_changed");
        match (before.sliver_direction(), after.sliver_direction()) {
            (None, Some(direction)) => {
                let sliver = self.build_sliver(node, direction);
                self.slivers.insert(node, sliver);
            }
            (Some(_), None) => {
                self.slivers.remove(node);
            }
            (Some(from), Some(to)) if from != to => {
                if let Some(sliver) = self.slivers.get_mut(node) {
                    sliver.set_direction(to);
                }
            }
            _ => {}
        }
        self.refresh_child(node);
    }

    /// Replaces the state of every sliver in the subtree with fresh state.
    fn reset_slivers(&mut self, root: NodeId) {
        for id in self.tree.descendants(root) {
            let Some(direction) = self.slivers.get(id).map(Sliver::direction) else {
                continue;
            };
            dlog!(debug, ?id, "sliver state reset on removal");
            let sliver = self.build_sliver(id, direction);
            self.slivers.insert(id, sliver);
        }
    }

    fn build_sliver(&self, container: NodeId, direction: Direction) -> Sliver<NodeId> {
        let mut sliver = Sliver::new(self.config.sliver_options(direction));
        for &child in self.tree.children(container) {
            sliver.push(child, hidden_in_sliver(&self.tree, self.config.text_extent, child));
        }
        sliver
    }
}

fn main_of(direction: Direction, x: i64, y: i64) -> i64 {
    match direction {
        Direction::Column => y,
        Direction::Row => x,
    }
}

/// Children that keep their position in a sliver but never take space.
fn hidden_in_sliver(tree: &NodeTree, text_extent: TextExtent, node: NodeId) -> bool {
    let Some(n) = tree.get(node) else {
        return true;
    };
    match n.kind() {
        NodeKind::Element => n.style().is_some_and(|s| s.display.is_none()),
        NodeKind::Text => text_extent == TextExtent::Zero || n.text().is_none_or(str::is_empty),
        NodeKind::Comment => true,
    }
}

fn measure_child<O: LayoutOracle>(
    tree: &NodeTree,
    oracle: &O,
    container: NodeId,
    child: NodeId,
    direction: Direction,
) -> Option<Rect> {
    if tree.parent(child) != Some(container) {
        dlog!(debug, ?container, ?child, "child left its container during layout, skipped");
        return None;
    }
    oracle.box_size(tree, child).map(|b| b.to_rect(direction))
}

fn dispatch_intersections(
    handlers: &mut HandlerTable,
    container: NodeId,
    window: &LayoutWindow<NodeId>,
    change: &WindowChange<NodeId>,
) {
    for &target in &change.exited {
        handlers.dispatch_intersection(&IntersectionChangeEvent {
            target,
            container,
            entered: false,
            intersection_ratio: 0.0,
        });
    }
    for &target in &change.entered {
        let intersection_ratio = window
            .get(&target)
            .map_or(0.0, |entry| window.intersection_ratio(entry));
        handlers.dispatch_intersection(&IntersectionChangeEvent {
            target,
            container,
            entered: true,
            intersection_ratio,
        });
    }
}
