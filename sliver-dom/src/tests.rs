use crate::*;

use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start))
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn sized_div(engine: &mut Engine, width: &str, height: &str) -> NodeId {
    let e = engine.create_element("div");
    engine.set_style(e, "width", width).unwrap();
    engine.set_style(e, "height", height).unwrap();
    e
}

/// 100 children of 99x99 (each holding its index as text) in a 100x150 column sliver
/// attached to the body.
fn basic_case(engine: &mut Engine) -> NodeId {
    let d = engine.create_element("div");
    for i in 0..100 {
        let e = sized_div(engine, "99px", "99px");
        let t = engine.create_text(&format!("{i}"));
        engine.append_child(e, t).unwrap();
        engine.append_child(d, e).unwrap();
    }
    engine.set_style(d, "display", "sliver").unwrap();
    engine.set_style(d, "width", "100px").unwrap();
    engine.set_style(d, "height", "150px").unwrap();
    let body = engine.body();
    engine.append_child(body, d).unwrap();
    d
}

fn window_children<O: LayoutOracle>(engine: &mut Engine<O>, container: NodeId) -> Vec<NodeId> {
    engine
        .layout_window(container)
        .map(|w| w.iter().map(|e| e.key).collect())
        .unwrap_or_default()
}

fn nth(engine: &Engine, container: NodeId, index: usize) -> NodeId {
    engine.child_nodes(container)[index]
}

#[test]
fn uniform_children_define_scroll_height() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    assert!(engine.is_sliver(d));
    assert_eq!(engine.scroll_height(d), 100 * 99);
    assert_eq!(engine.scroll_width(d), 100);
    assert_eq!(engine.scroll_top(d), 0);
    assert_eq!(engine.scroll_left(d), 0);
    assert_eq!(window_children(&mut engine, d), [nth(&engine, d, 0), nth(&engine, d, 1)]);
}

#[test]
fn scroll_by_composes() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    engine.scroll_by(d, 0, 200).unwrap();
    assert_eq!(engine.scroll_top(d), 200);
    engine.scroll_by(d, 0, -150).unwrap();
    assert_eq!(engine.scroll_top(d), 50);
    assert_eq!(engine.scroll_height(d), 9900);
    // The cross axis never scrolls.
    engine.scroll_by(d, 40, 0).unwrap();
    assert_eq!(engine.scroll_left(d), 0);
    assert_eq!(engine.scroll_top(d), 50);
}

#[test]
fn scroll_is_clamped() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    engine.scroll_by(d, 0, -500).unwrap();
    assert_eq!(engine.scroll_top(d), 0);
    engine.scroll_to(d, 0, 1_000_000).unwrap();
    assert_eq!(engine.scroll_top(d), 9900 - 150);
    engine.scroll_to(d, 0, -1).unwrap();
    assert_eq!(engine.scroll_top(d), 0);
}

#[test]
fn continuous_scroll_rewindows_backward() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    engine.scroll_to(d, 0, 600).unwrap();
    assert_eq!(window_children(&mut engine, d), [nth(&engine, d, 6), nth(&engine, d, 7)]);
    engine.scroll_to(d, 0, 200).unwrap();
    assert_eq!(engine.scroll_top(d), 200);
    assert_eq!(window_children(&mut engine, d), [nth(&engine, d, 2), nth(&engine, d, 3)]);
}

#[test]
fn round_trip_restores_window() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let initial = engine.layout_window(d).unwrap().entries().to_vec();
    for target in [99, 1234, 5000, 9750, 100_000] {
        engine.scroll_to(d, 0, target).unwrap();
        engine.scroll_to(d, 0, 0).unwrap();
        assert_eq!(engine.layout_window(d).unwrap().entries(), &initial[..]);
    }
}

#[test]
fn insert_before_first_child_reverses_order() {
    let mut engine = Engine::new();
    let d = engine.create_element("div");
    let mut created = Vec::new();
    for _ in 0..100 {
        let e = sized_div(&mut engine, "99px", "99px");
        let first = engine.first_child(d);
        engine.insert_before(d, e, first).unwrap();
        created.push(e);
    }
    engine.set_style(d, "display", "sliver").unwrap();
    engine.set_style(d, "width", "100px").unwrap();
    engine.set_style(d, "height", "150px").unwrap();

    created.reverse();
    assert_eq!(engine.child_nodes(d), &created[..]);
    assert_eq!(window_children(&mut engine, d), created[..2]);
    assert_eq!(engine.scroll_height(d), 9900);
}

#[test]
fn text_and_comment_children_keep_position_but_not_extent() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let first_div = nth(&engine, d, 0);
    assert_eq!(engine.scroll_height(d), 9900);

    let comment = engine.create_comment("HelloWorld");
    let text = engine.create_text("HelloWorld");
    let empty = engine.create_text("");
    for node in [empty, text, comment] {
        let first = engine.first_child(d);
        engine.insert_before(d, node, first).unwrap();
    }

    assert_eq!(engine.child_nodes(d).len(), 103);
    assert_eq!(&engine.child_nodes(d)[..4], &[comment, text, empty, first_div]);
    assert_eq!(engine.scroll_height(d), 9900);
    assert_eq!(window_children(&mut engine, d)[0], first_div);
    assert_eq!(engine.hit_test(d, Point::new(50, 20)), Some(first_div));
    assert_eq!(engine.node_text(comment), Some("HelloWorld"));
    assert_eq!(engine.kind(empty), Some(NodeKind::Text));
}

#[test]
fn display_none_child_is_skipped() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let c1 = nth(&engine, d, 1);
    let c2 = nth(&engine, d, 2);

    engine.set_style(c1, "display", "none").unwrap();
    assert_eq!(engine.scroll_height(d), 99 * 99);
    assert_eq!(window_children(&mut engine, d), [nth(&engine, d, 0), c2]);
    assert_eq!(engine.child_nodes(d).len(), 100);
    assert_eq!(engine.child_offset(d, c2), Some(99));

    engine.set_style(c1, "display", "block").unwrap();
    assert_eq!(engine.scroll_height(d), 9900);
    assert_eq!(window_children(&mut engine, d), [nth(&engine, d, 0), c1]);
}

#[test]
fn click_after_scroll_reaches_child_thirty_once() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let children = engine.child_nodes(d).to_vec();
    let hits = Rc::new(RefCell::new(Vec::new()));
    for (i, &child) in children.iter().enumerate() {
        let hits = hits.clone();
        engine
            .on_click(child, move |ev| hits.borrow_mut().push((i, *ev)))
            .unwrap();
    }

    engine.scroll_by(d, 0, 30 * 100).unwrap();
    let target = engine.click(d, Point::new(50, 20));
    assert_eq!(target, Some(children[30]));

    let hits = hits.borrow();
    assert_eq!(hits.len(), 1);
    let (index, event) = hits[0];
    assert_eq!(index, 30);
    assert_eq!(
        event,
        ClickEvent {
            target: children[30],
            container: d,
            point: Point::new(50, 20),
            offset: Point::new(50, 50),
        }
    );
}

#[test]
fn points_outside_the_viewport_hit_nothing() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    assert_eq!(engine.hit_test(d, Point::new(-1, 10)), None);
    assert_eq!(engine.hit_test(d, Point::new(10, -1)), None);
    assert_eq!(engine.hit_test(d, Point::new(10, 150)), None);
    assert_eq!(engine.hit_test(d, Point::new(100, 10)), None);
    // Inside the viewport, right of the 99px child.
    assert_eq!(engine.hit_test(d, Point::new(99, 10)), None);
    assert_eq!(engine.click(d, Point::new(99, 10)), None);
    // Non-sliver elements are not routed.
    let body = engine.body();
    assert_eq!(engine.hit_test(body, Point::new(0, 0)), None);
}

#[test]
fn invalid_reference_leaves_tree_unchanged() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let stranger = engine.create_element("div");
    let node = engine.create_element("div");
    let before = engine.child_nodes(d).to_vec();

    let err = engine.insert_before(d, node, Some(stranger)).unwrap_err();
    assert_eq!(
        err,
        TreeError::InvalidReference {
            parent: d,
            reference: stranger
        }
    );
    assert_eq!(engine.child_nodes(d), &before[..]);
    assert_eq!(engine.parent(node), None);
    assert_eq!(engine.scroll_height(d), 9900);
}

#[test]
fn insert_before_itself_is_a_no_op() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let c5 = nth(&engine, d, 5);
    let before = engine.child_nodes(d).to_vec();
    engine.insert_before(d, c5, Some(c5)).unwrap();
    assert_eq!(engine.child_nodes(d), &before[..]);
}

#[test]
fn hierarchy_errors() {
    let mut engine = Engine::new();
    let outer = engine.create_element("div");
    let inner = engine.create_element("div");
    let text = engine.create_text("x");
    engine.append_child(outer, inner).unwrap();

    assert_eq!(
        engine.append_child(inner, outer),
        Err(TreeError::HierarchyRequest {
            parent: inner,
            node: outer
        })
    );
    assert_eq!(
        engine.append_child(outer, outer),
        Err(TreeError::HierarchyRequest {
            parent: outer,
            node: outer
        })
    );
    assert!(matches!(
        engine.append_child(text, inner),
        Err(TreeError::HierarchyRequest { .. })
    ));
    let body = engine.body();
    assert!(matches!(
        engine.append_child(outer, body),
        Err(TreeError::HierarchyRequest { .. })
    ));
    assert_eq!(
        engine.remove_child(inner, outer),
        Err(TreeError::NotAChild {
            parent: inner,
            child: outer
        })
    );
    assert_eq!(engine.set_style(text, "width", "1px"), Err(TreeError::NotAnElement(text)));
    assert_eq!(engine.set_text(outer, "x"), Err(TreeError::NotCharacterData(outer)));
    assert_eq!(engine.parent(inner), Some(outer));
}

#[test]
fn appending_an_attached_node_moves_it() {
    let mut engine = Engine::new();
    let a = basic_case(&mut engine);
    let b = basic_case(&mut engine);
    let moved = nth(&engine, a, 0);
    assert_eq!(engine.scroll_height(a), 9900);
    assert_eq!(engine.scroll_height(b), 9900);

    engine.append_child(b, moved).unwrap();
    assert_eq!(engine.parent(moved), Some(b));
    assert_eq!(engine.child_nodes(a).len(), 99);
    assert_eq!(engine.child_nodes(b).len(), 101);
    assert_eq!(engine.child_nodes(b)[100], moved);
    assert_eq!(engine.scroll_height(a), 99 * 99);
    assert_eq!(engine.scroll_height(b), 101 * 99);
    assert!(!window_children(&mut engine, a).contains(&moved));
}

#[test]
fn row_direction_swaps_axes() {
    let mut engine = Engine::new();
    let d = engine.create_element("div");
    for _ in 0..100 {
        let e = sized_div(&mut engine, "99px", "99px");
        engine.append_child(d, e).unwrap();
    }
    engine.set_style(d, "display", "sliver").unwrap();
    engine.set_style(d, "sliverDirection", "row").unwrap();
    engine.set_style(d, "width", "150px").unwrap();
    engine.set_style(d, "height", "100px").unwrap();

    assert_eq!(engine.scroll_width(d), 9900);
    assert_eq!(engine.scroll_height(d), 100);
    engine.scroll_by(d, 300, 0).unwrap();
    engine.scroll_by(d, 0, 300).unwrap();
    assert_eq!(engine.scroll_left(d), 300);
    assert_eq!(engine.scroll_top(d), 0);
    // x = 20 along the main axis: 300 + 20 lies in child 3.
    assert_eq!(engine.hit_test(d, Point::new(20, 50)), Some(nth(&engine, d, 3)));
}

#[test]
fn direction_change_resets_scroll() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    engine.scroll_to(d, 0, 500).unwrap();
    engine.set_style(d, "sliver-direction", "row").unwrap();
    assert_eq!(engine.style(d).unwrap().display, Display::Sliver(Direction::Row));
    assert_eq!(engine.scroll_top(d), 0);
    assert_eq!(engine.scroll_left(d), 0);
    assert_eq!(engine.scroll_width(d), 9900);
}

#[test]
fn unsupported_direction_falls_back_to_column() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    engine.set_style(d, "sliverDirection", "row").unwrap();
    engine.set_style(d, "sliverDirection", "diagonal").unwrap();
    assert_eq!(engine.style(d).unwrap().direction, Direction::Column);
    assert_eq!(engine.scroll_height(d), 9900);
}

#[test]
fn direction_declared_before_display_is_kept() {
    let mut engine = Engine::new();
    let d = engine.create_element("div");
    engine.set_style(d, "sliverDirection", "row").unwrap();
    assert!(!engine.is_sliver(d));
    engine.set_style(d, "display", "sliver").unwrap();
    assert_eq!(engine.sliver(d).map(|s| s.direction()), Some(Direction::Row));
}

#[test]
fn leaving_sliver_display_destroys_state() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    engine.scroll_to(d, 0, 700).unwrap();
    engine.set_style(d, "display", "block").unwrap();
    assert!(!engine.is_sliver(d));
    assert_eq!(engine.scroll_top(d), 0);
    // A non-sliver element reports its own box.
    assert_eq!(engine.scroll_height(d), 150);
    engine.scroll_by(d, 0, 100).unwrap();
    assert_eq!(engine.scroll_top(d), 0);

    engine.set_style(d, "display", "sliver").unwrap();
    assert_eq!(engine.scroll_top(d), 0);
    assert!(!engine.is_measured(d, nth(&engine, d, 7)));
}

#[test]
fn removal_from_tree_resets_sliver_state() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let body = engine.body();
    engine.scroll_by(d, 0, 500).unwrap();
    assert!(engine.is_measured(d, nth(&engine, d, 5)));

    engine.remove_child(body, d).unwrap();
    assert_eq!(engine.parent(d), None);
    engine.append_child(body, d).unwrap();

    assert_eq!(engine.scroll_top(d), 0);
    assert!(!engine.is_measured(d, nth(&engine, d, 5)));
    assert_eq!(engine.scroll_height(d), 9900);
}

#[test]
fn deep_mutation_invalidates_only_the_enclosing_child() {
    let config = EngineConfig::default()
        .with_estimate(Estimate::Fixed)
        .with_estimate_size(16);
    let mut engine = Engine::with_oracle(StyleOracle::default(), config);
    let list = engine.create_element("div");
    engine.set_style(list, "width", "100px").unwrap();
    engine.set_style(list, "height", "50px").unwrap();
    engine.set_style(list, "display", "sliver").unwrap();
    for _ in 0..20 {
        let item = engine.create_element("div");
        let text = engine.create_text("x");
        engine.append_child(item, text).unwrap();
        engine.append_child(list, item).unwrap();
    }
    assert_eq!(engine.scroll_height(list), 20 * 16);
    let first = nth(&engine, list, 0);
    let second = nth(&engine, list, 1);
    assert!(engine.is_measured(list, first));

    let more = engine.create_text("y");
    engine.append_child(first, more).unwrap();
    assert!(!engine.is_measured(list, first));
    assert!(engine.is_measured(list, second));

    assert_eq!(engine.scroll_height(list), 21 * 16);
    assert_eq!(engine.child_offset(list, second), Some(32));

    engine.set_text(more, "").unwrap();
    assert!(!engine.is_measured(list, first));
    assert_eq!(engine.scroll_height(list), 20 * 16);
}

#[test]
fn inline_text_policy_sizes_non_empty_text() {
    let config = EngineConfig::default()
        .with_text_extent(TextExtent::InlineBox)
        .with_estimate(Estimate::Fixed)
        .with_estimate_size(99);
    let mut engine = Engine::with_oracle(StyleOracle::default(), config);
    let d = engine.create_element("div");
    engine.set_style(d, "width", "100px").unwrap();
    engine.set_style(d, "height", "150px").unwrap();
    engine.set_style(d, "display", "sliver").unwrap();
    let text = engine.create_text("Hello");
    let empty = engine.create_text("");
    let comment = engine.create_comment("c");
    for node in [text, empty, comment] {
        engine.append_child(d, node).unwrap();
    }
    for _ in 0..10 {
        let e = sized_div(&mut engine, "99px", "99px");
        engine.append_child(d, e).unwrap();
    }

    assert_eq!(engine.scroll_height(d), 16 + 10 * 99);
    assert_eq!(window_children(&mut engine, d)[0], text);
    assert_eq!(engine.hit_test(d, Point::new(39, 0)), Some(text));
    assert_eq!(engine.hit_test(d, Point::new(40, 0)), None);

    // An empty text node never takes space, whatever the policy.
    engine.set_text(text, "").unwrap();
    assert_eq!(engine.scroll_height(d), 10 * 99);
    engine.set_text(empty, "ab").unwrap();
    assert_eq!(engine.scroll_height(d), 16 + 10 * 99);
}

#[test]
fn dispose_frees_subtree_and_handlers() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let victim = nth(&engine, d, 0);
    let grandchild = engine.first_child(victim).unwrap();
    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    engine
        .on_click(victim, move |_| counter.set(counter.get() + 1))
        .unwrap();

    engine.dispose(victim).unwrap();
    assert!(!engine.tree().contains(victim));
    assert!(!engine.tree().contains(grandchild));
    assert_eq!(engine.child_nodes(d).len(), 99);
    assert_eq!(engine.scroll_height(d), 99 * 99);
    engine.click(d, Point::new(10, 10));
    assert_eq!(clicks.get(), 0);

    assert_eq!(engine.dispose(victim), Err(TreeError::NodeNotFound(victim)));
    assert_eq!(engine.append_child(d, victim), Err(TreeError::NodeNotFound(victim)));
    let body = engine.body();
    assert!(engine.dispose(body).is_err());

    engine.dispose(d).unwrap();
    assert!(!engine.is_sliver(d));
    assert!(engine.child_nodes(body).is_empty());
    assert_eq!(engine.tree().len(), 1);
}

#[test]
fn intersection_changes_follow_the_window() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let children = engine.child_nodes(d).to_vec();
    let log = Rc::new(RefCell::new(Vec::new()));
    for (i, &child) in children.iter().enumerate() {
        let log = log.clone();
        engine
            .on_intersection_change(child, move |ev| {
                log.borrow_mut().push((i, ev.intersection_ratio))
            })
            .unwrap();
    }

    engine.flush();
    assert_eq!(*log.borrow(), [(0, 1.0), (1, 51.0 / 99.0)]);
    log.borrow_mut().clear();

    engine.scroll_to(d, 0, 600).unwrap();
    assert_eq!(
        *log.borrow(),
        [(0, 0.0), (1, 0.0), (6, 93.0 / 99.0), (7, 57.0 / 99.0)]
    );
    log.borrow_mut().clear();

    // No re-windowing, no events.
    engine.scroll_to(d, 0, 600).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn entering_through_the_cache_extent_is_flagged() {
    let config = EngineConfig::default().with_cache_extent(100);
    let mut engine = Engine::with_oracle(StyleOracle::default(), config);
    let d = basic_case(&mut engine);
    let children = engine.child_nodes(d).to_vec();
    let log = Rc::new(RefCell::new(Vec::new()));
    for (i, &child) in children.iter().enumerate() {
        let log = log.clone();
        engine
            .on_intersection_change(child, move |ev| {
                log.borrow_mut().push((i, ev.entered, ev.intersection_ratio))
            })
            .unwrap();
    }

    engine.flush();
    assert_eq!(
        *log.borrow(),
        [(0, true, 1.0), (1, true, 51.0 / 99.0), (2, true, 0.0)]
    );
    log.borrow_mut().clear();

    engine.scroll_to(d, 0, 600).unwrap();
    assert_eq!(
        *log.borrow(),
        [
            (0, false, 0.0),
            (1, false, 0.0),
            (2, false, 0.0),
            (5, true, 0.0),
            (6, true, 93.0 / 99.0),
            (7, true, 57.0 / 99.0),
            (8, true, 0.0),
        ]
    );
}

#[test]
fn leading_empty_children_do_not_blank_the_sliver() {
    let mut engine = Engine::new();
    let d = engine.create_element("div");
    for _ in 0..3 {
        let empty = engine.create_element("div");
        engine.append_child(d, empty).unwrap();
    }
    for _ in 0..97 {
        let e = sized_div(&mut engine, "99px", "99px");
        engine.append_child(d, e).unwrap();
    }
    engine.set_style(d, "display", "sliver").unwrap();
    engine.set_style(d, "width", "100px").unwrap();
    engine.set_style(d, "height", "150px").unwrap();
    let body = engine.body();
    engine.append_child(body, d).unwrap();

    assert_eq!(engine.scroll_height(d), 97 * 99);
    assert_eq!(window_children(&mut engine, d), [nth(&engine, d, 3), nth(&engine, d, 4)]);

    engine.scroll_by(d, 0, 3000).unwrap();
    assert_eq!(engine.scroll_top(d), 3000);
    let hit = engine.hit_test(d, Point::new(50, 20));
    assert_eq!(hit, Some(nth(&engine, d, 33)));
}

#[test]
fn zero_estimate_size_in_config_is_clamped() {
    let config = EngineConfig::default()
        .with_estimate(Estimate::Fixed)
        .with_estimate_size(0);
    assert_eq!(config.estimate_size, 1);

    let mut engine = Engine::with_oracle(StyleOracle::default(), config);
    let d = basic_case(&mut engine);
    assert_eq!(engine.scroll_height(d), 100 * 99);
    assert_eq!(window_children(&mut engine, d).len(), 2);
}

#[test]
fn scroll_to_child_aligns() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    let c10 = nth(&engine, d, 10);
    engine.scroll_to_child(d, c10, Align::Start).unwrap();
    assert_eq!(engine.scroll_top(d), 990);
    assert_eq!(engine.hit_test(d, Point::new(0, 0)), Some(c10));

    let c50 = nth(&engine, d, 50);
    engine.scroll_to_child(d, c50, Align::End).unwrap();
    assert_eq!(engine.scroll_top(d), 51 * 99 - 150);

    let c20 = nth(&engine, d, 20);
    engine.scroll_to_child(d, c20, Align::Center).unwrap();
    assert_eq!(engine.scroll_top(d), 20 * 99 + 49 - 75);

    let stranger = engine.create_element("div");
    assert_eq!(
        engine.scroll_to_child(d, stranger, Align::Start),
        Err(TreeError::NotAChild {
            parent: d,
            child: stranger
        })
    );
    assert_eq!(engine.child_offset(d, nth(&engine, d, 40)), Some(40 * 99));
}

#[test]
fn frame_state_round_trip() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    engine.scroll_to(d, 0, 777).unwrap();
    let frame = engine.frame_state(d).unwrap();
    assert_eq!(frame.scroll.offset, 777);

    engine.scroll_to(d, 0, 0).unwrap();
    engine.restore_frame_state(d, frame).unwrap();
    assert_eq!(engine.scroll_top(d), 777);
    let body = engine.body();
    assert_eq!(engine.frame_state(body), None);
}

#[test]
fn style_parsing() {
    assert_eq!(parse_length("99px"), Some(Length::Px(99)));
    assert_eq!(parse_length(" 99PX "), Some(Length::Px(99)));
    assert_eq!(parse_length("12.6px"), Some(Length::Px(13)));
    assert_eq!(parse_length("40"), Some(Length::Px(40)));
    assert_eq!(parse_length("auto"), Some(Length::Auto));
    assert_eq!(parse_length(""), Some(Length::Auto));
    assert_eq!(parse_length("-5px"), None);
    assert_eq!(parse_length("wide"), None);

    assert_eq!(parse_display("sliver", Direction::Row), Display::Sliver(Direction::Row));
    assert_eq!(parse_display(" NONE ", Direction::Column), Display::None);
    assert_eq!(parse_display("flex", Direction::Column), Display::Normal);
    assert_eq!(parse_direction("Row"), Direction::Row);
    assert_eq!(parse_direction("sideways"), Direction::Column);

    assert_eq!(StyleProperty::from_name("sliver-direction"), Some(StyleProperty::SliverDirection));
    assert_eq!(StyleProperty::from_name("background"), None);
}

#[test]
fn ignored_style_declarations() {
    let mut engine = Engine::new();
    let d = basic_case(&mut engine);
    engine.set_style(d, "background", "red").unwrap();
    engine.set_style(d, "height", "tall").unwrap();
    assert_eq!(engine.style(d).unwrap().height, Length::Px(150));
    assert_eq!(engine.scroll_height(d), 9900);

    let missing = engine.create_element("div");
    engine.dispose(missing).unwrap();
    assert_eq!(
        engine.set_style(missing, "display", "sliver"),
        Err(TreeError::NodeNotFound(missing))
    );
    assert_eq!(engine.scroll_by(missing, 0, 1), Err(TreeError::NodeNotFound(missing)));
}

#[test]
fn non_sliver_elements_do_not_scroll() {
    let mut engine = Engine::new();
    let e = sized_div(&mut engine, "30px", "40px");
    engine.scroll_by(e, 0, 10).unwrap();
    assert_eq!(engine.scroll_top(e), 0);
    assert_eq!(engine.scroll_height(e), 40);
    assert_eq!(engine.scroll_width(e), 30);
    assert_eq!(engine.layout_window(e), None);
}

#[test]
fn closure_oracle_is_only_asked_about_realized_children() {
    let asked = Rc::new(Cell::new(0usize));
    let counter = asked.clone();
    let oracle = move |tree: &NodeTree, node: NodeId| -> Option<BoxSize> {
        match tree.get(node)?.tag()? {
            "list" => Some(BoxSize::new(300, 400)),
            _ => {
                counter.set(counter.get() + 1);
                Some(BoxSize::new(300, 40))
            }
        }
    };
    let mut engine = Engine::with_oracle(oracle, EngineConfig::default());
    let list = engine.create_element("list");
    engine
        .set_display(list, Display::Sliver(Direction::Column))
        .unwrap();
    for _ in 0..10_000 {
        let item = engine.create_element("item");
        engine.append_child(list, item).unwrap();
    }

    assert_eq!(engine.scroll_height(list), 400_000);
    assert!(asked.get() <= 12, "asked about {} children", asked.get());

    asked.set(0);
    engine.scroll_to(list, 0, 200_000).unwrap();
    assert!(asked.get() <= 12, "asked about {} children", asked.get());
    assert_eq!(window_children(&mut engine, list).len(), 10);
}

#[test]
fn random_mutations_keep_window_consistent() {
    let mut rng = Lcg::new(0xd0d0);
    let mut engine = Engine::new();
    let list = engine.create_element("div");
    engine.set_style(list, "display", "sliver").unwrap();
    engine.set_style(list, "width", "120px").unwrap();
    engine.set_style(list, "height", "200px").unwrap();
    let body = engine.body();
    engine.append_child(body, list).unwrap();

    let mut model: Vec<NodeId> = Vec::new();
    for _ in 0..400 {
        match rng.gen_range_usize(0, 7) {
            0 | 1 => {
                let height = rng.gen_range_u64(1, 120);
                let node = sized_div(&mut engine, "100px", &format!("{height}px"));
                let at = rng.gen_range_usize(0, model.len() + 1);
                engine.insert_before(list, node, model.get(at).copied()).unwrap();
                model.insert(at, node);
            }
            2 => {
                let node = if rng.gen_bool() {
                    engine.create_text(if rng.gen_bool() { "abc" } else { "" })
                } else {
                    engine.create_comment("c")
                };
                let at = rng.gen_range_usize(0, model.len() + 1);
                engine.insert_before(list, node, model.get(at).copied()).unwrap();
                model.insert(at, node);
            }
            3 if !model.is_empty() => {
                let at = rng.gen_range_usize(0, model.len());
                let node = model.remove(at);
                engine.remove_child(list, node).unwrap();
            }
            4 if !model.is_empty() => {
                let node = model[rng.gen_range_usize(0, model.len())];
                if let Some(style) = engine.style(node).copied() {
                    let value = if style.display.is_none() { "block" } else { "none" };
                    engine.set_style(node, "display", value).unwrap();
                }
            }
            _ => {
                let height = engine.scroll_height(list);
                let y = rng.gen_range_u64(0, height + 100) as i64;
                engine.scroll_to(list, 0, y).unwrap();
            }
        }

        assert_eq!(engine.child_nodes(list), &model[..]);

        let height = engine.scroll_height(list);
        let top = engine.scroll_top(list);
        assert!(top <= height.saturating_sub(200));

        let entries = engine.layout_window(list).unwrap().entries().to_vec();
        for pair in entries.windows(2) {
            assert!(pair[0].index < pair[1].index);
            assert_eq!(pair[0].end(), pair[1].offset);
        }
        for entry in &entries {
            assert_eq!(model[entry.index], entry.key);
            assert_eq!(engine.kind(entry.key), Some(NodeKind::Element));
            assert!(!engine.style(entry.key).unwrap().display.is_none());
            assert_eq!(engine.child_offset(list, entry.key), Some(entry.offset));
            assert!(entry.offset < top + 200 && entry.end() > top);
        }
    }
}
