use sliver::{Direction, Rect};

use crate::{Display, NodeId, NodeKind, NodeTree};

/// A border-box size in physical axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxSize {
    pub width: u32,
    pub height: u32,
}

impl BoxSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn main(self, direction: Direction) -> u32 {
        match direction {
            Direction::Column => self.height,
            Direction::Row => self.width,
        }
    }

    pub fn cross(self, direction: Direction) -> u32 {
        match direction {
            Direction::Column => self.width,
            Direction::Row => self.height,
        }
    }

    pub fn to_rect(self, direction: Direction) -> Rect {
        Rect {
            main: self.main(direction),
            cross: self.cross(direction),
        }
    }
}

/// The external layout/style system, queried on demand for computed box sizes.
///
/// The engine calls this for sliver containers (to get their viewport) and for sliver children
/// entering the window. It is never asked about every child up front.
pub trait LayoutOracle {
    /// `None` when the node produces no box.
    fn box_size(&self, tree: &NodeTree, node: NodeId) -> Option<BoxSize>;
}

impl<F> LayoutOracle for F
where
    F: Fn(&NodeTree, NodeId) -> Option<BoxSize>,
{
    fn box_size(&self, tree: &NodeTree, node: NodeId) -> Option<BoxSize> {
        self(tree, node)
    }
}

/// A minimal oracle driven by element styles.
///
/// - elements use their explicit `width`/`height`; an `auto` side wraps the children, stacked
///   along the block axis (or along a sliver's main axis),
/// - `display: none` elements, comments and empty text produce no box,
/// - text is one line of fixed-width glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleOracle {
    pub glyph_width: u32,
    pub line_height: u32,
}

impl Default for StyleOracle {
    fn default() -> Self {
        Self {
            glyph_width: 8,
            line_height: 16,
        }
    }
}

impl LayoutOracle for StyleOracle {
    fn box_size(&self, tree: &NodeTree, node: NodeId) -> Option<BoxSize> {
        let n = tree.get(node)?;
        match n.kind() {
            NodeKind::Comment => None,
            NodeKind::Text => {
                let text = n.text()?;
                if text.is_empty() {
                    return None;
                }
                let glyphs = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                Some(BoxSize::new(
                    glyphs.saturating_mul(self.glyph_width),
                    self.line_height,
                ))
            }
            NodeKind::Element => {
                let style = n.style()?;
                let stacking = match style.display {
                    Display::None => return None,
                    Display::Sliver(direction) => direction,
                    Display::Normal => Direction::Column,
                };
                let (width, height) = (style.width.px(), style.height.px());
                if let (Some(width), Some(height)) = (width, height) {
                    return Some(BoxSize::new(width, height));
                }

                let mut main = 0u32;
                let mut cross = 0u32;
                for &child in n.children() {
                    if let Some(b) = self.box_size(tree, child) {
                        main = main.saturating_add(b.main(stacking));
                        cross = cross.max(b.cross(stacking));
                    }
                }
                let content = match stacking {
                    Direction::Column => BoxSize::new(cross, main),
                    Direction::Row => BoxSize::new(main, cross),
                };
                Some(BoxSize::new(
                    width.unwrap_or(content.width),
                    height.unwrap_or(content.height),
                ))
            }
        }
    }
}
