use alloc::string::{String, ToString};
use alloc::vec::Vec;

use slotmap::{SlotMap, new_key_type};

use crate::{Result, Style, TreeError};

new_key_type! {
    /// Handle of a node in a [`NodeTree`]. Stable across insertions and removals.
    pub struct NodeId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

#[derive(Clone, Debug)]
enum NodeData {
    Element { tag: String, style: Style },
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug)]
pub struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match &self.data {
            NodeData::Element { style, .. } => Some(style),
            _ => None,
        }
    }

    /// Character data of a text or comment node.
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(data) | NodeData::Comment(data) => Some(data.as_str()),
            NodeData::Element { .. } => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Position a node was detached from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detached {
    pub parent: NodeId,
    pub index: usize,
}

/// Outcome of a successful (non no-op) insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inserted {
    /// Index of the node among its new parent's children.
    pub index: usize,
    /// Where the node was moved from, if it had a parent.
    pub detached: Option<Detached>,
}

/// Arena of nodes with ordered children and parent back-links.
///
/// Child order reflects mutations verbatim whatever the node kind; nothing here looks at
/// styles.
#[derive(Clone, Debug, Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, Node>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.insert(Node::new(NodeData::Element {
            tag: tag.to_string(),
            style: Style::default(),
        }))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.nodes.insert(Node::new(NodeData::Text(data.to_string())))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.nodes.insert(Node::new(NodeData::Comment(data.to_string())))
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(Node::kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children in order. Empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        if self.parent(child) != Some(parent) {
            return None;
        }
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// `id` and all its descendants, in tree order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = alloc::vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.children(cur).iter().rev().copied());
        }
        out
    }

    pub fn style(&self, id: NodeId) -> Option<&Style> {
        self.nodes.get(id).and_then(Node::style)
    }

    pub(crate) fn style_mut(&mut self, id: NodeId) -> Result<&mut Style> {
        match &mut self.nodes.get_mut(id).ok_or(TreeError::NodeNotFound(id))?.data {
            NodeData::Element { style, .. } => Ok(style),
            _ => Err(TreeError::NotAnElement(id)),
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(Node::text)
    }

    /// Replaces the data of a text or comment node. Returns whether it changed.
    pub fn set_text(&mut self, id: NodeId, data: &str) -> Result<bool> {
        match &mut self.nodes.get_mut(id).ok_or(TreeError::NodeNotFound(id))?.data {
            NodeData::Text(cur) | NodeData::Comment(cur) => {
                if cur.as_str() == data {
                    return Ok(false);
                }
                cur.clear();
                cur.push_str(data);
                Ok(true)
            }
            NodeData::Element { .. } => Err(TreeError::NotCharacterData(id)),
        }
    }

    /// Inserts `node` into `parent` before `reference` (at the end when `None`), moving it out
    /// of its current parent first.
    ///
    /// Returns `Ok(None)` when nothing changed (`reference == node`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<Option<Inserted>> {
        let parent_node = self.node(parent)?;
        self.node(node)?;
        if parent_node.kind() != NodeKind::Element || self.is_inclusive_ancestor(node, parent) {
            return Err(TreeError::HierarchyRequest { parent, node });
        }
        if let Some(reference) = reference {
            if self.index_of(parent, reference).is_none() {
                return Err(TreeError::InvalidReference { parent, reference });
            }
            if reference == node {
                return Ok(None);
            }
        }

        let detached = self.detach(node);
        let children = &self.nodes[parent].children;
        let index = match reference {
            Some(reference) => children
                .iter()
                .position(|&c| c == reference)
                .unwrap_or(children.len()),
            None => children.len(),
        };
        self.nodes[parent].children.insert(index, node);
        self.nodes[node].parent = Some(parent);
        dlog!(trace, ?parent, ?node, index, moved = detached.is_some(), "tree: insert");
        Ok(Some(Inserted { index, detached }))
    }

    /// Removes `node` from `parent`'s children. Returns the index it occupied.
    pub fn remove_child(&mut self, parent: NodeId, node: NodeId) -> Result<usize> {
        self.node(parent)?;
        self.node(node)?;
        if self.parent(node) != Some(parent) {
            return Err(TreeError::NotAChild {
                parent,
                child: node,
            });
        }
        self.detach(node)
            .map(|d| d.index)
            .ok_or(TreeError::NotAChild {
                parent,
                child: node,
            })
    }

    pub(crate) fn detach(&mut self, node: NodeId) -> Option<Detached> {
        let parent = self.nodes.get_mut(node)?.parent.take()?;
        let children = &mut self.nodes.get_mut(parent)?.children;
        let index = children.iter().position(|&c| c == node)?;
        children.remove(index);
        dlog!(trace, ?parent, ?node, index, "tree: detach");
        Some(Detached { parent, index })
    }

    /// Frees a detached subtree. Returns the freed ids in tree order.
    pub(crate) fn free(&mut self, root: NodeId) -> Vec<NodeId> {
        debug_assert!(self.parent(root).is_none(), "freeing an attached subtree");
        let ids = self.descendants(root);
        for &id in &ids {
            self.nodes.remove(id);
        }
        ids
    }
}
