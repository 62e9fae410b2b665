//! Depth-first traversal and position lookup over [`Node`] views.

use crate::ast::Node;
use crate::span::Position;

/// Walks `root` and its descendants in pre-order, source order.
///
/// Returning `false` from `visitor` skips the children of that node. The walk keeps its own
/// stack, so deeply nested trees do not recurse.
pub fn walk<'a>(root: impl Into<Node<'a>>, visitor: &mut impl FnMut(Node<'a>) -> bool) {
    let mut stack = vec![root.into()];
    while let Some(node) = stack.pop() {
        if visitor(node) {
            stack.extend(node.semantic_children().into_iter().rev());
        }
    }
}

/// A node together with its ancestors, outermost first.
#[derive(Debug, Clone)]
pub struct NodePath<'a> {
    pub node: Node<'a>,
    pub parents: Vec<Node<'a>>,
}

impl<'a> NodePath<'a> {
    /// The direct parent, if the node is not the root.
    pub fn parent(&self) -> Option<Node<'a>> {
        self.parents.last().copied()
    }

    /// Ancestors from the direct parent outwards.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> + '_ {
        self.parents.iter().rev().copied()
    }
}

/// Finds the innermost node whose span contains `pos`.
///
/// Zero-width nodes (missing tokens, empty blocks) are never matched, so an empty chunk
/// yields `None` for every position.
///
/// ```text
/// for i = 1, 100 do j = j + i end
///                   ^ pos
/// node:    Identifier `j`
/// parents: [Block, NumericForStat, Block, AssignStat]
/// ```
pub fn locate<'a>(root: impl Into<Node<'a>>, pos: Position) -> Option<NodePath<'a>> {
    let covers = |node: &Node<'_>| {
        let span = node.span();
        !span.is_empty() && span.contains(pos)
    };

    let mut node = root.into();
    if !covers(&node) {
        return None;
    }

    let mut parents = Vec::new();
    while let Some(child) = node.semantic_children().into_iter().find(covers) {
        parents.push(node);
        node = child;
    }
    Some(NodePath { node, parents })
}
