//! Arena-backed syntax tree.
//!
//! Nodes live in a flat `Vec` owned by [`SyntaxTree`] and refer to each other
//! by [`NodeId`]. The parent link is a plain index, so walking upwards is O(1)
//! and the tree has no reference cycles. Tokens are leaf nodes; trivia is not
//! materialized but is accounted for in each node's full range.

use std::fmt;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::SyntaxKind;
use crate::parser::ParseError;

/// Stable index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The compilation unit.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    /// Range without leading/trailing trivia.
    pub(crate) range: TextRange,
    /// Range including leading trivia and same-line trailing trivia.
    pub(crate) full_range: TextRange,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) name: Option<SmolStr>,
}

/// An immutable syntax tree together with the text it was parsed from.
pub struct SyntaxTree {
    text: String,
    nodes: Vec<NodeData>,
    errors: Vec<ParseError>,
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("len", &self.text.len())
            .field("nodes", &self.nodes.len())
            .field("errors", &self.errors.len())
            .finish()
    }
}

impl SyntaxTree {
    pub(crate) fn new(text: String, nodes: Vec<NodeData>, errors: Vec<ParseError>) -> Self {
        Self {
            text,
            nodes,
            errors,
        }
    }

    /// Parses `text` into a tree.
    #[must_use]
    pub fn parse(text: impl Into<String>) -> Self {
        crate::parser::parse(text.into())
    }

    /// The source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The compilation unit node.
    #[must_use]
    pub fn root(&self) -> SyntaxNode<'_> {
        self.node(NodeId::ROOT)
    }

    /// Returns a handle for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        assert!(id.index() < self.nodes.len(), "node {id:?} is not part of this tree");
        SyntaxNode { tree: self, id }
    }

    /// Returns a handle for `id` if it belongs to this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<SyntaxNode<'_>> {
        (id.index() < self.nodes.len()).then_some(SyntaxNode { tree: self, id })
    }

    /// Parse errors, in source order of detection.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Returns `true` if parsing produced no errors.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of nodes, tokens included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the slice of the source covered by `range`.
    #[must_use]
    pub fn slice(&self, range: TextRange) -> &str {
        &self.text[range]
    }

    /// Innermost node (token leaves included) whose range contains `offset`.
    ///
    /// A position right after the last character of a token still counts as
    /// inside it, so a cursor at `Foo|(` finds `Foo`.
    #[must_use]
    pub fn covering_element(&self, offset: TextSize) -> SyntaxNode<'_> {
        let mut current = self.root();
        loop {
            let children = &self.nodes[current.id.index()].children;
            let next = children
                .iter()
                .map(|&id| self.node(id))
                .find(|child| child.text_range().contains(offset))
                .or_else(|| {
                    children
                        .iter()
                        .map(|&id| self.node(id))
                        .find(|child| child.text_range().contains_inclusive(offset))
                });
            match next {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Innermost ancestor-or-self of the element at `offset` whose kind is in `kinds`.
    #[must_use]
    pub fn find_node_at(&self, offset: TextSize, kinds: &[SyntaxKind]) -> Option<SyntaxNode<'_>> {
        self.covering_element(offset)
            .ancestors()
            .find(|node| node.is_kind_in(kinds))
    }

    /// Smallest node whose range covers `range`.
    #[must_use]
    pub fn covering_node(&self, range: TextRange) -> SyntaxNode<'_> {
        let mut node = self.covering_element(range.start());
        while !node.text_range().contains_range(range) {
            match node.parent() {
                Some(parent) => node = parent,
                None => break,
            }
        }
        node
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// A cheap, copyable handle to a node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl<'t> SyntaxNode<'t> {
    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }

    /// The tree this node belongs to.
    #[must_use]
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// Stable id, usable across calls on the same tree.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    /// Returns `true` if this is a token leaf.
    #[must_use]
    pub fn is_token(&self) -> bool {
        self.kind().is_token()
    }

    /// Exact membership test against a set of kinds.
    #[must_use]
    pub fn is_kind_in(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.kind())
    }

    /// Range without surrounding trivia.
    #[must_use]
    pub fn text_range(&self) -> TextRange {
        self.data().range
    }

    /// Range including leading trivia and trailing same-line trivia.
    #[must_use]
    pub fn full_range(&self) -> TextRange {
        self.data().full_range
    }

    /// Source text of [`Self::text_range`].
    #[must_use]
    pub fn text(&self) -> &'t str {
        &self.tree.text[self.text_range()]
    }

    /// Source text of [`Self::full_range`].
    #[must_use]
    pub fn full_text(&self) -> &'t str {
        &self.tree.text[self.full_range()]
    }

    /// Cached declaration name, as written (quotes kept).
    #[must_use]
    pub fn name(&self) -> Option<&'t str> {
        self.data().name.as_deref()
    }

    /// Enclosing node.
    #[must_use]
    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    /// All children, tokens included, in source order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| tree.node(id))
    }

    /// Composite children only.
    pub fn child_nodes(&self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + 't {
        self.children().filter(|child| child.kind().is_node())
    }

    /// Token children only.
    pub fn child_tokens(&self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + 't {
        self.children().filter(|child| child.kind().is_token())
    }

    /// Children of exactly `kind`.
    pub fn children_of_kind(
        &self,
        kind: SyntaxKind,
    ) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + 't {
        self.children().filter(move |child| child.kind() == kind)
    }

    /// First child of `kind`.
    #[must_use]
    pub fn first_child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|child| child.kind() == kind)
    }

    /// Last child of `kind`.
    #[must_use]
    pub fn last_child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.children().rev().find(|child| child.kind() == kind)
    }

    /// First child whose kind is in `kinds`.
    #[must_use]
    pub fn first_child_in(&self, kinds: &[SyntaxKind]) -> Option<SyntaxNode<'t>> {
        self.children().find(|child| child.is_kind_in(kinds))
    }

    /// First child.
    #[must_use]
    pub fn first_child(&self) -> Option<SyntaxNode<'t>> {
        self.children().next()
    }

    /// Last child.
    #[must_use]
    pub fn last_child(&self) -> Option<SyntaxNode<'t>> {
        self.children().next_back()
    }

    /// Position of this node in its parent's children.
    fn index_in_parent(&self) -> Option<(SyntaxNode<'t>, usize)> {
        let parent = self.parent()?;
        let index = parent.data().children.iter().position(|&id| id == self.id)?;
        Some((parent, index))
    }

    /// Next sibling, tokens included.
    #[must_use]
    pub fn next_sibling(&self) -> Option<SyntaxNode<'t>> {
        let (parent, index) = self.index_in_parent()?;
        parent
            .data()
            .children
            .get(index + 1)
            .map(|&id| self.tree.node(id))
    }

    /// Previous sibling, tokens included.
    #[must_use]
    pub fn prev_sibling(&self) -> Option<SyntaxNode<'t>> {
        let (parent, index) = self.index_in_parent()?;
        let prev = index.checked_sub(1)?;
        parent.data().children.get(prev).map(|&id| self.tree.node(id))
    }

    /// This node and all its ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        std::iter::successors(Some(*self), SyntaxNode::parent)
    }

    /// This node and all descendants in preorder.
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        let mut stack = vec![self.id];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(tree.data(id).children.iter().rev());
            Some(tree.node(id))
        })
    }

    /// Descendants whose kind is in `kinds`, in source order.
    ///
    /// With `recurse_into_matches = false` the search does not descend into a
    /// node that already matched, so nested matches are skipped.
    #[must_use]
    pub fn collect_descendants(
        &self,
        kinds: &[SyntaxKind],
        recurse_into_matches: bool,
    ) -> Vec<SyntaxNode<'t>> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.data().children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.tree.node(id);
            let matched = node.is_kind_in(kinds);
            if matched {
                found.push(node);
            }
            if !matched || recurse_into_matches {
                stack.extend(node.data().children.iter().rev());
            }
        }
        found
    }

    /// Innermost enclosing node of one of `kinds`, self excluded.
    #[must_use]
    pub fn ancestor_in(&self, kinds: &[SyntaxKind]) -> Option<SyntaxNode<'t>> {
        self.ancestors().skip(1).find(|node| node.is_kind_in(kinds))
    }

    /// First token leaf in this subtree.
    #[must_use]
    pub fn first_token(&self) -> Option<SyntaxNode<'t>> {
        self.descendants().find(SyntaxNode::is_token)
    }

    /// Last token leaf in this subtree.
    #[must_use]
    pub fn last_token(&self) -> Option<SyntaxNode<'t>> {
        let mut node = *self;
        loop {
            if node.is_token() {
                return Some(node);
            }
            node = node.last_child()?;
        }
    }

    /// First direct token child of `kind`.
    #[must_use]
    pub fn token_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        debug_assert!(kind.is_token());
        self.first_child_of_kind(kind)
    }
}

/// Strips the double quotes of a quoted identifier.
#[must_use]
pub fn unquote(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(name)
}

/// Compares two identifiers the way AL does: case-insensitive, quotes ignored.
#[must_use]
pub fn names_equal(left: &str, right: &str) -> bool {
    unquote(left).eq_ignore_ascii_case(unquote(right))
}
