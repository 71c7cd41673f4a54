//! An arena-backed node tree implementing [`Host`], for use outside the browser.
//!
//! Every [`Host::insert_before`] that changes the tree is counted, which makes [`Document::insertions`]
//! a direct measure of how much work a hydration pass did.

use crate::host::{ClaimOrder, Cursor, Host};
use core::fmt::{self, Display, Formatter};
use hashbrown::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Element(String),
	Text(String),
}

#[derive(Debug)]
struct NodeData {
	kind: NodeKind,
	attributes: Vec<(String, String)>,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	claim_order: Option<ClaimOrder>,
	cursor: Cursor<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// The insertion would make a node its own ancestor.
	HierarchyRequest,
	/// The anchor is not a child of the parent.
	NotAChild,
	/// A text operation was applied to an element.
	NotText,
	/// A text split point is out of range or not on a char boundary.
	IndexSize,
}
impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::HierarchyRequest => write!(f, "The new child is an ancestor of the parent."),
			Self::NotAChild => write!(f, "The anchor is not a child of the parent."),
			Self::NotText => write!(f, "The node is not a text node."),
			Self::IndexSize => write!(f, "The split offset is out of range."),
		}
	}
}
impl std::error::Error for Error {}

/// A tree of element and text nodes.
///
/// Nodes are never freed. Detached nodes simply have no parent.
/// There are no namespaces, so SVG elements are plain elements here.
#[derive(Debug, Default)]
pub struct Document {
	nodes: Vec<NodeData>,
	reconciled: HashSet<NodeId>,
	insertions: usize,
}
impl Document {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	fn create(&mut self, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(NodeData {
			kind,
			attributes: Vec::new(),
			parent: None,
			children: Vec::new(),
			claim_order: None,
			cursor: Cursor::Unset,
		});
		id
	}

	pub fn create_element(&mut self, name: &str) -> NodeId {
		self.create(NodeKind::Element(name.to_owned()))
	}

	pub fn create_text(&mut self, data: &str) -> NodeId {
		self.create(NodeKind::Text(data.to_owned()))
	}

	#[must_use]
	pub fn kind(&self, node: NodeId) -> &NodeKind {
		&self.nodes[node.0].kind
	}

	/// Sets or replaces an attribute. Attributes keep their insertion order.
	pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
		let attributes = &mut self.nodes[node.0].attributes;
		match attributes.iter_mut().find(|(n, _)| n == name) {
			Some((_, v)) => *v = value.to_owned(),
			None => attributes.push((name.to_owned(), value.to_owned())),
		}
	}

	#[must_use]
	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		self.nodes[node.0].attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
	}

	#[must_use]
	pub fn children_of(&self, parent: NodeId) -> &[NodeId] {
		&self.nodes[parent.0].children
	}

	/// The claim orders of `parent`'s children, in document order.
	#[must_use]
	pub fn claim_orders(&self, parent: NodeId) -> Vec<Option<ClaimOrder>> {
		self.children_of(parent).iter().map(|child| self.nodes[child.0].claim_order).collect()
	}

	/// Count of [`Host::insert_before`] calls that changed the tree.
	///
	/// Inserting a node before itself is a no-op and isn't counted.
	#[must_use]
	pub fn insertions(&self) -> usize {
		self.insertions
	}

	/// Appends `child` to `parent` while building a tree. Not counted as insertion.
	///
	/// # Panics
	///
	/// Iff `child` is `parent` or one of its ancestors.
	pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
		assert!(!self.is_inclusive_ancestor(child, parent), "Tried to append {:?} into its own descendant {:?}", child, parent);
		self.detach(child);
		self.nodes[parent.0].children.push(child);
		self.nodes[child.0].parent = Some(parent);
	}

	/// Splits a text node at byte `offset`, like ***Text.splitText()***.
	///
	/// The remainder becomes a new text node right after `text` and is returned.
	///
	/// # Errors
	///
	/// Iff `text` is not a text node, or `offset` is past its end or not on a char boundary.
	pub fn split_text_at(&mut self, text: NodeId, offset: usize) -> Result<NodeId, Error> {
		let rest = match &mut self.nodes[text.0].kind {
			NodeKind::Text(data) if data.is_char_boundary(offset) => data.split_off(offset),
			NodeKind::Text(_) => return Err(Error::IndexSize),
			NodeKind::Element(_) => return Err(Error::NotText),
		};
		let rest = self.create_text(&rest);
		if let Some(parent) = self.nodes[text.0].parent {
			let siblings = &mut self.nodes[parent.0].children;
			let at = siblings.iter().position(|&sibling| sibling == text).map_or(siblings.len(), |i| i + 1);
			siblings.insert(at, rest);
			self.nodes[rest.0].parent = Some(parent);
		}
		Ok(rest)
	}

	fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
		loop {
			if node == ancestor {
				return true;
			}
			match self.nodes[node.0].parent {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}

	fn detach(&mut self, node: NodeId) {
		if let Some(parent) = self.nodes[node.0].parent.take() {
			self.nodes[parent.0].children.retain(|&child| child != node);
		}
	}
}

impl Host for Document {
	type Node = NodeId;
	type Error = Error;

	fn child_nodes(&self, parent: &NodeId) -> Vec<NodeId> {
		self.children_of(*parent).to_vec()
	}

	fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
		self.nodes[node.0].parent
	}

	fn first_child(&self, parent: &NodeId) -> Option<NodeId> {
		self.children_of(*parent).first().copied()
	}

	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		let parent = self.nodes[node.0].parent?;
		let siblings = self.children_of(parent);
		let i = siblings.iter().position(|sibling| sibling == node)?;
		siblings.get(i + 1).copied()
	}

	fn insert_before(&mut self, parent: &NodeId, node: &NodeId, anchor: Option<&NodeId>) -> Result<(), Error> {
		let (parent, node) = (*parent, *node);
		if self.is_inclusive_ancestor(node, parent) {
			return Err(Error::HierarchyRequest);
		}
		if let Some(&anchor) = anchor {
			if self.nodes[anchor.0].parent != Some(parent) {
				return Err(Error::NotAChild);
			}
		}

		if anchor == Some(&node) {
			return Ok(());
		}

		self.detach(node);
		let children = &mut self.nodes[parent.0].children;
		let at = match anchor {
			Some(anchor) => children.iter().position(|child| child == anchor).ok_or(Error::NotAChild)?,
			None => children.len(),
		};
		children.insert(at, node);
		self.nodes[node.0].parent = Some(parent);
		self.insertions += 1;
		Ok(())
	}

	fn remove(&mut self, node: &NodeId) -> Result<(), Error> {
		self.detach(*node);
		Ok(())
	}

	fn node_name(&self, node: &NodeId) -> String {
		match self.kind(*node) {
			NodeKind::Element(name) => name.clone(),
			NodeKind::Text(_) => "#text".to_owned(),
		}
	}

	fn attribute_names(&self, node: &NodeId) -> Vec<String> {
		self.nodes[node.0].attributes.iter().map(|(name, _)| name.clone()).collect()
	}

	fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), Error> {
		self.nodes[node.0].attributes.retain(|(n, _)| n != name);
		Ok(())
	}

	fn text_data(&self, node: &NodeId) -> Option<String> {
		match self.kind(*node) {
			NodeKind::Text(data) => Some(data.clone()),
			NodeKind::Element(_) => None,
		}
	}

	fn set_text_data(&mut self, node: &NodeId, data: &str) {
		if let NodeKind::Text(current) = &mut self.nodes[node.0].kind {
			*current = data.to_owned();
		}
	}

	fn split_text(&mut self, text: &NodeId, prefix: &str) -> Result<NodeId, Error> {
		self.split_text_at(*text, prefix.len())
	}

	fn create_element(&mut self, name: &str) -> Result<NodeId, Error> {
		Ok(Document::create_element(self, name))
	}

	fn create_svg_element(&mut self, name: &str) -> Result<NodeId, Error> {
		Ok(Document::create_element(self, name))
	}

	fn create_text(&mut self, data: &str) -> NodeId {
		Document::create_text(self, data)
	}

	fn claim_order(&self, node: &NodeId) -> Option<ClaimOrder> {
		self.nodes[node.0].claim_order
	}

	fn set_claim_order(&mut self, node: &NodeId, claim_order: ClaimOrder) {
		self.nodes[node.0].claim_order = Some(claim_order);
	}

	fn is_reconciled(&self, container: &NodeId) -> bool {
		self.reconciled.contains(container)
	}

	fn mark_reconciled(&mut self, container: &NodeId) {
		self.reconciled.insert(*container);
	}

	fn cursor(&self, container: &NodeId) -> Cursor<NodeId> {
		self.nodes[container.0].cursor.clone()
	}

	fn set_cursor(&mut self, container: &NodeId, cursor: Cursor<NodeId>) {
		self.nodes[container.0].cursor = cursor;
	}
}
