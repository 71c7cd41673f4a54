//! The DOM surface that reconciliation and hydration run against.
//!
//! [`Host`] is implemented for [`web_sys::Node`](https://docs.rs/web-sys/0.3/web_sys/struct.Node.html) handles
//! by `web::WebHost` on `wasm32`, and for an arena tree by [`memory::Document`](`crate::memory::Document`).

use core::fmt::Debug;

/// Position of a node in the renderer's intended child order, assigned when the node is claimed.
///
/// Claim orders are handed out by a monotonic counter ([`ClaimList`](`crate::claim::ClaimList`)), so within a
/// container they are distinct.
pub type ClaimOrder = u32;

/// A node handle paired with its claim order.
///
/// `claim_order` is [`None`] for nodes the renderer never claimed (i.e. content of a shared `<head>`
/// that belongs to someone else). Those nodes are not part of the ordering problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claimed<N> {
	pub node: N,
	pub claim_order: Option<ClaimOrder>,
}
impl<N> Claimed<N> {
	#[must_use]
	pub fn new(node: N, claim_order: Option<ClaimOrder>) -> Self {
		Self { node, claim_order }
	}

	#[must_use]
	pub fn is_ordered(&self) -> bool {
		self.claim_order.is_some()
	}
}

/// Where the next node appended during hydration should land within a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor<N> {
	/// Not positioned yet. Resolves to the container's first child.
	Unset,
	/// After the last child.
	End,
	/// Before this child.
	Before(N),
}
impl<N> Default for Cursor<N> {
	fn default() -> Self {
		Self::Unset
	}
}
impl<N> From<Option<N>> for Cursor<N> {
	fn from(next: Option<N>) -> Self {
		match next {
			Some(node) => Self::Before(node),
			None => Self::End,
		}
	}
}

/// Tree access and mutation needed by [`reconcile`](`crate::reconcile::reconcile`) and [`Hydration`](`crate::hydrate::Hydration`).
///
/// Besides the tree itself, a host stores three pieces of per-node bookkeeping:
/// the claim order, the one-shot "reconciled" flag and the hydration [`Cursor`] of containers.
pub trait Host {
	type Node: Clone + PartialEq + Debug;
	type Error: Debug;

	fn child_nodes(&self, parent: &Self::Node) -> Vec<Self::Node>;
	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
	fn first_child(&self, parent: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Inserts `node` into `parent` before `anchor`, or as last child if `anchor` is [`None`].
	///
	/// If `node` is already in the tree, it is moved.
	///
	/// # Errors
	///
	/// Iff the host rejects the insertion, e.g. because `anchor` is not a child of `parent`.
	fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, anchor: Option<&Self::Node>) -> Result<(), Self::Error>;

	/// Removes `node` from its parent. Nodes without parent are left alone.
	///
	/// # Errors
	///
	/// Iff the host rejects the removal.
	fn remove(&mut self, node: &Self::Node) -> Result<(), Self::Error>;

	/// The node's ***nodeName***, i.e. the tag name of elements or `"#text"`.
	fn node_name(&self, node: &Self::Node) -> String;

	/// Names of the attributes of an element. Empty for other nodes.
	fn attribute_names(&self, node: &Self::Node) -> Vec<String>;

	/// # Errors
	///
	/// Iff the host rejects the removal.
	fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), Self::Error>;

	/// The data of a text node, or [`None`] for any other node.
	fn text_data(&self, node: &Self::Node) -> Option<String>;

	/// Replaces the data of a text node. Other nodes are left alone.
	fn set_text_data(&mut self, node: &Self::Node, data: &str);

	/// Splits a text node right after `prefix`, which its data must start with.
	///
	/// The remainder becomes a new text node following `text`, which is returned.
	///
	/// # Errors
	///
	/// Iff `text` is not a text node or the split point is out of range.
	fn split_text(&mut self, text: &Self::Node, prefix: &str) -> Result<Self::Node, Self::Error>;

	/// # Errors
	///
	/// Iff the host can't create an element with this name.
	fn create_element(&mut self, name: &str) -> Result<Self::Node, Self::Error>;

	/// # Errors
	///
	/// Iff the host can't create an SVG element with this name.
	fn create_svg_element(&mut self, name: &str) -> Result<Self::Node, Self::Error>;

	fn create_text(&mut self, data: &str) -> Self::Node;

	fn claim_order(&self, node: &Self::Node) -> Option<ClaimOrder>;
	fn set_claim_order(&mut self, node: &Self::Node, claim_order: ClaimOrder);

	fn is_reconciled(&self, container: &Self::Node) -> bool;
	fn mark_reconciled(&mut self, container: &Self::Node);

	fn cursor(&self, container: &Self::Node) -> Cursor<Self::Node>;
	fn set_cursor(&mut self, container: &Self::Node, cursor: Cursor<Self::Node>);

	/// Snapshot of `parent`'s children together with their claim orders.
	fn claimed_children(&self, parent: &Self::Node) -> Vec<Claimed<Self::Node>> {
		self.child_nodes(parent)
			.into_iter()
			.map(|node| {
				let claim_order = self.claim_order(&node);
				Claimed::new(node, claim_order)
			})
			.collect()
	}
}
