//! Claiming existing children for reuse, which is what assigns claim orders in the first place.

use crate::host::{ClaimOrder, Host};
use core::convert::Infallible;
use tracing::{instrument, trace};

/// What to do with a claimed node's slot in the [`ClaimList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processed<N> {
	/// The node is used up.
	Consume,
	/// Keep this node claimable in the same slot instead, i.e. the rest of a split text node.
	Replace(N),
}

/// The not-yet-claimed existing children of one parent.
///
/// Claims search near the previous match first, so that nodes tend to be claimed in document order,
/// which keeps the longest increasing subsequence long and the number of later moves low.
#[derive(Debug, Clone)]
pub struct ClaimList<N> {
	nodes: Vec<N>,
	last_index: usize,
	total_claimed: ClaimOrder,
}
impl<N: Clone> ClaimList<N> {
	#[must_use]
	pub fn new(nodes: Vec<N>) -> Self {
		Self {
			nodes,
			last_index: 0,
			total_claimed: 0,
		}
	}

	#[must_use]
	pub fn from_children<H: Host<Node = N>>(host: &H, parent: &N) -> Self {
		Self::new(host.child_nodes(parent))
	}

	#[must_use]
	pub fn unclaimed(&self) -> &[N] {
		&self.nodes
	}

	#[must_use]
	pub fn total_claimed(&self) -> ClaimOrder {
		self.total_claimed
	}

	/// Claims the first node matching `predicate` (or a new one from `create`) and assigns it the next claim order.
	///
	/// The search runs forward from the previous match, then backward from just before it.
	/// A matched node is passed to `process`, which decides whether it leaves the list.
	///
	/// With `update_last_index` unset, the match doesn't move the search start.
	/// Text nodes are claimed that way, as they are rarely worth breaking up a run of elements for.
	pub fn claim<H, P, F, C>(&mut self, host: &mut H, predicate: P, process: F, create: C, update_last_index: bool) -> N
	where
		H: Host<Node = N>,
		P: FnMut(&H, &N) -> bool,
		F: FnOnce(&mut H, &N) -> Processed<N>,
		C: FnOnce(&mut H) -> N,
	{
		let claimed = self.try_claim::<_, _, _, _, Infallible>(
			host,
			predicate,
			|host, node| Ok(process(host, node)),
			|host| Ok(create(host)),
			update_last_index,
		);
		match claimed {
			Ok(node) => node,
			Err(never) => match never {},
		}
	}

	#[instrument(skip(self, host, predicate, process, create))]
	fn try_claim<H, P, F, C, E>(&mut self, host: &mut H, mut predicate: P, process: F, create: C, update_last_index: bool) -> Result<N, E>
	where
		H: Host<Node = N>,
		P: FnMut(&H, &N) -> bool,
		F: FnOnce(&mut H, &N) -> Result<Processed<N>, E>,
		C: FnOnce(&mut H) -> Result<N, E>,
	{
		let start = self.last_index.min(self.nodes.len());

		let node = if let Some(i) = (start..self.nodes.len()).find(|&i| predicate(&*host, &self.nodes[i])) {
			trace!(index = i, "Claimed existing node at or after the previous match.");
			let node = self.take(host, i, process)?.0;
			if update_last_index {
				self.last_index = i;
			}
			node
		} else if let Some(i) = (0..start).rev().find(|&i| predicate(&*host, &self.nodes[i])) {
			trace!(index = i, "Claimed existing node before the previous match.");
			let (node, consumed) = self.take(host, i, process)?;
			if update_last_index {
				self.last_index = i;
			} else if consumed {
				self.last_index = self.last_index.saturating_sub(1);
			}
			node
		} else {
			trace!("No match. Creating node.");
			create(host)?
		};

		host.set_claim_order(&node, self.total_claimed);
		self.total_claimed = self.total_claimed.saturating_add(1);
		Ok(node)
	}

	fn take<H, F, E>(&mut self, host: &mut H, i: usize, process: F) -> Result<(N, bool), E>
	where
		H: Host<Node = N>,
		F: FnOnce(&mut H, &N) -> Result<Processed<N>, E>,
	{
		let node = self.nodes[i].clone();
		Ok(match process(host, &node)? {
			Processed::Consume => {
				self.nodes.remove(i);
				(node, true)
			}
			Processed::Replace(replacement) => {
				self.nodes[i] = replacement;
				(node, false)
			}
		})
	}

	/// Claims an element whose ***nodeName*** is `name`, or creates one.
	///
	/// Attributes of a reused element that aren't in `attributes` are removed,
	/// so that only what the renderer is about to set remains.
	///
	/// # Errors
	///
	/// Iff the host fails to remove an attribute or to create the element.
	pub fn claim_element<H: Host<Node = N>>(&mut self, host: &mut H, name: &str, attributes: &[&str]) -> Result<N, H::Error> {
		self.claim_element_with(host, name, attributes, |host| host.create_element(name))
	}

	/// Like [`claim_element`](`ClaimList::claim_element`), but creates missing elements in the SVG namespace.
	///
	/// # Errors
	///
	/// Iff the host fails to remove an attribute or to create the element.
	pub fn claim_svg_element<H: Host<Node = N>>(&mut self, host: &mut H, name: &str, attributes: &[&str]) -> Result<N, H::Error> {
		self.claim_element_with(host, name, attributes, |host| host.create_svg_element(name))
	}

	fn claim_element_with<H, C>(&mut self, host: &mut H, name: &str, attributes: &[&str], create: C) -> Result<N, H::Error>
	where
		H: Host<Node = N>,
		C: FnOnce(&mut H) -> Result<N, H::Error>,
	{
		self.try_claim(
			host,
			|host, node| host.node_name(node) == name,
			|host: &mut H, node: &N| -> Result<Processed<N>, H::Error> {
				for attribute in host.attribute_names(node) {
					if !attributes.contains(&attribute.as_str()) {
						trace!(attribute = attribute.as_str(), "Removing stale attribute.");
						host.remove_attribute(node, &attribute)?;
					}
				}
				Ok(Processed::Consume)
			},
			create,
			true,
		)
	}

	/// Claims any text node, or creates one, and makes sure its data is `data`.
	///
	/// A text node that merely starts with `data` is split, and the rest stays claimable in its place
	/// (adjacent server-rendered text is merged into a single node). Any other text node is overwritten.
	///
	/// Doesn't move the search start.
	///
	/// # Errors
	///
	/// Iff the host fails to split the text node.
	pub fn claim_text<H: Host<Node = N>>(&mut self, host: &mut H, data: &str) -> Result<N, H::Error> {
		self.try_claim(
			host,
			|host, node| host.text_data(node).is_some(),
			|host, node| {
				let current = host.text_data(node).unwrap_or_default();
				if current.starts_with(data) {
					if current.len() != data.len() {
						return host.split_text(node, data).map(Processed::Replace);
					}
				} else {
					host.set_text_data(node, data);
				}
				Ok(Processed::Consume)
			},
			|host| Ok(host.create_text(data)),
			false,
		)
	}

	/// [`claim_text`](`ClaimList::claim_text`) for a single space.
	///
	/// # Errors
	///
	/// Iff the host fails to split the text node.
	pub fn claim_space<H: Host<Node = N>>(&mut self, host: &mut H) -> Result<N, H::Error> {
		self.claim_text(host, " ")
	}

	/// The nodes that were never claimed, i.e. for detaching once hydration of the parent is done.
	#[must_use]
	pub fn into_unclaimed(self) -> Vec<N> {
		self.nodes
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::{Document, NodeId, NodeKind};

	fn element_named(name: &'static str) -> impl FnMut(&Document, &NodeId) -> bool {
		move |document: &Document, &node: &NodeId| matches!(document.kind(node), NodeKind::Element(n) if n == name)
	}

	fn fixture(names: &[&str]) -> (Document, NodeId, Vec<NodeId>) {
		let mut document = Document::new();
		let parent = document.create_element("div");
		let children = names
			.iter()
			.map(|name| {
				let child = document.create_element(name);
				document.append_child(parent, child);
				child
			})
			.collect();
		(document, parent, children)
	}

	#[test]
	fn assigns_sequential_claim_orders() {
		let (mut document, parent, children) = fixture(&["a", "b"]);
		let mut list = ClaimList::from_children(&document, &parent);

		let a = list.claim(&mut document, element_named("a"), |_, _| Processed::Consume, |d| d.create_element("a"), true);
		let b = list.claim(&mut document, element_named("b"), |_, _| Processed::Consume, |d| d.create_element("b"), true);
		let c = list.claim(&mut document, element_named("c"), |_, _| Processed::Consume, |d| d.create_element("c"), true);

		assert_eq!(a, children[0]);
		assert_eq!(b, children[1]);
		assert!(!children.contains(&c));
		assert_eq!(document.claim_order(&a), Some(0));
		assert_eq!(document.claim_order(&b), Some(1));
		assert_eq!(document.claim_order(&c), Some(2));
		assert_eq!(list.total_claimed(), 3);
		assert!(list.unclaimed().is_empty());
	}

	#[test]
	fn prefers_matches_after_the_previous_one() {
		let (mut document, parent, children) = fixture(&["p", "x", "p"]);
		let mut list = ClaimList::from_children(&document, &parent);

		let x = list.claim(&mut document, element_named("x"), |_, _| Processed::Consume, |d| d.create_element("x"), true);
		assert_eq!(x, children[1]);

		let p = list.claim(&mut document, element_named("p"), |_, _| Processed::Consume, |d| d.create_element("p"), true);
		assert_eq!(p, children[2], "should pick the <p> after <x>");

		let p = list.claim(&mut document, element_named("p"), |_, _| Processed::Consume, |d| d.create_element("p"), true);
		assert_eq!(p, children[0], "falls back to searching backwards");
	}

	#[test]
	fn replacement_stays_claimable() {
		let mut document = Document::new();
		let parent = document.create_element("div");
		let text = document.create_text("HelloWorld");
		document.append_child(parent, text);

		let mut list = ClaimList::from_children(&document, &parent);
		let is_text = |document: &Document, &node: &NodeId| matches!(document.kind(node), NodeKind::Text(_));

		let hello = list.claim(
			&mut document,
			is_text,
			|document, &node| Processed::Replace(document.split_text_at(node, 5).unwrap()),
			|document| document.create_text("Hello"),
			false,
		);
		assert_eq!(hello, text);
		assert_eq!(document.kind(hello), &NodeKind::Text("Hello".to_owned()));
		assert_eq!(list.unclaimed().len(), 1);

		let world = list.claim(&mut document, is_text, |_, _| Processed::Consume, |document| document.create_text("World"), false);
		assert_eq!(document.kind(world), &NodeKind::Text("World".to_owned()));
		assert_eq!(document.children_of(parent), &[hello, world]);
		assert_eq!(document.claim_order(&world), Some(1));
	}

	#[test]
	fn leftovers_are_unclaimed() {
		let (mut document, parent, children) = fixture(&["a", "b", "c"]);
		let mut list = ClaimList::from_children(&document, &parent);
		list.claim(&mut document, element_named("b"), |_, _| Processed::Consume, |d| d.create_element("b"), true);
		assert_eq!(list.into_unclaimed(), vec![children[0], children[2]]);
	}

	#[test]
	fn claim_element_strips_unlisted_attributes() {
		let (mut document, parent, children) = fixture(&["span", "div"]);
		document.set_attribute(children[1], "id", "main");
		document.set_attribute(children[1], "data-server", "1");
		document.set_attribute(children[1], "class", "wide");
		let mut list = ClaimList::from_children(&document, &parent);

		let div = list.claim_element(&mut document, "div", &["class", "id"]).unwrap();
		assert_eq!(div, children[1]);
		assert_eq!(document.attribute_names(&div), vec!["id", "class"]);
		assert_eq!(document.attribute(div, "class"), Some("wide"));
		assert_eq!(list.unclaimed(), &[children[0]]);
	}

	#[test]
	fn claim_element_creates_missing_elements() {
		let (mut document, parent, children) = fixture(&["span"]);
		let mut list = ClaimList::from_children(&document, &parent);

		let circle = list.claim_svg_element(&mut document, "circle", &[]).unwrap();
		assert!(!children.contains(&circle));
		assert_eq!(document.node_name(&circle), "circle");
		assert_eq!(document.parent_node(&circle), None);
		assert_eq!(document.claim_order(&circle), Some(0));

		let span = list.claim_element(&mut document, "span", &[]).unwrap();
		assert_eq!(span, children[0]);
		assert_eq!(document.claim_order(&span), Some(1));
	}

	#[test]
	fn claim_text_splits_off_the_rest() {
		let mut document = Document::new();
		let parent = document.create_element("p");
		let text = document.create_text("Hello, World!");
		document.append_child(parent, text);
		let mut list = ClaimList::from_children(&document, &parent);

		let hello = list.claim_text(&mut document, "Hello,").unwrap();
		assert_eq!(hello, text);
		assert_eq!(document.text_data(&hello).as_deref(), Some("Hello,"));

		let space = list.claim_space(&mut document).unwrap();
		assert_eq!(document.text_data(&space).as_deref(), Some(" "));

		let world = list.claim_text(&mut document, "World!").unwrap();
		assert_eq!(document.children_of(parent), &[hello, space, world]);
		assert!(list.unclaimed().is_empty());
		assert_eq!(document.claim_orders(parent), vec![Some(0), Some(1), Some(2)]);
	}

	#[test]
	fn claim_text_overwrites_other_data() {
		let mut document = Document::new();
		let parent = document.create_element("p");
		let stale = document.create_text("server");
		let em = document.create_element("em");
		document.append_child(parent, em);
		document.append_child(parent, stale);
		let mut list = ClaimList::from_children(&document, &parent);

		let text = list.claim_text(&mut document, "client").unwrap();
		assert_eq!(text, stale);
		assert_eq!(document.text_data(&text).as_deref(), Some("client"));
		assert_eq!(list.unclaimed(), &[em]);

		let created = list.claim_text(&mut document, "new").unwrap();
		assert_eq!(document.text_data(&created).as_deref(), Some("new"));
		assert_eq!(document.parent_node(&created), None);
	}

	#[test]
	fn consuming_text_before_the_search_start_shifts_it() {
		let mut document = Document::new();
		let parent = document.create_element("div");
		let text = document.create_text("t");
		document.append_child(parent, text);
		let mut children = vec![text];
		for name in &["b", "a", "a"] {
			let child = document.create_element(name);
			document.append_child(parent, child);
			children.push(child);
		}
		let mut list = ClaimList::from_children(&document, &parent);

		let b = list.claim(&mut document, element_named("b"), |_, _| Processed::Consume, |d| d.create_element("b"), true);
		assert_eq!(b, children[1]);
		assert_eq!(list.claim_text(&mut document, "t").unwrap(), text);

		// The search start follows the removed text node, so it still points at the first <a>.
		let a = list.claim(&mut document, element_named("a"), |_, _| Processed::Consume, |d| d.create_element("a"), true);
		assert_eq!(a, children[2]);
	}
}
