//! Inserting nodes while hydrating, so that reused nodes stay in the tree and only move when necessary.

use crate::{
	claim::ClaimList,
	host::{Cursor, Host},
	reconcile::reconcile,
};
use tracing::{instrument, trace};

/// Whether a hydration pass is in progress, and the insertions that depend on it.
///
/// Between [`start`](`Hydration::start`) and [`end`](`Hydration::end`), [`append`](`Hydration::append`)
/// reconciles each target on first touch and then walks a per-target [`Cursor`] instead of appending blindly,
/// so that claimed nodes that are already in place aren't moved at all.
#[derive(Debug, Default)]
pub struct Hydration {
	hydrating: bool,
}
impl Hydration {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn start(&mut self) {
		trace!("Hydration started.");
		self.hydrating = true;
	}

	pub fn end(&mut self) {
		trace!("Hydration ended.");
		self.hydrating = false;
	}

	#[must_use]
	pub fn is_hydrating(&self) -> bool {
		self.hydrating
	}

	/// Places `node` as the next child of `target`.
	///
	/// # Errors
	///
	/// Iff the host rejects an insertion.
	#[instrument(skip(host, target, node))]
	pub fn append<H: Host>(&self, host: &mut H, target: &H::Node, node: &H::Node) -> Result<(), H::Error> {
		if !self.hydrating {
			if host.parent_node(node).as_ref() != Some(target) || host.next_sibling(node).is_some() {
				host.insert_before(target, node, None)?;
			}
			return Ok(());
		}

		reconcile(host, target);

		let mut end = match host.cursor(target) {
			Cursor::Unset => host.first_child(target),
			Cursor::End => None,
			Cursor::Before(child) if host.parent_node(&child).as_ref() != Some(target) => {
				trace!("Cursor left the target. Resetting it.");
				host.first_child(target)
			}
			Cursor::Before(child) => Some(child),
		};

		// Unordered children belong to someone else, so the cursor skips past them.
		while let Some(child) = end.take() {
			if host.claim_order(&child).is_some() {
				end = Some(child);
				break;
			}
			end = host.next_sibling(&child);
		}

		if end.as_ref() == Some(node) {
			trace!("Node already in place.");
			let next = host.next_sibling(node);
			host.set_cursor(target, next.into());
		} else {
			if host.claim_order(node).is_some() || host.parent_node(node).as_ref() != Some(target) {
				host.insert_before(target, node, end.as_ref())?;
			}
			host.set_cursor(target, end.into());
		}
		Ok(())
	}

	/// Places `node` into `target` before `anchor`, or as with [`append`](`Hydration::append`) if there is no anchor.
	///
	/// # Errors
	///
	/// Iff the host rejects an insertion.
	#[instrument(skip(host, target, node, anchor))]
	pub fn insert<H: Host>(&self, host: &mut H, target: &H::Node, node: &H::Node, anchor: Option<&H::Node>) -> Result<(), H::Error> {
		if self.hydrating && anchor.is_none() {
			return self.append(host, target, node);
		}

		if host.parent_node(node).as_ref() != Some(target) || host.next_sibling(node).as_ref() != anchor {
			host.insert_before(target, node, anchor)?;
		}
		Ok(())
	}

	/// Removes `node` from its parent, if it has one.
	///
	/// # Errors
	///
	/// Iff the host rejects the removal.
	pub fn detach<H: Host>(host: &mut H, node: &H::Node) -> Result<(), H::Error> {
		if host.parent_node(node).is_some() {
			host.remove(node)?;
		}
		Ok(())
	}

	/// Detaches every node the renderer didn't claim.
	///
	/// # Errors
	///
	/// On the first failed removal. Nodes after it stay attached.
	#[instrument(skip(host, claim_list))]
	pub fn detach_unclaimed<H: Host>(host: &mut H, claim_list: ClaimList<H::Node>) -> Result<(), H::Error> {
		let unclaimed = claim_list.into_unclaimed();
		trace!("Detaching {} unclaimed node(s).", unclaimed.len());
		for node in &unclaimed {
			Self::detach(host, node)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::Document;

	#[test]
	fn appends_outside_hydration() {
		let mut document = Document::new();
		let parent = document.create_element("div");
		let a = document.create_text("a");
		let b = document.create_text("b");

		let hydration = Hydration::new();
		hydration.append(&mut document, &parent, &a).unwrap();
		hydration.append(&mut document, &parent, &b).unwrap();
		hydration.append(&mut document, &parent, &b).unwrap();

		assert_eq!(document.children_of(parent), &[a, b]);
		assert_eq!(document.insertions(), 2, "re-appending the last child is a no-op");
	}

	#[test]
	fn insert_skips_nodes_already_in_place() {
		let mut document = Document::new();
		let parent = document.create_element("div");
		let a = document.create_text("a");
		let b = document.create_text("b");
		document.append_child(parent, a);
		document.append_child(parent, b);

		let hydration = Hydration::new();
		hydration.insert(&mut document, &parent, &a, Some(&b)).unwrap();
		assert_eq!(document.insertions(), 0);

		hydration.insert(&mut document, &parent, &b, Some(&a)).unwrap();
		assert_eq!(document.children_of(parent), &[b, a]);
		assert_eq!(document.insertions(), 1);
	}

	#[test]
	fn cursor_advances_over_nodes_in_place() {
		let mut document = Document::new();
		let parent = document.create_element("div");
		let a = document.create_element("a");
		let b = document.create_element("b");
		document.append_child(parent, a);
		document.append_child(parent, b);
		document.set_claim_order(&a, 0);
		document.set_claim_order(&b, 1);

		let mut hydration = Hydration::new();
		assert!(!hydration.is_hydrating());
		hydration.start();
		assert!(hydration.is_hydrating());
		hydration.append(&mut document, &parent, &a).unwrap();
		assert_eq!(document.cursor(&parent), Cursor::Before(b));
		hydration.append(&mut document, &parent, &b).unwrap();
		assert_eq!(document.cursor(&parent), Cursor::End);
		hydration.end();
		assert!(!hydration.is_hydrating());

		assert!(document.is_reconciled(&parent));
		assert_eq!(document.insertions(), 0);
	}

	#[test]
	fn cursor_resets_when_its_node_moves_away() {
		let mut document = Document::new();
		let parent = document.create_element("div");
		let elsewhere = document.create_element("div");
		let a = document.create_element("a");
		let x = document.create_element("x");
		document.append_child(parent, a);
		document.append_child(parent, x);
		document.set_claim_order(&a, 0);
		document.set_claim_order(&x, 1);

		let mut hydration = Hydration::new();
		hydration.start();
		hydration.append(&mut document, &parent, &a).unwrap();
		assert_eq!(document.cursor(&parent), Cursor::Before(x));

		document.append_child(elsewhere, x);
		let b = document.create_element("b");
		document.set_claim_order(&b, 2);
		hydration.append(&mut document, &parent, &b).unwrap();
		hydration.end();

		assert_eq!(document.children_of(parent), &[b, a]);
		assert_eq!(document.cursor(&parent), Cursor::Before(a));
		assert_eq!(document.insertions(), 1);
	}

	#[test]
	fn unordered_node_in_target_is_left_alone() {
		let mut document = Document::new();
		let parent = document.create_element("head");
		let foreign = document.create_element("script");
		let a = document.create_element("title");
		document.append_child(parent, foreign);
		document.append_child(parent, a);
		document.set_claim_order(&a, 0);

		let mut hydration = Hydration::new();
		hydration.start();
		hydration.append(&mut document, &parent, &foreign).unwrap();
		hydration.end();

		assert_eq!(document.children_of(parent), &[foreign, a]);
		assert_eq!(document.cursor(&parent), Cursor::Before(a));
		assert_eq!(document.insertions(), 0);
	}

	#[test]
	fn detach_is_a_no_op_for_orphans() {
		let mut document = Document::new();
		let orphan = document.create_text("orphan");
		Hydration::detach(&mut document, &orphan).unwrap();
		assert_eq!(document.parent_node(&orphan), None);
	}
}
