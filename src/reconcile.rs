//! Reorders a container's claimed children into claim order with as few moves as possible.
//!
//! The children that don't move always form an increasing subsequence of claim orders, since they keep
//! their order among each other. So the largest set of children that can stay in place is a longest increasing
//! subsequence, and every other claimed child is moved exactly once.

use crate::{
	host::{ClaimOrder, Claimed, Host},
	lis::longest_increasing_subsequence,
};
use hashbrown::HashSet;
use tracing::{error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// A single `insert_before` of a moved node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move<N> {
	pub node: N,
	/// The kept node to insert before, or [`None`] to append.
	pub anchor: Option<N>,
}

/// What [`reconcile`] will do to a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan<N> {
	/// Claimed children that stay where they are, in document order.
	pub kept: Vec<N>,
	/// Moves in ascending claim order. They must be applied in this order.
	pub moves: Vec<Move<N>>,
}
impl<N> MovePlan<N> {
	/// Count of claimed children.
	#[must_use]
	pub fn ordered_len(&self) -> usize {
		self.kept.len() + self.moves.len()
	}
}

/// Outcome of a container's (only) reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
	/// Count of children that carried a claim order.
	pub ordered: usize,
	/// Count of successful moves.
	pub moved: usize,
}

/// Computes the minimal set of moves that puts the ordered entries of `children` into ascending claim order.
///
/// Entries without claim order are ignored and never used as anchors.
///
/// # Panics
///
/// With debug assertions, if two entries share a claim order.
/// Without them, duplicates merely make the plan possibly longer than necessary.
#[must_use]
pub fn plan<N: Clone>(children: &[Claimed<N>]) -> MovePlan<N> {
	let ordered: Vec<(&N, ClaimOrder)> = children.iter().filter_map(|child| child.claim_order.map(|claim_order| (&child.node, claim_order))).collect();

	debug_assert_eq!(
		ordered.len(),
		ordered.iter().map(|&(_, claim_order)| claim_order).collect::<HashSet<_>>().len(),
		"Duplicate claim order encountered"
	);

	let claim_orders: Vec<ClaimOrder> = ordered.iter().map(|&(_, claim_order)| claim_order).collect();
	let mut lis = longest_increasing_subsequence(&claim_orders).into_iter().peekable();

	let mut kept = Vec::with_capacity(lis.len());
	let mut to_move = Vec::with_capacity(ordered.len() - lis.len());
	for (i, entry) in ordered.into_iter().enumerate() {
		if lis.peek() == Some(&i) {
			lis.next();
			kept.push(entry);
		} else {
			to_move.push(entry);
		}
	}

	// Placing moved nodes in claim order means each one lands after every moved node that precedes it.
	to_move.sort_by_key(|&(_, claim_order)| claim_order);

	let mut j = 0;
	let moves = to_move
		.into_iter()
		.map(|(node, claim_order)| {
			while j < kept.len() && claim_order >= kept[j].1 {
				j += 1;
			}
			Move {
				node: node.clone(),
				anchor: kept.get(j).map(|&(anchor, _)| anchor.clone()),
			}
		})
		.collect();

	MovePlan {
		kept: kept.into_iter().map(|(node, _)| node.clone()).collect(),
		moves,
	}
}

/// Moves `container`'s claimed children into ascending claim order, once.
///
/// The first call marks `container` as reconciled and returns what was done.
/// Any further call returns [`None`] without touching the tree.
///
/// Children without claim order stay where they are.
/// Failed moves are logged and skipped, and don't count towards [`Reconciliation::moved`].
#[instrument(skip(host, container))]
pub fn reconcile<H: Host>(host: &mut H, container: &H::Node) -> Option<Reconciliation> {
	if host.is_reconciled(container) {
		trace!("Container already reconciled.");
		return None;
	}
	host.mark_reconciled(container);

	let children = host.claimed_children(container);
	let plan = plan(&children);
	let ordered = plan.ordered_len();

	let span = trace_span!("Applying moves", children = children.len(), ordered, moves = plan.moves.len());
	let _enter = span.enter();

	let mut moved = 0;
	for Move { node, anchor } in &plan.moves {
		match host.insert_before(container, node, anchor.as_ref()) {
			Ok(()) => {
				moved += 1;
				if cfg!(feature = "dangerous-logging") {
					trace!(?node, ?anchor, "Moved node.");
				} else {
					trace!(anchored = anchor.is_some(), "Moved node.");
				}
			}
			Err(error) => error!("Failed to move node: {:?}", error),
		}
	}

	info!("Reconciled {} claimed of {} child node(s) with {} move(s).", ordered, children.len(), moved);
	if STATIC_MAX_LEVEL >= Level::WARN && ordered >= 100 && moved * 2 > ordered {
		warn!(
			"Moved {} of {} claimed child nodes.\n\
			This may point to nodes being claimed in a different order than they were rendered on the server.",
			moved, ordered
		);
	}

	Some(Reconciliation { ordered, moved })
}
