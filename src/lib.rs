//! Reorders server-rendered DOM children into the order a hydrating renderer claimed them in,
//! moving as few nodes as possible.
//!
//! See [`reconcile::reconcile`] for the reordering itself and [`hydrate::Hydration`] for the insertions around it.

#![doc(html_root_url = "https://docs.rs/hydrate-reorder/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod claim;
pub mod host;
pub mod hydrate;
pub mod lis;
pub mod memory;
pub mod reconcile;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use host::{ClaimOrder, Claimed, Cursor, Host};
pub use reconcile::{reconcile, Reconciliation};
