//! [`Host`] over live [***Node***](https://developer.mozilla.org/en-US/docs/Web/API/Node)s.
//!
//! Claim orders, the reconciled flag and the hydration cursor are stored as expando properties on the
//! JavaScript objects themselves, so they live exactly as long as the nodes do.

use crate::host::{ClaimOrder, Cursor, Host};
use js_sys::{Object, Reflect};
use tracing::error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Node, Text};

const CLAIM_ORDER: &str = "__hydrate_reorder_claim_order";
const RECONCILED: &str = "__hydrate_reorder_reconciled";
const CURSOR: &str = "__hydrate_reorder_cursor";

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// The browser DOM. New nodes are created through `document`.
#[derive(Debug, Clone)]
pub struct WebHost {
	document: Document,
}
impl WebHost {
	#[must_use]
	pub fn new(document: Document) -> Self {
		Self { document }
	}
}

fn get(node: &Node, key: &str) -> JsValue {
	let target: &JsValue = node.as_ref();
	Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn set(node: &Node, key: &str, value: &JsValue) {
	let target: &JsValue = node.as_ref();
	match Reflect::set(target, &JsValue::from_str(key), value) {
		Ok(true) => (),
		Ok(false) => error!("Node rejected property {:?}.", key),
		Err(error) => error!("Failed to set node property {:?}: {:?}", key, error),
	}
}

impl Host for WebHost {
	type Node = Node;
	type Error = JsValue;

	fn child_nodes(&self, parent: &Node) -> Vec<Node> {
		let child_nodes = parent.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).collect()
	}

	fn parent_node(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn first_child(&self, parent: &Node) -> Option<Node> {
		parent.first_child()
	}

	fn next_sibling(&self, node: &Node) -> Option<Node> {
		node.next_sibling()
	}

	fn insert_before(&mut self, parent: &Node, node: &Node, anchor: Option<&Node>) -> Result<(), JsValue> {
		parent.insert_before(node, anchor).map(drop)
	}

	fn remove(&mut self, node: &Node) -> Result<(), JsValue> {
		match node.parent_node() {
			Some(parent) => parent.remove_child(node).map(drop),
			None => Ok(()),
		}
	}

	fn node_name(&self, node: &Node) -> String {
		node.node_name()
	}

	fn attribute_names(&self, node: &Node) -> Vec<String> {
		node.dyn_ref::<Element>()
			.map(|element| element.get_attribute_names().iter().filter_map(|name| name.as_string()).collect())
			.unwrap_or_default()
	}

	fn remove_attribute(&mut self, node: &Node, name: &str) -> Result<(), JsValue> {
		match node.dyn_ref::<Element>() {
			Some(element) => element.remove_attribute(name),
			None => Ok(()),
		}
	}

	fn text_data(&self, node: &Node) -> Option<String> {
		node.dyn_ref::<Text>().map(|text| text.data())
	}

	fn set_text_data(&mut self, node: &Node, data: &str) {
		if let Some(text) = node.dyn_ref::<Text>() {
			text.set_data(data);
		}
	}

	#[allow(clippy::cast_possible_truncation)]
	fn split_text(&mut self, text: &Node, prefix: &str) -> Result<Node, JsValue> {
		let text = text.dyn_ref::<Text>().ok_or_else(|| JsValue::from_str("Tried to split a node that isn't text."))?;
		// DOM offsets count UTF-16 code units.
		text.split_text(prefix.encode_utf16().count() as u32).map(Into::into)
	}

	fn create_element(&mut self, name: &str) -> Result<Node, JsValue> {
		self.document.create_element(name).map(Into::into)
	}

	fn create_svg_element(&mut self, name: &str) -> Result<Node, JsValue> {
		self.document.create_element_ns(Some(SVG_NAMESPACE), name).map(Into::into)
	}

	fn create_text(&mut self, data: &str) -> Node {
		self.document.create_text_node(data).into()
	}

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn claim_order(&self, node: &Node) -> Option<ClaimOrder> {
		get(node, CLAIM_ORDER).as_f64().map(|claim_order| claim_order as ClaimOrder)
	}

	fn set_claim_order(&mut self, node: &Node, claim_order: ClaimOrder) {
		set(node, CLAIM_ORDER, &JsValue::from(claim_order));
	}

	fn is_reconciled(&self, container: &Node) -> bool {
		get(container, RECONCILED).as_bool() == Some(true)
	}

	fn mark_reconciled(&mut self, container: &Node) {
		set(container, RECONCILED, &JsValue::from_bool(true));
	}

	fn cursor(&self, container: &Node) -> Cursor<Node> {
		let value = get(container, CURSOR);
		if value.is_null() {
			Cursor::End
		} else {
			value.dyn_into::<Node>().map_or(Cursor::Unset, Cursor::Before)
		}
	}

	fn set_cursor(&mut self, container: &Node, cursor: Cursor<Node>) {
		match cursor {
			Cursor::Unset => {
				let target: &Object = container.as_ref();
				if let Err(error) = Reflect::delete_property(target, &JsValue::from_str(CURSOR)) {
					error!("Failed to reset cursor: {:?}", error);
				}
			}
			Cursor::End => set(container, CURSOR, &JsValue::NULL),
			Cursor::Before(child) => set(container, CURSOR, &child),
		}
	}
}
