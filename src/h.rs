use crate::selector;
use crate::vnode::{VNode, VNodeData};

/// Namespace stamped onto `svg` subtrees at build time.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// What goes below a built node: nothing, a single text, or child nodes.
///
/// Mostly constructed through the `From` impls, so call sites can pass a
/// string, a number, a single node or a `Vec` directly.
pub enum Children<H> {
	None,
	Text(String),
	Nodes(Vec<VNode<H>>),
}

impl<H> From<()> for Children<H> {
	fn from(_: ()) -> Self {
		Children::None
	}
}
impl<H> From<&str> for Children<H> {
	fn from(value: &str) -> Self {
		Children::Text(value.to_owned())
	}
}
impl<H> From<String> for Children<H> {
	fn from(value: String) -> Self {
		Children::Text(value)
	}
}
impl<H> From<i32> for Children<H> {
	fn from(value: i32) -> Self {
		Children::Text(value.to_string())
	}
}
impl<H> From<i64> for Children<H> {
	fn from(value: i64) -> Self {
		Children::Text(value.to_string())
	}
}
impl<H> From<f64> for Children<H> {
	fn from(value: f64) -> Self {
		Children::Text(value.to_string())
	}
}
impl<H> From<VNode<H>> for Children<H> {
	fn from(value: VNode<H>) -> Self {
		Children::Nodes(vec![value])
	}
}
impl<H> From<Vec<VNode<H>>> for Children<H> {
	fn from(value: Vec<VNode<H>>) -> Self {
		Children::Nodes(value)
	}
}

/// Builds an element node from a selector, its config and its content.
///
/// Selectors starting with an `svg` tag get [`SVG_NAMESPACE`] stamped onto
/// their whole subtree right away, stopping below `foreignObject` elements so
/// embedded ordinary content keeps its default namespace.
///
/// ```
/// use cambium::{h, MemoryHandle, VNodeData};
///
/// let node: cambium::VNode<MemoryHandle> = h(
/// 	"ul.menu",
/// 	VNodeData::new(),
/// 	vec![h("li", VNodeData::new().key(1), "One"), h("li", VNodeData::new().key(2), "Two")],
/// );
/// assert_eq!(node.children.as_ref().map(Vec::len), Some(2));
/// ```
#[must_use]
pub fn h<H>(sel: impl Into<String>, data: VNodeData<H>, children: impl Into<Children<H>>) -> VNode<H> {
	let sel = sel.into();
	let (children, text) = match children.into() {
		Children::None => (None, None),
		Children::Text(text) => (None, Some(text)),
		Children::Nodes(nodes) => (Some(nodes), None),
	};
	let mut node = VNode::new(Some(sel), Some(data), children, text, None);
	if node.sel.as_deref().map_or(false, is_svg_selector) {
		add_ns(&mut node);
	}
	node
}

/// Builds a bare text node, for spelling out mixed content explicitly.
#[must_use]
pub fn text<H>(content: impl Into<String>) -> VNode<H> {
	VNode::text_node(content)
}

fn is_svg_selector(sel: &str) -> bool {
	let bytes = sel.as_bytes();
	bytes.len() >= 3 && &bytes[..3] == b"svg" && (bytes.len() == 3 || bytes[3] == b'.' || bytes[3] == b'#')
}

fn add_ns<H>(node: &mut VNode<H>) {
	if let Some(data) = node.data.as_mut() {
		data.ns = Some(SVG_NAMESPACE.to_owned());
	}
	let foreign = node
		.sel
		.as_deref()
		.map_or(false, |sel| selector::tag_of(sel) == "foreignObject");
	if foreign {
		return;
	}
	if let Some(children) = node.children.as_mut() {
		for child in children {
			if child.data.is_some() {
				add_ns(child);
			}
		}
	}
}
