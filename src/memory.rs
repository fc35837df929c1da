//! A self-contained tree store implementing [`Sink`].
//!
//! This is the default target: good enough to render against, assert on and
//! import from in tests, and the model implementation to consult when writing
//! adapters for real scene graphs or markup documents.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::error;

use crate::sink::Sink;

enum Kind {
	Element {
		tag: String,
		namespace: Option<String>,
		attributes: BTreeMap<String, String>,
	},
	Text(String),
	Comment(String),
}

struct MemoryNode {
	kind: Kind,
	parent: Weak<RefCell<MemoryNode>>,
	children: Vec<MemoryHandle>,
}

/// Shared reference to one node of a [`MemorySink`] tree.
///
/// Clones alias the same node; equality is node identity.
#[derive(Clone)]
pub struct MemoryHandle(Rc<RefCell<MemoryNode>>);

impl MemoryHandle {
	fn new(kind: Kind) -> Self {
		Self(Rc::new(RefCell::new(MemoryNode {
			kind,
			parent: Weak::new(),
			children: Vec::new(),
		})))
	}

	#[must_use]
	pub fn is_element(&self) -> bool {
		matches!(self.0.borrow().kind, Kind::Element { .. })
	}

	#[must_use]
	pub fn is_text(&self) -> bool {
		matches!(self.0.borrow().kind, Kind::Text(_))
	}

	#[must_use]
	pub fn is_comment(&self) -> bool {
		matches!(self.0.borrow().kind, Kind::Comment(_))
	}

	/// The element's tag, `None` for text and comment nodes.
	#[must_use]
	pub fn tag(&self) -> Option<String> {
		match &self.0.borrow().kind {
			Kind::Element { tag, .. } => Some(tag.clone()),
			_ => None,
		}
	}

	/// The namespace the element was created in, if any.
	#[must_use]
	pub fn namespace(&self) -> Option<String> {
		match &self.0.borrow().kind {
			Kind::Element { namespace, .. } => namespace.clone(),
			_ => None,
		}
	}

	/// The own character data of a text or comment node.
	#[must_use]
	pub fn text(&self) -> Option<String> {
		match &self.0.borrow().kind {
			Kind::Text(text) | Kind::Comment(text) => Some(text.clone()),
			Kind::Element { .. } => None,
		}
	}

	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<String> {
		match &self.0.borrow().kind {
			Kind::Element { attributes, .. } => attributes.get(name).cloned(),
			_ => None,
		}
	}

	/// All attribute names, in sorted order.
	#[must_use]
	pub fn attribute_names(&self) -> Vec<String> {
		match &self.0.borrow().kind {
			Kind::Element { attributes, .. } => attributes.keys().cloned().collect(),
			_ => Vec::new(),
		}
	}

	pub fn set_attribute(&self, name: &str, value: &str) {
		match &mut self.0.borrow_mut().kind {
			Kind::Element { attributes, .. } => {
				attributes.insert(name.to_owned(), value.to_owned());
			}
			_ => error!("Attempted to set attribute {:?} on a non-element node.", name),
		}
	}

	pub fn remove_attribute(&self, name: &str) {
		if let Kind::Element { attributes, .. } = &mut self.0.borrow_mut().kind {
			attributes.remove(name);
		}
	}

	#[must_use]
	pub fn parent(&self) -> Option<MemoryHandle> {
		self.0.borrow().parent.upgrade().map(MemoryHandle)
	}

	/// The node's children, in order.
	#[must_use]
	pub fn children(&self) -> Vec<MemoryHandle> {
		self.0.borrow().children.clone()
	}

	fn detach(&self) {
		if let Some(parent) = self.parent() {
			parent.0.borrow_mut().children.retain(|child| child != self);
		}
		self.0.borrow_mut().parent = Weak::new();
	}

	fn collect_text(&self, out: &mut String) {
		let node = self.0.borrow();
		match &node.kind {
			Kind::Text(text) => out.push_str(text),
			Kind::Element { .. } => {
				for child in &node.children {
					child.collect_text(out);
				}
			}
			Kind::Comment(_) => {}
		}
	}

	/// Serializes the subtree as angle-bracket markup, attributes in sorted
	/// order. Meant for assertions and debugging, not for document output.
	#[must_use]
	pub fn to_markup(&self) -> String {
		let mut out = String::new();
		self.write_markup(&mut out);
		out
	}

	fn write_markup(&self, out: &mut String) {
		let node = self.0.borrow();
		match &node.kind {
			Kind::Element { tag, attributes, .. } => {
				out.push('<');
				out.push_str(tag);
				for (name, value) in attributes {
					out.push(' ');
					out.push_str(name);
					out.push_str("=\"");
					escape_into(value, true, out);
					out.push('"');
				}
				out.push('>');
				for child in &node.children {
					child.write_markup(out);
				}
				out.push_str("</");
				out.push_str(tag);
				out.push('>');
			}
			Kind::Text(text) => escape_into(text, false, out),
			Kind::Comment(text) => {
				out.push_str("<!--");
				out.push_str(text);
				out.push_str("-->");
			}
		}
	}
}

impl PartialEq for MemoryHandle {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Eq for MemoryHandle {}

impl fmt::Debug for MemoryHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.0.borrow().kind {
			Kind::Element { tag, .. } => write!(f, "<{}>", tag),
			Kind::Text(text) => {
				if cfg!(feature = "dangerous-logging") {
					write!(f, "#text {:?}", text)
				} else {
					write!(f, "#text[{} bytes]", text.len())
				}
			}
			Kind::Comment(text) => {
				if cfg!(feature = "dangerous-logging") {
					write!(f, "#comment {:?}", text)
				} else {
					write!(f, "#comment[{} bytes]", text.len())
				}
			}
		}
	}
}

fn escape_into(raw: &str, quote: bool, out: &mut String) {
	for c in raw.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' if quote => out.push_str("&quot;"),
			c => out.push(c),
		}
	}
}

#[derive(Debug, Default)]
struct Counters {
	created: Cell<u64>,
	mutations: Cell<u64>,
}

/// The in-memory render target.
///
/// Cloning shares the counters, so a clone handed to a patcher keeps counting
/// for the original. Node creations and structural or textual mutations are
/// tallied separately, which lets tests distinguish "nothing was rebuilt"
/// from "nothing was touched at all".
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
	counters: Rc<Counters>,
}

impl MemorySink {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Total nodes created through the adapter's create calls so far.
	///
	/// The implicit text child written by [`Sink::set_text_content`] is not
	/// counted; it is part of that one mutation.
	#[must_use]
	pub fn nodes_created(&self) -> u64 {
		self.counters.created.get()
	}

	/// Total attach, detach, text and attribute writes so far.
	#[must_use]
	pub fn mutation_count(&self) -> u64 {
		self.counters.mutations.get()
	}

	fn count_created(&self) {
		self.counters.created.set(self.counters.created.get() + 1);
	}

	fn count_mutation(&self) {
		self.counters.mutations.set(self.counters.mutations.get() + 1);
	}
}

impl Sink for MemorySink {
	type Handle = MemoryHandle;

	fn create_element(&self, tag: &str, namespace: Option<&str>) -> MemoryHandle {
		self.count_created();
		MemoryHandle::new(Kind::Element {
			tag: tag.to_owned(),
			namespace: namespace.map(str::to_owned),
			attributes: BTreeMap::new(),
		})
	}

	fn create_text_node(&self, text: &str) -> MemoryHandle {
		self.count_created();
		MemoryHandle::new(Kind::Text(text.to_owned()))
	}

	fn create_comment(&self, text: &str) -> MemoryHandle {
		self.count_created();
		MemoryHandle::new(Kind::Comment(text.to_owned()))
	}

	fn insert_before(&self, parent: &MemoryHandle, child: &MemoryHandle, reference: Option<&MemoryHandle>) {
		self.count_mutation();
		child.detach();
		{
			let mut node = parent.0.borrow_mut();
			match reference {
				Some(reference) => match node.children.iter().position(|c| c == reference) {
					Some(index) => node.children.insert(index, child.clone()),
					None => {
						error!("insert_before reference is not a child of the given parent; appending instead.");
						node.children.push(child.clone());
					}
				},
				None => node.children.push(child.clone()),
			}
		}
		child.0.borrow_mut().parent = Rc::downgrade(&parent.0);
	}

	fn append_child(&self, parent: &MemoryHandle, child: &MemoryHandle) {
		self.insert_before(parent, child, None);
	}

	fn remove_child(&self, parent: &MemoryHandle, child: &MemoryHandle) {
		self.count_mutation();
		let mut node = parent.0.borrow_mut();
		let before = node.children.len();
		node.children.retain(|c| c != child);
		if node.children.len() == before {
			error!("remove_child target is not a child of the given parent.");
		} else {
			drop(node);
			child.0.borrow_mut().parent = Weak::new();
		}
	}

	fn parent_node(&self, handle: &MemoryHandle) -> Option<MemoryHandle> {
		handle.parent()
	}

	fn next_sibling(&self, handle: &MemoryHandle) -> Option<MemoryHandle> {
		let parent = handle.parent()?;
		let node = parent.0.borrow();
		let index = node.children.iter().position(|c| c == handle)?;
		node.children.get(index + 1).cloned()
	}

	fn tag_name(&self, handle: &MemoryHandle) -> String {
		match handle.tag() {
			Some(tag) => tag,
			None => {
				error!("Requested the tag name of a non-element node.");
				String::new()
			}
		}
	}

	fn set_text_content(&self, handle: &MemoryHandle, text: &str) {
		self.count_mutation();
		let mut borrow = handle.0.borrow_mut();
		let node = &mut *borrow;
		match &mut node.kind {
			Kind::Element { .. } => {
				let discarded = core::mem::take(&mut node.children);
				for child in &discarded {
					child.0.borrow_mut().parent = Weak::new();
				}
				if !text.is_empty() {
					let child = MemoryHandle::new(Kind::Text(text.to_owned()));
					child.0.borrow_mut().parent = Rc::downgrade(&handle.0);
					node.children.push(child);
				}
			}
			Kind::Text(data) | Kind::Comment(data) => *data = text.to_owned(),
		}
	}

	fn set_attribute(&self, handle: &MemoryHandle, name: &str, value: &str) {
		self.count_mutation();
		handle.set_attribute(name, value);
	}

	fn is_element(&self, handle: &MemoryHandle) -> bool {
		handle.is_element()
	}

	fn is_text(&self, handle: &MemoryHandle) -> bool {
		handle.is_text()
	}

	fn is_comment(&self, handle: &MemoryHandle) -> bool {
		handle.is_comment()
	}

	fn get_text_content(&self, handle: &MemoryHandle) -> Option<String> {
		match &handle.0.borrow().kind {
			Kind::Text(text) | Kind::Comment(text) => Some(text.clone()),
			Kind::Element { .. } => {
				let mut out = String::new();
				handle.collect_text(&mut out);
				Some(out)
			}
		}
	}

	fn get_attribute(&self, handle: &MemoryHandle, name: &str) -> Option<String> {
		handle.attribute(name)
	}

	fn attribute_names(&self, handle: &MemoryHandle) -> Vec<String> {
		handle.attribute_names()
	}

	fn child_handles(&self, handle: &MemoryHandle) -> Vec<MemoryHandle> {
		handle.children()
	}
}

#[cfg(test)]
mod tests {
	use super::{MemorySink, Sink};

	#[test]
	fn insert_before_moves_attached_children() {
		let sink = MemorySink::new();
		let parent = sink.create_element("ul", None);
		let a = sink.create_element("li", None);
		let b = sink.create_element("li", None);
		sink.append_child(&parent, &a);
		sink.append_child(&parent, &b);

		sink.insert_before(&parent, &b, Some(&a));
		let children = parent.children();
		assert_eq!(children.len(), 2);
		assert!(children[0] == b);
		assert!(children[1] == a);
		assert!(b.parent().map_or(false, |p| p == parent));
	}

	#[test]
	fn set_text_content_replaces_element_children() {
		let sink = MemorySink::new();
		let parent = sink.create_element("p", None);
		let child = sink.create_element("span", None);
		sink.append_child(&parent, &child);

		sink.set_text_content(&parent, "plain");
		assert_eq!(parent.to_markup(), "<p>plain</p>");
		assert_eq!(child.parent(), None);

		sink.set_text_content(&parent, "");
		assert_eq!(parent.to_markup(), "<p></p>");
	}

	#[test]
	fn markup_escapes_content() {
		let sink = MemorySink::new();
		let parent = sink.create_element("div", None);
		sink.set_attribute(&parent, "title", "a \"b\" & c");
		sink.set_text_content(&parent, "1 < 2");
		assert_eq!(parent.to_markup(), "<div title=\"a &quot;b&quot; &amp; c\">1 &lt; 2</div>");
	}

	#[test]
	fn counters_tell_creations_from_mutations() {
		let sink = MemorySink::new();
		let parent = sink.create_element("div", None);
		let child = sink.create_text_node("x");
		assert_eq!(sink.nodes_created(), 2);
		assert_eq!(sink.mutation_count(), 0);

		sink.append_child(&parent, &child);
		assert_eq!(sink.nodes_created(), 2);
		assert_eq!(sink.mutation_count(), 1);
	}

	#[test]
	fn text_content_of_elements_concatenates_descendants() {
		let sink = MemorySink::new();
		let parent = sink.create_element("div", None);
		let span = sink.create_element("span", None);
		sink.append_child(&parent, &span);
		sink.set_text_content(&span, "a");
		sink.append_child(&parent, &sink.create_text_node("b"));
		sink.append_child(&parent, &sink.create_comment("nope"));

		assert_eq!(sink.get_text_content(&parent).as_deref(), Some("ab"));
	}
}
