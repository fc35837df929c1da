/// The adapter contract between the differ and a concrete render target.
///
/// Implementations translate the engine's narrow vocabulary of structural
/// edits into whatever the target understands. Handles are opaque to the
/// engine: it only ever stores, clones and passes them back.
///
/// The write half is issued in strict call order and must be applied
/// synchronously; the engine re-reads structure (parents, siblings) between
/// writes. The read half additionally serves [`load::to_vnode`](crate::load::to_vnode),
/// which imports pre-existing target content into a patchable tree.
pub trait Sink {
	/// Opaque reference to one target node.
	///
	/// Equality must mean target identity, not structural likeness.
	type Handle: Clone + PartialEq + core::fmt::Debug;

	/// Creates a detached element, in `namespace` when one is given.
	fn create_element(&self, tag: &str, namespace: Option<&str>) -> Self::Handle;

	/// Creates a detached text node.
	fn create_text_node(&self, text: &str) -> Self::Handle;

	/// Creates a detached comment node.
	fn create_comment(&self, text: &str) -> Self::Handle;

	/// Inserts `child` under `parent`, directly before `reference`.
	///
	/// `None` appends. A child that is already attached elsewhere is moved,
	/// not duplicated.
	fn insert_before(&self, parent: &Self::Handle, child: &Self::Handle, reference: Option<&Self::Handle>);

	/// Appends `child` as the last child of `parent`, moving it if attached.
	fn append_child(&self, parent: &Self::Handle, child: &Self::Handle);

	/// Detaches `child` from `parent`.
	fn remove_child(&self, parent: &Self::Handle, child: &Self::Handle);

	/// The current parent of `handle`, if it is attached.
	fn parent_node(&self, handle: &Self::Handle) -> Option<Self::Handle>;

	/// The sibling directly after `handle`, if any.
	fn next_sibling(&self, handle: &Self::Handle) -> Option<Self::Handle>;

	/// The element's tag. Only called on element handles.
	fn tag_name(&self, handle: &Self::Handle) -> String;

	/// Replaces the node's text.
	///
	/// On an element this discards all children; on a text or comment node it
	/// rewrites the node's own data.
	fn set_text_content(&self, handle: &Self::Handle, text: &str);

	/// Writes one attribute of an element.
	fn set_attribute(&self, handle: &Self::Handle, name: &str, value: &str);

	fn is_element(&self, handle: &Self::Handle) -> bool;

	fn is_text(&self, handle: &Self::Handle) -> bool;

	fn is_comment(&self, handle: &Self::Handle) -> bool;

	/// The node's text content: own data for text and comment nodes,
	/// concatenated descendant text for elements.
	fn get_text_content(&self, handle: &Self::Handle) -> Option<String>;

	/// Reads one attribute of an element.
	fn get_attribute(&self, handle: &Self::Handle, name: &str) -> Option<String>;

	/// All attribute names currently present on an element.
	fn attribute_names(&self, handle: &Self::Handle) -> Vec<String>;

	/// The node's children, in order.
	fn child_handles(&self, handle: &Self::Handle) -> Vec<Self::Handle>;
}
