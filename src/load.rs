use std::collections::BTreeMap;

use tracing::trace_span;

use crate::selector;
use crate::sink::Sink;
use crate::vnode::{VNode, VNodeData};

/// Attribute map captured off an imported element.
///
/// `id` and `class` are not listed here; they are folded into the node's
/// selector instead. Stored under [`Ext`](crate::vnode::Ext), so an attribute
/// module can pick the map up on the first patch against the imported tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadedAttributes(pub BTreeMap<String, String>);

/// Imports a live target subtree as a patchable tree.
///
/// The result carries the visited handles as targets, so handing it to
/// [`Patcher::patch`](crate::Patcher::patch) as the previous tree reconciles
/// in place against content that was rendered by someone else, e.g. markup
/// produced on a server. Element selectors are rebuilt from the live tag, id
/// and class; unknown node kinds import as elements with an empty selector.
pub fn to_vnode<S: Sink>(api: &S, handle: &S::Handle) -> VNode<S::Handle> {
	let span = trace_span!("Importing");
	let _enter = span.enter();
	import(api, handle)
}

fn import<S: Sink>(api: &S, handle: &S::Handle) -> VNode<S::Handle> {
	if api.is_element(handle) {
		let tag = api.tag_name(handle).to_lowercase();
		let id = api.get_attribute(handle, "id");
		let class = api.get_attribute(handle, "class");
		let sel = selector::compose(&tag, id.as_deref(), class.as_deref());

		let mut attributes = BTreeMap::new();
		for name in api.attribute_names(handle) {
			if name == "id" || name == "class" {
				continue;
			}
			if let Some(value) = api.get_attribute(handle, &name) {
				attributes.insert(name, value);
			}
		}
		let mut data = VNodeData::default();
		data.ext.insert(LoadedAttributes(attributes));

		let children = api
			.child_handles(handle)
			.iter()
			.map(|child| import(api, child))
			.collect();
		VNode::new(Some(sel), Some(data), Some(children), None, Some(handle.clone()))
	} else if api.is_text(handle) {
		VNode::new(
			None,
			None,
			None,
			Some(api.get_text_content(handle).unwrap_or_default()),
			Some(handle.clone()),
		)
	} else if api.is_comment(handle) {
		VNode::new(
			Some("!".to_owned()),
			Some(VNodeData::default()),
			Some(Vec::new()),
			Some(api.get_text_content(handle).unwrap_or_default()),
			Some(handle.clone()),
		)
	} else {
		VNode::new(
			Some(String::new()),
			Some(VNodeData::default()),
			Some(Vec::new()),
			None,
			Some(handle.clone()),
		)
	}
}
