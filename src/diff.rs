use core::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use tracing::{error, instrument, trace, trace_span, warn};

use crate::hooks::{Module, ModuleHooks};
use crate::memory::{MemoryHandle, MemorySink};
use crate::release::Release;
use crate::selector;
use crate::sink::Sink;
use crate::vnode::{Key, VNode, VNodeData};

/// A patcher over a fresh [`MemorySink`].
#[must_use]
pub fn init(modules: Vec<Module<MemoryHandle>>) -> Patcher<MemorySink> {
	Patcher::new(modules, MemorySink::new())
}

/// A patcher over a caller-provided adapter.
#[must_use]
pub fn init_with<S: Sink + 'static>(modules: Vec<Module<S::Handle>>, api: S) -> Patcher<S> {
	Patcher::new(modules, api)
}

/// Insert hook bookkeeping for one patch call.
///
/// Nodes are remembered as child index paths into the new tree, in
/// materialization order, and resolved once the structural phase is over.
struct PatchCtx {
	queue: Vec<Vec<usize>>,
	path: Vec<usize>,
}

impl PatchCtx {
	fn new() -> Self {
		Self {
			queue: Vec::new(),
			path: Vec::new(),
		}
	}

	fn enqueue_current(&mut self) {
		self.queue.push(self.path.clone());
	}
}

/// The reconciliation engine, bound to one adapter and one module list.
///
/// A patcher is cheap to keep around and drives any number of roots. Each
/// [`patch`](Patcher::patch) call consumes the previous tree and returns the
/// new one with live targets attached; that return value is the only valid
/// previous tree for the next call over the same root.
pub struct Patcher<S: Sink> {
	api: Rc<S>,
	cbs: ModuleHooks<S::Handle>,
	empty: VNode<S::Handle>,
}

impl<S: Sink + 'static> Patcher<S> {
	#[must_use]
	pub fn new(modules: Vec<Module<S::Handle>>, api: S) -> Self {
		Self {
			api: Rc::new(api),
			cbs: ModuleHooks::assemble(modules),
			empty: VNode::empty(),
		}
	}

	/// The adapter this patcher writes through.
	#[must_use]
	pub fn sink(&self) -> &S {
		&self.api
	}

	/// Reconciles the root from `old` to `new`.
	///
	/// `old` must be the return value of the previous call over this root (or
	/// of the materializing [`patch_handle`](Patcher::patch_handle) call).
	/// When the roots are not the same logical node, the new tree is
	/// materialized from scratch and spliced in at the old root's position.
	#[instrument(skip(old, new))]
	pub fn patch(&self, old: VNode<S::Handle>, new: VNode<S::Handle>) -> VNode<S::Handle> {
		self.run(&old, new)
	}

	/// Reconciles against a pre-existing target node instead of a previous
	/// tree.
	///
	/// The handle is wrapped as a childless element node with its selector
	/// derived from the live tag, id and class, so a matching `new` root is
	/// patched in place and anything else replaces the handle in its parent.
	#[instrument(skip(new))]
	pub fn patch_handle(&self, root: S::Handle, new: VNode<S::Handle>) -> VNode<S::Handle> {
		let old = self.adopt(root);
		self.run(&old, new)
	}

	fn adopt(&self, root: S::Handle) -> VNode<S::Handle> {
		let tag = self.api.tag_name(&root).to_lowercase();
		let id = self.api.get_attribute(&root, "id");
		let class = self.api.get_attribute(&root, "class");
		let sel = selector::compose(&tag, id.as_deref(), class.as_deref());
		trace!("Adopted existing root as {:?}.", sel);
		VNode::new(Some(sel), Some(VNodeData::default()), Some(Vec::new()), None, Some(root))
	}

	fn run(&self, old: &VNode<S::Handle>, mut new: VNode<S::Handle>) -> VNode<S::Handle> {
		let mut ctx = PatchCtx::new();
		for hook in &self.cbs.pre {
			hook();
		}

		if old.same(&new) {
			self.patch_vnode(old, &mut new, &mut ctx);
		} else if let Some(old_target) = old.target.clone() {
			let parent = self.api.parent_node(&old_target);
			let created = self.create_elm(&mut new, &mut ctx);
			if let Some(parent) = parent {
				let next = self.api.next_sibling(&old_target);
				self.api.insert_before(&parent, &created, next.as_ref());
				self.remove_vnodes(&parent, core::iter::once(old));
			} else {
				trace!("Replaced root has no parent; the new tree stays detached.");
			}
		} else {
			error!("Previous root was never materialized; creating the new tree detached.");
			self.create_elm(&mut new, &mut ctx);
		}

		self.run_insert_hooks(&mut new, ctx.queue);
		for hook in &self.cbs.post {
			hook();
		}
		new
	}

	/// Materializes `node` and its subtree, returning the fresh target.
	fn create_elm(&self, node: &mut VNode<S::Handle>, ctx: &mut PatchCtx) -> S::Handle {
		let init = node.data.as_ref().and_then(|data| data.hook.init.clone());
		if let Some(init) = init {
			// May rewrite the node's config; everything below re-reads it.
			init(node);
		}

		match node.sel.clone() {
			Some(sel) if sel == "!" => {
				if node.text.is_none() {
					node.text = Some(String::new());
				}
				let target = self.api.create_comment(node.text.as_deref().unwrap_or_default());
				node.target = Some(target.clone());
				target
			}
			Some(sel) => {
				let span = trace_span!("Materializing", sel = &*sel);
				let _enter = span.enter();

				let parts = selector::parse(&sel);
				let ns = node.data.as_ref().and_then(|data| data.ns.clone());
				let target = self.api.create_element(parts.tag, ns.as_deref());
				if let Some(id) = parts.id {
					self.api.set_attribute(&target, "id", id);
				}
				if let Some(classes) = &parts.classes {
					self.api.set_attribute(&target, "class", classes);
				}
				node.target = Some(target.clone());

				for hook in &self.cbs.create {
					hook(&self.empty, node);
				}

				if let Some(children) = node.children.as_mut() {
					for (index, child) in children.iter_mut().enumerate() {
						ctx.path.push(index);
						let child_target = self.create_elm(child, ctx);
						self.api.append_child(&target, &child_target);
						ctx.path.pop();
					}
				} else if let Some(text) = &node.text {
					self.api.append_child(&target, &self.api.create_text_node(text));
				}

				if let Some(hook) = node.data.as_ref().and_then(|data| data.hook.create.clone()) {
					hook(&self.empty, node);
				}
				if node.data.as_ref().map_or(false, |data| data.hook.insert.is_some()) {
					ctx.enqueue_current();
				}
				target
			}
			None => {
				let target = self.api.create_text_node(node.text.as_deref().unwrap_or_default());
				node.target = Some(target.clone());
				target
			}
		}
	}

	/// Materializes and attaches `nodes[..]` before `before`.
	///
	/// `offset` is the child index of the first node within its parent, for
	/// insert hook paths.
	fn add_vnodes(
		&self,
		parent: &S::Handle,
		before: Option<&S::Handle>,
		nodes: &mut [VNode<S::Handle>],
		offset: usize,
		ctx: &mut PatchCtx,
	) {
		for (index, node) in nodes.iter_mut().enumerate() {
			ctx.path.push(offset + index);
			let target = self.create_elm(node, ctx);
			self.api.insert_before(parent, &target, before);
			ctx.path.pop();
		}
	}

	/// Tears down each node: destroy hooks over the whole subtree, then the
	/// detach countdown for the subtree root.
	fn remove_vnodes<'a>(&self, parent: &S::Handle, nodes: impl IntoIterator<Item = &'a VNode<S::Handle>>)
	where
		S::Handle: 'a,
	{
		for node in nodes {
			if node.sel.is_some() {
				self.invoke_destroy(node);
				let target = match node.target.clone() {
					Some(target) => target,
					None => {
						error!("Removing a node that was never materialized; skipping it.");
						continue;
					}
				};
				let release = Release::new(self.cbs.remove.len() + 1, {
					let api = Rc::clone(&self.api);
					move || match api.parent_node(&target) {
						Some(parent) => api.remove_child(&parent, &target),
						None => warn!("Released node {:?} is no longer attached.", target),
					}
				});
				for hook in &self.cbs.remove {
					hook(node, release.clone());
				}
				match node.data.as_ref().and_then(|data| data.hook.remove.clone()) {
					Some(hook) => hook(node, release),
					None => release.acknowledge(),
				}
			} else if let Some(target) = &node.target {
				self.api.remove_child(parent, target);
			} else {
				warn!("Removing a text node that was never materialized; skipping it.");
			}
		}
	}

	fn invoke_destroy(&self, node: &VNode<S::Handle>) {
		if let Some(data) = &node.data {
			if let Some(hook) = &data.hook.destroy {
				hook(node);
			}
			for hook in &self.cbs.destroy {
				hook(node);
			}
			if let Some(children) = &node.children {
				for child in children {
					self.invoke_destroy(child);
				}
			}
		}
	}

	/// The keyed two-ended sibling diff.
	///
	/// Both lists are narrowed from the outside in. Each round tries, in
	/// order: same front, same back, front moved towards the back, back moved
	/// towards the front, and finally a key lookup over what is left of the
	/// old list. Old nodes consumed out of order leave a hole so the cursors
	/// can skip them later.
	#[allow(clippy::too_many_lines)]
	fn update_children(
		&self,
		parent: &S::Handle,
		old_children: &[VNode<S::Handle>],
		new_children: &mut Vec<VNode<S::Handle>>,
		ctx: &mut PatchCtx,
	) {
		let span = trace_span!(
			"Reconciling children",
			old = old_children.len(),
			new = new_children.len()
		);
		let _enter = span.enter();

		let mut old: Vec<Option<&VNode<S::Handle>>> = old_children.iter().map(Some).collect();
		let mut old_start = 0;
		let mut old_end = old.len();
		let mut new_start = 0;
		let mut new_end = new_children.len();
		// Built lazily, only once a round falls through to the key lookup.
		let mut keyed: Option<HashMap<Key, usize>> = None;

		while old_start < old_end && new_start < new_end {
			if old[old_start].is_none() {
				old_start += 1;
			} else if old[old_end - 1].is_none() {
				old_end -= 1;
			} else if slot_same(old[old_start], &new_children[new_start]) {
				if let Some(node) = old[old_start].take() {
					ctx.path.push(new_start);
					self.patch_vnode(node, &mut new_children[new_start], ctx);
					ctx.path.pop();
				}
				old_start += 1;
				new_start += 1;
			} else if slot_same(old[old_end - 1], &new_children[new_end - 1]) {
				if let Some(node) = old[old_end - 1].take() {
					ctx.path.push(new_end - 1);
					self.patch_vnode(node, &mut new_children[new_end - 1], ctx);
					ctx.path.pop();
				}
				old_end -= 1;
				new_end -= 1;
			} else if slot_same(old[old_start], &new_children[new_end - 1]) {
				// Front node moved towards the back.
				let anchor = old[old_end - 1].and_then(|node| node.target.clone());
				if let Some(node) = old[old_start].take() {
					ctx.path.push(new_end - 1);
					self.patch_vnode(node, &mut new_children[new_end - 1], ctx);
					ctx.path.pop();
				}
				if let Some(moved) = new_children[new_end - 1].target.clone() {
					let next = anchor.as_ref().and_then(|anchor| self.api.next_sibling(anchor));
					self.api.insert_before(parent, &moved, next.as_ref());
				}
				old_start += 1;
				new_end -= 1;
			} else if slot_same(old[old_end - 1], &new_children[new_start]) {
				// Back node moved towards the front.
				let anchor = old[old_start].and_then(|node| node.target.clone());
				if let Some(node) = old[old_end - 1].take() {
					ctx.path.push(new_start);
					self.patch_vnode(node, &mut new_children[new_start], ctx);
					ctx.path.pop();
				}
				if let Some(moved) = new_children[new_start].target.clone() {
					self.api.insert_before(parent, &moved, anchor.as_ref());
				}
				old_end -= 1;
				new_start += 1;
			} else {
				let index = {
					let keyed = keyed.get_or_insert_with(|| key_to_index(&old, old_start, old_end));
					new_children[new_start].key.as_ref().and_then(|key| keyed.get(key).copied())
				};
				let before = old[old_start].and_then(|node| node.target.clone());
				let reusable = match index {
					Some(index) if old[index].map_or(false, |node| node.sel == new_children[new_start].sel) => {
						old[index].take()
					}
					_ => None,
				};
				match reusable {
					Some(node) => {
						ctx.path.push(new_start);
						self.patch_vnode(node, &mut new_children[new_start], ctx);
						ctx.path.pop();
						if let Some(moved) = new_children[new_start].target.clone() {
							self.api.insert_before(parent, &moved, before.as_ref());
						}
					}
					None => {
						// Unknown key or a selector clash; materialize in place.
						ctx.path.push(new_start);
						let created = self.create_elm(&mut new_children[new_start], ctx);
						ctx.path.pop();
						self.api.insert_before(parent, &created, before.as_ref());
					}
				}
				new_start += 1;
			}
		}

		if old_start >= old_end {
			if new_start < new_end {
				let before = new_children.get(new_end).and_then(|node| node.target.clone());
				self.add_vnodes(
					parent,
					before.as_ref(),
					&mut new_children[new_start..new_end],
					new_start,
					ctx,
				);
			}
		} else if new_start >= new_end {
			self.remove_vnodes(parent, old.drain(old_start..old_end).flatten());
		}
	}

	/// Patches one logical node in place; `old` and `new` are already known
	/// to be the same per [`VNode::same`].
	fn patch_vnode(&self, old: &VNode<S::Handle>, new: &mut VNode<S::Handle>, ctx: &mut PatchCtx) {
		let span = trace_span!("Patching", sel = new.sel.as_deref().unwrap_or("#text"));
		let _enter = span.enter();

		let prepatch = new.data.as_ref().and_then(|data| data.hook.prepatch.clone());
		let postpatch = new.data.as_ref().and_then(|data| data.hook.postpatch.clone());
		if let Some(hook) = &prepatch {
			hook(old, new);
		}

		let target = match old.target.clone() {
			Some(target) => target,
			None => {
				error!("Patching against a node that was never materialized; leaving the new tree detached.");
				return;
			}
		};
		new.target = Some(target.clone());

		if new.data.is_some() {
			for hook in &self.cbs.update {
				hook(old, new);
			}
			if let Some(hook) = new.data.as_ref().and_then(|data| data.hook.update.clone()) {
				hook(old, new);
			}
		}

		if new.text.is_none() {
			match (old.children.as_ref(), new.children.as_mut()) {
				(Some(old_children), Some(new_children)) => {
					self.update_children(&target, old_children, new_children, ctx);
				}
				(None, Some(new_children)) => {
					if old.text.is_some() {
						self.api.set_text_content(&target, "");
					}
					self.add_vnodes(&target, None, new_children, 0, ctx);
				}
				(Some(old_children), None) => {
					self.remove_vnodes(&target, old_children);
				}
				(None, None) => {
					if old.text.is_some() {
						self.api.set_text_content(&target, "");
					}
				}
			}
		} else if new.text != old.text {
			if let Some(old_children) = old.children.as_ref() {
				self.remove_vnodes(&target, old_children);
			}
			if let Some(text) = &new.text {
				if cfg!(feature = "dangerous-logging") {
					trace!("Writing text {:?}.", text);
				} else {
					trace!("Writing text ({} bytes).", text.len());
				}
				self.api.set_text_content(&target, text);
			}
		}

		if let Some(hook) = &postpatch {
			hook(old, new);
		}
	}

	fn run_insert_hooks(&self, root: &mut VNode<S::Handle>, queue: Vec<Vec<usize>>) {
		for path in queue {
			match node_at_path(root, &path) {
				Some(node) => {
					let hook = node.data.as_ref().and_then(|data| data.hook.insert.clone());
					if let Some(hook) = hook {
						hook(node);
					}
				}
				None => error!("Queued insert hook path no longer resolves; skipping it."),
			}
		}
	}
}

impl<S: Sink> fmt::Debug for Patcher<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Patcher").field("modules", &self.cbs).finish()
	}
}

fn slot_same<H>(slot: Option<&VNode<H>>, node: &VNode<H>) -> bool {
	slot.map_or(false, |old| old.same(node))
}

fn key_to_index<H>(old: &[Option<&VNode<H>>], start: usize, end: usize) -> HashMap<Key, usize> {
	let mut map = HashMap::new();
	for index in start..end {
		if let Some(node) = old[index] {
			if let Some(key) = &node.key {
				map.insert(key.clone(), index);
			}
		}
	}
	map
}

fn node_at_path<'a, H>(root: &'a mut VNode<H>, path: &[usize]) -> Option<&'a mut VNode<H>> {
	let mut node = root;
	for &index in path {
		node = node.children.as_mut()?.get_mut(index)?;
	}
	Some(node)
}
