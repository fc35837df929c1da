use crate::release::Release;
use core::any::{Any, TypeId};
use core::fmt;
use hashbrown::HashMap;
use std::rc::Rc;

/// Stable identifier disambiguating siblings across reconciliations.
///
/// Equality of `key` (with absence counting as a value) together with equality
/// of the selector is what makes two nodes "the same logical node". Keys must
/// be unique among siblings at diff time; violating that is undefined
/// behaviour and goes undetected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
	Str(String),
	Int(i64),
}

impl From<&str> for Key {
	fn from(value: &str) -> Self {
		Key::Str(value.to_owned())
	}
}
impl From<String> for Key {
	fn from(value: String) -> Self {
		Key::Str(value)
	}
}
impl From<i64> for Key {
	fn from(value: i64) -> Self {
		Key::Int(value)
	}
}
impl From<i32> for Key {
	fn from(value: i32) -> Self {
		Key::Int(value.into())
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Str(s) => f.write_str(s),
			Key::Int(i) => write!(f, "{}", i),
		}
	}
}

pub type InitHook<H> = Rc<dyn Fn(&mut VNode<H>)>;
pub type CreateHook<H> = Rc<dyn Fn(&VNode<H>, &mut VNode<H>)>;
pub type PatchHook<H> = Rc<dyn Fn(&VNode<H>, &mut VNode<H>)>;
pub type InsertHook<H> = Rc<dyn Fn(&VNode<H>)>;
pub type DestroyHook<H> = Rc<dyn Fn(&VNode<H>)>;
pub type RemoveHook<H> = Rc<dyn Fn(&VNode<H>, Release)>;

/// The per-node lifecycle callback slots.
///
/// Every slot is optional; an absent hook is simply skipped. The callbacks are
/// reference-counted so trees stay cheaply clonable.
pub struct HookSet<H> {
	/// Fired before materialization; may rewrite the node's config wholesale.
	pub init: Option<InitHook<H>>,
	/// Fired once the node's own target exists, before its `insert` hook is queued.
	pub create: Option<CreateHook<H>>,
	/// Fired after the whole call's structural phase, in materialization order.
	pub insert: Option<InsertHook<H>>,
	/// Fired at the very start of a single-node patch.
	pub prepatch: Option<PatchHook<H>>,
	/// Fired after the global update hooks of a patch.
	pub update: Option<PatchHook<H>>,
	/// Fired at the very end of a single-node patch.
	pub postpatch: Option<PatchHook<H>>,
	/// Fired for every node of a discarded subtree.
	pub destroy: Option<DestroyHook<H>>,
	/// Fired for the root of a discarded subtree; receives the detach countdown.
	pub remove: Option<RemoveHook<H>>,
}

impl<H> HookSet<H> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn on_init(mut self, hook: impl Fn(&mut VNode<H>) + 'static) -> Self {
		self.init = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_create(mut self, hook: impl Fn(&VNode<H>, &mut VNode<H>) + 'static) -> Self {
		self.create = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_insert(mut self, hook: impl Fn(&VNode<H>) + 'static) -> Self {
		self.insert = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_prepatch(mut self, hook: impl Fn(&VNode<H>, &mut VNode<H>) + 'static) -> Self {
		self.prepatch = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_update(mut self, hook: impl Fn(&VNode<H>, &mut VNode<H>) + 'static) -> Self {
		self.update = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_postpatch(mut self, hook: impl Fn(&VNode<H>, &mut VNode<H>) + 'static) -> Self {
		self.postpatch = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_destroy(mut self, hook: impl Fn(&VNode<H>) + 'static) -> Self {
		self.destroy = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_remove(mut self, hook: impl Fn(&VNode<H>, Release) + 'static) -> Self {
		self.remove = Some(Rc::new(hook));
		self
	}
}

impl<H> Default for HookSet<H> {
	fn default() -> Self {
		Self {
			init: None,
			create: None,
			insert: None,
			prepatch: None,
			update: None,
			postpatch: None,
			destroy: None,
			remove: None,
		}
	}
}

impl<H> Clone for HookSet<H> {
	fn clone(&self) -> Self {
		Self {
			init: self.init.clone(),
			create: self.create.clone(),
			insert: self.insert.clone(),
			prepatch: self.prepatch.clone(),
			update: self.update.clone(),
			postpatch: self.postpatch.clone(),
			destroy: self.destroy.clone(),
			remove: self.remove.clone(),
		}
	}
}

impl<H> fmt::Debug for HookSet<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookSet")
			.field("init", &self.init.is_some())
			.field("create", &self.create.is_some())
			.field("insert", &self.insert.is_some())
			.field("prepatch", &self.prepatch.is_some())
			.field("update", &self.update.is_some())
			.field("postpatch", &self.postpatch.is_some())
			.field("destroy", &self.destroy.is_some())
			.field("remove", &self.remove.is_some())
			.finish()
	}
}

/// Typed side-band storage for third-party module payloads.
///
/// Keys are types, so two modules can never trample each other's entries.
/// Values are reference-counted; cloning a config shares them.
#[derive(Clone, Default)]
pub struct Ext {
	entries: HashMap<TypeId, Rc<dyn Any>>,
}

impl Ext {
	/// Stores `value`, returning the previous entry of the same type if any.
	pub fn insert<T: 'static>(&mut self, value: T) -> Option<Rc<T>> {
		self.entries
			.insert(TypeId::of::<T>(), Rc::new(value))
			.and_then(|previous| previous.downcast::<T>().ok())
	}

	#[must_use]
	pub fn get<T: 'static>(&self) -> Option<&T> {
		self.entries.get(&TypeId::of::<T>()).and_then(|value| value.downcast_ref::<T>())
	}

	pub fn remove<T: 'static>(&mut self) -> Option<Rc<T>> {
		self.entries.remove(&TypeId::of::<T>()).and_then(|previous| previous.downcast::<T>().ok())
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl fmt::Debug for Ext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Ext").field("entries", &self.entries.len()).finish()
	}
}

/// Per-node configuration: the recognized keys plus an open extension map.
pub struct VNodeData<H> {
	/// Mirrored into [`VNode::key`] at construction.
	pub key: Option<Key>,
	/// Namespace for element creation, propagated at build time for foreign
	/// content such as SVG.
	pub ns: Option<String>,
	pub hook: HookSet<H>,
	pub ext: Ext,
}

impl<H> VNodeData<H> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	#[must_use]
	pub fn ns(mut self, ns: impl Into<String>) -> Self {
		self.ns = Some(ns.into());
		self
	}

	#[must_use]
	pub fn hook(mut self, hook: HookSet<H>) -> Self {
		self.hook = hook;
		self
	}
}

impl<H> Default for VNodeData<H> {
	fn default() -> Self {
		Self {
			key: None,
			ns: None,
			hook: HookSet::default(),
			ext: Ext::default(),
		}
	}
}

impl<H> Clone for VNodeData<H> {
	fn clone(&self) -> Self {
		Self {
			key: self.key.clone(),
			ns: self.ns.clone(),
			hook: self.hook.clone(),
			ext: self.ext.clone(),
		}
	}
}

impl<H> fmt::Debug for VNodeData<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("VNodeData")
			.field("key", &self.key)
			.field("ns", &self.ns)
			.field("hook", &self.hook)
			.field("ext", &self.ext)
			.finish()
	}
}

/// A virtual node: the passive description of one slot of the desired tree.
///
/// `H` is the handle type of the sink the tree will be materialized into.
/// `target` stays `None` until materialization and is then carried forward by
/// every later patch of the same logical node.
///
/// A tree passed to [`Patcher::patch`](crate::Patcher::patch) as the old
/// argument is consumed by that call; the returned new tree carries the live
/// targets and becomes the reference for the next call.
#[derive(Clone, Debug)]
pub struct VNode<H> {
	/// Compact `tag#id.class` encoding. `None` makes this a pure text node,
	/// the reserved value `"!"` a comment node.
	pub sel: Option<String>,
	pub data: Option<VNodeData<H>>,
	pub children: Option<Vec<VNode<H>>>,
	pub text: Option<String>,
	pub target: Option<H>,
	pub key: Option<Key>,
}

impl<H> VNode<H> {
	/// Assembles a node, mirroring the key out of `data`.
	#[must_use]
	pub fn new(
		sel: Option<String>,
		data: Option<VNodeData<H>>,
		children: Option<Vec<VNode<H>>>,
		text: Option<String>,
		target: Option<H>,
	) -> Self {
		let key = data.as_ref().and_then(|data| data.key.clone());
		Self {
			sel,
			data,
			children,
			text,
			target,
			key,
		}
	}

	/// A pure text node.
	#[must_use]
	pub fn text_node(text: impl Into<String>) -> Self {
		Self::new(None, None, None, Some(text.into()), None)
	}

	/// The placeholder passed as the first argument of `create` hooks.
	#[must_use]
	pub(crate) fn empty() -> Self {
		Self::new(Some(String::new()), Some(VNodeData::default()), Some(Vec::new()), None, None)
	}

	/// The O(1) identity test: equal key and equal selector, nothing else.
	///
	/// Absent keys compare equal to absent keys. Content is never inspected
	/// here; the shallowness of this test is what keeps the diff near-linear.
	#[must_use]
	pub fn same(&self, other: &Self) -> bool {
		self.key == other.key && self.sel == other.sel
	}

	/// `true` for nodes without a selector.
	#[must_use]
	pub fn is_text_node(&self) -> bool {
		self.sel.is_none()
	}

	/// `true` for nodes carrying the reserved comment selector.
	#[must_use]
	pub fn is_comment_node(&self) -> bool {
		self.sel.as_deref() == Some("!")
	}

	/// The node's hook set, when it carries a config.
	#[must_use]
	pub fn hooks(&self) -> Option<&HookSet<H>> {
		self.data.as_ref().map(|data| &data.hook)
	}
}

impl<H> From<&str> for VNode<H> {
	fn from(text: &str) -> Self {
		Self::text_node(text)
	}
}
impl<H> From<String> for VNode<H> {
	fn from(text: String) -> Self {
		Self::text_node(text)
	}
}
impl<H> From<i64> for VNode<H> {
	fn from(number: i64) -> Self {
		Self::text_node(number.to_string())
	}
}
