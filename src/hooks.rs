use core::fmt;

use crate::release::Release;
use crate::vnode::VNode;

type PhaseHook = Box<dyn Fn()>;
type PairHook<H> = Box<dyn Fn(&VNode<H>, &mut VNode<H>)>;
type RemoveHook<H> = Box<dyn Fn(&VNode<H>, Release)>;
type DestroyHook<H> = Box<dyn Fn(&VNode<H>)>;

/// One pluggable extension of the engine.
///
/// Modules carry no identity of their own; they are just a bundle of optional
/// callbacks registered at patcher construction. A typical module mirrors one
/// config concern (attributes, listeners, styles) onto the target inside its
/// `create` and `update` callbacks.
pub struct Module<H> {
	/// Runs at the start of every patch call.
	pub pre: Option<PhaseHook>,
	/// Runs for every materialized element, before the element's children.
	pub create: Option<PairHook<H>>,
	/// Runs for every patched node that carries a config.
	pub update: Option<PairHook<H>>,
	/// Runs for every detaching subtree root; must acknowledge the release.
	pub remove: Option<RemoveHook<H>>,
	/// Runs for every node of a discarded subtree.
	pub destroy: Option<DestroyHook<H>>,
	/// Runs at the end of every patch call.
	pub post: Option<PhaseHook>,
}

impl<H> Module<H> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn on_pre(mut self, hook: impl Fn() + 'static) -> Self {
		self.pre = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_create(mut self, hook: impl Fn(&VNode<H>, &mut VNode<H>) + 'static) -> Self {
		self.create = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_update(mut self, hook: impl Fn(&VNode<H>, &mut VNode<H>) + 'static) -> Self {
		self.update = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_remove(mut self, hook: impl Fn(&VNode<H>, Release) + 'static) -> Self {
		self.remove = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_destroy(mut self, hook: impl Fn(&VNode<H>) + 'static) -> Self {
		self.destroy = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_post(mut self, hook: impl Fn() + 'static) -> Self {
		self.post = Some(Box::new(hook));
		self
	}
}

impl<H> Default for Module<H> {
	fn default() -> Self {
		Self {
			pre: None,
			create: None,
			update: None,
			remove: None,
			destroy: None,
			post: None,
		}
	}
}

impl<H> fmt::Debug for Module<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Module")
			.field("pre", &self.pre.is_some())
			.field("create", &self.create.is_some())
			.field("update", &self.update.is_some())
			.field("remove", &self.remove.is_some())
			.field("destroy", &self.destroy.is_some())
			.field("post", &self.post.is_some())
			.finish()
	}
}

/// Module callbacks folded into per-phase call lists, in registration order.
///
/// Built once at patcher construction so the hot path never walks absent
/// slots.
pub(crate) struct ModuleHooks<H> {
	pub(crate) pre: Vec<PhaseHook>,
	pub(crate) create: Vec<PairHook<H>>,
	pub(crate) update: Vec<PairHook<H>>,
	pub(crate) remove: Vec<RemoveHook<H>>,
	pub(crate) destroy: Vec<DestroyHook<H>>,
	pub(crate) post: Vec<PhaseHook>,
}

impl<H> ModuleHooks<H> {
	pub(crate) fn assemble(modules: Vec<Module<H>>) -> Self {
		let mut folded = Self {
			pre: Vec::new(),
			create: Vec::new(),
			update: Vec::new(),
			remove: Vec::new(),
			destroy: Vec::new(),
			post: Vec::new(),
		};
		for module in modules {
			if let Some(hook) = module.pre {
				folded.pre.push(hook);
			}
			if let Some(hook) = module.create {
				folded.create.push(hook);
			}
			if let Some(hook) = module.update {
				folded.update.push(hook);
			}
			if let Some(hook) = module.remove {
				folded.remove.push(hook);
			}
			if let Some(hook) = module.destroy {
				folded.destroy.push(hook);
			}
			if let Some(hook) = module.post {
				folded.post.push(hook);
			}
		}
		folded
	}
}

impl<H> fmt::Debug for ModuleHooks<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModuleHooks")
			.field("pre", &self.pre.len())
			.field("create", &self.create.len())
			.field("update", &self.update.len())
			.field("remove", &self.remove.len())
			.field("destroy", &self.destroy.len())
			.field("post", &self.post.len())
			.finish()
	}
}
