#![doc(html_root_url = "https://docs.rs/cambium/0.0.1")]
#![warn(clippy::pedantic)]

//! A keyed virtual-tree differ that renders through pluggable sinks.
//!
//! Describe the desired tree with [`h`] and hand it to a [`Patcher`]; the
//! engine reconciles the target with the minimum of structural edits and
//! returns the tree to diff against next time. See the README for a worked
//! example.

pub mod diff;
pub mod h;
pub mod hooks;
pub mod load;
pub mod memory;
pub mod release;
mod selector;
pub mod sink;
pub mod vnode;

pub use diff::{init, init_with, Patcher};
pub use h::{h, text, Children, SVG_NAMESPACE};
pub use hooks::Module;
pub use memory::{MemoryHandle, MemorySink};
pub use release::Release;
pub use sink::Sink;
pub use vnode::{HookSet, Key, VNode, VNodeData};

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}
