//! Binding trie nodes.

use std::sync::Arc;

use mle_primitives::{Key, PatternKey};
use rustc_hash::FxHashMap;

/// Leaf payload of a trie node: a late-bound command reference plus an
/// optional static parameter baked into the binding.
#[derive(Debug, Clone)]
pub struct Binding {
	pub cmd: Arc<str>,
	pub static_param: Option<Arc<str>>,
}

/// A node in a keymap trie.
///
/// Children are keyed by concrete keystrokes; the numeric and wildcard
/// sentinel edges are stored separately so the resolver can consult them in
/// a fixed order. Every node reachable through [`BindingNode::insert`] has
/// at least one child edge or a leaf payload.
#[derive(Debug, Default)]
pub struct BindingNode {
	children: FxHashMap<Key, BindingNode>,
	numeric: Option<Box<BindingNode>>,
	wildcard: Option<Box<BindingNode>>,
	leaf: Option<Binding>,
}

impl BindingNode {
	/// Inserts a binding for the given pattern, reusing existing prefix
	/// nodes. Rebinding an existing pattern replaces its leaf.
	pub fn insert(&mut self, pattern: &[PatternKey], binding: Binding) {
		match pattern.split_first() {
			None => self.leaf = Some(binding),
			Some((head, rest)) => self.child_entry(head).insert(rest, binding),
		}
	}

	fn child_entry(&mut self, key: &PatternKey) -> &mut BindingNode {
		match key {
			PatternKey::Key(k) => self.children.entry(*k).or_default(),
			PatternKey::Numeric => self.numeric.get_or_insert_default(),
			PatternKey::Wildcard => self.wildcard.get_or_insert_default(),
		}
	}

	pub fn child(&self, key: &Key) -> Option<&BindingNode> {
		self.children.get(key)
	}

	pub fn numeric(&self) -> Option<&BindingNode> {
		self.numeric.as_deref()
	}

	pub fn wildcard(&self) -> Option<&BindingNode> {
		self.wildcard.as_deref()
	}

	pub fn leaf(&self) -> Option<&Binding> {
		self.leaf.as_ref()
	}

	/// Returns true if this node has any outgoing edge, sentinels included.
	pub fn has_children(&self) -> bool {
		!self.children.is_empty() || self.numeric.is_some() || self.wildcard.is_some()
	}

	/// Checks the trie invariant recursively: every node below the root has
	/// children, a leaf, or both.
	pub fn is_well_formed(&self) -> bool {
		let subtrees = self
			.children
			.values()
			.chain(self.numeric.as_deref())
			.chain(self.wildcard.as_deref());
		subtrees.into_iter().all(|n| (n.has_children() || n.leaf.is_some()) && n.is_well_formed())
	}
}
