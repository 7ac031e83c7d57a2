//! Named keymaps and the editor-wide keymap registry.

use std::sync::Arc;

use mle_primitives::{KeyParseError, parse_pattern};
use rustc_hash::FxHashMap;

use crate::trie::{Binding, BindingNode};

/// A named binding trie with fallthrough semantics.
///
/// When a top-level lookup misses, the keymap's default command (if any) is
/// consulted first; with `allow_fallthru` set, the miss then delegates to
/// the next keymap beneath it on the view's stack.
#[derive(Debug)]
pub struct Keymap {
	name: Arc<str>,
	root: BindingNode,
	default_cmd: Option<Arc<str>>,
	allow_fallthru: bool,
}

impl Keymap {
	pub fn new(name: &str, default_cmd: Option<&str>, allow_fallthru: bool) -> Self {
		Self {
			name: name.into(),
			root: BindingNode::default(),
			default_cmd: default_cmd.map(Into::into),
			allow_fallthru,
		}
	}

	/// Adds a binding from a space-separated key pattern to a command name.
	pub fn bind(&mut self, cmd: &str, pattern: &str, static_param: Option<&str>) -> Result<(), KeyParseError> {
		let keys = parse_pattern(pattern)?;
		self.root.insert(
			&keys,
			Binding {
				cmd: cmd.into(),
				static_param: static_param.map(Into::into),
			},
		);
		Ok(())
	}

	pub fn name(&self) -> &Arc<str> {
		&self.name
	}

	pub fn root(&self) -> &BindingNode {
		&self.root
	}

	pub fn default_cmd(&self) -> Option<&Arc<str>> {
		self.default_cmd.as_ref()
	}

	pub fn allow_fallthru(&self) -> bool {
		self.allow_fallthru
	}
}

/// Editor-wide registry of keymaps, keyed by name.
#[derive(Debug, Default)]
pub struct KeymapRegistry {
	maps: FxHashMap<Arc<str>, Keymap>,
}

impl KeymapRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a keymap, replacing any keymap with the same name.
	pub fn insert(&mut self, keymap: Keymap) {
		self.maps.insert(keymap.name.clone(), keymap);
	}

	pub fn get(&self, name: &str) -> Option<&Keymap> {
		self.maps.get(name)
	}

	pub fn get_mut(&mut self, name: &str) -> Option<&mut Keymap> {
		self.maps.get_mut(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.maps.contains_key(name)
	}
}
