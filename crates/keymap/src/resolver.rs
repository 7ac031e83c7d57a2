//! Chord resolution against a keymap stack.
//!
//! Resolution is a pure function of the registry, the stack, and the
//! pending chord, so peeking (classifying an input without committing) is
//! just a call with a hypothetical sequence, and two runs from identical
//! state always agree.

use std::sync::Arc;

use mle_primitives::Key;
use tracing::{debug, warn};

use crate::keymap::{Keymap, KeymapRegistry};
use crate::trie::{Binding, BindingNode};

/// Maximum digits accepted while accumulating a numeric prefix.
pub const MAX_NUMERIC_LEN: usize = 8;
/// Maximum numeric parameters captured per chord.
pub const MAX_NUMERIC_PARAMS: usize = 8;
/// Maximum wildcard parameters captured per chord.
pub const MAX_WILDCARD_PARAMS: usize = 8;

/// A fully resolved binding with its captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
	pub cmd: Arc<str>,
	pub static_param: Option<Arc<str>>,
	/// Numeric prefixes in capture order.
	pub numeric_params: Vec<u32>,
	/// Wildcard codepoints in capture order (`'\0'` for special keys).
	pub wildcard_params: Vec<char>,
}

/// Outcome of resolving a pending chord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// A leaf binding (or a keymap default command) was reached.
	Resolved(ResolvedBinding),
	/// The chord is a proper prefix of at least one binding.
	Pending,
	/// No binding matches; the chord should be discarded.
	Unbound,
}

/// Result of walking a single keymap's trie.
enum Walk<'a> {
	Leaf(&'a Binding, Vec<u32>, Vec<char>),
	Partial,
	/// The first keystroke matched nothing at the top level; default-command
	/// and fallthrough rules apply.
	MissAtRoot,
	/// A later keystroke missed mid-traversal; the chord is dead.
	Miss,
	/// A parameter buffer overflowed; the whole chord aborts.
	Overflow,
}

/// Resolves `seq` against `stack` (tail first). The stack holds keymap
/// names; entries naming unregistered keymaps resolve as unbound.
pub fn resolve(registry: &KeymapRegistry, stack: &[Arc<str>], seq: &[Key]) -> Resolution {
	for name in stack.iter().rev() {
		let Some(keymap) = registry.get(name) else {
			warn!(keymap = %name, "keymap stack names an unregistered keymap");
			return Resolution::Unbound;
		};
		match walk(keymap, seq) {
			Walk::Leaf(binding, numeric_params, wildcard_params) => {
				return Resolution::Resolved(ResolvedBinding {
					cmd: binding.cmd.clone(),
					static_param: binding.static_param.clone(),
					numeric_params,
					wildcard_params,
				});
			}
			Walk::Partial => return Resolution::Pending,
			Walk::Miss => return Resolution::Unbound,
			Walk::Overflow => {
				debug!(keymap = %name, "chord aborted: parameter buffer exhausted");
				return Resolution::Unbound;
			}
			Walk::MissAtRoot => {
				if let Some(cmd) = keymap.default_cmd() {
					return Resolution::Resolved(ResolvedBinding {
						cmd: cmd.clone(),
						static_param: None,
						numeric_params: Vec::new(),
						wildcard_params: Vec::new(),
					});
				}
				if !keymap.allow_fallthru() {
					return Resolution::Unbound;
				}
			}
		}
	}
	Resolution::Unbound
}

/// Walks one keymap's trie for the whole chord.
///
/// Per-step order at a node: numeric accumulation, numeric finalization,
/// exact child, wildcard child. Digits bound for a numeric edge never reach
/// the wildcard edge.
fn walk<'a>(keymap: &'a Keymap, seq: &[Key]) -> Walk<'a> {
	let mut node = keymap.root();
	let mut numeric_buf = String::new();
	let mut numeric_child: Option<&'a BindingNode> = None;
	let mut numeric_params: Vec<u32> = Vec::new();
	let mut wildcard_params: Vec<char> = Vec::new();
	let mut at_root = true;

	for key in seq {
		if let Some(digit) = key.as_digit() {
			if numeric_child.is_none() {
				numeric_child = node.numeric();
			}
			if numeric_child.is_some() {
				if numeric_buf.len() >= MAX_NUMERIC_LEN {
					return Walk::Overflow;
				}
				numeric_buf.push(char::from_digit(digit, 10).unwrap_or('0'));
				at_root = false;
				continue;
			}
		}

		if !numeric_buf.is_empty() {
			if numeric_params.len() >= MAX_NUMERIC_PARAMS {
				return Walk::Overflow;
			}
			// At most MAX_NUMERIC_LEN digits, so the parse cannot overflow u32.
			numeric_params.push(numeric_buf.parse().unwrap_or(u32::MAX));
			numeric_buf.clear();
			node = numeric_child.take().expect("numeric buffer implies a numeric edge");
		}

		if let Some(child) = node.child(key) {
			node = child;
		} else if let Some(wildcard) = node.wildcard() {
			if wildcard_params.len() >= MAX_WILDCARD_PARAMS {
				return Walk::Overflow;
			}
			wildcard_params.push(key.codepoint());
			node = wildcard;
		} else {
			return if at_root { Walk::MissAtRoot } else { Walk::Miss };
		}
		at_root = false;
	}

	if !numeric_buf.is_empty() {
		// Mid-accumulation; the numeric edge guarantees a continuation.
		return Walk::Partial;
	}
	if let Some(binding) = node.leaf() {
		return Walk::Leaf(binding, numeric_params, wildcard_params);
	}
	if node.has_children() {
		return Walk::Partial;
	}
	// Unreachable for tries built through insert: a node is a leaf, has
	// children, or both.
	Walk::Miss
}

#[cfg(test)]
mod tests {
	use mle_primitives::{Key, KeyCode};

	use super::*;

	fn registry_with(maps: Vec<Keymap>) -> KeymapRegistry {
		let mut registry = KeymapRegistry::new();
		for map in maps {
			registry.insert(map);
		}
		registry
	}

	fn normal_keymap() -> Keymap {
		let mut map = Keymap::new("normal", Some("insert-data"), false);
		map.bind("copy-by", "C-c d", Some("bracket")).unwrap();
		map.bind("copy-by", "C-c w", Some("word")).unwrap();
		map.bind("move-relative", "M-y ## u", Some("up")).unwrap();
		map.bind("move-relative", "M-y ## d", Some("down")).unwrap();
		map.bind("move-until-forward", "M-' **", None).unwrap();
		map.bind("cut", "C-k", None).unwrap();
		map
	}

	fn stack(names: &[&str]) -> Vec<std::sync::Arc<str>> {
		names.iter().map(|n| (*n).into()).collect()
	}

	fn keys(s: &str) -> Vec<Key> {
		s.chars().map(Key::char).collect()
	}

	fn expect_resolved(resolution: Resolution) -> ResolvedBinding {
		match resolution {
			Resolution::Resolved(binding) => binding,
			other => panic!("expected Resolved, got {other:?}"),
		}
	}

	#[test]
	fn single_key_binding() {
		let registry = registry_with(vec![normal_keymap()]);
		let stack = stack(&["normal"]);
		let binding = expect_resolved(resolve(&registry, &stack, &[Key::ctrl('k')]));
		assert_eq!(&*binding.cmd, "cut");
		assert!(binding.numeric_params.is_empty());
	}

	#[test]
	fn multi_key_chord_reports_pending_then_resolves() {
		let registry = registry_with(vec![normal_keymap()]);
		let stack = stack(&["normal"]);

		assert_eq!(resolve(&registry, &stack, &[Key::ctrl('c')]), Resolution::Pending);

		let binding = expect_resolved(resolve(&registry, &stack, &[Key::ctrl('c'), Key::char('d')]));
		assert_eq!(&*binding.cmd, "copy-by");
		assert_eq!(binding.static_param.as_deref(), Some("bracket"));
	}

	#[test]
	fn numeric_prefix_parses_decimal_and_leaves_wildcards_alone() {
		let registry = registry_with(vec![normal_keymap()]);
		let stack = stack(&["normal"]);

		let mut seq = vec![Key::alt('y')];
		assert_eq!(resolve(&registry, &stack, &seq), Resolution::Pending);
		seq.push(Key::char('1'));
		assert_eq!(resolve(&registry, &stack, &seq), Resolution::Pending);
		seq.push(Key::char('2'));
		assert_eq!(resolve(&registry, &stack, &seq), Resolution::Pending);
		seq.push(Key::char('u'));

		let binding = expect_resolved(resolve(&registry, &stack, &seq));
		assert_eq!(&*binding.cmd, "move-relative");
		assert_eq!(binding.static_param.as_deref(), Some("up"));
		assert_eq!(binding.numeric_params, vec![12]);
		assert!(binding.wildcard_params.is_empty());
	}

	#[test]
	fn wildcard_captures_codepoint() {
		let registry = registry_with(vec![normal_keymap()]);
		let stack = stack(&["normal"]);

		let binding = expect_resolved(resolve(&registry, &stack, &[Key::alt('\''), Key::char('q')]));
		assert_eq!(&*binding.cmd, "move-until-forward");
		assert_eq!(binding.wildcard_params, vec!['q']);
	}

	#[test]
	fn wildcard_captures_nul_for_special_keys() {
		let registry = registry_with(vec![normal_keymap()]);
		let stack = stack(&["normal"]);

		let binding = expect_resolved(resolve(&registry, &stack, &[Key::alt('\''), Key::new(KeyCode::Left)]));
		assert_eq!(binding.wildcard_params, vec!['\0']);
	}

	#[test]
	fn default_command_fires_on_top_level_miss() {
		let registry = registry_with(vec![normal_keymap()]);
		let stack = stack(&["normal"]);

		let binding = expect_resolved(resolve(&registry, &stack, &keys("x")));
		assert_eq!(&*binding.cmd, "insert-data");
	}

	#[test]
	fn mid_chord_miss_is_unbound_not_default() {
		let registry = registry_with(vec![normal_keymap()]);
		let stack = stack(&["normal"]);

		// C-c anchors the chord; 'z' misses mid-traversal and the default
		// command must not fire.
		assert_eq!(
			resolve(&registry, &stack, &[Key::ctrl('c'), Key::char('z')]),
			Resolution::Unbound
		);
	}

	#[test]
	fn fallthru_delegates_to_keymap_beneath() {
		let mut prompt = Keymap::new("prompt-input", None, true);
		prompt.bind("prompt-submit", "enter", None).unwrap();
		let registry = registry_with(vec![normal_keymap(), prompt]);
		let stack = stack(&["normal", "prompt-input"]);

		// Bound in the prompt keymap itself.
		let binding = expect_resolved(resolve(&registry, &stack, &[Key::new(KeyCode::Enter)]));
		assert_eq!(&*binding.cmd, "prompt-submit");

		// Unbound printable falls through to normal's default.
		let binding = expect_resolved(resolve(&registry, &stack, &keys("x")));
		assert_eq!(&*binding.cmd, "insert-data");

		// Chords from the keymap beneath stay reachable through fallthru.
		let binding = expect_resolved(resolve(&registry, &stack, &[Key::ctrl('c'), Key::char('w')]));
		assert_eq!(&*binding.cmd, "copy-by");
	}

	#[test]
	fn fallthru_flag_off_blocks_delegation() {
		let mut yn = Keymap::new("prompt-yn", None, false);
		yn.bind("prompt-yes", "y", None).unwrap();
		let registry = registry_with(vec![normal_keymap(), yn]);
		let stack = stack(&["normal", "prompt-yn"]);

		assert_eq!(resolve(&registry, &stack, &keys("x")), Resolution::Unbound);
	}

	#[test]
	fn numeric_buffer_boundary() {
		let registry = registry_with(vec![normal_keymap()]);
		let stack = stack(&["normal"]);

		// Exactly MAX_NUMERIC_LEN digits still resolve.
		let mut seq = vec![Key::alt('y')];
		seq.extend(std::iter::repeat_n(Key::char('9'), MAX_NUMERIC_LEN));
		assert_eq!(resolve(&registry, &stack, &seq), Resolution::Pending);
		seq.push(Key::char('u'));
		let binding = expect_resolved(resolve(&registry, &stack, &seq));
		assert_eq!(binding.numeric_params, vec![99_999_999]);

		// One more digit aborts the whole chord.
		let mut seq = vec![Key::alt('y')];
		seq.extend(std::iter::repeat_n(Key::char('9'), MAX_NUMERIC_LEN + 1));
		assert_eq!(resolve(&registry, &stack, &seq), Resolution::Unbound);
	}

	#[test]
	fn digits_without_numeric_edge_take_literal_edges() {
		let mut map = Keymap::new("digits", None, false);
		map.bind("five", "g 5", None).unwrap();
		let registry = registry_with(vec![map]);
		let stack = stack(&["digits"]);

		let binding = expect_resolved(resolve(&registry, &stack, &[Key::char('g'), Key::char('5')]));
		assert_eq!(&*binding.cmd, "five");
	}

	#[test]
	fn resolution_is_deterministic() {
		let registry = registry_with(vec![normal_keymap()]);
		let stack = stack(&["normal"]);
		let seq = [Key::alt('y'), Key::char('4'), Key::char('2'), Key::char('d')];

		let first = resolve(&registry, &stack, &seq);
		let second = resolve(&registry, &stack, &seq);
		assert_eq!(first, second);
	}

	#[test]
	fn unregistered_stack_entry_is_unbound() {
		let registry = registry_with(vec![]);
		let stack = stack(&["missing"]);
		assert_eq!(resolve(&registry, &stack, &keys("x")), Resolution::Unbound);
	}

	#[test]
	fn empty_stack_is_unbound() {
		let registry = registry_with(vec![normal_keymap()]);
		assert_eq!(resolve(&registry, &[], &keys("x")), Resolution::Unbound);
	}
}
