//! Keymap tries, keymap stacks, and the chord resolver for mle.
//!
//! A [`Keymap`] owns a trie of [`BindingNode`]s indexed by keystroke
//! sequences, with sentinel edges for numeric prefixes and wildcard
//! captures. Views hold a stack of keymap names; [`resolve`] walks the
//! stack for a pending chord and yields a command reference, a request for
//! more input, or an unbound result.

mod keymap;
mod resolver;
mod trie;

pub use keymap::{Keymap, KeymapRegistry};
pub use resolver::{
	MAX_NUMERIC_LEN, MAX_NUMERIC_PARAMS, MAX_WILDCARD_PARAMS, Resolution, ResolvedBinding, resolve,
};
pub use trie::{Binding, BindingNode};
