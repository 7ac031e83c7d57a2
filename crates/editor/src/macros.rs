//! Named keystroke macros.

use std::sync::Arc;

use mle_primitives::{Key, parse_key};

use crate::error::{Error, Result};

/// A named, replayable sequence of recorded keystrokes.
#[derive(Debug, Clone)]
pub struct Macro {
	pub name: Arc<str>,
	pub inputs: Vec<Key>,
}

impl Macro {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.into(),
			inputs: Vec::new(),
		}
	}

	/// Parses a `name,key1,key2,…` definition. A macro with no keys is
	/// rejected.
	pub fn parse_def(def: &str) -> Result<Self> {
		let mut parts = def.split(',');
		let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(|| Error::BadDefinition {
			what: "macro",
			input: def.to_string(),
		})?;
		let inputs: Vec<Key> = parts.map(parse_key).collect::<std::result::Result<_, _>>()?;
		if inputs.is_empty() {
			return Err(Error::BadDefinition {
				what: "macro",
				input: def.to_string(),
			});
		}
		Ok(Self {
			name: name.into(),
			inputs,
		})
	}
}

/// Replay state substituting a macro's inputs for the terminal.
#[derive(Debug)]
pub struct MacroReplay {
	pub inputs: Vec<Key>,
	pub index: usize,
}

impl MacroReplay {
	pub fn new(inputs: Vec<Key>) -> Self {
		Self { inputs, index: 0 }
	}

	/// Takes the next replayed keystroke, if any remain.
	pub fn next(&mut self) -> Option<Key> {
		let key = self.inputs.get(self.index).copied()?;
		self.index += 1;
		Some(key)
	}
}
