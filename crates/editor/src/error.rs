//! Error types for editor operations.

use thiserror::Error;

use crate::view::ViewId;

/// Errors that can occur while operating the editor core.
#[derive(Debug, Error)]
pub enum Error {
	/// A prompt is already open; nested prompts are not allowed.
	#[error("a prompt is already open")]
	PromptOpen,

	/// A view id does not name a live view.
	#[error("no such view: {0:?}")]
	NoSuchView(ViewId),

	/// A configuration string (keymap, binding, macro, syntax) failed to parse.
	#[error("invalid {what} definition: '{input}'")]
	BadDefinition {
		what: &'static str,
		input: String,
	},

	/// A key token failed to parse.
	#[error(transparent)]
	KeyParse(#[from] mle_primitives::KeyParseError),

	/// A syntax rule regex failed to compile.
	#[error("invalid regex: {0}")]
	Regex(#[from] regex::Error),

	/// Spawning a subprocess failed.
	#[error("failed to spawn '{cmd}': {error}")]
	Spawn {
		cmd: String,
		error: std::io::Error,
	},

	/// A subprocess did not finish within its deadline.
	#[error("shell command timed out: {0}")]
	ShellTimeout(String),

	/// Terminal or pipe I/O failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// The scripted input source ran out of events.
	#[error("scripted input exhausted")]
	InputExhausted,
}

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, Error>;
