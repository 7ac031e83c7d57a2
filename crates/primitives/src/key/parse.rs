//! Parsing of plain-text key tokens and binding patterns.
//!
//! Binding patterns are space-separated sequences of tokens. A token is
//! either a named special key (`enter`, `page-up`, `f3`), a literal UTF-8
//! character, any of those with `C-`/`M-`/`S-` modifier prefixes, or one of
//! the two sentinels:
//!
//! * `##`: the numeric sentinel, matching a run of decimal digits
//! * `**`: the wildcard sentinel, matching any keystroke
//!
//! Sentinels are only meaningful inside binding patterns; parsing a concrete
//! key (macro definitions, the macro toggle key) rejects them.

use std::fmt;
use std::str::FromStr;

use super::{Key, KeyCode, Modifiers};

/// One element of a binding pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKey {
	/// Matches exactly this keystroke.
	Key(Key),
	/// Matches a run of decimal digits, captured as a numeric parameter.
	Numeric,
	/// Matches any keystroke, capturing its codepoint.
	Wildcard,
}

/// Error produced when a key token or pattern fails to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParseError {
	token: String,
}

impl KeyParseError {
	fn new(token: &str) -> Self {
		Self { token: token.to_string() }
	}
}

impl fmt::Display for KeyParseError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "invalid key token: '{}'", self.token)
	}
}

impl std::error::Error for KeyParseError {}

/// Parses a single pattern token, accepting the sentinels.
pub fn parse_key_token(token: &str) -> Result<PatternKey, KeyParseError> {
	match token {
		"##" => Ok(PatternKey::Numeric),
		"**" => Ok(PatternKey::Wildcard),
		_ => parse_key(token).map(PatternKey::Key),
	}
}

/// Parses a whitespace-separated binding pattern.
pub fn parse_pattern(pattern: &str) -> Result<Vec<PatternKey>, KeyParseError> {
	let keys: Vec<PatternKey> = pattern.split_whitespace().map(parse_key_token).collect::<Result<_, _>>()?;
	if keys.is_empty() {
		return Err(KeyParseError::new(pattern));
	}
	Ok(keys)
}

/// Parses a concrete key token (no sentinels).
pub fn parse_key(token: &str) -> Result<Key, KeyParseError> {
	let mut modifiers = Modifiers::NONE;
	let mut rest = token;

	// Strip modifier prefixes. A trailing lone '-' is a literal key, so the
	// prefix is only consumed while more than one character remains.
	loop {
		let Some((prefix, tail)) = rest.split_at_checked(2) else {
			break;
		};
		if tail.is_empty() {
			break;
		}
		match prefix {
			"C-" => modifiers.ctrl = true,
			"M-" => modifiers.alt = true,
			"S-" => modifiers.shift = true,
			_ => break,
		}
		rest = tail;
	}

	let code = parse_base_key(rest).ok_or_else(|| KeyParseError::new(token))?;
	Ok(Key { code, modifiers }.canonicalize())
}

/// Parses the base portion of a token: a named key, `fN`, or a single char.
fn parse_base_key(base: &str) -> Option<KeyCode> {
	let mut chars = base.chars();
	if let (Some(c), None) = (chars.next(), chars.next()) {
		return Some(KeyCode::Char(c));
	}

	let lower = base.to_ascii_lowercase();
	if let Some(num) = lower.strip_prefix('f')
		&& let Ok(n) = num.parse::<u8>()
		&& (1..=12).contains(&n)
	{
		return Some(KeyCode::F(n));
	}

	let code = match lower.as_str() {
		"backtab" => KeyCode::BackTab,
		"backspace" => KeyCode::Backspace,
		"delete" | "del" => KeyCode::Delete,
		"down" => KeyCode::Down,
		"end" => KeyCode::End,
		"enter" => KeyCode::Enter,
		"esc" | "escape" => KeyCode::Esc,
		"home" => KeyCode::Home,
		"insert" => KeyCode::Insert,
		"left" => KeyCode::Left,
		"page-down" => KeyCode::PageDown,
		"page-up" => KeyCode::PageUp,
		"right" => KeyCode::Right,
		"space" => KeyCode::Space,
		"tab" => KeyCode::Tab,
		"up" => KeyCode::Up,
		_ => return None,
	};
	Some(code)
}

impl FromStr for Key {
	type Err = KeyParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_key(s)
	}
}
