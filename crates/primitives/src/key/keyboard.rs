//! Runtime keystroke representation.

use std::fmt;

use super::Modifiers;

/// Key codes carried by input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
	BackTab,
	Backspace,
	Delete,
	Down,
	End,
	Enter,
	Esc,
	Home,
	Insert,
	Left,
	PageDown,
	PageUp,
	Right,
	Space,
	Tab,
	Up,
	F(u8),
	Char(char),
}

impl fmt::Display for KeyCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Char(c) => write!(f, "{c}"),
			Self::F(n) => write!(f, "f{n}"),
			Self::BackTab => write!(f, "backtab"),
			Self::Backspace => write!(f, "backspace"),
			Self::Delete => write!(f, "delete"),
			Self::Down => write!(f, "down"),
			Self::End => write!(f, "end"),
			Self::Enter => write!(f, "enter"),
			Self::Esc => write!(f, "esc"),
			Self::Home => write!(f, "home"),
			Self::Insert => write!(f, "insert"),
			Self::Left => write!(f, "left"),
			Self::PageDown => write!(f, "page-down"),
			Self::PageUp => write!(f, "page-up"),
			Self::Right => write!(f, "right"),
			Self::Space => write!(f, "space"),
			Self::Tab => write!(f, "tab"),
			Self::Up => write!(f, "up"),
		}
	}
}

/// A key with optional modifiers.
///
/// Equality is field-wise over the code and every modifier bit, so two
/// keystrokes compare equal exactly when the terminal reported the same
/// event for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
	pub code: KeyCode,
	pub modifiers: Modifiers,
}

impl Key {
	/// Create a key from a character with no modifiers.
	///
	/// Whitespace characters are canonicalized: `' '` → `Space`, `'\t'` →
	/// `Tab`, `'\n'` → `Enter`.
	pub const fn char(c: char) -> Self {
		let code = match c {
			' ' => KeyCode::Space,
			'\t' => KeyCode::Tab,
			'\n' => KeyCode::Enter,
			_ => KeyCode::Char(c),
		};
		Self {
			code,
			modifiers: Modifiers::NONE,
		}
	}

	/// Create a key from a key code with no modifiers.
	pub const fn new(code: KeyCode) -> Self {
		Self {
			code,
			modifiers: Modifiers::NONE,
		}
	}

	/// Create a key with Ctrl modifier.
	pub const fn ctrl(c: char) -> Self {
		Self {
			code: KeyCode::Char(c),
			modifiers: Modifiers::CTRL,
		}
	}

	/// Create a key with Alt modifier.
	pub const fn alt(c: char) -> Self {
		Self {
			code: KeyCode::Char(c),
			modifiers: Modifiers::ALT,
		}
	}

	/// Add Ctrl modifier.
	pub const fn with_ctrl(self) -> Self {
		Self {
			modifiers: Modifiers { ctrl: true, ..self.modifiers },
			..self
		}
	}

	/// Add Alt modifier.
	pub const fn with_alt(self) -> Self {
		Self {
			modifiers: Modifiers { alt: true, ..self.modifiers },
			..self
		}
	}

	/// Canonicalizes the key code so equivalent inputs have one representation.
	pub fn canonicalize(self) -> Self {
		let code = match self.code {
			KeyCode::Char(' ') => KeyCode::Space,
			KeyCode::Char('\t') => KeyCode::Tab,
			KeyCode::Char('\n') => KeyCode::Enter,
			other => other,
		};
		Self { code, ..self }
	}

	/// Returns the digit value if this is an unmodified decimal digit key.
	pub fn as_digit(&self) -> Option<u32> {
		if self.modifiers.is_empty()
			&& let KeyCode::Char(c) = self.code
		{
			return c.to_digit(10);
		}
		None
	}

	/// The unicode codepoint carried by this key, `'\0'` for special keys.
	///
	/// Wildcard captures store this value verbatim, including the zero
	/// codepoint.
	pub fn codepoint(&self) -> char {
		match self.code {
			KeyCode::Char(c) => c,
			KeyCode::Space => ' ',
			KeyCode::Tab => '\t',
			KeyCode::Enter => '\n',
			_ => '\0',
		}
	}

	/// Returns the inserted text for this key, if it is a text-producing key.
	pub fn as_text(&self) -> Option<char> {
		if self.modifiers.ctrl || self.modifiers.alt {
			return None;
		}
		match self.code {
			KeyCode::Char(c) => Some(c),
			KeyCode::Space => Some(' '),
			KeyCode::Tab => Some('\t'),
			KeyCode::Enter => Some('\n'),
			_ => None,
		}
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.modifiers.ctrl {
			write!(f, "C-")?;
		}
		if self.modifiers.alt {
			write!(f, "M-")?;
		}
		if self.modifiers.shift {
			write!(f, "S-")?;
		}
		write!(f, "{}", self.code)
	}
}

impl TryFrom<termina::event::KeyEvent> for Key {
	type Error = ();

	fn try_from(event: termina::event::KeyEvent) -> Result<Self, ()> {
		use termina::event::{KeyCode as TmKeyCode, Modifiers as TmModifiers};

		let modifiers = Modifiers {
			ctrl: event.modifiers.contains(TmModifiers::CONTROL),
			alt: event.modifiers.contains(TmModifiers::ALT),
			shift: event.modifiers.contains(TmModifiers::SHIFT),
		};

		let code = match event.code {
			TmKeyCode::Char(c) => KeyCode::Char(c),
			TmKeyCode::Escape => KeyCode::Esc,
			TmKeyCode::Enter => KeyCode::Enter,
			TmKeyCode::BackTab => KeyCode::BackTab,
			TmKeyCode::Tab => KeyCode::Tab,
			TmKeyCode::Backspace => KeyCode::Backspace,
			TmKeyCode::Delete => KeyCode::Delete,
			TmKeyCode::Insert => KeyCode::Insert,
			TmKeyCode::Home => KeyCode::Home,
			TmKeyCode::End => KeyCode::End,
			TmKeyCode::PageUp => KeyCode::PageUp,
			TmKeyCode::PageDown => KeyCode::PageDown,
			TmKeyCode::Up => KeyCode::Up,
			TmKeyCode::Down => KeyCode::Down,
			TmKeyCode::Left => KeyCode::Left,
			TmKeyCode::Right => KeyCode::Right,
			TmKeyCode::Function(n) => KeyCode::F(n),
			_ => return Err(()),
		};

		Ok(Self { code, modifiers }.canonicalize())
	}
}
