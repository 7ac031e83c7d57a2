//! Text buffer and cursor primitives.
//!
//! The core only needs a modest surface from its text storage: positional
//! insert/remove, line/char addressing, whole-content access, and a dirty
//! flag for crash backups. Buffers are shared between split views through
//! [`BufferId`] handles owned by the editor.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ropey::Rope;

/// Stable handle to a buffer in the editor's buffer arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) u32);

/// A cursor with an optional mark anchoring a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
	/// Character index into the buffer.
	pub pos: usize,
	/// Selection anchor, if a selection is active.
	pub mark: Option<usize>,
}

/// A text buffer backed by a rope.
#[derive(Debug, Clone)]
pub struct Buffer {
	text: Rope,
	path: Option<PathBuf>,
	unsaved: bool,
	version: u64,
}

impl Default for Buffer {
	fn default() -> Self {
		Self::new()
	}
}

impl Buffer {
	pub fn new() -> Self {
		Self {
			text: Rope::new(),
			path: None,
			unsaved: false,
			version: 0,
		}
	}

	/// Opens a buffer for `path`. A nonexistent path yields an empty buffer
	/// that will be created on save.
	pub fn from_path(path: &Path) -> io::Result<Self> {
		let text = match fs::read_to_string(path) {
			Ok(data) => Rope::from_str(&data),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Rope::new(),
			Err(err) => return Err(err),
		};
		Ok(Self {
			text,
			path: Some(path.to_path_buf()),
			unsaved: false,
			version: 0,
		})
	}

	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	pub fn is_unsaved(&self) -> bool {
		self.unsaved
	}

	/// Monotonic counter bumped on every mutation; change listeners compare
	/// versions to detect edits.
	pub fn version(&self) -> u64 {
		self.version
	}

	pub fn len_chars(&self) -> usize {
		self.text.len_chars()
	}

	pub fn len_lines(&self) -> usize {
		self.text.len_lines()
	}

	pub fn contents(&self) -> String {
		self.text.to_string()
	}

	/// Returns the characters in `[start, end)`.
	pub fn slice(&self, start: usize, end: usize) -> String {
		let end = end.min(self.text.len_chars());
		let start = start.min(end);
		self.text.slice(start..end).to_string()
	}

	pub fn char_at(&self, pos: usize) -> Option<char> {
		(pos < self.text.len_chars()).then(|| self.text.char(pos))
	}

	pub fn insert(&mut self, pos: usize, text: &str) {
		let pos = pos.min(self.text.len_chars());
		self.text.insert(pos, text);
		self.touch();
	}

	pub fn remove(&mut self, start: usize, end: usize) {
		let end = end.min(self.text.len_chars());
		let start = start.min(end);
		if start == end {
			return;
		}
		self.text.remove(start..end);
		self.touch();
	}

	pub fn set_contents(&mut self, text: &str) {
		self.text = Rope::from_str(text);
		self.touch();
	}

	fn touch(&mut self) {
		self.unsaved = true;
		self.version += 1;
	}

	/// The line containing `pos` (which may equal `len_chars`).
	pub fn char_to_line(&self, pos: usize) -> usize {
		self.text.char_to_line(pos.min(self.text.len_chars()))
	}

	pub fn line_to_char(&self, line: usize) -> usize {
		self.text.line_to_char(line.min(self.text.len_lines().saturating_sub(1)))
	}

	/// Line length in characters, excluding the trailing newline.
	pub fn line_len(&self, line: usize) -> usize {
		if line >= self.text.len_lines() {
			return 0;
		}
		let slice = self.text.line(line);
		let mut len = slice.len_chars();
		if len > 0 && slice.char(len - 1) == '\n' {
			len -= 1;
		}
		len
	}

	/// Line contents without the trailing newline.
	pub fn line(&self, line: usize) -> String {
		if line >= self.text.len_lines() {
			return String::new();
		}
		let start = self.text.line_to_char(line);
		self.slice(start, start + self.line_len(line))
	}

	/// `(line, col)` of a character position.
	pub fn line_col(&self, pos: usize) -> (usize, usize) {
		let pos = pos.min(self.text.len_chars());
		let line = self.text.char_to_line(pos);
		(line, pos - self.text.line_to_char(line))
	}

	/// Character position of `(line, col)`, clamped into the buffer.
	pub fn pos_at(&self, line: usize, col: usize) -> usize {
		let line = line.min(self.text.len_lines().saturating_sub(1));
		self.text.line_to_char(line) + col.min(self.line_len(line))
	}

	/// Writes the buffer to `path` without changing buffer state. Used by
	/// the crash-backup path.
	pub fn write_to(&self, path: &Path) -> io::Result<()> {
		fs::write(path, self.contents())
	}

	/// Saves to the buffer's path, clearing the unsaved flag.
	pub fn save(&mut self) -> io::Result<()> {
		let Some(path) = self.path.clone() else {
			return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer has no path"));
		};
		self.write_to(&path)?;
		self.unsaved = false;
		Ok(())
	}

	/// Saves to a new path, adopting it as the buffer's path.
	pub fn save_as(&mut self, path: &Path) -> io::Result<()> {
		self.write_to(path)?;
		self.path = Some(path.to_path_buf());
		self.unsaved = false;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn insert_and_remove_track_versions() {
		let mut buffer = Buffer::new();
		assert_eq!(buffer.version(), 0);
		buffer.insert(0, "hello\nworld");
		assert!(buffer.is_unsaved());
		assert_eq!(buffer.version(), 1);
		buffer.remove(5, 6);
		assert_eq!(buffer.contents(), "helloworld");
		assert_eq!(buffer.version(), 2);
	}

	#[test]
	fn line_addressing() {
		let mut buffer = Buffer::new();
		buffer.insert(0, "one\ntwo\nthree");
		assert_eq!(buffer.len_lines(), 3);
		assert_eq!(buffer.line(1), "two");
		assert_eq!(buffer.line_len(0), 3);
		assert_eq!(buffer.line_col(5), (1, 1));
		assert_eq!(buffer.pos_at(2, 100), buffer.len_chars());
	}

	#[test]
	fn out_of_range_ops_are_clamped() {
		let mut buffer = Buffer::new();
		buffer.insert(100, "abc");
		assert_eq!(buffer.contents(), "abc");
		buffer.remove(2, 100);
		assert_eq!(buffer.contents(), "ab");
		assert_eq!(buffer.slice(1, 100), "b");
	}

	#[test]
	fn save_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("file.txt");
		let mut buffer = Buffer::from_path(&path).unwrap();
		buffer.insert(0, "content\n");
		buffer.save().unwrap();
		assert!(!buffer.is_unsaved());
		assert_eq!(std::fs::read_to_string(&path).unwrap(), "content\n");
	}
}
