//! On-screen views and their lifecycle metadata.

use std::sync::Arc;

use mle_primitives::Rect;
use regex::Regex;

use crate::async_proc::ProcId;
use crate::buffer::{BufferId, Cursor};
use crate::commands::CmdFn;

/// Stable handle to a view in the editor's view arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub(crate) u32);

/// What a view displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
	Edit,
	Prompt,
	Status,
}

/// Direction a split view divides its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDir {
	Vertical,
	Horizontal,
}

/// A window onto a buffer, with its own cursors and keymap stack.
#[derive(Debug)]
pub struct View {
	pub id: ViewId,
	pub kind: ViewKind,
	pub buffer: BufferId,
	pub cursors: Vec<Cursor>,
	pub active_cursor: usize,
	/// Keymap names, tail consulted first.
	pub kmap_stack: Vec<Arc<str>>,
	pub is_menu: bool,
	pub menu_callback: Option<CmdFn>,
	/// Opaque payload for menu callbacks (e.g. the browsed directory).
	pub menu_data: Option<String>,
	pub async_proc: Option<ProcId>,
	pub rect: Rect,
	/// First visible buffer line.
	pub viewport_y: usize,
	pub split_parent: Option<ViewId>,
	pub split_child: Option<ViewId>,
	pub split_dir: Option<SplitDir>,
	/// Label shown before the buffer contents of a prompt view.
	pub prompt_str: Option<String>,
	/// Compiled pattern driving the isearch prompt keymap.
	pub isearch_re: Option<Regex>,
}

impl View {
	pub(crate) fn new(id: ViewId, kind: ViewKind, buffer: BufferId) -> Self {
		Self {
			id,
			kind,
			buffer,
			cursors: vec![Cursor::default()],
			active_cursor: 0,
			kmap_stack: Vec::new(),
			is_menu: false,
			menu_callback: None,
			menu_data: None,
			async_proc: None,
			rect: Rect::default(),
			viewport_y: 0,
			split_parent: None,
			split_child: None,
			split_dir: None,
			prompt_str: None,
			isearch_re: None,
		}
	}

	pub fn is_edit(&self) -> bool {
		matches!(self.kind, ViewKind::Edit)
	}

	pub fn cursor(&self) -> Cursor {
		self.cursors[self.active_cursor]
	}

	pub fn cursor_mut(&mut self) -> &mut Cursor {
		&mut self.cursors[self.active_cursor]
	}

	/// Pushes a keymap onto this view's stack; it becomes the first keymap
	/// consulted.
	pub fn push_kmap(&mut self, name: &str) {
		self.kmap_stack.push(name.into());
	}

	/// Scrolls the viewport the minimum amount needed to contain `line`.
	pub fn rectify_viewport(&mut self, line: usize) {
		let height = self.rect.h.max(1) as usize;
		if line < self.viewport_y {
			self.viewport_y = line;
		} else if line >= self.viewport_y + height {
			self.viewport_y = line + 1 - height;
		}
	}

	/// Centers the viewport on `line`.
	pub fn center_viewport(&mut self, line: usize) {
		let height = self.rect.h.max(1) as usize;
		self.viewport_y = line.saturating_sub(height / 2);
	}
}
