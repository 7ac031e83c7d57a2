//! Screen drawing.
//!
//! One full-frame redraw per loop turn: clear, active edit split chain,
//! status bar, prompt line, cursors. Headless editors (no terminal
//! attached) skip drawing entirely.

use std::fmt::Write as _;
use std::num::NonZeroU16;

use termina::escape::csi::{Csi, Cursor, Edit, EraseInDisplay, Sgr, SgrAttributes, SgrModifiers};

use crate::editor::{Editor, LinenumType};
use crate::error::Result;
use crate::view::{View, ViewId};

impl Editor {
	/// Redraws the whole screen. A no-op without an attached terminal.
	pub fn display(&mut self) -> Result<()> {
		if self.term.is_none() {
			return Ok(());
		}
		let frame = self.render_frame();
		let term = self.term.as_mut().expect("checked above");
		use std::io::Write;
		write!(term, "{frame}")?;
		term.flush()?;
		Ok(())
	}

	fn render_frame(&self) -> String {
		let mut out = String::new();
		let _ = write!(out, "{}{}", Csi::Sgr(Sgr::Reset), Csi::Edit(Edit::EraseInDisplay(EraseInDisplay::EraseDisplay)));

		let root = self.split_root(self.active_edit());
		self.render_split_chain(&mut out, root);
		self.render_status(&mut out);
		if let Some(prompt) = self.prompt_view() {
			self.render_prompt(&mut out, prompt);
		}
		self.render_cursors(&mut out, root);

		// Park the hardware cursor on the active view's cursor.
		if let Some((x, y)) = self.cursor_screen_pos(self.active()) {
			let _ = write!(out, "{}", move_to(x, y));
		}
		out
	}

	fn render_split_chain(&self, out: &mut String, mut id: ViewId) {
		loop {
			let Some(view) = self.views.get(&id) else {
				return;
			};
			self.render_view(out, view);
			match view.split_child {
				Some(child) => id = child,
				None => return,
			}
		}
	}

	fn render_view(&self, out: &mut String, view: &View) {
		let Some(buffer) = self.buffer(view.buffer) else {
			return;
		};
		let gutter = self.gutter_width(buffer.len_lines());
		let width = view.rect.w as usize;
		let text_width = width.saturating_sub(gutter);
		let cursor_line = buffer.char_to_line(view.cursor().pos);

		for row in 0..view.rect.h {
			let line = view.viewport_y + row as usize;
			if line >= buffer.len_lines() {
				break;
			}
			let _ = write!(out, "{}", move_to(view.rect.x, view.rect.y + row));
			if gutter > 0 {
				let shown = match self.options.linenum_type {
					LinenumType::Absolute => line + 1,
					LinenumType::Relative => line.abs_diff(cursor_line),
					LinenumType::Both => {
						if line == cursor_line {
							line + 1
						} else {
							line.abs_diff(cursor_line)
						}
					}
				};
				let _ = write!(out, "{:>width$} ", shown, width = gutter - 1);
			}
			let text = self.expand_tabs(&buffer.line(line));
			out.extend(text.chars().take(text_width));
		}
	}

	fn render_status(&self, out: &mut String) {
		let rect = self.rect_status;
		let Some(view) = self.views.get(&self.active_edit()) else {
			return;
		};
		let Some(buffer) = self.buffer(view.buffer) else {
			return;
		};
		let (line, col) = buffer.line_col(view.cursor().pos);

		let left = match &self.status_msg {
			Some(msg) => msg.clone(),
			None => {
				let name = buffer
					.path()
					.map(|p| p.to_string_lossy().into_owned())
					.unwrap_or_else(|| "<new>".to_string());
				let dirty = if buffer.is_unsaved() { " [+]" } else { "" };
				format!("{name}{dirty}")
			}
		};

		let kmap = view.kmap_stack.last().map(|k| k.to_string()).unwrap_or_default();
		let mut flags = String::new();
		if self.is_recording_macro() {
			flags.push_str(" rec");
		}
		if self.is_replaying_macro() {
			flags.push_str(" play");
		}
		if !self.pending_chord.is_empty() {
			flags.push(' ');
			flags.push_str(&self.pending_chord);
		}
		let right = format!("{kmap}{flags}  {}:{}", line + 1, col + 1);

		let width = rect.w as usize;
		let mut bar = String::with_capacity(width);
		bar.extend(left.chars().take(width));
		let used = bar.chars().count();
		let right_len = right.chars().count();
		if used + right_len < width {
			bar.extend(std::iter::repeat_n(' ', width - used - right_len));
			bar.push_str(&right);
		} else {
			bar.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
		}

		let mut attrs = SgrAttributes::default();
		attrs.modifiers |= SgrModifiers::REVERSE;
		let _ = write!(
			out,
			"{}{}{bar}{}",
			move_to(rect.x, rect.y),
			Csi::Sgr(Sgr::Attributes(attrs)),
			Csi::Sgr(Sgr::Reset)
		);
	}

	fn render_prompt(&self, out: &mut String, prompt: ViewId) {
		let Some(view) = self.views.get(&prompt) else {
			return;
		};
		let Some(buffer) = self.buffer(view.buffer) else {
			return;
		};
		let rect = self.rect_prompt;
		let label = view.prompt_str.as_deref().unwrap_or("");
		let line = format!("{label} {}", buffer.line(0));
		let _ = write!(out, "{}", move_to(rect.x, rect.y));
		out.extend(line.chars().take(rect.w as usize));
	}

	/// Marks every extra cursor in the split chain with reverse video.
	fn render_cursors(&self, out: &mut String, root: ViewId) {
		let mut id = Some(root);
		while let Some(current) = id {
			let Some(view) = self.views.get(&current) else {
				return;
			};
			if let Some(buffer) = self.buffer(view.buffer) {
				for (i, cursor) in view.cursors.iter().enumerate() {
					if i == view.active_cursor && current == self.active() {
						continue;
					}
					if let Some((x, y)) = self.view_screen_pos(view, cursor.pos) {
						let shown = buffer.char_at(cursor.pos).filter(|c| *c != '\n').unwrap_or(' ');
						let mut attrs = SgrAttributes::default();
						attrs.modifiers |= SgrModifiers::REVERSE;
						let _ = write!(
							out,
							"{}{}{shown}{}",
							move_to(x, y),
							Csi::Sgr(Sgr::Attributes(attrs)),
							Csi::Sgr(Sgr::Reset)
						);
					}
				}
			}
			id = view.split_child;
		}
	}

	/// Screen position of a view's cursor, if visible.
	fn cursor_screen_pos(&self, id: ViewId) -> Option<(u16, u16)> {
		let view = self.views.get(&id)?;
		if self.prompt_view() == Some(id) {
			let buffer = self.buffer(view.buffer)?;
			let label_len = view.prompt_str.as_deref().map_or(0, |l| l.chars().count() + 1);
			let (_, col) = buffer.line_col(view.cursor().pos);
			let x = self.rect_prompt.x + (label_len + col).min(self.rect_prompt.w.saturating_sub(1) as usize) as u16;
			return Some((x, self.rect_prompt.y));
		}
		self.view_screen_pos(view, view.cursor().pos)
	}

	fn view_screen_pos(&self, view: &View, pos: usize) -> Option<(u16, u16)> {
		let buffer = self.buffer(view.buffer)?;
		let (line, col) = buffer.line_col(pos);
		if line < view.viewport_y || line >= view.viewport_y + view.rect.h as usize {
			return None;
		}
		let gutter = self.gutter_width(buffer.len_lines());
		let x = view.rect.x as usize + gutter + col;
		if x >= (view.rect.x + view.rect.w) as usize {
			return None;
		}
		Some((x as u16, view.rect.y + (line - view.viewport_y) as u16))
	}

	fn gutter_width(&self, len_lines: usize) -> usize {
		let digits = len_lines.max(1).ilog10() as usize + 1;
		digits.max(2) + 1
	}

	fn expand_tabs(&self, line: &str) -> String {
		line.replace('\t', &" ".repeat(self.options.tab_width))
	}
}

fn move_to(x: u16, y: u16) -> Csi {
	// Termina uses 1-based coordinates.
	let line = NonZeroU16::new(y + 1).unwrap_or(NonZeroU16::MIN);
	let col = NonZeroU16::new(x + 1).unwrap_or(NonZeroU16::MIN);
	Csi::Cursor(Cursor::Position {
		line: line.into(),
		col: col.into(),
	})
}
