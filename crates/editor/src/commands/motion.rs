//! Cursor motion commands.

use super::CmdContext;
use crate::buffer::Buffer;
use crate::error::Result;
use crate::view::View;

pub(crate) fn is_word_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

/// Start of the word at or before `pos`.
pub(crate) fn word_start(buffer: &Buffer, pos: usize) -> usize {
	let mut i = pos.min(buffer.len_chars());
	while i > 0 && !buffer.char_at(i - 1).is_some_and(is_word_char) {
		i -= 1;
	}
	while i > 0 && buffer.char_at(i - 1).is_some_and(is_word_char) {
		i -= 1;
	}
	i
}

/// End of the word at or after `pos`.
pub(crate) fn word_end(buffer: &Buffer, pos: usize) -> usize {
	let len = buffer.len_chars();
	let mut i = pos.min(len);
	while i < len && !buffer.char_at(i).is_some_and(is_word_char) {
		i += 1;
	}
	while i < len && buffer.char_at(i).is_some_and(is_word_char) {
		i += 1;
	}
	i
}

fn rectify(view: &mut View, buffer: &Buffer) {
	let (line, _) = buffer.line_col(view.cursor().pos);
	view.rectify_viewport(line);
}

fn move_vert(view: &mut View, buffer: &Buffer, delta: isize) {
	let (line, col) = buffer.line_col(view.cursor().pos);
	let target = line.saturating_add_signed(delta).min(buffer.len_lines().saturating_sub(1));
	view.cursor_mut().pos = buffer.pos_at(target, col);
	rectify(view, buffer);
}

pub fn move_left(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let cursor = view.cursor_mut();
	cursor.pos = cursor.pos.saturating_sub(1);
	rectify(view, buffer);
	Ok(())
}

pub fn move_right(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let pos = view.cursor().pos;
	view.cursor_mut().pos = (pos + 1).min(buffer.len_chars());
	rectify(view, buffer);
	Ok(())
}

pub fn move_up(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	move_vert(view, buffer, -1);
	Ok(())
}

pub fn move_down(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	move_vert(view, buffer, 1);
	Ok(())
}

pub fn move_bol(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let (line, _) = buffer.line_col(view.cursor().pos);
	view.cursor_mut().pos = buffer.line_to_char(line);
	Ok(())
}

pub fn move_eol(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let (line, _) = buffer.line_col(view.cursor().pos);
	view.cursor_mut().pos = buffer.line_to_char(line) + buffer.line_len(line);
	Ok(())
}

pub fn move_beginning(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	view.cursor_mut().pos = 0;
	rectify(view, buffer);
	Ok(())
}

pub fn move_end(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	view.cursor_mut().pos = buffer.len_chars();
	rectify(view, buffer);
	Ok(())
}

pub fn move_page_up(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let page = view.rect.h.max(1) as isize;
	move_vert(view, buffer, -page);
	Ok(())
}

pub fn move_page_down(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let page = view.rect.h.max(1) as isize;
	move_vert(view, buffer, page);
	Ok(())
}

/// Prompts for a 1-based line number and jumps to it.
pub fn move_to_line(ctx: &mut CmdContext) -> Result<()> {
	let Some(answer) = ctx.editor.prompt_text("goto_line: Line?")? else {
		return Ok(());
	};
	let Ok(linenum) = answer.trim().parse::<usize>() else {
		ctx.editor.set_status("invalid line number");
		return Ok(());
	};
	let (view, buffer) = ctx.active_mut()?;
	let line = linenum.saturating_sub(1);
	view.cursor_mut().pos = buffer.pos_at(line, 0);
	view.center_viewport(line);
	Ok(())
}

/// Moves up or down by the captured numeric prefix; the direction is the
/// binding's static parameter.
pub fn move_relative(ctx: &mut CmdContext) -> Result<()> {
	let count = ctx.count() as isize;
	let delta = match ctx.static_param_str() {
		"up" => -count,
		"down" => count,
		other => {
			ctx.editor.set_status(format!("move-relative: bad direction '{other}'"));
			return Ok(());
		}
	};
	let (view, buffer) = ctx.active_mut()?;
	move_vert(view, buffer, delta);
	Ok(())
}

/// Moves forward to the next occurrence of the captured wildcard character.
pub fn move_until_forward(ctx: &mut CmdContext) -> Result<()> {
	let Some(target) = ctx.wildcard_params.first().copied() else {
		return Ok(());
	};
	let (view, buffer) = ctx.active_mut()?;
	let start = view.cursor().pos + 1;
	for i in start..buffer.len_chars() {
		if buffer.char_at(i) == Some(target) {
			view.cursor_mut().pos = i;
			break;
		}
	}
	rectify(view, buffer);
	Ok(())
}

/// Moves back to the previous occurrence of the captured wildcard character.
pub fn move_until_back(ctx: &mut CmdContext) -> Result<()> {
	let Some(target) = ctx.wildcard_params.first().copied() else {
		return Ok(());
	};
	let (view, buffer) = ctx.active_mut()?;
	let mut i = view.cursor().pos;
	while i > 0 {
		i -= 1;
		if buffer.char_at(i) == Some(target) {
			view.cursor_mut().pos = i;
			break;
		}
	}
	rectify(view, buffer);
	Ok(())
}

pub fn move_word_forward(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let pos = view.cursor().pos;
	view.cursor_mut().pos = word_end(buffer, pos);
	rectify(view, buffer);
	Ok(())
}

pub fn move_word_back(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let pos = view.cursor().pos;
	view.cursor_mut().pos = word_start(buffer, pos);
	rectify(view, buffer);
	Ok(())
}
