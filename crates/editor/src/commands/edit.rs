//! Text-editing commands.

use mle_primitives::Key;

use super::CmdContext;
use super::motion::{word_end, word_start};
use crate::buffer::Buffer;
use crate::error::Result;

/// Inserts the triggering keystroke, plus any paste burst collected by the
/// ingestion pass, at every cursor of the active view.
pub fn insert_data(ctx: &mut CmdContext) -> Result<()> {
	let Some(first) = ctx.input.as_text() else {
		return Ok(());
	};
	let mut text = String::new();
	text.push(first);

	let pastebuf: Vec<Key> = std::mem::take(&mut ctx.loop_ctx.pastebuf);
	for key in &pastebuf {
		if let Some(c) = key.as_text() {
			text.push(c);
		}
	}
	if !pastebuf.is_empty() && ctx.editor.options.trim_paste {
		text = trim_trailing_whitespace(&text);
	}
	if ctx.editor.options.tab_to_space {
		text = text.replace('\t', &" ".repeat(ctx.editor.options.tab_width));
	}

	let (view, buffer) = ctx.active_mut()?;
	let len = text.chars().count();
	let mut order: Vec<usize> = (0..view.cursors.len()).collect();
	order.sort_by_key(|i| std::cmp::Reverse(view.cursors[*i].pos));
	for i in order {
		let pos = view.cursors[i].pos;
		buffer.insert(pos, &text);
		for cursor in &mut view.cursors {
			if cursor.pos >= pos {
				cursor.pos += len;
			}
			if let Some(mark) = &mut cursor.mark
				&& *mark >= pos
			{
				*mark += len;
			}
		}
	}
	let line = buffer.char_to_line(view.cursor().pos);
	view.rectify_viewport(line);
	Ok(())
}

/// Strips trailing spaces and tabs from every line of a pasted block.
fn trim_trailing_whitespace(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for (i, line) in text.split('\n').enumerate() {
		if i > 0 {
			out.push('\n');
		}
		out.push_str(line.trim_end_matches([' ', '\t']));
	}
	out
}

pub fn delete_before(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let mut order: Vec<usize> = (0..view.cursors.len()).collect();
	order.sort_by_key(|i| std::cmp::Reverse(view.cursors[*i].pos));
	for i in order {
		let pos = view.cursors[i].pos;
		if pos == 0 {
			continue;
		}
		buffer.remove(pos - 1, pos);
		for cursor in &mut view.cursors {
			if cursor.pos >= pos {
				cursor.pos -= 1;
			}
		}
	}
	Ok(())
}

pub fn delete_after(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let mut order: Vec<usize> = (0..view.cursors.len()).collect();
	order.sort_by_key(|i| std::cmp::Reverse(view.cursors[*i].pos));
	for i in order {
		let pos = view.cursors[i].pos;
		if pos >= buffer.len_chars() {
			continue;
		}
		buffer.remove(pos, pos + 1);
		for cursor in &mut view.cursors {
			if cursor.pos > pos {
				cursor.pos -= 1;
			}
		}
	}
	Ok(())
}

pub fn delete_word_before(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let pos = view.cursor().pos;
	let start = word_start(buffer, pos);
	if start < pos {
		buffer.remove(start, pos);
		view.cursor_mut().pos = start;
	}
	Ok(())
}

pub fn delete_word_after(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let pos = view.cursor().pos;
	let end = word_end(buffer, pos);
	if end > pos {
		buffer.remove(pos, end);
	}
	Ok(())
}

/// Cuts the cursor line (newline included) into the paste register.
pub fn cut(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let (line, _) = buffer.line_col(view.cursor().pos);
	let start = buffer.line_to_char(line);
	let end = (start + buffer.line_len(line) + 1).min(buffer.len_chars());
	let cut_text = buffer.slice(start, end);
	buffer.remove(start, end);
	view.cursor_mut().pos = start.min(buffer.len_chars());
	ctx.editor.paste_register = cut_text;
	Ok(())
}

/// Copies the cursor line into the paste register.
pub fn copy(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_mut()?;
	let (line, _) = buffer.line_col(view.cursor().pos);
	let start = buffer.line_to_char(line);
	let end = (start + buffer.line_len(line) + 1).min(buffer.len_chars());
	let text = buffer.slice(start, end);
	ctx.editor.paste_register = text;
	Ok(())
}

/// Inserts the paste register at the cursor.
pub fn uncut(ctx: &mut CmdContext) -> Result<()> {
	let text = ctx.editor.paste_register.clone();
	if text.is_empty() {
		return Ok(());
	}
	let (view, buffer) = ctx.active_mut()?;
	let pos = view.cursor().pos;
	buffer.insert(pos, &text);
	view.cursor_mut().pos = pos + text.chars().count();
	Ok(())
}

pub fn copy_by(ctx: &mut CmdContext) -> Result<()> {
	let param = ctx.static_param_str().to_string();
	let (view, buffer) = ctx.active_mut()?;
	let text = range_by(&param, buffer, view.cursor().pos).map(|(start, end)| buffer.slice(start, end));
	if let Some(text) = text {
		ctx.editor.paste_register = text;
	}
	Ok(())
}

pub fn cut_by(ctx: &mut CmdContext) -> Result<()> {
	let param = ctx.static_param_str().to_string();
	let (view, buffer) = ctx.active_mut()?;
	if let Some((start, end)) = range_by(&param, buffer, view.cursor().pos) {
		let text = buffer.slice(start, end);
		buffer.remove(start, end);
		view.cursor_mut().pos = start;
		ctx.editor.paste_register = text;
	}
	Ok(())
}

/// Computes the character range selected by a `copy-by`/`cut-by` parameter.
fn range_by(param: &str, buffer: &Buffer, pos: usize) -> Option<(usize, usize)> {
	let (line, _) = buffer.line_col(pos);
	let bol = buffer.line_to_char(line);
	let eol = bol + buffer.line_len(line);
	match param {
		"bol" => Some((bol, pos)),
		"eol" => Some((pos, eol)),
		"word" => {
			let start = word_start(buffer, pos);
			let end = word_end(buffer, pos.max(start));
			(start < end).then_some((start, end))
		}
		"word-back" => {
			let start = word_start(buffer, pos);
			(start < pos).then_some((start, pos))
		}
		"word-forward" => {
			let end = word_end(buffer, pos);
			(pos < end).then_some((pos, end))
		}
		"bracket" => bracket_range(buffer, pos),
		_ => None,
	}
}

/// Innermost bracket pair enclosing `pos`, contents included.
fn bracket_range(buffer: &Buffer, pos: usize) -> Option<(usize, usize)> {
	let open = find_enclosing_open(buffer, pos)?;
	let open_char = buffer.char_at(open)?;
	let close_char = closing_bracket(open_char)?;
	let mut depth = 0usize;
	for i in open..buffer.len_chars() {
		let c = buffer.char_at(i)?;
		if c == open_char {
			depth += 1;
		} else if c == close_char {
			depth -= 1;
			if depth == 0 {
				return Some((open, i + 1));
			}
		}
	}
	None
}

fn find_enclosing_open(buffer: &Buffer, pos: usize) -> Option<usize> {
	let mut depths = [0i32; 3];
	let mut i = pos.min(buffer.len_chars());
	while i > 0 {
		i -= 1;
		let c = buffer.char_at(i)?;
		if let Some(b) = bracket_index(c, false) {
			if depths[b] == 0 {
				return Some(i);
			}
			depths[b] += 1;
		} else if let Some(b) = bracket_index(c, true) {
			depths[b] -= 1;
		}
	}
	None
}

fn bracket_index(c: char, closing: bool) -> Option<usize> {
	let set = if closing { [')', ']', '}'] } else { ['(', '[', '{'] };
	set.iter().position(|b| *b == c)
}

fn closing_bracket(open: char) -> Option<char> {
	match open {
		'(' => Some(')'),
		'[' => Some(']'),
		'{' => Some('}'),
		_ => None,
	}
}
