//! Search, incremental search, and replace commands.

use regex::Regex;

use super::CmdContext;
use crate::buffer::Buffer;
use crate::editor::Editor;
use crate::error::Result;
use crate::prompt::{PromptAnswer, PromptParams};

pub(crate) fn char_to_byte(text: &str, char_idx: usize) -> usize {
	text.char_indices().nth(char_idx).map_or(text.len(), |(b, _)| b)
}

pub(crate) fn byte_to_char(text: &str, byte_idx: usize) -> usize {
	text[..byte_idx.min(text.len())].chars().count()
}

/// Char index of the next match at or after `from`, optionally wrapping.
pub(crate) fn find_next(buffer: &Buffer, re: &Regex, from: usize, wrap: bool) -> Option<usize> {
	let text = buffer.contents();
	let from_byte = char_to_byte(&text, from);
	if let Some(found) = re.find_at(&text, from_byte) {
		return Some(byte_to_char(&text, found.start()));
	}
	if wrap && let Some(found) = re.find(&text) {
		return Some(byte_to_char(&text, found.start()));
	}
	None
}

/// Char index of the last match strictly before `before`.
pub(crate) fn find_prev(buffer: &Buffer, re: &Regex, before: usize) -> Option<usize> {
	let text = buffer.contents();
	let before_byte = char_to_byte(&text, before);
	let mut last = None;
	for found in re.find_iter(&text) {
		if found.start() >= before_byte {
			break;
		}
		last = Some(byte_to_char(&text, found.start()));
	}
	last
}

fn jump_to_match(ctx: &mut CmdContext, re: &Regex) {
	let (view, buffer) = match ctx.active_edit_mut() {
		Ok(pair) => pair,
		Err(_) => return,
	};
	let from = view.cursor().pos + 1;
	match find_next(buffer, re, from, true) {
		Some(pos) => {
			view.cursor_mut().pos = pos;
			let (line, _) = buffer.line_col(pos);
			view.center_viewport(line);
		}
		None => ctx.editor.set_status("no match"),
	}
}

/// Prompts for a pattern and jumps to the next match.
pub fn search(ctx: &mut CmdContext) -> Result<()> {
	let Some(pattern) = ctx.editor.prompt_text("search: Pattern?")? else {
		return Ok(());
	};
	if pattern.is_empty() {
		return Ok(());
	}
	let re = match Regex::new(&pattern) {
		Ok(re) => re,
		Err(err) => {
			ctx.editor.set_status(format!("bad pattern: {err}"));
			return Ok(());
		}
	};
	ctx.editor.last_search = Some(pattern);
	jump_to_match(ctx, &re);
	Ok(())
}

/// Repeats the last search.
pub fn search_next(ctx: &mut CmdContext) -> Result<()> {
	let Some(pattern) = ctx.editor.last_search.clone() else {
		ctx.editor.set_status("no previous search");
		return Ok(());
	};
	if let Ok(re) = Regex::new(&pattern) {
		jump_to_match(ctx, &re);
	}
	Ok(())
}

/// Incremental search: the prompt's change listener recompiles the pattern
/// and advances the cursor as the user types.
pub fn isearch(ctx: &mut CmdContext) -> Result<()> {
	let params = PromptParams {
		kmap: Some("mle_prompt_isearch"),
		listener: Some(isearch_update),
		..Default::default()
	};
	ctx.editor.prompt("isearch: Pattern?", params)?;
	let active_edit = ctx.editor.active_edit();
	if let Ok(view) = ctx.editor.view_mut(active_edit) {
		view.isearch_re = None;
	}
	Ok(())
}

/// Change listener for the isearch prompt.
fn isearch_update(editor: &mut Editor, contents: &str) {
	let active_edit = editor.active_edit();
	let re = (!contents.is_empty()).then(|| Regex::new(contents).ok()).flatten();
	let Some((view, buffer)) = editor.view_and_buffer_mut(active_edit) else {
		return;
	};
	match re {
		Some(re) => {
			if let Some(pos) = find_next(buffer, &re, view.cursor().pos, true) {
				view.cursor_mut().pos = pos;
				let (line, _) = buffer.line_col(pos);
				view.center_viewport(line);
			}
			view.isearch_re = Some(re);
		}
		None => view.isearch_re = None,
	}
}

/// Regex replace with a yes/no/all confirmation per match.
pub fn replace(ctx: &mut CmdContext) -> Result<()> {
	let Some(pattern) = ctx.editor.prompt_text("replace: Pattern?")? else {
		return Ok(());
	};
	if pattern.is_empty() {
		return Ok(());
	}
	let re = match Regex::new(&pattern) {
		Ok(re) => re,
		Err(err) => {
			ctx.editor.set_status(format!("bad pattern: {err}"));
			return Ok(());
		}
	};
	let Some(replacement) = ctx.editor.prompt_text("replace: Replacement?")? else {
		return Ok(());
	};

	let mut replace_all = false;
	let mut num_replaced = 0usize;
	let mut from = {
		let (view, _) = ctx.active_edit_mut()?;
		view.cursor().pos
	};

	loop {
		let text = {
			let (_, buffer) = ctx.active_edit_mut()?;
			buffer.contents()
		};
		let from_byte = char_to_byte(&text, from);
		let Some(caps) = re.captures_at(&text, from_byte) else {
			break;
		};
		let whole = caps.get(0).expect("capture 0 always present");
		let start = byte_to_char(&text, whole.start());
		let end = byte_to_char(&text, whole.end());

		// Show the candidate match.
		{
			let (view, buffer) = ctx.active_edit_mut()?;
			let cursor = view.cursor_mut();
			cursor.pos = start;
			cursor.mark = Some(end);
			let (line, _) = buffer.line_col(start);
			view.center_viewport(line);
		}

		let answer = if replace_all {
			Some(PromptAnswer::Yes)
		} else {
			ctx.editor.prompt_yna("replace: OK to replace? (y=yes, n=no, a=all)")?
		};
		match answer {
			Some(PromptAnswer::All) => replace_all = true,
			Some(PromptAnswer::Yes) => {}
			Some(PromptAnswer::No) => {
				from = (start + 1).max(end);
				continue;
			}
			_ => break,
		}

		let mut expansion = String::new();
		caps.expand(&replacement, &mut expansion);
		let expansion_len = expansion.chars().count();
		{
			let (view, buffer) = ctx.active_edit_mut()?;
			buffer.remove(start, end);
			buffer.insert(start, &expansion);
			let cursor = view.cursor_mut();
			cursor.pos = start + expansion_len;
			cursor.mark = None;
		}
		num_replaced += 1;
		from = start + expansion_len;
		if start == end {
			// Empty match; step forward so the loop terminates.
			from += 1;
		}
	}

	{
		let (view, _) = ctx.active_edit_mut()?;
		view.cursor_mut().mark = None;
	}
	ctx.editor.set_status(format!("{num_replaced} replacement(s)"));
	Ok(())
}
