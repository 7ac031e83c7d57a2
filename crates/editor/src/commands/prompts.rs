//! Commands bound by the prompt and menu keymaps.
//!
//! These implement the fixed prompt contracts: submit/cancel/tab-complete
//! for input prompts, the yes/no/all sentinels, menu submission and
//! navigation, and the isearch stepper.

use tracing::warn;

use super::CmdContext;
use super::search::{find_next, find_prev};
use crate::async_proc::shell_escape;
use crate::buffer::Cursor;
use crate::editor::SHELL_EXEC_TIMEOUT;
use crate::error::Result;
use crate::prompt::PromptAnswer;

/// Longest prompt line that can seed tab completion.
const MAX_COMPLETE_TERM: usize = 256;

/// Enter in an input prompt: the buffer contents become the answer.
pub fn prompt_submit(ctx: &mut CmdContext) -> Result<()> {
	let contents = {
		let (_, buffer) = ctx.active_mut()?;
		buffer.contents()
	};
	ctx.loop_ctx.prompt_answer = Some(PromptAnswer::Text(contents));
	ctx.loop_ctx.should_exit = true;
	Ok(())
}

/// Cancel: null answer, exit the nested loop.
pub fn prompt_cancel(ctx: &mut CmdContext) -> Result<()> {
	ctx.loop_ctx.prompt_answer = None;
	ctx.loop_ctx.should_exit = true;
	Ok(())
}

pub fn prompt_yes(ctx: &mut CmdContext) -> Result<()> {
	ctx.loop_ctx.prompt_answer = Some(PromptAnswer::Yes);
	ctx.loop_ctx.should_exit = true;
	Ok(())
}

pub fn prompt_no(ctx: &mut CmdContext) -> Result<()> {
	ctx.loop_ctx.prompt_answer = Some(PromptAnswer::No);
	ctx.loop_ctx.should_exit = true;
	Ok(())
}

pub fn prompt_all(ctx: &mut CmdContext) -> Result<()> {
	ctx.loop_ctx.prompt_answer = Some(PromptAnswer::All);
	ctx.loop_ctx.should_exit = true;
	Ok(())
}

/// Tab in an input prompt: cycle filename-completion candidates.
///
/// The first press of a streak snapshots the prompt line as the stem and
/// resets the cycle index; repeated presses (detected through `last_cmd`)
/// advance it. Candidates come from the external completion command, one
/// per line; an empty candidate list is a no-op.
pub fn prompt_complete(ctx: &mut CmdContext) -> Result<()> {
	let Some(prompt) = ctx.editor.prompt_view() else {
		return Ok(());
	};

	if ctx.loop_ctx.last_cmd.as_deref() == Some("prompt-complete") {
		ctx.loop_ctx.tab_complete_index += 1;
	} else {
		let first_line = ctx.editor.view_buffer(prompt).map(|b| b.line(0)).unwrap_or_default();
		if first_line.chars().count() >= MAX_COMPLETE_TERM {
			return Ok(());
		}
		ctx.loop_ctx.tab_complete_term = first_line;
		ctx.loop_ctx.tab_complete_index = 0;
	}

	let stem = ctx.loop_ctx.tab_complete_term.clone();
	let cmd = format!("{} {} | sort", ctx.editor.options.completion_cmd, shell_escape(&stem));
	let shell = ctx.editor.options.completion_shell.clone();
	let output = match ctx.editor.shell_exec(&cmd, &shell, SHELL_EXEC_TIMEOUT, None) {
		Ok(output) => output,
		Err(err) => {
			warn!(%err, "completion command failed");
			return Ok(());
		}
	};
	let text = String::from_utf8_lossy(&output);
	let candidates: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
	if candidates.is_empty() {
		return Ok(());
	}

	let chosen = candidates[ctx.loop_ctx.tab_complete_index % candidates.len()].to_string();
	let (view, buffer) = ctx.editor.view_and_buffer_mut(prompt).expect("prompt view exists");
	buffer.set_contents(&chosen);
	view.cursor_mut().pos = buffer.len_chars();
	Ok(())
}

/// Enter in a menu: invoke the menu's callback.
pub fn menu_submit(ctx: &mut CmdContext) -> Result<()> {
	let callback = {
		let (view, _) = ctx.active_mut()?;
		view.menu_callback
	};
	match callback {
		Some(callback) => callback(ctx),
		None => Ok(()),
	}
}

/// C-c in a menu: stop the bound async proc, if any.
pub fn menu_cancel(ctx: &mut CmdContext) -> Result<()> {
	let proc = {
		let (view, _) = ctx.active_mut()?;
		view.async_proc
	};
	if let Some(proc) = proc {
		ctx.editor.cancel_async_proc(proc);
	}
	Ok(())
}

fn prompt_menu_move(ctx: &mut CmdContext, delta: isize, zero_viewport: bool) -> Result<()> {
	let (view, buffer) = ctx.active_edit_mut()?;
	let (line, col) = buffer.line_col(view.cursor().pos);
	let target = line.saturating_add_signed(delta).min(buffer.len_lines().saturating_sub(1));
	view.cursor_mut().pos = buffer.pos_at(target, col);
	if zero_viewport {
		view.viewport_y = target;
	} else {
		view.rectify_viewport(target);
	}
	Ok(())
}

pub fn prompt_menu_up(ctx: &mut CmdContext) -> Result<()> {
	prompt_menu_move(ctx, -1, false)
}

pub fn prompt_menu_down(ctx: &mut CmdContext) -> Result<()> {
	prompt_menu_move(ctx, 1, false)
}

pub fn prompt_menu_page_up(ctx: &mut CmdContext) -> Result<()> {
	let page = {
		let (view, _) = ctx.active_edit_mut()?;
		view.rect.h.max(1) as isize
	};
	prompt_menu_move(ctx, -page, true)
}

pub fn prompt_menu_page_down(ctx: &mut CmdContext) -> Result<()> {
	let page = {
		let (view, _) = ctx.active_edit_mut()?;
		view.rect.h.max(1) as isize
	};
	prompt_menu_move(ctx, page, true)
}

/// Down in the isearch prompt: step to the next match.
pub fn prompt_isearch_next(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_edit_mut()?;
	let Some(re) = view.isearch_re.clone() else {
		return Ok(());
	};
	if let Some(pos) = find_next(buffer, &re, view.cursor().pos + 1, false) {
		view.cursor_mut().pos = pos;
		let (line, _) = buffer.line_col(pos);
		view.center_viewport(line);
	}
	Ok(())
}

/// Up in the isearch prompt: step to the previous match.
pub fn prompt_isearch_prev(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_edit_mut()?;
	let Some(re) = view.isearch_re.clone() else {
		return Ok(());
	};
	if let Some(pos) = find_prev(buffer, &re, view.cursor().pos) {
		view.cursor_mut().pos = pos;
		let (line, _) = buffer.line_col(pos);
		view.center_viewport(line);
	}
	Ok(())
}

/// Drops a cursor on every isearch match, then exits the prompt.
pub fn prompt_isearch_drop_cursors(ctx: &mut CmdContext) -> Result<()> {
	let (view, buffer) = ctx.active_edit_mut()?;
	if let Some(re) = view.isearch_re.clone() {
		let original = view.cursor();
		let mut cursors = vec![original];
		let mut from = 0;
		while let Some(pos) = find_next(buffer, &re, from, false) {
			if pos != original.pos {
				cursors.push(Cursor { pos, mark: None });
			}
			from = pos + 1;
		}
		view.cursors = cursors;
		view.active_cursor = 0;
	}
	ctx.loop_ctx.prompt_answer = None;
	ctx.loop_ctx.should_exit = true;
	Ok(())
}
