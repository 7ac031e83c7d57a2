//! View lifecycle, persistence, and macro-replay commands.

use std::path::Path;

use super::CmdContext;
use crate::error::Result;
use crate::view::{SplitDir, ViewKind};

pub fn open_new(ctx: &mut CmdContext) -> Result<()> {
	ctx.editor.open_view(ViewKind::Edit, None, true, None)?;
	Ok(())
}

pub fn open_file(ctx: &mut CmdContext) -> Result<()> {
	let Some(path) = ctx.editor.prompt_text("open: Path?")? else {
		return Ok(());
	};
	if path.is_empty() {
		return Ok(());
	}
	ctx.editor.open_view(ViewKind::Edit, Some(Path::new(&path)), true, None)?;
	Ok(())
}

/// Closes the active view, offering to save a modified buffer first.
pub fn close(ctx: &mut CmdContext) -> Result<()> {
	let id = ctx.editor.active();
	let unsaved = ctx.editor.view_buffer(id).is_some_and(|b| b.is_unsaved());
	if unsaved {
		match ctx.editor.prompt_yn("close: Save modified? (y=yes, n=no)")? {
			Some(true) => save(ctx)?,
			Some(false) => {}
			None => return Ok(()),
		}
	}
	ctx.editor.close_view(id)?;
	Ok(())
}

/// Exits the invoking loop, confirming when unsaved buffers exist.
pub fn quit(ctx: &mut CmdContext) -> Result<()> {
	let any_unsaved = ctx
		.editor
		.all_views
		.iter()
		.filter(|id| ctx.editor.views[id].is_edit())
		.any(|id| ctx.editor.view_buffer(*id).is_some_and(|b| b.is_unsaved()));
	if any_unsaved && ctx.editor.prompt_yn("quit: Unsaved changes exist. Quit anyway? (y=yes, n=no)")? != Some(true) {
		return Ok(());
	}
	ctx.loop_ctx.should_exit = true;
	Ok(())
}

pub fn save(ctx: &mut CmdContext) -> Result<()> {
	let id = ctx.editor.active();
	let has_path = ctx.editor.view_buffer(id).is_some_and(|b| b.path().is_some());
	if !has_path {
		return save_as(ctx);
	}
	let (_, buffer) = ctx.active_mut()?;
	buffer.save()?;
	ctx.editor.set_status("saved");
	Ok(())
}

pub fn save_as(ctx: &mut CmdContext) -> Result<()> {
	let Some(path) = ctx.editor.prompt_text("save_as: Path?")? else {
		return Ok(());
	};
	if path.is_empty() {
		return Ok(());
	}
	let (_, buffer) = ctx.active_mut()?;
	buffer.save_as(Path::new(&path))?;
	ctx.editor.set_status(format!("saved {path}"));
	Ok(())
}

pub fn next_view(ctx: &mut CmdContext) -> Result<()> {
	if let Some(next) = ctx.editor.cycle_edit_view(ctx.editor.active_edit(), true) {
		ctx.editor.set_active(next)?;
	}
	Ok(())
}

pub fn prev_view(ctx: &mut CmdContext) -> Result<()> {
	if let Some(prev) = ctx.editor.cycle_edit_view(ctx.editor.active_edit(), false) {
		ctx.editor.set_active(prev)?;
	}
	Ok(())
}

pub fn split_vertical(ctx: &mut CmdContext) -> Result<()> {
	let parent = ctx.editor.active_edit();
	ctx.editor.open_split(parent, SplitDir::Vertical)?;
	Ok(())
}

pub fn split_horizontal(ctx: &mut CmdContext) -> Result<()> {
	let parent = ctx.editor.active_edit();
	ctx.editor.open_split(parent, SplitDir::Horizontal)?;
	Ok(())
}

pub fn redraw(ctx: &mut CmdContext) -> Result<()> {
	ctx.editor.display()
}

/// Prompts for a macro name and replays it.
pub fn apply_macro(ctx: &mut CmdContext) -> Result<()> {
	let Some(name) = ctx.editor.prompt_text("apply_macro: Name?")? else {
		return Ok(());
	};
	if !ctx.editor.replay_macro(&name) {
		ctx.editor.set_status(format!("no macro named '{name}'"));
	}
	Ok(())
}

/// Replays the macro named by the captured wildcard keystroke.
pub fn apply_macro_by(ctx: &mut CmdContext) -> Result<()> {
	let Some(c) = ctx.wildcard_params.first().copied() else {
		return Ok(());
	};
	let name = c.to_string();
	if !ctx.editor.replay_macro(&name) {
		ctx.editor.set_status(format!("no macro named '{name}'"));
	}
	Ok(())
}
