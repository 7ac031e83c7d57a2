//! Commands that shell out: grep, the file browser, and shell-exec.

use std::path::Path;

use tracing::warn;

use super::CmdContext;
use crate::async_proc::shell_escape;
use crate::editor::{Editor, SHELL_EXEC_TIMEOUT};
use crate::error::Result;
use crate::view::{ViewId, ViewKind};

/// Prompts for a pattern, greps the working tree asynchronously into a
/// navigation menu, and opens the selected `path:line` hit.
pub fn grep(ctx: &mut CmdContext) -> Result<()> {
	let Some(pattern) = ctx.editor.prompt_text("grep: Pattern?")? else {
		return Ok(());
	};
	if pattern.is_empty() {
		return Ok(());
	}
	let cmd = format!("grep -rn {} . 2>/dev/null", shell_escape(&pattern));
	let Some(line) = ctx.editor.prompt_menu("grep: Pick a result", None, Some(&cmd))? else {
		return Ok(());
	};
	let Some((path, linenum)) = parse_grep_line(&line) else {
		return Ok(());
	};
	ctx.editor.open_view(ViewKind::Edit, Some(Path::new(path)), true, Some(linenum))?;
	Ok(())
}

/// Splits a `path:line:text` grep hit into path and 0-based line.
fn parse_grep_line(line: &str) -> Option<(&str, usize)> {
	let mut parts = line.splitn(3, ':');
	let path = parts.next().filter(|p| !p.is_empty())?;
	let linenum: usize = parts.next()?.parse().ok()?;
	Some((path, linenum.saturating_sub(1)))
}

/// Opens the file browser on the static-parameter directory, the current
/// file's directory, or the working directory.
pub fn browse(ctx: &mut CmdContext) -> Result<()> {
	let dir = match ctx.static_param.as_deref() {
		Some(dir) if !dir.is_empty() => dir.to_string(),
		_ => {
			let id = ctx.editor.active();
			ctx.editor
				.view_buffer(id)
				.and_then(|b| b.path())
				.and_then(|p| p.parent())
				.map(|p| p.to_string_lossy().into_owned())
				.filter(|p| !p.is_empty())
				.unwrap_or_else(|| ".".to_string())
		}
	};
	ctx.editor.browse_dir(&dir)?;
	Ok(())
}

impl Editor {
	/// Opens a menu listing `dir`, fed asynchronously by the shell.
	pub fn browse_dir(&mut self, dir: &str) -> Result<ViewId> {
		let cmd = format!("cd {} && ls -1ap", shell_escape(dir));
		let menu = self.menu(browse_submit, None, Some(&cmd))?;
		self.view_mut(menu)?.menu_data = Some(dir.to_string());
		Ok(menu)
	}
}

/// Menu callback for the browser: descend into directories, open files.
fn browse_submit(ctx: &mut CmdContext) -> Result<()> {
	let (menu_id, base, entry) = {
		let (view, buffer) = ctx.active_mut()?;
		let (line, _) = buffer.line_col(view.cursor().pos);
		(
			view.id,
			view.menu_data.clone().unwrap_or_else(|| ".".to_string()),
			buffer.line(line),
		)
	};
	if entry.is_empty() || entry == "./" {
		return Ok(());
	}
	ctx.editor.close_view(menu_id)?;
	let joined = format!("{base}/{entry}");
	if let Some(subdir) = joined.strip_suffix('/') {
		ctx.editor.browse_dir(subdir)?;
	} else {
		ctx.editor.open_view(ViewKind::Edit, Some(Path::new(&joined)), true, None)?;
	}
	Ok(())
}

/// Prompts for a shell command and inserts its output at the cursor.
pub fn shell_exec_cmd(ctx: &mut CmdContext) -> Result<()> {
	let Some(cmd) = ctx.editor.prompt_text("shell: Cmd?")? else {
		return Ok(());
	};
	if cmd.is_empty() {
		return Ok(());
	}
	let shell = ctx.editor.options.shell.clone();
	let output = match ctx.editor.shell_exec(&cmd, &shell, SHELL_EXEC_TIMEOUT, None) {
		Ok(output) => output,
		Err(err) => {
			warn!(%cmd, %err, "shell command failed");
			ctx.editor.set_status(err.to_string());
			return Ok(());
		}
	};
	let text = String::from_utf8_lossy(&output).into_owned();
	if text.is_empty() {
		return Ok(());
	}
	let (view, buffer) = ctx.active_mut()?;
	let pos = view.cursor().pos;
	buffer.insert(pos, &text);
	view.cursor_mut().pos = pos + text.chars().count();
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn grep_lines_parse() {
		assert_eq!(parse_grep_line("src/main.rs:42:fn main"), Some(("src/main.rs", 41)));
		assert_eq!(parse_grep_line("no-line-number"), None);
		assert_eq!(parse_grep_line(":12:x"), None);
	}
}
