//! Prompts and menus: ephemeral views running nested event loops.

use tracing::debug;

use crate::async_proc::ProcEvent;
use crate::commands::CmdFn;
use crate::editor::{Editor, MENU_PROC_TIMEOUT};
use crate::error::{Error, Result};
use crate::event_loop::{LoopContext, run_loop};
use crate::view::{ViewId, ViewKind};

/// Typed answer produced by a prompt's nested loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
	Text(String),
	Yes,
	No,
	All,
}

/// Listener invoked after a dispatch that changed the prompt buffer.
pub type PromptListener = fn(&mut Editor, &str);

/// Optional prompt configuration.
#[derive(Default)]
pub struct PromptParams<'a> {
	/// Keymap pushed on the prompt view (default `mle_prompt_input`).
	pub kmap: Option<&'a str>,
	/// Initial prompt contents.
	pub data: Option<&'a str>,
	pub listener: Option<PromptListener>,
}

impl Editor {
	/// Opens a one-line prompt at the bottom of the screen and runs a nested
	/// event loop until a prompt command sets the answer or cancels.
	///
	/// Fails with [`Error::PromptOpen`] if a prompt is already open; at most
	/// one prompt view exists at any time.
	pub fn prompt(&mut self, label: &str, params: PromptParams) -> Result<Option<PromptAnswer>> {
		if self.prompt.is_some() {
			return Err(Error::PromptOpen);
		}
		let invoker = self.active();
		let id = self.open_view(ViewKind::Prompt, None, true, None)?;
		self.prompt = Some(id);
		{
			let view = self.view_mut(id)?;
			view.prompt_str = Some(label.to_string());
			view.push_kmap(params.kmap.unwrap_or("mle_prompt_input"));
		}
		if let Some(data) = params.data {
			let (view, buffer) = self.view_and_buffer_mut(id).expect("prompt view exists");
			buffer.set_contents(data);
			view.cursor_mut().pos = buffer.len_chars();
		}

		let mut loop_ctx = LoopContext::new(Some(invoker));
		loop_ctx.listener = params.listener;
		let result = run_loop(self, &mut loop_ctx);

		self.prompt = None;
		let _ = self.close_view(id);
		if self.view_exists(invoker) {
			let _ = self.set_active(invoker);
		}
		result?;
		Ok(loop_ctx.prompt_answer.take())
	}

	/// Text prompt; `None` on cancel.
	pub fn prompt_text(&mut self, label: &str) -> Result<Option<String>> {
		Ok(match self.prompt(label, PromptParams::default())? {
			Some(PromptAnswer::Text(text)) => Some(text),
			_ => None,
		})
	}

	/// Yes/no prompt; `None` on cancel.
	pub fn prompt_yn(&mut self, label: &str) -> Result<Option<bool>> {
		let params = PromptParams {
			kmap: Some("mle_prompt_yn"),
			..Default::default()
		};
		Ok(match self.prompt(label, params)? {
			Some(PromptAnswer::Yes) => Some(true),
			Some(PromptAnswer::No) => Some(false),
			_ => None,
		})
	}

	/// Yes/no/all prompt; `None` on cancel.
	pub fn prompt_yna(&mut self, label: &str) -> Result<Option<PromptAnswer>> {
		let params = PromptParams {
			kmap: Some("mle_prompt_yna"),
			..Default::default()
		};
		self.prompt(label, params)
	}

	/// Acknowledgement prompt: any key dismisses it.
	pub fn prompt_ok(&mut self, label: &str) -> Result<()> {
		let params = PromptParams {
			kmap: Some("mle_prompt_ok"),
			..Default::default()
		};
		self.prompt(label, params)?;
		Ok(())
	}

	/// Opens a full-height menu view with a submit callback, optionally fed
	/// by an async proc whose output populates the buffer.
	pub fn menu(&mut self, callback: CmdFn, data: Option<&str>, proc_cmd: Option<&str>) -> Result<ViewId> {
		let id = self.open_view(ViewKind::Edit, None, true, None)?;
		{
			let view = self.view_mut(id)?;
			view.is_menu = true;
			view.menu_callback = Some(callback);
			view.push_kmap("mle_menu");
		}
		if let Some(data) = data {
			let (view, buffer) = self.view_and_buffer_mut(id).expect("menu view exists");
			buffer.set_contents(data);
			view.cursor_mut().pos = 0;
		}
		if let Some(cmd) = proc_cmd {
			self.spawn_async_proc(cmd, id, MENU_PROC_TIMEOUT, menu_append_output)?;
		}
		Ok(id)
	}

	/// Opens a menu behind a navigation prompt and returns the menu line
	/// under the cursor on submit, or `None` on cancel.
	pub fn prompt_menu(&mut self, label: &str, data: Option<&str>, proc_cmd: Option<&str>) -> Result<Option<String>> {
		let orig = self.active();
		let menu = self.open_view(ViewKind::Edit, None, true, None)?;
		self.view_mut(menu)?.is_menu = true;
		if let Some(data) = data {
			let (view, buffer) = self.view_and_buffer_mut(menu).expect("menu view exists");
			buffer.set_contents(data);
			view.cursor_mut().pos = 0;
		}
		if let Some(cmd) = proc_cmd {
			self.spawn_async_proc(cmd, menu, MENU_PROC_TIMEOUT, menu_append_output)?;
		}

		let params = PromptParams {
			kmap: Some("mle_prompt_menu"),
			..Default::default()
		};
		let answer = self.prompt(label, params);

		let line = match &answer {
			Ok(Some(_)) => {
				let (view, buffer) = self.view_and_buffer_mut(menu).expect("menu view exists");
				let (linenum, _) = buffer.line_col(view.cursor().pos);
				Some(buffer.line(linenum))
			}
			_ => None,
		};
		let _ = self.close_view(menu);
		if self.view_exists(orig) {
			let _ = self.set_active(orig);
		}
		answer?;
		Ok(line)
	}
}

/// Async-proc callback appending output to the invoking menu's buffer.
pub(crate) fn menu_append_output(editor: &mut Editor, event: &ProcEvent) {
	if event.is_done {
		debug!(proc = event.proc.0, "menu proc finished");
		return;
	}
	if event.bytes.is_empty() {
		return;
	}
	let text = String::from_utf8_lossy(&event.bytes).into_owned();
	if let Some((_, buffer)) = editor.view_and_buffer_mut(event.invoker) {
		let end = buffer.len_chars();
		buffer.insert(end, &text);
	}
}

#[cfg(test)]
mod tests {
	use mle_primitives::Key;

	use super::*;

	#[test]
	fn prompt_collects_typed_answer() {
		let mut editor = Editor::with_script([
			Key::char('h'),
			Key::char('i'),
			Key::new(mle_primitives::KeyCode::Enter),
		]);
		let answer = editor.prompt_text("test: Say hi?").unwrap();
		assert_eq!(answer.as_deref(), Some("hi"));
		// The prompt view is gone afterwards.
		assert!(editor.prompt_view().is_none());
	}

	#[test]
	fn prompt_cancel_yields_none() {
		let mut editor = Editor::with_script([Key::char('x'), Key::ctrl('c')]);
		let answer = editor.prompt_text("test: Cancel me").unwrap();
		assert_eq!(answer, None);
	}

	#[test]
	fn yn_prompt_maps_keys_to_sentinels() {
		let mut editor = Editor::with_script([Key::char('y')]);
		assert_eq!(editor.prompt_yn("ok?").unwrap(), Some(true));

		let mut editor = Editor::with_script([Key::char('n')]);
		assert_eq!(editor.prompt_yn("ok?").unwrap(), Some(false));

		// Unbound keys are dead in the yn keymap (no fallthru); the prompt
		// stays open until an answer or cancel arrives.
		let mut editor = Editor::with_script([Key::char('q'), Key::char('a'), Key::ctrl('c')]);
		assert_eq!(editor.prompt_yn("ok?").unwrap(), None);
	}

	#[test]
	fn yna_prompt_supports_all() {
		let mut editor = Editor::with_script([Key::char('a')]);
		assert_eq!(editor.prompt_yna("all?").unwrap(), Some(PromptAnswer::All));
	}

	#[test]
	fn ok_prompt_dismisses_on_any_key() {
		let mut editor = Editor::with_script([Key::char('z')]);
		editor.prompt_ok("notice").unwrap();
	}

	#[test]
	fn second_prompt_fails_while_one_is_open() {
		fn reentrant_prompt(ctx: &mut crate::commands::CmdContext) -> Result<()> {
			assert!(matches!(ctx.editor.prompt_text("inner"), Err(Error::PromptOpen)));
			ctx.loop_ctx.should_exit = true;
			Ok(())
		}
		let mut editor = Editor::with_script([Key::ctrl('t'), Key::new(mle_primitives::KeyCode::Enter)]);
		editor.commands.register("reentrant-prompt", reentrant_prompt);
		editor
			.keymaps
			.get_mut("mle_prompt_input")
			.unwrap()
			.bind("reentrant-prompt", "C-t", None)
			.unwrap();
		let answer = editor.prompt_text("outer").unwrap();
		assert_eq!(answer, None);
	}
}
