//! The reentrant event loop.
//!
//! One loop turn: draw, drain async procs, acquire input (macro replay
//! first), check the macro toggle, resolve the pending chord, execute.
//! Prompts and menus push a fresh [`LoopContext`] and re-enter [`run_loop`]
//! recursively; `loop_depth` on the editor tracks nesting.

use std::sync::Arc;
use std::time::Duration;

use mle_keymap::Resolution;
use mle_primitives::Key;
use termina::event::{Event, KeyEventKind};
use tracing::{debug, warn};

use crate::async_proc::DrainOutcome;
use crate::commands::CmdContext;
use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::input::PollOutcome;
use crate::macros::Macro;
use crate::prompt::{PromptAnswer, PromptListener};
use crate::signals;
use crate::view::ViewId;

/// How long one input poll slice lasts; the loop checks the fatal-signal
/// flag between slices.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Per-loop state carried through one (possibly nested) run of the event
/// loop.
pub struct LoopContext {
	/// View that was active when this loop started; prompts restore it.
	pub invoker: Option<ViewId>,
	pub should_exit: bool,
	pub prompt_answer: Option<PromptAnswer>,
	/// Keystrokes of the chord in flight.
	pub seq: Vec<Key>,
	pub need_more_input: bool,
	/// Parameters captured by the chord in flight; cleared when a command
	/// executes, preserved across need-more-input turns.
	pub numeric_params: Vec<u32>,
	pub wildcard_params: Vec<char>,
	/// Last executed command, for streak detection (completion cycling).
	pub last_cmd: Option<Arc<str>>,
	pub tab_complete_term: String,
	pub tab_complete_index: usize,
	/// Paste burst collected by ingestion, consumed by `insert-data`.
	pub pastebuf: Vec<Key>,
	/// At most one keystroke peeked past the end of a paste burst; consumed
	/// on the very next input acquisition.
	pub pastebuf_leftover: Option<Key>,
	pub listener: Option<PromptListener>,
}

impl LoopContext {
	pub fn new(invoker: Option<ViewId>) -> Self {
		Self {
			invoker,
			should_exit: false,
			prompt_answer: None,
			seq: Vec::new(),
			need_more_input: false,
			numeric_params: Vec::new(),
			wildcard_params: Vec::new(),
			last_cmd: None,
			tab_complete_term: String::new(),
			tab_complete_index: 0,
			pastebuf: Vec::new(),
			pastebuf_leftover: None,
			listener: None,
		}
	}

	fn clear_chord(&mut self) {
		self.seq.clear();
		self.numeric_params.clear();
		self.wildcard_params.clear();
	}
}

impl Default for LoopContext {
	fn default() -> Self {
		Self::new(None)
	}
}

/// Runs the event loop until the context's exit flag is set.
pub fn run_loop(editor: &mut Editor, loop_ctx: &mut LoopContext) -> Result<()> {
	editor.loop_depth += 1;
	let result = loop_body(editor, loop_ctx);
	editor.loop_depth -= 1;
	result
}

fn loop_body(editor: &mut Editor, loop_ctx: &mut LoopContext) -> Result<()> {
	while !loop_ctx.should_exit {
		if let Some(signum) = signals::take_pending() {
			editor.graceful_exit(signum);
		}

		editor.display()?;

		if !editor.async_procs.is_empty() {
			match editor.drain_async_procs() {
				DrainOutcome::CallAgain => continue,
				DrainOutcome::InputReady | DrainOutcome::Stop => {}
			}
		}

		let (key, is_user_input) = acquire_input(editor, loop_ctx)?;

		if editor.maybe_toggle_macro(key)? {
			continue;
		}

		dispatch(editor, loop_ctx, key, is_user_input)?;
	}
	Ok(())
}

/// Gets the next keystroke: paste leftover, then macro replay, then the
/// terminal. User input is appended to an in-progress recording.
fn acquire_input(editor: &mut Editor, loop_ctx: &mut LoopContext) -> Result<(Key, bool)> {
	if let Some(key) = loop_ctx.pastebuf_leftover.take() {
		editor.record_macro_input(key);
		return Ok((key, true));
	}

	if let Some(replay) = &mut editor.macro_replay {
		match replay.next() {
			Some(key) => return Ok((key, false)),
			None => editor.macro_replay = None,
		}
	}

	let key = editor.read_key()?;
	editor.record_macro_input(key);
	Ok((key, true))
}

impl Editor {
	/// Blocks for the next keystroke, handling resize events and polling the
	/// fatal-signal flag between slices.
	fn read_key(&mut self) -> Result<Key> {
		loop {
			if let Some(signum) = signals::take_pending() {
				self.graceful_exit(signum);
			}
			match self.input.poll(INPUT_POLL_INTERVAL)? {
				PollOutcome::Idle => continue,
				PollOutcome::Exhausted => return Err(Error::InputExhausted),
				PollOutcome::Ready => {}
			}
			match self.input.read()? {
				Event::Key(event) if matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
					if let Ok(key) = Key::try_from(event) {
						return Ok(key);
					}
				}
				Event::WindowResized(size) => {
					self.resize(size.cols, size.rows);
					self.display()?;
				}
				_ => {}
			}
		}
	}

	/// Toggles macro recording when `key` is the configured toggle key.
	/// Returns true if the key was consumed.
	pub(crate) fn maybe_toggle_macro(&mut self, key: Key) -> Result<bool> {
		if key != self.macro_toggle_key {
			return Ok(false);
		}
		if let Some(mut recording) = self.macro_record.take() {
			// The toggle key itself was recorded before this check; trim it.
			recording.inputs.pop();
			if recording.inputs.is_empty() {
				debug!(name = %recording.name, "discarding empty macro");
			} else {
				debug!(name = %recording.name, inputs = recording.inputs.len(), "recorded macro");
				self.register_macro(recording);
			}
		} else {
			let name = match self.prompt_text("record_macro: Name?") {
				Ok(Some(name)) if !name.is_empty() => name,
				Ok(_) => return Ok(true),
				Err(Error::PromptOpen) => return Ok(true),
				Err(err) => return Err(err),
			};
			self.macro_record = Some(Macro::new(&name));
		}
		Ok(true)
	}
}

/// Resolves the chord extended by `key` and executes the outcome.
fn dispatch(editor: &mut Editor, loop_ctx: &mut LoopContext, key: Key, is_user_input: bool) -> Result<()> {
	loop_ctx.seq.push(key);
	let stack = editor.view(editor.active())?.kmap_stack.clone();

	match mle_keymap::resolve(&editor.keymaps, &stack, &loop_ctx.seq) {
		Resolution::Resolved(binding) => {
			loop_ctx.need_more_input = false;
			loop_ctx.numeric_params = binding.numeric_params.clone();
			loop_ctx.wildcard_params = binding.wildcard_params.clone();

			let Some(func) = editor.commands.resolve(&binding.cmd) else {
				warn!(cmd = %binding.cmd, "binding names an unregistered command");
				editor.set_status(format!("unknown command: {}", binding.cmd));
				loop_ctx.clear_chord();
				return Ok(());
			};

			if is_user_input && &*binding.cmd == "insert-data" {
				ingest_paste(editor, loop_ctx)?;
			}

			let prompt_version = prompt_buffer_version(editor, loop_ctx);

			let mut ctx = CmdContext {
				editor: &mut *editor,
				loop_ctx: &mut *loop_ctx,
				input: key,
				cmd: binding.cmd.clone(),
				static_param: binding.static_param.clone(),
				numeric_params: binding.numeric_params,
				wildcard_params: binding.wildcard_params,
				is_user_input,
			};
			if let Err(err) = func(&mut ctx) {
				warn!(cmd = %binding.cmd, %err, "command failed");
				editor.set_status(err.to_string());
			}

			notify_listener(editor, loop_ctx, prompt_version);

			loop_ctx.clear_chord();
			loop_ctx.last_cmd = Some(binding.cmd);
		}
		Resolution::Pending => {
			loop_ctx.need_more_input = true;
		}
		Resolution::Unbound => {
			loop_ctx.need_more_input = false;
			loop_ctx.clear_chord();
		}
	}

	editor.pending_chord = if loop_ctx.need_more_input {
		loop_ctx.seq.iter().map(Key::to_string).collect::<Vec<_>>().join(" ")
	} else {
		String::new()
	};
	Ok(())
}

fn prompt_buffer_version(editor: &Editor, loop_ctx: &LoopContext) -> Option<u64> {
	loop_ctx.listener?;
	let prompt = editor.prompt_view()?;
	editor.view_buffer(prompt).map(|b| b.version())
}

fn notify_listener(editor: &mut Editor, loop_ctx: &LoopContext, version_before: Option<u64>) {
	let Some(listener) = loop_ctx.listener else {
		return;
	};
	let Some(prompt) = editor.prompt_view() else {
		return;
	};
	let Some(buffer) = editor.view_buffer(prompt) else {
		return;
	};
	if version_before == Some(buffer.version()) {
		return;
	}
	let contents = buffer.contents();
	listener(editor, &contents);
}

/// Collapses a burst of ready keystrokes that all resolve to `insert-data`
/// into the paste buffer, so one insert handles the whole paste. At most one
/// non-insert keystroke is peeked past the burst; it becomes the leftover.
fn ingest_paste(editor: &mut Editor, loop_ctx: &mut LoopContext) -> Result<()> {
	loop_ctx.pastebuf.clear();
	loop {
		match editor.input.poll(Duration::ZERO) {
			Ok(PollOutcome::Ready) => {}
			_ => break,
		}
		let key = match editor.input.read()? {
			Event::Key(event) if matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
				match Key::try_from(event) {
					Ok(key) => key,
					Err(()) => continue,
				}
			}
			Event::WindowResized(size) => {
				editor.resize(size.cols, size.rows);
				editor.display()?;
				break;
			}
			_ => continue,
		};

		// The macro toggle key is handled at loop level, never swallowed
		// into a paste burst.
		if key == editor.macro_toggle_key {
			loop_ctx.pastebuf_leftover = Some(key);
			break;
		}

		let stack = editor.view(editor.active())?.kmap_stack.clone();
		match mle_keymap::resolve(&editor.keymaps, &stack, &[key]) {
			Resolution::Resolved(binding) if &*binding.cmd == "insert-data" => {
				loop_ctx.pastebuf.push(key);
			}
			_ => {
				loop_ctx.pastebuf_leftover = Some(key);
				break;
			}
		}
	}
	Ok(())
}
