//! Async-proc multiplexing driven through the event loop.
//!
//! These tests run real shell children. A drained scripted input source
//! reports exhaustion, so `run_loop` returns `Error::InputExhausted` once
//! every proc has been torn down; that error is the expected way out.

use std::time::{Duration, Instant};

use mle_editor::async_proc::ProcEvent;
use mle_editor::{Editor, Error, LoopContext, run_loop};
use mle_primitives::Key;

fn noop_menu_callback(_ctx: &mut mle_editor::commands::CmdContext) -> mle_editor::Result<()> {
	Ok(())
}

/// Callback writing a marker into the invoker's buffer on teardown.
fn done_marker(editor: &mut Editor, event: &ProcEvent) {
	if event.is_done
		&& let Some((_, buffer)) = editor.view_and_buffer_mut(event.invoker)
	{
		let end = buffer.len_chars();
		buffer.insert(end, "DONE");
	}
}

/// Callback that would be observable if closed-view deliveries leaked.
fn poison(editor: &mut Editor, _event: &ProcEvent) {
	editor.exit_code = 99;
}

fn drive_until_exhausted(editor: &mut Editor) {
	let err = run_loop(editor, &mut LoopContext::default()).unwrap_err();
	assert!(matches!(err, Error::InputExhausted), "{err}");
}

#[test]
fn proc_output_populates_the_menu_buffer() {
	let mut editor = Editor::with_script([]);
	let menu = editor
		.menu(noop_menu_callback, None, Some("printf 'one\\ntwo\\n'"))
		.unwrap();

	drive_until_exhausted(&mut editor);

	assert_eq!(editor.async_proc_count(), 0);
	let contents = editor.view_buffer(menu).unwrap().contents();
	assert_eq!(contents, "one\ntwo\n");
}

#[test]
fn tty_readiness_preempts_proc_draining() {
	let mut editor = Editor::with_script([]);
	editor.menu(noop_menu_callback, None, Some("sleep 5")).unwrap();

	// The quit key is already buffered: the first multiplexer turn must
	// yield to it instead of waiting on the proc.
	editor.push_script_burst([Key::ctrl('x')]);
	let started = Instant::now();
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert!(started.elapsed() < Duration::from_secs(2), "keystroke was serviced promptly");
	assert_eq!(editor.async_proc_count(), 1, "proc untouched on the input turn");
}

#[test]
fn deadline_tears_down_a_silent_proc() {
	let mut editor = Editor::with_script([]);
	let invoker = editor.active();
	editor
		.spawn_async_proc("sleep 10", invoker, Duration::from_millis(50), done_marker)
		.unwrap();

	let started = Instant::now();
	drive_until_exhausted(&mut editor);

	assert!(started.elapsed() < Duration::from_secs(5));
	assert_eq!(editor.async_proc_count(), 0);
	let contents = editor.view_buffer(invoker).unwrap().contents();
	assert_eq!(contents, "DONE", "final done delivery fired exactly once");
}

#[test]
fn deliveries_for_a_closed_view_are_dropped() {
	let mut editor = Editor::with_script([]);
	let doomed = editor.open_view(mle_editor::ViewKind::Edit, None, true, None).unwrap();
	editor
		.spawn_async_proc("printf x", doomed, Duration::from_secs(5), poison)
		.unwrap();
	editor.close_view(doomed).unwrap();

	drive_until_exhausted(&mut editor);

	assert_eq!(editor.async_proc_count(), 0);
	assert_eq!(editor.exit_code, 0, "no callback ran for the closed view");
}

#[test]
fn menu_cancel_stops_the_bound_proc() {
	let mut editor = Editor::with_script([]);
	editor.menu(noop_menu_callback, None, Some("sleep 5")).unwrap();
	editor.push_script_keys([Key::ctrl('c')]);

	let started = Instant::now();
	drive_until_exhausted(&mut editor);

	assert!(started.elapsed() < Duration::from_secs(4));
	assert_eq!(editor.async_proc_count(), 0, "cancelled proc was destroyed");
}

#[test]
fn shell_exec_collects_output_and_honors_timeouts() {
	let mut editor = Editor::with_script([]);
	let output = editor
		.shell_exec("printf hello", "sh", Duration::from_secs(5), None)
		.unwrap();
	assert_eq!(output, b"hello");

	let piped = editor
		.shell_exec("cat", "sh", Duration::from_secs(5), Some(b"stdin data"))
		.unwrap();
	assert_eq!(piped, b"stdin data");

	let err = editor
		.shell_exec("sleep 10", "sh", Duration::from_millis(50), None)
		.unwrap_err();
	assert!(matches!(err, Error::ShellTimeout(_)), "{err}");
}
