//! End-to-end dispatch scenarios driven through the real event loop with
//! scripted input.

use mle_editor::{Editor, LoopContext, run_loop};
use mle_primitives::{Key, KeyCode};

fn chars(s: &str) -> Vec<Key> {
	s.chars().map(Key::char).collect()
}

fn enter() -> Key {
	Key::new(KeyCode::Enter)
}

fn seed(editor: &mut Editor, contents: &str, cursor: usize) {
	let id = editor.active();
	let (view, buffer) = editor.view_and_buffer_mut(id).expect("active view");
	buffer.set_contents(contents);
	view.cursor_mut().pos = cursor;
}

fn contents(editor: &Editor) -> String {
	editor.view_buffer(editor.active()).expect("active buffer").contents()
}

fn cursor_line(editor: &Editor) -> usize {
	let view = editor.view(editor.active()).expect("active view");
	let buffer = editor.view_buffer(editor.active()).expect("active buffer");
	buffer.line_col(view.cursor().pos).0
}

/// Quit keys for a session whose buffer has unsaved changes.
fn quit_dirty() -> Vec<Key> {
	vec![Key::ctrl('x'), Key::char('y')]
}

#[test]
fn multi_key_chord_dispatches_with_static_param() {
	let mut editor = Editor::with_script([]);
	seed(&mut editor, "(ab)", 2);

	// C-c d = copy-by(bracket); M-/ = move-end; C-u = uncut.
	editor.push_script_keys([Key::ctrl('c'), Key::char('d'), Key::alt('/'), Key::ctrl('u')]);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert_eq!(contents(&editor), "(ab)(ab)");
}

#[test]
fn numeric_prefix_parameter_reaches_command() {
	let mut editor = Editor::with_script([]);
	let body = "line\n".repeat(30);
	let pos = {
		let id = editor.active();
		let (_, buffer) = editor.view_and_buffer_mut(id).unwrap();
		buffer.set_contents(&body);
		buffer.pos_at(20, 0)
	};
	seed(&mut editor, &body, pos);

	// M-y 1 2 u = move-relative(up) with numeric parameter 12.
	editor.push_script_keys([Key::alt('y'), Key::char('1'), Key::char('2'), Key::char('u')]);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert_eq!(cursor_line(&editor), 8);
}

#[test]
fn unbound_mid_chord_discards_the_partial_chord() {
	let mut editor = Editor::with_script([]);

	// C-c z misses mid-trie; the chord dies and 'a' inserts normally.
	editor.push_script_keys([Key::ctrl('c'), Key::char('z'), Key::char('a')]);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert_eq!(contents(&editor), "a");
}

#[test]
fn numeric_overflow_aborts_the_whole_chord() {
	let mut editor = Editor::with_script([]);

	// Nine digits exceeds the eight-digit numeric buffer; the pending
	// chord aborts and the following 'u' inserts via the default command.
	let mut keys = vec![Key::alt('y')];
	keys.extend(std::iter::repeat_n(Key::char('9'), 9));
	keys.push(Key::char('u'));
	editor.push_script_keys(keys);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert_eq!(contents(&editor), "u");
}

#[test]
fn paste_burst_collapses_into_one_insert() {
	let mut editor = Editor::with_script([]);

	// A burst of inserts plus the quit key: the inserts batch into a
	// single insert-data, and the quit key is the one allowed leftover,
	// consumed on the very next acquisition.
	editor.push_script_burst([Key::char('a'), Key::char('b'), Key::char('c'), Key::ctrl('x')]);
	editor.push_script_keys([Key::char('y')]);
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert_eq!(contents(&editor), "abc");
	let buffer = editor.view_buffer(editor.active()).unwrap();
	assert_eq!(buffer.version(), 1, "burst must land as a single insert");
}

#[test]
fn trim_paste_strips_trailing_whitespace() {
	let mut editor = Editor::with_script([]);
	editor.options.trim_paste = true;
	editor.options.tab_to_space = false;

	editor.push_script_burst([
		Key::char('a'),
		Key::char(' '),
		Key::char(' '),
		Key::new(KeyCode::Enter),
		Key::char('b'),
	]);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert_eq!(contents(&editor), "a\nb");
}

#[test]
fn macro_record_and_replay_dispatch_the_same_commands() {
	let mut editor = Editor::with_script([]);

	// Toggle, name "m", record h i, toggle, replay via M-j.
	editor.push_script_keys([Key::alt('r')]);
	editor.push_script_keys(chars("m"));
	editor.push_script_keys([enter()]);
	editor.push_script_keys(chars("hi"));
	editor.push_script_keys([Key::alt('r'), Key::alt('j')]);
	editor.push_script_keys(chars("m"));
	editor.push_script_keys([enter()]);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	let recorded = editor.get_macro("m").expect("macro registered");
	assert_eq!(recorded.inputs, vec![Key::char('h'), Key::char('i')]);
	assert_eq!(contents(&editor), "hihi");
}

#[test]
fn empty_macro_is_not_registered() {
	let mut editor = Editor::with_script([]);

	editor.push_script_keys([Key::alt('r')]);
	editor.push_script_keys(chars("e"));
	editor.push_script_keys([enter(), Key::alt('r'), Key::ctrl('x')]);
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert!(editor.get_macro("e").is_none());
	assert!(!editor.is_recording_macro());
}

#[test]
fn cancelled_name_prompt_skips_recording() {
	let mut editor = Editor::with_script([Key::alt('r'), Key::ctrl('c'), Key::ctrl('x')]);
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();
	assert!(!editor.is_recording_macro());
}

#[test]
fn configured_macro_replays_through_wildcard_binding() {
	let mut editor = Editor::with_script([]);
	editor.add_macro_from_str("m,h,i").unwrap();

	// M-m ** captures 'm' as the macro name.
	editor.push_script_keys([Key::alt('m'), Key::char('m')]);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert_eq!(contents(&editor), "hi");
}

#[test]
fn tab_completion_cycles_through_candidates() {
	let mut editor = Editor::with_script([]);
	editor.options.completion_cmd = "printf 'aa\\nab\\nac\\n' #".to_string();

	// Four tabs walk aa -> ab -> ac -> aa; enter submits.
	editor.push_script_keys([
		Key::new(KeyCode::Tab),
		Key::new(KeyCode::Tab),
		Key::new(KeyCode::Tab),
		Key::new(KeyCode::Tab),
		enter(),
	]);
	let answer = editor.prompt_text("open: Path?").unwrap();
	assert_eq!(answer.as_deref(), Some("aa"));
}

#[test]
fn tab_completion_with_no_candidates_is_a_noop() {
	let mut editor = Editor::with_script([]);
	editor.options.completion_cmd = "true".to_string();

	editor.push_script_keys(chars("x"));
	editor.push_script_keys([Key::new(KeyCode::Tab), enter()]);
	let answer = editor.prompt_text("open: Path?").unwrap();
	assert_eq!(answer.as_deref(), Some("x"));
}

#[test]
fn shell_exec_inserts_command_output() {
	let mut editor = Editor::with_script([]);

	editor.push_script_keys([Key::alt('e')]);
	editor.push_script_keys(chars("echo hi"));
	editor.push_script_keys([enter()]);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert_eq!(contents(&editor), "hi\n");
}

#[test]
fn prompt_menu_returns_the_selected_line() {
	let mut editor = Editor::with_script([]);
	editor.push_script_keys([Key::new(KeyCode::Down), enter()]);
	let line = editor.prompt_menu("pick: Item?", Some("alpha\nbeta\ngamma"), None).unwrap();
	assert_eq!(line.as_deref(), Some("beta"));
}

#[test]
fn prompt_menu_cancel_returns_none() {
	let mut editor = Editor::with_script([Key::new(KeyCode::Down), Key::ctrl('c')]);
	let line = editor.prompt_menu("pick: Item?", Some("alpha\nbeta"), None).unwrap();
	assert_eq!(line, None);
}

#[test]
fn isearch_advances_cursor_as_pattern_grows() {
	let mut editor = Editor::with_script([]);
	seed(&mut editor, "alpha\nbeta\nalpha\n", 0);

	editor.push_script_keys([Key::ctrl('r')]);
	editor.push_script_keys(chars("be"));
	editor.push_script_keys([enter()]);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	let view = editor.view(editor.active()).unwrap();
	assert_eq!(view.cursor().pos, 6, "cursor lands on 'beta'");
	assert!(view.isearch_re.is_none(), "isearch pattern cleared on exit");
}

#[test]
fn isearch_drop_cursors_places_one_cursor_per_match() {
	let mut editor = Editor::with_script([]);
	seed(&mut editor, "alpha\nbeta\nalpha\n", 0);

	editor.push_script_keys([Key::ctrl('r')]);
	editor.push_script_keys(chars("a"));
	editor.push_script_keys([Key::ctrl('/')]);
	editor.push_script_keys(chars("X"));
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	let view = editor.view(editor.active()).unwrap();
	assert_eq!(view.cursors.len(), 5);
	assert_eq!(contents(&editor).matches('X').count(), 5);
}

#[test]
fn replace_honors_yes_no_all_answers() {
	let mut editor = Editor::with_script([]);
	seed(&mut editor, "x x x x", 0);

	// Pattern "x", replacement "o", answers: y, n, a.
	editor.push_script_keys([Key::ctrl('t')]);
	editor.push_script_keys(chars("x"));
	editor.push_script_keys([enter()]);
	editor.push_script_keys(chars("o"));
	editor.push_script_keys([enter()]);
	editor.push_script_keys(chars("yna"));
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	assert_eq!(contents(&editor), "o x o o");
}

#[test]
fn split_and_close_restore_a_single_view() {
	let mut editor = Editor::with_script([Key::alt('v'), Key::alt('c'), Key::ctrl('x')]);
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();
	assert_eq!(editor.edit_count(), 1);
}

#[test]
fn custom_keymap_pushed_on_stack_wins() {
	let mut editor = Editor::with_script([]);
	editor.define_kmap_from_str("custom,insert-data,0").unwrap();
	editor.add_binding_from_str("custom", "quit,q").unwrap();
	{
		let id = editor.active();
		editor.view_mut(id).unwrap().push_kmap("custom");
	}

	// 'q' resolves in the pushed keymap instead of inserting.
	editor.push_script_keys([Key::char('q')]);
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();
	assert_eq!(contents(&editor), "");
}

#[test]
fn binding_to_unknown_command_is_reported_not_fatal() {
	let mut editor = Editor::with_script([]);
	editor.define_kmap_from_str("odd,insert-data,0").unwrap();
	editor.add_binding_from_str("odd", "no-such-command,C-j").unwrap();
	{
		let id = editor.active();
		editor.view_mut(id).unwrap().push_kmap("odd");
	}

	editor.push_script_keys([Key::ctrl('j'), Key::char('a')]);
	editor.push_script_keys(quit_dirty());
	run_loop(&mut editor, &mut LoopContext::default()).unwrap();

	// The loop survived the unknown command and kept dispatching.
	assert_eq!(contents(&editor), "a");
}

#[test]
fn crash_backups_during_a_prompt_skip_the_prompt_buffer() {
	fn backup_probe(ctx: &mut mle_editor::commands::CmdContext) -> mle_editor::Result<()> {
		let dir = tempfile::tempdir().expect("tempdir");
		ctx.editor.exit_code = ctx.editor.write_crash_backups(dir.path()) as i32;
		ctx.loop_ctx.should_exit = true;
		Ok(())
	}
	let mut editor = Editor::with_script([]);
	seed(&mut editor, "unsaved edit text", 0);
	editor.commands.register("backup-probe", backup_probe);
	editor
		.keymaps
		.get_mut("mle_prompt_input")
		.unwrap()
		.bind("backup-probe", "C-b", None)
		.unwrap();

	// Type into the prompt buffer so it is modified too, then probe.
	editor.push_script_keys(chars("z"));
	editor.push_script_keys([Key::ctrl('b')]);
	editor.prompt_text("probe:").unwrap();

	assert_eq!(editor.exit_code, 1, "only the modified edit buffer is backed up");
}

#[test]
fn loop_depth_nests_inside_prompts() {
	fn probe(ctx: &mut mle_editor::commands::CmdContext) -> mle_editor::Result<()> {
		ctx.editor.exit_code = ctx.editor.loop_depth() as i32;
		ctx.loop_ctx.should_exit = true;
		Ok(())
	}
	let mut editor = Editor::with_script([Key::ctrl('p')]);
	editor.commands.register("depth-probe", probe);
	editor
		.keymaps
		.get_mut("mle_prompt_input")
		.unwrap()
		.bind("depth-probe", "C-p", None)
		.unwrap();

	assert_eq!(editor.loop_depth(), 0);
	editor.prompt_text("probe:").unwrap();
	assert_eq!(editor.exit_code, 1, "prompt loop runs at depth 1 from the top level");
}
