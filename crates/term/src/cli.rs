//! CLI schema and RC-file handling.
//!
//! RC files (`$HOME/.mlerc`, then `/etc/mlerc`) hold one CLI argument per
//! line and are parsed with the same schema as the command line. Keymap
//! (`-K`/`-k`) and syntax (`-S`/`-s`) options are order-sensitive: a
//! binding or rule applies to the most recent definition, recovered from
//! the argument indices.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command};
use mle_editor::syntax::Syntax;
use mle_editor::{Editor, LinenumType, ViewKind};
use tracing::warn;

pub fn build_command() -> Command {
	Command::new("mle")
		.about("small terminal text editor")
		.disable_version_flag(true)
		.arg(
			Arg::new("tab-to-space")
				.short('a')
				.value_name("1|0")
				.help("Enable/disable tab-to-space"),
		)
		.arg(
			Arg::new("bracket-pairs")
				.short('b')
				.action(ArgAction::SetTrue)
				.help("Highlight bracket pairs"),
		)
		.arg(Arg::new("color-col").short('c').value_name("COL").help("Color column"))
		.arg(
			Arg::new("kmap-def")
				.short('K')
				.value_name("KDEF")
				.action(ArgAction::Append)
				.help("Set current kmap definition (use with -k); kdef is '<name>,<default_cmd>,<allow_fallthru>'"),
		)
		.arg(
			Arg::new("kmap-bind")
				.short('k')
				.value_name("KBIND")
				.action(ArgAction::Append)
				.help("Add key binding to current kmap definition (use with -K); kbind is '<cmd>,<key>[,<param>]'"),
		)
		.arg(
			Arg::new("linenum")
				.short('l')
				.value_name("LTYPE")
				.help("Linenum type (0=absolute, 1=relative, 2=both)"),
		)
		.arg(
			Arg::new("macro-def")
				.short('M')
				.value_name("MACRO")
				.action(ArgAction::Append)
				.help("Add a macro; macro is '<name>,<key1>,...,<keyN>'"),
		)
		.arg(
			Arg::new("macro-key")
				.short('m')
				.value_name("KEY")
				.help("Set macro toggle key (default: M-r)"),
		)
		.arg(
			Arg::new("init-kmap")
				.short('n')
				.value_name("KMAP")
				.help("Set init kmap (default: mle_normal)"),
		)
		.arg(
			Arg::new("syntax-def")
				.short('S')
				.value_name("SYNDEF")
				.action(ArgAction::Append)
				.help("Set current syntax definition (use with -s); syndef is '<name>,<path_pattern>'"),
		)
		.arg(
			Arg::new("syntax-rule")
				.short('s')
				.value_name("SYNRULE")
				.action(ArgAction::Append)
				.help("Add rule to current syntax definition (use with -S); synrule is '<start>,<end>,<fg>,<bg>' or '<regex>,<fg>,<bg>'"),
		)
		.arg(Arg::new("tab-width").short('t').value_name("SIZE").help("Set tab width (default: 4)"))
		.arg(
			Arg::new("version")
				.short('v')
				.action(ArgAction::SetTrue)
				.help("Print version and exit"),
		)
		.arg(Arg::new("script").short('x').value_name("SCRIPT").help("Run user script at startup"))
		.arg(
			Arg::new("syntax-override")
				.short('y')
				.value_name("SYNTAX")
				.help("Set override syntax for files opened at startup"),
		)
		.arg(
			Arg::new("trim-paste")
				.short('z')
				.value_name("1|0")
				.help("Enable/disable trim paste"),
		)
		.arg(
			Arg::new("files")
				.value_name("FILE[:LINE]")
				.num_args(0..)
				.help("Files to open at startup"),
		)
}

/// Applies one argv to the editor. `strict` argv (the real command line)
/// exits on parse errors; RC-file argv logs and continues with a failure
/// exit code. Returns positional paths for later opening.
pub fn apply_argv<I, S>(editor: &mut Editor, argv: I, strict: bool) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: Into<std::ffi::OsString> + Clone,
{
	let matches = match build_command().try_get_matches_from(argv) {
		Ok(matches) => matches,
		Err(err) if strict => err.exit(),
		Err(err) => {
			warn!(%err, "ignoring malformed rc arguments");
			editor.exit_code = 1;
			return Vec::new();
		}
	};

	if matches.get_flag("version") {
		println!("mle {}", env!("CARGO_PKG_VERSION"));
		std::process::exit(0);
	}

	apply_matches(editor, &matches);
	matches
		.get_many::<String>("files")
		.map(|files| files.cloned().collect())
		.unwrap_or_default()
}

fn config_error(editor: &mut Editor, what: &str, input: &str, err: impl std::fmt::Display) {
	warn!(what, input, %err, "bad configuration");
	editor.exit_code = 1;
}

fn apply_matches(editor: &mut Editor, matches: &ArgMatches) {
	if let Some(v) = matches.get_one::<String>("tab-to-space") {
		editor.options.tab_to_space = v.trim() == "1";
	}
	if matches.get_flag("bracket-pairs") {
		editor.options.highlight_bracket_pairs = true;
	}
	if let Some(v) = matches.get_one::<String>("color-col") {
		match v.parse::<u16>() {
			Ok(col) => editor.options.color_col = Some(col),
			Err(err) => config_error(editor, "color column", v, err),
		}
	}
	if let Some(v) = matches.get_one::<String>("linenum") {
		match v.parse::<i32>() {
			Ok(flag) => editor.options.linenum_type = LinenumType::from_flag(flag),
			Err(err) => config_error(editor, "linenum type", v, err),
		}
	}
	if let Some(v) = matches.get_one::<String>("tab-width") {
		match v.parse::<usize>() {
			Ok(width) if width > 0 => editor.options.tab_width = width,
			Ok(_) => config_error(editor, "tab width", v, "must be positive"),
			Err(err) => config_error(editor, "tab width", v, err),
		}
	}
	if let Some(v) = matches.get_one::<String>("macro-key")
		&& let Err(err) = editor.set_macro_toggle_key(v)
	{
		config_error(editor, "macro toggle key", v, err);
	}
	if let Some(v) = matches.get_one::<String>("init-kmap") {
		editor.options.kmap_init = v.clone();
	}
	if let Some(v) = matches.get_one::<String>("syntax-override") {
		editor.options.syntax_override = Some(v.clone());
	}
	if let Some(v) = matches.get_one::<String>("script") {
		editor.startup_script = Some(v.clone());
	}
	if let Some(v) = matches.get_one::<String>("trim-paste") {
		editor.options.trim_paste = v.trim() == "1";
	}
	if let Some(defs) = matches.get_many::<String>("macro-def") {
		for def in defs {
			if let Err(err) = editor.add_macro_from_str(def) {
				config_error(editor, "macro", def, err);
			}
		}
	}

	apply_kmap_args(editor, matches);
	apply_syntax_args(editor, matches);
}

/// Merges two appendable options back into command-line order.
fn interleave(matches: &ArgMatches, def_id: &str, item_id: &str) -> Vec<(usize, bool, String)> {
	let mut items = Vec::new();
	for (id, is_def) in [(def_id, true), (item_id, false)] {
		if let (Some(indices), Some(values)) = (matches.indices_of(id), matches.get_many::<String>(id)) {
			items.extend(indices.zip(values).map(|(i, v)| (i, is_def, v.clone())));
		}
	}
	items.sort_by_key(|(i, _, _)| *i);
	items
}

fn apply_kmap_args(editor: &mut Editor, matches: &ArgMatches) {
	let mut current: Option<String> = None;
	for (_, is_def, value) in interleave(matches, "kmap-def", "kmap-bind") {
		if is_def {
			match editor.define_kmap_from_str(&value) {
				Ok(name) => current = Some(name),
				Err(err) => config_error(editor, "kmap", &value, err),
			}
		} else {
			match &current {
				Some(kmap) => {
					let kmap = kmap.clone();
					if let Err(err) = editor.add_binding_from_str(&kmap, &value) {
						config_error(editor, "key binding", &value, err);
					}
				}
				None => config_error(editor, "key binding", &value, "-k requires a preceding -K"),
			}
		}
	}
}

fn apply_syntax_args(editor: &mut Editor, matches: &ArgMatches) {
	let mut current: Option<String> = None;
	for (_, is_def, value) in interleave(matches, "syntax-def", "syntax-rule") {
		if is_def {
			match Syntax::from_def_str(&value) {
				Ok(syntax) => {
					current = Some(syntax.name.to_string());
					editor.syntaxes.insert(syntax);
				}
				Err(err) => config_error(editor, "syntax", &value, err),
			}
		} else {
			let result = current
				.as_ref()
				.and_then(|name| editor.syntaxes.get_mut(name))
				.map(|syntax| syntax.add_rule_str(&value));
			match result {
				Some(Ok(())) => {}
				Some(Err(err)) => config_error(editor, "syntax rule", &value, err),
				None => config_error(editor, "syntax rule", &value, "-s requires a preceding -S"),
			}
		}
	}
}

/// Reads the per-user and system RC files, if present, applying each as an
/// argv. Returns any positional paths they named.
pub fn load_rc_files(editor: &mut Editor) -> Vec<String> {
	let mut paths = Vec::new();
	if let Ok(home) = std::env::var("HOME") {
		paths.extend(load_rc(editor, &Path::new(&home).join(".mlerc")));
	}
	paths.extend(load_rc(editor, Path::new("/etc/mlerc")));
	paths
}

fn load_rc(editor: &mut Editor, path: &Path) -> Vec<String> {
	let Ok(data) = fs::read_to_string(path) else {
		return Vec::new();
	};
	let argv: Vec<String> = std::iter::once("mle".to_string())
		.chain(data.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from))
		.collect();
	if argv.len() == 1 {
		return Vec::new();
	}
	apply_argv(editor, argv, false)
}

/// Post-config validation: the initial keymap must exist.
pub fn validate(editor: &mut Editor) {
	if !editor.keymaps.contains(&editor.options.kmap_init) {
		let bad = std::mem::replace(&mut editor.options.kmap_init, "mle_normal".to_string());
		config_error(editor, "init kmap", &bad, "unknown keymap");
	}
}

/// Opens the startup files, handling `path:line` suffixes for paths that do
/// not exist verbatim. Closes the pristine initial blank view when real
/// files were opened.
pub fn open_files(editor: &mut Editor, paths: &[String]) -> anyhow::Result<()> {
	if paths.is_empty() {
		return Ok(());
	}
	let blank = editor.active();
	for raw in paths {
		let (path, line) = split_path_line(raw);
		if line.is_some() {
			editor.startup_linenum = line;
		}
		editor.open_view(ViewKind::Edit, Some(Path::new(&path)), true, None)?;
	}
	if editor.edit_count() > 1
		&& editor.view_exists(blank)
		&& editor.view_buffer(blank).is_some_and(|b| b.path().is_none() && !b.is_unsaved())
	{
		editor.close_view(blank)?;
	}
	Ok(())
}

/// Splits a trailing `:N` line suffix off a path that does not exist as
/// written.
fn split_path_line(raw: &str) -> (PathBuf, Option<usize>) {
	if fs::metadata(raw).is_ok() {
		return (PathBuf::from(raw), None);
	}
	if let Some((path, suffix)) = raw.rsplit_once(':')
		&& !path.is_empty()
		&& let Ok(line) = suffix.parse::<usize>()
	{
		return (PathBuf::from(path), Some(line.saturating_sub(1)));
	}
	(PathBuf::from(raw), None)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn argv(args: &[&str]) -> Vec<String> {
		std::iter::once("mle").chain(args.iter().copied()).map(String::from).collect()
	}

	#[test]
	fn options_apply() {
		let mut editor = Editor::new();
		let paths = apply_argv(
			&mut editor,
			argv(&["-a", "0", "-t", "8", "-l", "1", "-z", "1", "-b", "file.txt"]),
			false,
		);
		assert!(!editor.options.tab_to_space);
		assert_eq!(editor.options.tab_width, 8);
		assert_eq!(editor.options.linenum_type, LinenumType::Relative);
		assert!(editor.options.trim_paste);
		assert!(editor.options.highlight_bracket_pairs);
		assert_eq!(paths, vec!["file.txt"]);
		assert_eq!(editor.exit_code, 0);
	}

	#[test]
	fn kmap_defs_bind_in_order() {
		let mut editor = Editor::new();
		apply_argv(
			&mut editor,
			argv(&[
				"-K",
				"mine,insert-data,0",
				"-k",
				"cut,C-k",
				"-K",
				"other,1",
				"-k",
				"copy,M-k",
			]),
			false,
		);
		assert!(editor.keymaps.contains("mine"));
		assert!(editor.keymaps.contains("other"));
		assert_eq!(editor.exit_code, 0);

		// A binding without a current keymap is a config error that does not
		// abort startup.
		let mut editor = Editor::new();
		apply_argv(&mut editor, argv(&["-k", "cut,C-k"]), false);
		assert_eq!(editor.exit_code, 1);
	}

	#[test]
	fn macro_definitions_register() {
		let mut editor = Editor::new();
		apply_argv(&mut editor, argv(&["-M", "m1,h,i", "-m", "M-q"]), false);
		assert!(editor.get_macro("m1").is_some());
		assert_eq!(editor.macro_toggle_key, mle_primitives::parse_key("M-q").unwrap());
	}

	#[test]
	fn syntax_defs_and_rules() {
		let mut editor = Editor::new();
		apply_argv(
			&mut editor,
			argv(&["-S", "mysyn,\\.x$", "-s", "\\d+,3,0", "-s", "a,b,1,2"]),
			false,
		);
		let syntax = editor.syntaxes.get("mysyn").unwrap();
		assert_eq!(syntax.rules.len(), 2);
	}

	#[test]
	fn bad_rc_arguments_set_failure_exit_code() {
		let mut editor = Editor::new();
		apply_argv(&mut editor, argv(&["-Q"]), false);
		assert_eq!(editor.exit_code, 1);
	}

	#[test]
	fn rc_file_lines_parse_as_argv() {
		let dir = tempfile::tempdir().unwrap();
		let rc = dir.path().join("mlerc");
		std::fs::write(&rc, "-t8\n\n-l2\n").unwrap();
		let mut editor = Editor::new();
		let paths = load_rc(&mut editor, &rc);
		assert!(paths.is_empty());
		assert_eq!(editor.options.tab_width, 8);
		assert_eq!(editor.options.linenum_type, LinenumType::Both);
	}

	#[test]
	fn missing_rc_file_is_ignored() {
		let mut editor = Editor::new();
		let paths = load_rc(&mut editor, Path::new("/nonexistent/mlerc"));
		assert!(paths.is_empty());
		assert_eq!(editor.exit_code, 0);
	}

	#[test]
	fn unknown_init_kmap_falls_back() {
		let mut editor = Editor::new();
		apply_argv(&mut editor, argv(&["-n", "nope"]), false);
		validate(&mut editor);
		assert_eq!(editor.options.kmap_init, "mle_normal");
		assert_eq!(editor.exit_code, 1);
	}

	#[test]
	fn path_line_suffix_only_for_missing_files() {
		let dir = tempfile::tempdir().unwrap();
		let literal = dir.path().join("weird:3");
		std::fs::write(&literal, "x").unwrap();

		let (path, line) = split_path_line(&literal.to_string_lossy());
		assert_eq!(path, literal);
		assert_eq!(line, None);

		let missing = dir.path().join("file.txt:3");
		let (path, line) = split_path_line(&missing.to_string_lossy());
		assert_eq!(path, dir.path().join("file.txt"));
		assert_eq!(line, Some(2));
	}
}
