mod cli;
mod terminal;

use std::sync::Arc;

use anyhow::Context;
use mle_editor::{Editor, LoopContext, run_loop};
use termina::PlatformTerminal;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
	init_tracing();
	mle_editor::signals::install();

	let mut editor = Editor::new();

	// RC files first, then the command line; later arguments win.
	let mut paths = cli::load_rc_files(&mut editor);
	paths.extend(cli::apply_argv(&mut editor, std::env::args(), true));
	cli::validate(&mut editor);

	let mut term = PlatformTerminal::new().context("failed to open terminal")?;
	terminal::install_panic_hook(&mut term);
	terminal::enable_terminal_features(&mut term)?;
	editor.attach_terminal(term)?;

	cli::open_files(&mut editor, &paths)?;
	for hook in editor.commands.init_hooks() {
		hook(&mut editor, false);
	}
	editor.startup();

	let mut loop_ctx = LoopContext::default();
	let result = run_loop(&mut editor, &mut loop_ctx);

	for hook in editor.commands.init_hooks() {
		hook(&mut editor, true);
	}
	editor.teardown_terminal();
	result?;
	std::process::exit(editor.exit_code);
}

/// Logs go to the file named by `MLE_LOG`; the TTY belongs to the editor.
fn init_tracing() {
	let Ok(path) = std::env::var("MLE_LOG") else {
		return;
	};
	let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path) else {
		eprintln!("mle: cannot open log file {path}");
		return;
	};
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(Arc::new(file))
		.with_ansi(false)
		.init();
}
