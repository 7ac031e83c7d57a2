//! Command registry, dispatch context, and built-in command functions.
//!
//! Command references are late-bound: keymaps store names, and the registry
//! accepts a name before its function is registered, so keymaps and
//! commands can be defined in any order. Resolution happens at dispatch
//! time against the editor-wide registry.

mod edit;
mod motion;
mod prompts;
mod search;
mod shellcmds;
mod views;

use std::any::Any;
use std::sync::Arc;

use mle_primitives::Key;
use rustc_hash::FxHashMap;

use crate::buffer::Buffer;
use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::event_loop::LoopContext;
use crate::view::View;

/// A command function.
pub type CmdFn = fn(&mut CmdContext) -> Result<()>;
/// Optional per-command init hook, run at startup and teardown.
pub type CmdInitFn = fn(&mut Editor, is_deinit: bool);

/// A registered command: resolved function, optional init hook, and
/// per-command user data.
#[derive(Default)]
pub struct CommandEntry {
	pub func: Option<CmdFn>,
	pub init: Option<CmdInitFn>,
	pub udata: Option<Box<dyn Any>>,
}

/// Editor-wide command registry keyed by unique names.
#[derive(Default)]
pub struct CommandRegistry {
	entries: FxHashMap<Arc<str>, CommandEntry>,
}

impl CommandRegistry {
	/// Registers (or re-registers) a command function under `name`.
	pub fn register(&mut self, name: &str, func: CmdFn) {
		self.entries.entry(name.into()).or_default().func = Some(func);
	}

	/// Registers a command with an init hook.
	pub fn register_with_init(&mut self, name: &str, func: CmdFn, init: CmdInitFn) {
		let entry = self.entries.entry(name.into()).or_default();
		entry.func = Some(func);
		entry.init = Some(init);
	}

	/// Ensures a named reference exists, function or not. Keymap bindings
	/// call this so unknown names surface at dispatch, not at bind time.
	pub fn reference(&mut self, name: &str) -> Arc<str> {
		let name: Arc<str> = name.into();
		self.entries.entry(name.clone()).or_default();
		name
	}

	/// Resolves a name to its function, if one has been registered.
	pub fn resolve(&self, name: &str) -> Option<CmdFn> {
		self.entries.get(name)?.func
	}

	/// Mutable access to a command's user data slot.
	pub fn udata_mut(&mut self, name: &str) -> Option<&mut Option<Box<dyn Any>>> {
		self.entries.get_mut(name).map(|e| &mut e.udata)
	}

	/// Init hooks in registration-map order.
	pub fn init_hooks(&self) -> Vec<CmdInitFn> {
		self.entries.values().filter_map(|e| e.init).collect()
	}
}

/// Ephemeral per-dispatch bundle handed to command functions.
pub struct CmdContext<'a> {
	pub editor: &'a mut Editor,
	pub loop_ctx: &'a mut LoopContext,
	/// The keystroke that completed the chord.
	pub input: Key,
	/// Name of the command being executed.
	pub cmd: Arc<str>,
	/// Static parameter from the trie leaf.
	pub static_param: Option<Arc<str>>,
	/// Numeric prefixes captured during the chord, in order.
	pub numeric_params: Vec<u32>,
	/// Wildcard codepoints captured during the chord, in order.
	pub wildcard_params: Vec<char>,
	/// False when the input came from macro replay.
	pub is_user_input: bool,
}

impl CmdContext<'_> {
	/// The active view and its buffer, borrowed together.
	pub fn active_mut(&mut self) -> Result<(&mut View, &mut Buffer)> {
		let id = self.editor.active();
		self.editor.view_and_buffer_mut(id).ok_or(Error::NoSuchView(id))
	}

	/// The active edit view and its buffer (differs from the active view
	/// inside prompts).
	pub fn active_edit_mut(&mut self) -> Result<(&mut View, &mut Buffer)> {
		let id = self.editor.active_edit();
		self.editor.view_and_buffer_mut(id).ok_or(Error::NoSuchView(id))
	}

	/// First numeric parameter, defaulting to 1.
	pub fn count(&self) -> usize {
		self.numeric_params.first().map_or(1, |n| *n as usize)
	}

	pub fn static_param_str(&self) -> &str {
		self.static_param.as_deref().unwrap_or("")
	}
}

/// Registers every built-in command.
pub fn register_builtins(registry: &mut CommandRegistry) {
	let builtins: &[(&str, CmdFn)] = &[
		("insert-data", edit::insert_data),
		("delete-before", edit::delete_before),
		("delete-after", edit::delete_after),
		("delete-word-before", edit::delete_word_before),
		("delete-word-after", edit::delete_word_after),
		("cut", edit::cut),
		("copy", edit::copy),
		("uncut", edit::uncut),
		("copy-by", edit::copy_by),
		("cut-by", edit::cut_by),
		("move-left", motion::move_left),
		("move-right", motion::move_right),
		("move-up", motion::move_up),
		("move-down", motion::move_down),
		("move-bol", motion::move_bol),
		("move-eol", motion::move_eol),
		("move-beginning", motion::move_beginning),
		("move-end", motion::move_end),
		("move-page-up", motion::move_page_up),
		("move-page-down", motion::move_page_down),
		("move-to-line", motion::move_to_line),
		("move-relative", motion::move_relative),
		("move-until-forward", motion::move_until_forward),
		("move-until-back", motion::move_until_back),
		("move-word-forward", motion::move_word_forward),
		("move-word-back", motion::move_word_back),
		("search", search::search),
		("search-next", search::search_next),
		("isearch", search::isearch),
		("replace", search::replace),
		("grep", shellcmds::grep),
		("browse", shellcmds::browse),
		("shell-exec", shellcmds::shell_exec_cmd),
		("open-new", views::open_new),
		("open-file", views::open_file),
		("close", views::close),
		("quit", views::quit),
		("save", views::save),
		("save-as", views::save_as),
		("next-view", views::next_view),
		("prev-view", views::prev_view),
		("split-vertical", views::split_vertical),
		("split-horizontal", views::split_horizontal),
		("redraw", views::redraw),
		("apply-macro", views::apply_macro),
		("apply-macro-by", views::apply_macro_by),
		("prompt-submit", prompts::prompt_submit),
		("prompt-complete", prompts::prompt_complete),
		("prompt-cancel", prompts::prompt_cancel),
		("prompt-yes", prompts::prompt_yes),
		("prompt-no", prompts::prompt_no),
		("prompt-all", prompts::prompt_all),
		("menu-submit", prompts::menu_submit),
		("menu-cancel", prompts::menu_cancel),
		("prompt-menu-up", prompts::prompt_menu_up),
		("prompt-menu-down", prompts::prompt_menu_down),
		("prompt-menu-page-up", prompts::prompt_menu_page_up),
		("prompt-menu-page-down", prompts::prompt_menu_page_down),
		("prompt-isearch-next", prompts::prompt_isearch_next),
		("prompt-isearch-prev", prompts::prompt_isearch_prev),
		("prompt-isearch-drop-cursors", prompts::prompt_isearch_drop_cursors),
	];
	for (name, func) in builtins {
		registry.register(name, *func);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn noop(_: &mut CmdContext) -> Result<()> {
		Ok(())
	}

	#[test]
	fn references_resolve_late() {
		let mut registry = CommandRegistry::default();
		let name = registry.reference("later");
		assert!(registry.resolve(&name).is_none());
		registry.register("later", noop);
		assert!(registry.resolve(&name).is_some());
	}

	#[test]
	fn init_hooks_and_udata() {
		fn init(editor: &mut Editor, _is_deinit: bool) {
			editor.exit_code = 42;
		}
		let mut registry = CommandRegistry::default();
		registry.register_with_init("with-init", noop, init);
		assert_eq!(registry.init_hooks().len(), 1);

		*registry.udata_mut("with-init").unwrap() = Some(Box::new(7u32));
		let slot = registry.udata_mut("with-init").unwrap().as_mut().unwrap();
		assert_eq!(slot.downcast_ref::<u32>(), Some(&7));
	}

	#[test]
	fn builtins_cover_every_keymap_binding() {
		let mut registry = CommandRegistry::default();
		register_builtins(&mut registry);
		for cmd in [
			"insert-data",
			"copy-by",
			"move-relative",
			"prompt-submit",
			"menu-cancel",
			"apply-macro-by",
			"quit",
		] {
			assert!(registry.resolve(cmd).is_some(), "{cmd}");
		}
	}
}
