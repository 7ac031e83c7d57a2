//! Editor state: buffers, views, registries, and lifecycle.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use mle_keymap::{Keymap, KeymapRegistry};
use mle_primitives::{Key, Rect, parse_key};
use rustc_hash::FxHashMap;
use termina::escape::csi::{Csi, DecPrivateMode, DecPrivateModeCode, Mode};
use termina::{PlatformTerminal, Terminal as _};
use tracing::{debug, error, info, warn};

use crate::async_proc::AsyncProc;
use crate::buffer::{Buffer, BufferId};
use crate::commands::{self, CommandRegistry};
use crate::error::{Error, Result};
use crate::input::InputSource;
use crate::macros::{Macro, MacroReplay};
use crate::syntax::{Syntax, SyntaxRegistry};
use crate::view::{SplitDir, View, ViewId, ViewKind};

/// Line-number gutter style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinenumType {
	#[default]
	Absolute,
	Relative,
	Both,
}

impl LinenumType {
	pub fn from_flag(flag: i32) -> Self {
		match flag {
			1 => Self::Relative,
			2 => Self::Both,
			_ => Self::Absolute,
		}
	}
}

/// Tunables settable from the CLI and RC files.
#[derive(Debug, Clone)]
pub struct Options {
	pub tab_width: usize,
	pub tab_to_space: bool,
	pub trim_paste: bool,
	pub highlight_bracket_pairs: bool,
	pub color_col: Option<u16>,
	pub linenum_type: LinenumType,
	/// Shell used for async procs and `shell-exec`.
	pub shell: String,
	/// Shell used for filename completion (the completion command is a bash
	/// builtin by default).
	pub completion_shell: String,
	/// Command producing completion candidates; the escaped stem is appended.
	pub completion_cmd: String,
	pub syntax_override: Option<String>,
	/// Keymap pushed onto every new view's stack.
	pub kmap_init: String,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			tab_width: 4,
			tab_to_space: true,
			trim_paste: false,
			highlight_bracket_pairs: false,
			color_col: None,
			linenum_type: LinenumType::Absolute,
			shell: "sh".to_string(),
			completion_shell: "bash".to_string(),
			completion_cmd: "compgen -f".to_string(),
			syntax_override: None,
			kmap_init: DEFAULT_KMAP.to_string(),
		}
	}
}

/// Default keymap pushed onto new views.
pub const DEFAULT_KMAP: &str = "mle_normal";
/// Default macro record/replay toggle key.
pub const DEFAULT_MACRO_TOGGLE_KEY: &str = "M-r";
/// Timeout for async procs backing menus.
pub const MENU_PROC_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for synchronous shell-exec commands.
pub const SHELL_EXEC_TIMEOUT: Duration = Duration::from_secs(10);

/// The editor: owns every registry and all buffer/view state. All mutation
/// happens on the main loop; the tokio runtime only ferries subprocess
/// bytes into channels drained there.
pub struct Editor {
	pub(crate) buffers: FxHashMap<BufferId, Buffer>,
	pub(crate) views: FxHashMap<ViewId, View>,
	/// View ring, most recently opened first. The active view is always a
	/// member.
	pub(crate) all_views: Vec<ViewId>,
	/// Top-level (non-split-child) views, open order.
	pub(crate) top_views: Vec<ViewId>,
	next_buffer_id: u32,
	next_view_id: u32,
	next_proc_id: u32,

	active: ViewId,
	active_edit: ViewId,
	pub(crate) status: ViewId,
	pub(crate) prompt: Option<ViewId>,

	pub keymaps: KeymapRegistry,
	pub commands: CommandRegistry,
	pub(crate) macros: FxHashMap<Arc<str>, Macro>,
	pub(crate) macro_record: Option<Macro>,
	pub(crate) macro_replay: Option<MacroReplay>,
	pub macro_toggle_key: Key,
	pub syntaxes: SyntaxRegistry,
	pub(crate) async_procs: Vec<AsyncProc>,

	pub(crate) input: InputSource,
	pub(crate) term: Option<PlatformTerminal>,
	runtime: tokio::runtime::Runtime,

	pub options: Options,
	pub(crate) w: u16,
	pub(crate) h: u16,
	pub(crate) rect_edit: Rect,
	pub(crate) rect_status: Rect,
	pub(crate) rect_prompt: Rect,

	pub(crate) loop_depth: u32,
	/// Rendering of the chord in flight, for the status bar.
	pub(crate) pending_chord: String,
	pub(crate) paste_register: String,
	pub(crate) last_search: Option<String>,
	pub(crate) status_msg: Option<String>,
	pub exit_code: i32,
	pub startup_linenum: Option<usize>,
	pub startup_script: Option<String>,
}

impl Editor {
	/// Creates a headless editor with built-in keymaps, commands, and
	/// syntaxes, one blank edit view, and an empty scripted input source.
	pub fn new() -> Self {
		let runtime = tokio::runtime::Builder::new_multi_thread()
			.worker_threads(2)
			.enable_all()
			.build()
			.expect("tokio runtime");

		let mut commands = CommandRegistry::default();
		commands::register_builtins(&mut commands);

		let mut editor = Self {
			buffers: FxHashMap::default(),
			views: FxHashMap::default(),
			all_views: Vec::new(),
			top_views: Vec::new(),
			next_buffer_id: 0,
			next_view_id: 0,
			next_proc_id: 0,
			active: ViewId(u32::MAX),
			active_edit: ViewId(u32::MAX),
			status: ViewId(u32::MAX),
			prompt: None,
			keymaps: KeymapRegistry::new(),
			commands,
			macros: FxHashMap::default(),
			macro_record: None,
			macro_replay: None,
			macro_toggle_key: parse_key(DEFAULT_MACRO_TOGGLE_KEY).expect("default toggle key"),
			syntaxes: SyntaxRegistry::default(),
			async_procs: Vec::new(),
			input: InputSource::scripted([]),
			term: None,
			runtime,
			options: Options::default(),
			w: 80,
			h: 24,
			rect_edit: Rect::default(),
			rect_status: Rect::default(),
			rect_prompt: Rect::default(),
			loop_depth: 0,
			pending_chord: String::new(),
			paste_register: String::new(),
			last_search: None,
			status_msg: None,
			exit_code: 0,
			startup_linenum: None,
			startup_script: None,
		};

		crate::keymaps::install_builtin_keymaps(&mut editor.keymaps);
		editor.install_builtin_syntax();

		// Status bar lives outside the view ring.
		let status_buffer = editor.alloc_buffer(Buffer::new());
		let status = editor.alloc_view_id();
		editor.views.insert(status, View::new(status, ViewKind::Status, status_buffer));
		editor.status = status;

		editor.resize(editor.w, editor.h);
		let initial = editor
			.open_view(ViewKind::Edit, None, true, None)
			.expect("initial view");
		editor.active = initial;
		editor.active_edit = initial;
		editor
	}

	fn install_builtin_syntax(&mut self) {
		// A generic catch-all, in the spirit of the built-in definition the
		// editor ships with; rules are data for the highlighter collaborator.
		if let Ok(mut syntax) = Syntax::new(
			"syn_generic",
			"\\.(c|cpp|h|hpp|php|py|rb|sh|pl|go|rs|js|java|lua)$",
		) {
			let _ = syntax.add_rule_str("\\b[A-Z_][A-Z0-9_]*\\b,1,0");
			let _ = syntax.add_rule_str("\\b(-?(0x)?[0-9]+|true|false|null)\\b,4,0");
			let _ = syntax.add_rule_str("\"(\\\\\"|[^\"])*?\",3,0");
			let _ = syntax.add_rule_str("/\\*,\\*/,6,0");
			let _ = syntax.add_rule_str("\\s+$,0,2");
			self.syntaxes.insert(syntax);
		}
	}

	// ---- id allocation ----

	pub(crate) fn alloc_buffer(&mut self, buffer: Buffer) -> BufferId {
		let id = BufferId(self.next_buffer_id);
		self.next_buffer_id += 1;
		self.buffers.insert(id, buffer);
		id
	}

	fn alloc_view_id(&mut self) -> ViewId {
		let id = ViewId(self.next_view_id);
		self.next_view_id += 1;
		id
	}

	pub(crate) fn next_proc_id(&mut self) -> crate::async_proc::ProcId {
		let id = crate::async_proc::ProcId(self.next_proc_id);
		self.next_proc_id += 1;
		id
	}

	// ---- accessors ----

	pub fn runtime(&self) -> &tokio::runtime::Runtime {
		&self.runtime
	}

	pub fn active(&self) -> ViewId {
		self.active
	}

	pub fn active_edit(&self) -> ViewId {
		self.active_edit
	}

	pub fn prompt_view(&self) -> Option<ViewId> {
		self.prompt
	}

	pub fn loop_depth(&self) -> u32 {
		self.loop_depth
	}

	pub fn view(&self, id: ViewId) -> Result<&View> {
		self.views.get(&id).ok_or(Error::NoSuchView(id))
	}

	pub fn view_mut(&mut self, id: ViewId) -> Result<&mut View> {
		self.views.get_mut(&id).ok_or(Error::NoSuchView(id))
	}

	pub fn view_exists(&self, id: ViewId) -> bool {
		self.views.contains_key(&id)
	}

	pub fn buffer(&self, id: BufferId) -> Option<&Buffer> {
		self.buffers.get(&id)
	}

	pub fn buffer_mut(&mut self, id: BufferId) -> Option<&mut Buffer> {
		self.buffers.get_mut(&id)
	}

	/// Splits borrows so a view and its buffer can be mutated together.
	pub fn view_and_buffer_mut(&mut self, id: ViewId) -> Option<(&mut View, &mut Buffer)> {
		let Self { views, buffers, .. } = self;
		let view = views.get_mut(&id)?;
		let buffer = buffers.get_mut(&view.buffer)?;
		Some((view, buffer))
	}

	pub fn view_buffer(&self, id: ViewId) -> Option<&Buffer> {
		self.buffers.get(&self.views.get(&id)?.buffer)
	}

	/// Number of open EDIT views.
	pub fn edit_count(&self) -> usize {
		self.all_views.iter().filter(|id| self.views[id].is_edit()).count()
	}

	/// Number of views displaying `buffer`.
	pub fn views_of_buffer(&self, buffer: BufferId) -> usize {
		self.views.values().filter(|v| v.buffer == buffer && v.id != self.status).count()
	}

	pub fn set_status(&mut self, msg: impl Into<String>) {
		let msg = msg.into();
		debug!(%msg, "status");
		self.status_msg = Some(msg);
	}

	pub fn take_status(&mut self) -> Option<String> {
		self.status_msg.take()
	}

	/// Root of the split chain containing `id`.
	pub fn split_root(&self, mut id: ViewId) -> ViewId {
		while let Some(parent) = self.views.get(&id).and_then(|v| v.split_parent) {
			id = parent;
		}
		id
	}

	// ---- view lifecycle ----

	/// Opens a top-level view. Directory paths open into the file browser
	/// instead; the returned id is then the browser menu's view.
	pub fn open_view(
		&mut self,
		kind: ViewKind,
		path: Option<&Path>,
		make_active: bool,
		linenum: Option<usize>,
	) -> Result<ViewId> {
		if let Some(dir) = path.filter(|p| p.is_dir()) {
			return self.browse_dir(&dir.to_string_lossy());
		}

		let buffer = match path {
			Some(p) => Buffer::from_path(p)?,
			None => Buffer::new(),
		};
		let buffer = self.alloc_buffer(buffer);
		let id = self.alloc_view_id();
		let mut view = View::new(id, kind, buffer);
		view.push_kmap(&self.options.kmap_init);
		view.rect = match kind {
			ViewKind::Prompt => self.rect_prompt,
			_ => self.rect_edit,
		};
		self.views.insert(id, view);
		self.all_views.insert(0, id);
		self.top_views.push(id);

		if make_active {
			self.set_active(id)?;
		}
		if let Some(line) = linenum {
			let (view, buffer) = self.view_and_buffer_mut(id).expect("just inserted");
			view.cursor_mut().pos = buffer.pos_at(line, 0);
			view.center_viewport(line);
		}
		Ok(id)
	}

	/// Opens a split child sharing the parent's buffer. Chained splits
	/// attach below the deepest existing child.
	pub fn open_split(&mut self, parent: ViewId, dir: SplitDir) -> Result<ViewId> {
		let mut parent = parent;
		while let Some(child) = self.view(parent)?.split_child {
			parent = child;
		}
		let (buffer, cursor) = {
			let view = self.view(parent)?;
			(view.buffer, view.cursor())
		};
		let id = self.alloc_view_id();
		let mut view = View::new(id, ViewKind::Edit, buffer);
		view.push_kmap(&self.options.kmap_init);
		view.cursors = vec![cursor];
		view.split_parent = Some(parent);
		self.views.insert(id, view);
		self.all_views.insert(0, id);

		let parent_view = self.view_mut(parent)?;
		parent_view.split_child = Some(id);
		parent_view.split_dir = Some(dir);

		self.set_active(id)?;
		self.resize(self.w, self.h);
		Ok(id)
	}

	/// Sets the active view. Fails for unknown views and while a prompt is
	/// open (the prompt cannot be abandoned).
	pub fn set_active(&mut self, id: ViewId) -> Result<()> {
		if !self.views.contains_key(&id) {
			return Err(Error::NoSuchView(id));
		}
		if let Some(prompt) = self.prompt
			&& prompt != id
		{
			return Err(Error::PromptOpen);
		}
		self.active = id;
		if self.views[&id].is_edit() {
			self.active_edit = id;
		}
		let (view, buffer) = self.view_and_buffer_mut(id).expect("checked above");
		let (line, _) = buffer.line_col(view.cursor().pos);
		view.rectify_viewport(line);
		Ok(())
	}

	/// Closes a view (split children first) and reactivates a neighbor,
	/// opening a fresh blank view when the last EDIT view closes. Always
	/// triggers a full resize.
	pub fn close_view(&mut self, id: ViewId) -> Result<()> {
		self.close_view_inner(id)?;
		self.resize(self.w, self.h);
		Ok(())
	}

	fn close_view_inner(&mut self, id: ViewId) -> Result<()> {
		if !self.views.contains_key(&id) {
			return Err(Error::NoSuchView(id));
		}
		if let Some(child) = self.views[&id].split_child {
			self.close_view_inner(child)?;
		}
		if self.prompt == Some(id) {
			self.prompt = None;
		}
		if let Some(proc) = self.views[&id].async_proc {
			self.cancel_async_proc(proc);
		}

		if let Some(parent) = self.views[&id].split_parent {
			let parent_view = self.views.get_mut(&parent).expect("split parent exists");
			parent_view.split_child = None;
			parent_view.split_dir = None;
			self.set_active(parent)?;
		} else {
			match self.nearest_edit_neighbor(id) {
				Some(neighbor) => self.set_active(neighbor)?,
				None => {
					self.open_view(ViewKind::Edit, None, true, None)?;
				}
			}
			self.top_views.retain(|v| *v != id);
		}

		self.all_views.retain(|v| *v != id);
		let buffer = self.views[&id].buffer;
		self.views.remove(&id);
		if self.views_of_buffer(buffer) == 0 {
			self.buffers.remove(&buffer);
		}
		Ok(())
	}

	/// Nearest EDIT view around `from` in the ring, scanning previous
	/// entries first.
	fn nearest_edit_neighbor(&self, from: ViewId) -> Option<ViewId> {
		let idx = self.all_views.iter().position(|v| *v == from)?;
		let len = self.all_views.len();
		for step in 1..len {
			let prev = self.all_views[(idx + len - step) % len];
			let next = self.all_views[(idx + step) % len];
			for candidate in [prev, next] {
				if candidate != from && self.views[&candidate].is_edit() {
					return Some(candidate);
				}
			}
		}
		None
	}

	/// Next or previous EDIT view in the ring, for view cycling.
	pub fn cycle_edit_view(&self, from: ViewId, forward: bool) -> Option<ViewId> {
		let idx = self.all_views.iter().position(|v| *v == from)?;
		let len = self.all_views.len();
		for step in 1..len {
			let i = if forward { (idx + step) % len } else { (idx + len - step) % len };
			let candidate = self.all_views[i];
			if candidate != from && self.views[&candidate].is_edit() {
				return Some(candidate);
			}
		}
		None
	}

	// ---- geometry ----

	/// Recomputes the screen layout. Idempotent for identical dimensions.
	pub fn resize(&mut self, w: u16, h: u16) {
		self.w = w;
		self.h = h;
		self.rect_edit = Rect::new(0, 0, w, h.saturating_sub(2));
		self.rect_status = Rect::new(0, h.saturating_sub(2), w, 1);
		self.rect_prompt = Rect::new(0, h.saturating_sub(1), w, 1);

		if let Some(status) = self.views.get_mut(&self.status) {
			status.rect = self.rect_status;
		}
		for id in self.top_views.clone() {
			let rect = match self.views[&id].kind {
				ViewKind::Prompt => self.rect_prompt,
				_ => self.rect_edit,
			};
			self.layout_split_chain(id, rect);
		}
	}

	/// Assigns rectangles down a split chain, halving along each split.
	fn layout_split_chain(&mut self, id: ViewId, rect: Rect) {
		let Some(view) = self.views.get_mut(&id) else {
			return;
		};
		match (view.split_child, view.split_dir) {
			(Some(child), Some(SplitDir::Vertical)) => {
				let left = Rect::new(rect.x, rect.y, rect.w / 2, rect.h);
				let right = Rect::new(rect.x + rect.w / 2, rect.y, rect.w - rect.w / 2, rect.h);
				view.rect = left;
				self.layout_split_chain(child, right);
			}
			(Some(child), Some(SplitDir::Horizontal)) => {
				let top = Rect::new(rect.x, rect.y, rect.w, rect.h / 2);
				let bottom = Rect::new(rect.x, rect.y + rect.h / 2, rect.w, rect.h - rect.h / 2);
				view.rect = top;
				self.layout_split_chain(child, bottom);
			}
			_ => view.rect = rect,
		}
	}

	// ---- terminal attachment ----

	/// Attaches a real terminal, replacing the scripted input source.
	pub fn attach_terminal(&mut self, term: PlatformTerminal) -> Result<()> {
		let reader = term.event_reader();
		let size = term.get_dimensions()?;
		self.input = InputSource::tty(reader);
		self.term = Some(term);
		self.resize(size.cols, size.rows);
		Ok(())
	}

	/// Restores the terminal to cooked mode; used on exit and in the
	/// fatal-signal path.
	pub fn teardown_terminal(&mut self) {
		if let Some(mut term) = self.term.take() {
			use std::io::Write;
			let _ = write!(
				term,
				"{}{}",
				Csi::Mode(Mode::SetDecPrivateMode(DecPrivateMode::Code(DecPrivateModeCode::ShowCursor))),
				Csi::Mode(Mode::ResetDecPrivateMode(DecPrivateMode::Code(
					DecPrivateModeCode::ClearAndEnableAlternateScreen
				))),
			);
			let _ = term.flush();
			let _ = term.enter_cooked_mode();
		}
	}

	// ---- startup & shutdown ----

	/// Runs startup actions before any user input is processed.
	pub fn startup(&mut self) {
		if let Some(line) = self.startup_linenum.take() {
			let active_edit = self.active_edit;
			if let Some((view, buffer)) = self.view_and_buffer_mut(active_edit) {
				view.cursor_mut().pos = buffer.pos_at(line, 0);
				view.center_viewport(line);
			}
		}
		if let Some(script) = self.startup_script.take() {
			let shell = self.options.shell.clone();
			let cmd = format!(". {}", crate::async_proc::shell_escape(&script));
			match self.shell_exec(&cmd, &shell, SHELL_EXEC_TIMEOUT, None) {
				Ok(output) => info!(%script, output = %String::from_utf8_lossy(&output), "user script ran"),
				Err(err) => {
					warn!(%script, %err, "user script failed");
					self.exit_code = 1;
				}
			}
		}
	}

	/// Writes `mle.bak.<pid>.<n>` files under `dir` for every unsaved buffer
	/// shown in an EDIT view. Prompt and status buffers have no file and are
	/// skipped. Returns how many backups were written.
	pub fn write_crash_backups(&self, dir: &Path) -> usize {
		let pid = std::process::id();
		let mut written = 0;
		let mut seen: Vec<BufferId> = Vec::new();
		for id in &self.all_views {
			let view = &self.views[id];
			if !view.is_edit() || seen.contains(&view.buffer) {
				continue;
			}
			seen.push(view.buffer);
			let buffer = &self.buffers[&view.buffer];
			if !buffer.is_unsaved() {
				continue;
			}
			let path = dir.join(format!("mle.bak.{pid}.{written}"));
			match buffer.write_to(&path) {
				Ok(()) => written += 1,
				Err(err) => error!(path = %path.display(), %err, "failed to write crash backup"),
			}
		}
		written
	}

	/// Fatal-signal path: restore the terminal, back up unsaved buffers in
	/// the working directory, and exit with code 1.
	pub fn graceful_exit(&mut self, signum: i32) -> ! {
		error!(signum, "shutting down on signal");
		self.teardown_terminal();
		self.write_crash_backups(Path::new("."));
		std::process::exit(1);
	}

	// ---- macro registry ----

	/// Appends a keystroke to the in-progress recording, if any.
	pub(crate) fn record_macro_input(&mut self, key: Key) {
		if let Some(recording) = &mut self.macro_record {
			recording.inputs.push(key);
		}
	}

	pub fn is_recording_macro(&self) -> bool {
		self.macro_record.is_some()
	}

	pub fn is_replaying_macro(&self) -> bool {
		self.macro_replay.is_some()
	}

	pub fn get_macro(&self, name: &str) -> Option<&Macro> {
		self.macros.get(name)
	}

	pub fn register_macro(&mut self, mac: Macro) {
		self.macros.insert(mac.name.clone(), mac);
	}

	/// Begins replaying a registered macro on the next input acquisition.
	pub fn replay_macro(&mut self, name: &str) -> bool {
		match self.macros.get(name) {
			Some(mac) => {
				self.macro_replay = Some(MacroReplay::new(mac.inputs.clone()));
				true
			}
			None => false,
		}
	}

	// ---- config strings (CLI / RC) ----

	/// Defines a keymap from `name,default_cmd,allow_fallthru` (or the
	/// two-field `name,allow_fallthru` form) and registers it.
	pub fn define_kmap_from_str(&mut self, def: &str) -> Result<String> {
		let parts: Vec<&str> = def.split(',').collect();
		let (name, default_cmd, fallthru) = match parts.as_slice() {
			[name, default_cmd, fallthru] if !name.is_empty() => (*name, Some(*default_cmd), *fallthru),
			[name, fallthru] if !name.is_empty() => (*name, None, *fallthru),
			_ => {
				return Err(Error::BadDefinition {
					what: "keymap",
					input: def.to_string(),
				});
			}
		};
		let allow_fallthru = fallthru.trim() == "1";
		if let Some(cmd) = default_cmd {
			self.commands.reference(cmd);
		}
		self.keymaps.insert(Keymap::new(name, default_cmd, allow_fallthru));
		Ok(name.to_string())
	}

	/// Adds a binding from `cmd,key_pattern[,static_param]` to a keymap.
	pub fn add_binding_from_str(&mut self, kmap: &str, def: &str) -> Result<()> {
		let mut parts = def.splitn(3, ',');
		let (Some(cmd), Some(pattern)) = (parts.next(), parts.next()) else {
			return Err(Error::BadDefinition {
				what: "binding",
				input: def.to_string(),
			});
		};
		let static_param = parts.next();
		self.commands.reference(cmd);
		let keymap = self.keymaps.get_mut(kmap).ok_or_else(|| Error::BadDefinition {
			what: "keymap name",
			input: kmap.to_string(),
		})?;
		keymap.bind(cmd, pattern, static_param)?;
		Ok(())
	}

	/// Registers a macro from a `name,key1,…` definition.
	pub fn add_macro_from_str(&mut self, def: &str) -> Result<()> {
		let mac = Macro::parse_def(def)?;
		self.register_macro(mac);
		Ok(())
	}

	/// Sets the macro toggle key from a key token.
	pub fn set_macro_toggle_key(&mut self, token: &str) -> Result<()> {
		self.macro_toggle_key = parse_key(token)?;
		Ok(())
	}
}

impl Default for Editor {
	fn default() -> Self {
		Self::new()
	}
}

/// Test constructors.
impl Editor {
	/// An editor with a scripted input source preloaded with `keys`.
	pub fn with_script<I: IntoIterator<Item = Key>>(keys: I) -> Self {
		let mut editor = Self::new();
		editor.input.push_keys(keys);
		editor
	}

	/// Appends separately-typed keys to the scripted input source.
	pub fn push_script_keys<I: IntoIterator<Item = Key>>(&mut self, keys: I) {
		self.input.push_keys(keys);
	}

	/// Appends a burst of simultaneously-ready keys, as a terminal paste
	/// would deliver them.
	pub fn push_script_burst<I: IntoIterator<Item = Key>>(&mut self, keys: I) {
		self.input.push_burst(keys);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_editor_has_one_edit_view_and_a_status_bar() {
		let editor = Editor::new();
		assert_eq!(editor.edit_count(), 1);
		assert!(editor.views[&editor.active()].is_edit());
		assert!(editor.all_views.contains(&editor.active()));
		assert!(!editor.all_views.contains(&editor.status));
	}

	#[test]
	fn resize_is_idempotent() {
		let mut editor = Editor::new();
		editor.resize(100, 40);
		let first: Vec<_> = editor.all_views.iter().map(|v| editor.views[v].rect).collect();
		let edit = editor.rect_edit;
		editor.resize(100, 40);
		let second: Vec<_> = editor.all_views.iter().map(|v| editor.views[v].rect).collect();
		assert_eq!(first, second);
		assert_eq!(edit, editor.rect_edit);
		assert_eq!(editor.rect_status, Rect::new(0, 38, 100, 1));
		assert_eq!(editor.rect_prompt, Rect::new(0, 39, 100, 1));
	}

	#[test]
	fn closing_last_edit_view_opens_a_fresh_one() {
		let mut editor = Editor::new();
		let only = editor.active();
		editor.close_view(only).unwrap();
		assert_eq!(editor.edit_count(), 1);
		assert_ne!(editor.active(), only);
		assert!(editor.views[&editor.active()].is_edit());
	}

	#[test]
	fn closing_a_view_activates_a_ring_neighbor() {
		let mut editor = Editor::new();
		let first = editor.active();
		let second = editor.open_view(ViewKind::Edit, None, true, None).unwrap();
		editor.close_view(second).unwrap();
		assert_eq!(editor.active(), first);
		assert!(!editor.view_exists(second));
	}

	#[test]
	fn split_shares_buffer_and_close_returns_to_parent() {
		let mut editor = Editor::new();
		let parent = editor.active();
		let child = editor.open_split(parent, SplitDir::Vertical).unwrap();
		assert_eq!(editor.views[&child].buffer, editor.views[&parent].buffer);
		assert_eq!(editor.active(), child);

		editor.close_view(child).unwrap();
		assert_eq!(editor.active(), parent);
		assert!(editor.views[&parent].split_child.is_none());
		// Shared buffer must survive the child closing.
		assert!(editor.buffers.contains_key(&editor.views[&parent].buffer));
	}

	#[test]
	fn closing_a_parent_closes_its_split_child() {
		let mut editor = Editor::new();
		let parent = editor.active();
		let child = editor.open_split(parent, SplitDir::Horizontal).unwrap();
		editor.close_view(parent).unwrap();
		assert!(!editor.view_exists(parent));
		assert!(!editor.view_exists(child));
		assert_eq!(editor.edit_count(), 1);
	}

	#[test]
	fn split_layout_halves_the_edit_rect() {
		let mut editor = Editor::new();
		editor.resize(80, 26);
		let parent = editor.active();
		let child = editor.open_split(parent, SplitDir::Vertical).unwrap();
		let parent_rect = editor.views[&parent].rect;
		let child_rect = editor.views[&child].rect;
		assert_eq!(parent_rect.w + child_rect.w, 80);
		assert_eq!(parent_rect.h, 24);
		assert_eq!(child_rect.x, parent_rect.w);
	}

	#[test]
	fn crash_backups_cover_unsaved_edit_buffers_only() {
		let mut editor = Editor::new();
		let active = editor.active();
		let buffer = editor.views[&active].buffer;
		editor.buffer_mut(buffer).unwrap().insert(0, "unsaved text");

		let dir = tempfile::tempdir().unwrap();
		let written = editor.write_crash_backups(dir.path());
		assert_eq!(written, 1);
		let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
		assert_eq!(entries.len(), 1);
		let name = entries[0].as_ref().unwrap().file_name();
		let name = name.to_string_lossy();
		assert!(name.starts_with(&format!("mle.bak.{}.", std::process::id())), "{name}");
	}

	#[test]
	fn kmap_definition_strings() {
		let mut editor = Editor::new();
		let name = editor.define_kmap_from_str("custom,insert-data,1").unwrap();
		assert_eq!(name, "custom");
		assert!(editor.keymaps.get("custom").unwrap().allow_fallthru());
		editor.add_binding_from_str("custom", "cut,C-k").unwrap();
		editor.add_binding_from_str("custom", "copy-by,C-c d,bracket").unwrap();
		assert!(editor.add_binding_from_str("missing", "cut,C-k").is_err());
		assert!(editor.define_kmap_from_str("oops").is_err());
	}
}
