//! Built-in keymaps.

use mle_keymap::{Keymap, KeymapRegistry};

fn keymap(
	name: &str,
	default_cmd: Option<&str>,
	allow_fallthru: bool,
	bindings: &[(&str, &str, Option<&str>)],
) -> Keymap {
	let mut map = Keymap::new(name, default_cmd, allow_fallthru);
	for (cmd, pattern, static_param) in bindings {
		map.bind(cmd, pattern, *static_param).expect("valid builtin binding");
	}
	map
}

/// Installs the built-in keymaps into `registry`.
pub fn install_builtin_keymaps(registry: &mut KeymapRegistry) {
	registry.insert(keymap(
		"mle_normal",
		Some("insert-data"),
		false,
		&[
			("delete-before", "backspace", None),
			("delete-after", "delete", None),
			("move-bol", "C-a", None),
			("move-bol", "home", None),
			("move-eol", "C-e", None),
			("move-eol", "end", None),
			("move-beginning", "M-\\", None),
			("move-end", "M-/", None),
			("move-left", "left", None),
			("move-right", "right", None),
			("move-up", "up", None),
			("move-down", "down", None),
			("move-page-up", "page-up", None),
			("move-page-down", "page-down", None),
			("move-to-line", "M-g", None),
			("move-relative", "M-y ## u", Some("up")),
			("move-relative", "M-y ## d", Some("down")),
			("move-until-forward", "M-' **", None),
			("move-until-back", "M-; **", None),
			("move-word-forward", "M-f", None),
			("move-word-back", "M-b", None),
			("search", "C-f", None),
			("search-next", "C-g", None),
			("search-next", "f3", None),
			("isearch", "C-r", None),
			("replace", "C-t", None),
			("cut", "C-k", None),
			("copy", "M-k", None),
			("uncut", "C-u", None),
			("redraw", "C-l", None),
			("copy-by", "C-c d", Some("bracket")),
			("copy-by", "C-c w", Some("word")),
			("copy-by", "C-c s", Some("word-back")),
			("copy-by", "C-c f", Some("word-forward")),
			("copy-by", "C-c a", Some("bol")),
			("copy-by", "C-c e", Some("eol")),
			("cut-by", "C-d d", Some("bracket")),
			("cut-by", "C-d w", Some("word")),
			("cut-by", "C-d s", Some("word-back")),
			("cut-by", "C-d f", Some("word-forward")),
			("cut-by", "C-d a", Some("bol")),
			("cut-by", "C-d e", Some("eol")),
			("delete-word-before", "M-w", None),
			("delete-word-after", "M-d", None),
			("apply-macro", "M-j", None),
			("apply-macro-by", "M-m **", None),
			("next-view", "M-n", None),
			("prev-view", "M-p", None),
			("split-vertical", "M-v", None),
			("split-vertical", "M-=", None),
			("split-horizontal", "M-h", None),
			("split-horizontal", "M--", None),
			("grep", "C-q", None),
			("browse", "C-b", None),
			("save", "C-s", None),
			("save-as", "M-s", None),
			("open-new", "C-n", None),
			("open-file", "C-o", None),
			("shell-exec", "M-e", None),
			("close", "M-c", None),
			("quit", "C-x", None),
		],
	));

	registry.insert(keymap(
		"mle_prompt_input",
		None,
		true,
		&[
			("prompt-submit", "enter", None),
			("prompt-complete", "tab", None),
			("prompt-cancel", "C-c", None),
			("prompt-cancel", "C-x", None),
			("prompt-cancel", "M-c", None),
		],
	));

	registry.insert(keymap(
		"mle_prompt_yn",
		None,
		false,
		&[
			("prompt-yes", "y", None),
			("prompt-no", "n", None),
			("prompt-cancel", "C-c", None),
			("prompt-cancel", "C-x", None),
			("prompt-cancel", "M-c", None),
		],
	));

	registry.insert(keymap(
		"mle_prompt_yna",
		None,
		false,
		&[
			("prompt-yes", "y", None),
			("prompt-no", "n", None),
			("prompt-all", "a", None),
			("prompt-cancel", "C-c", None),
			("prompt-cancel", "C-x", None),
			("prompt-cancel", "M-c", None),
		],
	));

	registry.insert(keymap("mle_prompt_ok", Some("prompt-cancel"), false, &[]));

	registry.insert(keymap(
		"mle_menu",
		None,
		true,
		&[("menu-submit", "enter", None), ("menu-cancel", "C-c", None)],
	));

	registry.insert(keymap(
		"mle_prompt_menu",
		None,
		true,
		&[
			("prompt-submit", "enter", None),
			("prompt-menu-up", "up", None),
			("prompt-menu-down", "down", None),
			("prompt-menu-up", "left", None),
			("prompt-menu-down", "right", None),
			("prompt-menu-page-up", "page-up", None),
			("prompt-menu-page-down", "page-down", None),
			("prompt-cancel", "C-c", None),
			("prompt-cancel", "C-x", None),
			("prompt-cancel", "M-c", None),
		],
	));

	registry.insert(keymap(
		"mle_prompt_isearch",
		None,
		true,
		&[
			("prompt-isearch-prev", "up", None),
			("prompt-isearch-next", "down", None),
			("prompt-isearch-drop-cursors", "C-/", None),
			("prompt-cancel", "enter", None),
			("prompt-cancel", "C-c", None),
			("prompt-cancel", "C-x", None),
			("prompt-cancel", "M-c", None),
		],
	));
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtin_keymaps_install() {
		let mut registry = KeymapRegistry::new();
		install_builtin_keymaps(&mut registry);
		for name in [
			"mle_normal",
			"mle_prompt_input",
			"mle_prompt_yn",
			"mle_prompt_yna",
			"mle_prompt_ok",
			"mle_menu",
			"mle_prompt_menu",
			"mle_prompt_isearch",
		] {
			assert!(registry.contains(name), "{name}");
		}
		assert_eq!(
			registry.get("mle_normal").unwrap().default_cmd().map(|c| &**c),
			Some("insert-data")
		);
		assert!(registry.get("mle_prompt_input").unwrap().allow_fallthru());
		assert!(!registry.get("mle_prompt_yn").unwrap().allow_fallthru());
	}
}
