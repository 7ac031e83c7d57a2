//! Syntax definitions configured through `-S`/`-s`.
//!
//! The core only parses, validates, and stores syntax definitions and picks
//! one per file path; rule evaluation belongs to the highlighter.

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// A single highlight rule: single-regex or start/end multiline form.
#[derive(Debug, Clone)]
pub struct SyntaxRule {
	pub re: String,
	pub re_end: Option<String>,
	pub fg: i32,
	pub bg: i32,
}

/// A named syntax with a path pattern selecting the files it applies to.
#[derive(Debug)]
pub struct Syntax {
	pub name: Arc<str>,
	pub path_pattern: Regex,
	pub rules: Vec<SyntaxRule>,
}

impl Syntax {
	pub fn new(name: &str, path_pattern: &str) -> Result<Self> {
		Ok(Self {
			name: name.into(),
			path_pattern: Regex::new(path_pattern)?,
			rules: Vec::new(),
		})
	}

	/// Parses a `name,path_pattern` definition string.
	pub fn from_def_str(def: &str) -> Result<Self> {
		let mut parts = def.splitn(2, ',');
		match (parts.next(), parts.next()) {
			(Some(name), Some(pattern)) if !name.is_empty() => Self::new(name, pattern),
			_ => Err(Error::BadDefinition {
				what: "syntax",
				input: def.to_string(),
			}),
		}
	}

	/// Adds a rule from a `start,end,fg,bg` or `regex,fg,bg` string.
	pub fn add_rule_str(&mut self, rule: &str) -> Result<()> {
		let parts: Vec<&str> = rule.split(',').collect();
		let (re, re_end, fg, bg) = match parts.as_slice() {
			[re, fg, bg] => (*re, None, *fg, *bg),
			[re, re_end, fg, bg] => (*re, Some(*re_end), *fg, *bg),
			_ => {
				return Err(Error::BadDefinition {
					what: "syntax rule",
					input: rule.to_string(),
				});
			}
		};
		// Validate the patterns up front so config errors surface at startup.
		Regex::new(re)?;
		if let Some(end) = re_end {
			Regex::new(end)?;
		}
		let parse_color = |s: &str| s.trim().parse::<i32>().unwrap_or(0);
		self.rules.push(SyntaxRule {
			re: re.to_string(),
			re_end: re_end.map(str::to_string),
			fg: parse_color(fg),
			bg: parse_color(bg),
		});
		Ok(())
	}
}

/// Registry of syntaxes, keyed by name.
#[derive(Debug, Default)]
pub struct SyntaxRegistry {
	map: FxHashMap<Arc<str>, Syntax>,
}

impl SyntaxRegistry {
	pub fn insert(&mut self, syntax: Syntax) {
		self.map.insert(syntax.name.clone(), syntax);
	}

	pub fn get(&self, name: &str) -> Option<&Syntax> {
		self.map.get(name)
	}

	pub fn get_mut(&mut self, name: &str) -> Option<&mut Syntax> {
		self.map.get_mut(name)
	}

	/// Picks the syntax for a path: the override if set, else the first
	/// syntax whose path pattern matches.
	pub fn for_path(&self, path: &Path, override_name: Option<&str>) -> Option<&Syntax> {
		if let Some(name) = override_name {
			return self.map.get(name);
		}
		let path = path.to_string_lossy();
		self.map.values().find(|s| s.path_pattern.is_match(&path))
	}
}
