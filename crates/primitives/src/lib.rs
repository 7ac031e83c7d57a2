//! Core primitives shared across the mle crates.
//!
//! Defines the keystroke model ([`Key`], [`KeyCode`], [`Modifiers`]), the
//! key-token parser used by binding patterns and macro definitions, and
//! screen geometry ([`Rect`]).

pub mod key;
mod rect;

pub use key::parse::{KeyParseError, PatternKey, parse_key, parse_key_token, parse_pattern};
pub use key::{Key, KeyCode, Modifiers};
pub use rect::Rect;
