//! Keyboard key types with modifier support.

mod keyboard;
mod modifiers;
pub mod parse;

pub use keyboard::{Key, KeyCode};
pub use modifiers::Modifiers;
