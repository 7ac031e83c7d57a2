//! Editor core for mle.
//!
//! Owns the editor state (buffers, views, keymap/command/macro/syntax
//! registries), the reentrant event loop with chord dispatch, the
//! prompt/menu controller, and the async subprocess multiplexer. The
//! terminal frontend lives in the `mle` binary crate.

pub mod async_proc;
pub mod buffer;
pub mod commands;
mod draw;
pub mod editor;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod keymaps;
pub mod macros;
pub mod prompt;
pub mod signals;
pub mod syntax;
pub mod view;

pub use editor::{Editor, LinenumType, Options};
pub use error::{Error, Result};
pub use event_loop::{LoopContext, run_loop};
pub use prompt::{PromptAnswer, PromptParams};
pub use view::{View, ViewId, ViewKind};
