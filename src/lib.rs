//! `lino`: an embeddable line editor operating directly on a POSIX
//! terminal in raw mode.
//!
//! The core is [`Editor`]: construct one over three file descriptors
//! and a prompt, optionally flip on multi-line mode and register
//! completion/hint callbacks, then call [`Editor::read_line`]
//! repeatedly. History is a small bounded FIFO the editor mutates as
//! the user browses with the arrow keys; persist it with
//! [`Editor::history_save`]/[`Editor::history_load`].
//!
//! Unsupported terminals (`$TERM=dumb` and friends) and non-TTY input
//! fall back automatically to a plain prompt-and-read with no editing.

pub mod buffer;
pub mod completion;
pub mod config;
pub mod edit;
pub mod error;
pub mod history;
pub mod keys;
pub mod render;
mod session;
pub mod term;

pub use completion::Completions;
pub use config::{BellStyle, EditorConfig};
pub use error::{Error, Result};
pub use history::History;
pub use render::Hint;
pub use session::{CompletionCallback, Editor, FreeHintsCallback, HintsCallback};
