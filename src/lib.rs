//! jot: a small terminal text editor.
//!
//! The crate splits into a platform-free core (document model, coordinate
//! mapping, viewport, key decoding), a POSIX terminal backend, and a
//! whole-frame renderer. The core talks to the terminal only through the
//! [`Console`] trait, so every editing behavior is testable against a
//! scripted console.

pub mod config;
pub mod core;
pub mod editor;
pub mod error;
pub mod fileio;
pub mod platform;
pub mod render;

pub use crate::config::{EditorConfig, EnvConfig};
pub use crate::core::charseq::{parse_run, Ch, CharSeq, Codepoint, MAX_CODEPOINT};
pub use crate::core::cursor::Cursor;
pub use crate::core::document::Document;
pub use crate::core::input::{ctrl, decode_key, ByteSource, Key, Utf8Assembler, BACKSPACE};
pub use crate::core::row::Row;
pub use crate::core::terminal::Console;
pub use crate::core::viewport::Viewport;
pub use crate::editor::Editor;
pub use crate::error::{Error, Result};
pub use crate::platform::terminal::RawTerminal;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
