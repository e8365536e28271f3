//! Terminal interface consumed by the editor loop.

use std::io;

use crate::core::input::ByteSource;
use crate::error::Result;

/// What the session needs from a terminal: timed byte reads (via
/// [`ByteSource`]), whole-frame writes, dimensions, and resize observation.
///
/// The process-backed implementation lives in `platform`; tests drive the
/// editor with a scripted implementation instead.
pub trait Console: ByteSource {
    /// Write one composed frame (or control sequence) to the output.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Current (rows, cols) of the backing window.
    fn size(&mut self) -> Result<(usize, usize)>;

    /// True once after the window size changed; observing it clears it.
    fn take_resize(&mut self) -> bool;
}
