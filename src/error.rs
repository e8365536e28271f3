//! Editor error types.
//!
//! Only two failures are ever fatal: enabling or restoring terminal raw mode.
//! File I/O errors during save are recovered locally as a status message, and
//! malformed byte sequences are dropped during decode rather than surfaced here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Raw-mode setup or restore failed. The session cannot continue.
    #[error("terminal configuration failed: {0}")]
    Terminal(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A value outside the Unicode codepoint space was handed to the encoder.
    #[error("codepoint {0:#x} is outside the Unicode range")]
    InvalidCodepoint(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
