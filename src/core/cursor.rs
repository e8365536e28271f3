//! Cursor state.

/// Logical cursor position plus its derived rendered column.
///
/// `cx`/`cy` index codepoints and rows; `rx` is recomputed from `cx` and the
/// current line content once per frame, never stored independently of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub cx: usize,
    pub cy: usize,
    pub rx: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }
}
