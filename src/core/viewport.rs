//! Viewport scrolling.
//!
//! Not a state machine, just a clamp applied once per frame before drawing:
//! after `scroll` the cursor's rendered position lies inside the visible
//! rectangle and the offsets are never negative.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub row_offset: usize,
    pub col_offset: usize,
    pub screen_rows: usize,
    pub screen_cols: usize,
}

impl Viewport {
    pub fn new(screen_rows: usize, screen_cols: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            screen_rows,
            screen_cols,
        }
    }

    pub fn resize(&mut self, screen_rows: usize, screen_cols: usize) {
        self.screen_rows = screen_rows;
        self.screen_cols = screen_cols;
    }

    /// Pull the offsets so `(cy, rx)` is visible. Comparisons follow the
    /// cursor's logical position; assignments use the rendered column.
    pub fn scroll(&mut self, cy: usize, cx: usize, rx: usize) {
        if cy < self.row_offset {
            self.row_offset = cy;
        }
        if cy >= self.row_offset + self.screen_rows {
            self.row_offset = cy + 1 - self.screen_rows;
        }
        if cx < self.col_offset {
            self.col_offset = rx;
        }
        if cx >= self.col_offset + self.screen_cols {
            self.col_offset = (rx + 1).saturating_sub(self.screen_cols);
        }
    }
}
