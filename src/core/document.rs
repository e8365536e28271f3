//! Ordered row storage for one editing session.
//!
//! Rows are kept in file order and owned exclusively by the session; every
//! mutation bumps the dirty counter.

use crate::core::charseq::CharSeq;
use crate::core::row::Row;

#[derive(Debug, Default)]
pub struct Document {
    rows: Vec<Row>,
    dirty: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate from raw line byte-strings (newlines already trimmed).
    pub fn from_lines<L>(lines: L, tab_stop: usize) -> Self
    where
        L: IntoIterator,
        L::Item: AsRef<[u8]>,
    {
        let mut doc = Self::new();
        for line in lines {
            let at = doc.rows.len();
            doc.insert_row(at, line.as_ref(), tab_stop);
        }
        doc.dirty = 0;
        doc
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn row_mut(&mut self, at: usize) -> Option<&mut Row> {
        self.dirty += 1;
        self.rows.get_mut(at)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    pub fn mark_clean(&mut self) {
        self.dirty = 0;
    }

    /// No-op when `at` is past the current row count.
    pub fn insert_row(&mut self, at: usize, bytes: &[u8], tab_stop: usize) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::from_bytes(bytes, tab_stop));
        self.dirty += 1;
    }

    /// No-op when `at` names no row.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
    }

    /// Split row `cy` at column `cx`: the head stays, the tail becomes a new
    /// row directly below.
    pub fn split_row(&mut self, cy: usize, cx: usize, tab_stop: usize) {
        let Some(row) = self.rows.get_mut(cy) else {
            return;
        };
        let tail = row.split_at(cx, tab_stop);
        self.rows.insert(cy + 1, Row::from_seq(tail, tab_stop));
        self.dirty += 1;
    }

    /// Append row `cy`'s content to the row above and drop row `cy`. Returns
    /// the join column in the surviving row, for cursor placement.
    pub fn join_row(&mut self, cy: usize, tab_stop: usize) -> Option<usize> {
        if cy == 0 || cy >= self.rows.len() {
            return None;
        }
        let moved: CharSeq = self.rows[cy].chars().clone();
        let above = &mut self.rows[cy - 1];
        let join_at = above.len();
        above.append_seq(&moved, tab_stop);
        self.rows.remove(cy);
        self.dirty += 1;
        Some(join_at)
    }

    /// Serialize all rows, each terminated by a newline.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for row in &self.rows {
            out.extend_from_slice(&row.chars().serialize());
            out.push(b'\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Document;

    const TAB_STOP: usize = 8;

    fn doc(lines: &[&str]) -> Document {
        Document::from_lines(lines.iter().map(|line| line.as_bytes()), TAB_STOP)
    }

    #[test]
    fn from_lines_preserves_order_and_starts_clean() {
        let doc = doc(&["one", "two"]);
        assert_eq!(doc.row_count(), 2);
        assert_eq!(doc.row(0).unwrap().chars().to_string(), "one");
        assert_eq!(doc.row(1).unwrap().chars().to_string(), "two");
        assert!(!doc.is_dirty());
    }

    #[test]
    fn insert_and_delete_rows_clamp_and_mark_dirty() {
        let mut doc = doc(&["a"]);
        doc.insert_row(9, b"ignored", TAB_STOP);
        assert_eq!(doc.row_count(), 1);
        assert!(!doc.is_dirty());

        doc.insert_row(1, b"b", TAB_STOP);
        assert!(doc.is_dirty());
        doc.delete_row(5);
        assert_eq!(doc.row_count(), 2);
        doc.delete_row(0);
        assert_eq!(doc.row(0).unwrap().chars().to_string(), "b");
    }

    #[test]
    fn split_then_join_restores_the_line() {
        let mut doc = doc(&["hello world"]);
        doc.split_row(0, 5, TAB_STOP);
        assert_eq!(doc.row_count(), 2);
        assert_eq!(doc.row(0).unwrap().chars().to_string(), "hello");
        assert_eq!(doc.row(1).unwrap().chars().to_string(), " world");

        let join_at = doc.join_row(1, TAB_STOP);
        assert_eq!(join_at, Some(5));
        assert_eq!(doc.row_count(), 1);
        assert_eq!(doc.row(0).unwrap().chars().to_string(), "hello world");
    }

    #[test]
    fn split_at_line_start_leaves_an_empty_head() {
        let mut doc = doc(&["abc"]);
        doc.split_row(0, 0, TAB_STOP);
        assert!(doc.row(0).unwrap().is_empty());
        assert_eq!(doc.row(1).unwrap().chars().to_string(), "abc");
    }

    #[test]
    fn join_on_first_row_is_refused() {
        let mut doc = doc(&["abc"]);
        assert_eq!(doc.join_row(0, TAB_STOP), None);
        assert_eq!(doc.row_count(), 1);
    }

    #[test]
    fn to_bytes_terminates_every_row() {
        let doc = doc(&["a", "", "b"]);
        assert_eq!(doc.to_bytes(), b"a\n\nb\n");
    }
}
