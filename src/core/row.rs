//! Document row: logical content plus its display projection.
//!
//! Every mutation recomputes the render sequence synchronously; the cache is
//! never read stale across a frame. Projection is a full rebuild, O(line
//! length) per change — there is no incremental diffing.

use crate::core::charseq::{Ch, CharSeq};

const SPACE: u8 = b' ';

/// One line of the document.
///
/// `chars` is the logical codepoint sequence; `render` is the derived glyph
/// sequence with tabs expanded to spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    chars: CharSeq,
    render: CharSeq,
}

impl Row {
    pub fn from_bytes(bytes: &[u8], tab_stop: usize) -> Self {
        let mut row = Self {
            chars: CharSeq::from_bytes(bytes),
            render: CharSeq::new(),
        };
        row.update(tab_stop);
        row
    }

    pub fn from_seq(chars: CharSeq, tab_stop: usize) -> Self {
        let mut row = Self {
            chars,
            render: CharSeq::new(),
        };
        row.update(tab_stop);
        row
    }

    pub fn chars(&self) -> &CharSeq {
        &self.chars
    }

    pub fn render(&self) -> &CharSeq {
        &self.render
    }

    /// Logical length in codepoints.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn insert_char(&mut self, at: usize, ch: Ch, tab_stop: usize) {
        self.chars.insert(at, ch);
        self.update(tab_stop);
    }

    pub fn delete_char(&mut self, at: usize, tab_stop: usize) {
        self.chars.delete_at(at);
        self.update(tab_stop);
    }

    /// Split the row at `at`, keeping the head and returning the tail.
    pub fn split_at(&mut self, at: usize, tab_stop: usize) -> CharSeq {
        let tail = self.chars.split_off(at);
        self.update(tab_stop);
        tail
    }

    pub fn append_seq(&mut self, tail: &CharSeq, tab_stop: usize) {
        self.chars.extend_from(tail);
        self.update(tab_stop);
    }

    /// Rebuild the render projection: every char copies verbatim except tab,
    /// which expands to 1..tab_stop spaces so the cumulative width after the
    /// expansion is a multiple of the tab stop.
    fn update(&mut self, tab_stop: usize) {
        let mut render = CharSeq::new();
        for ch in self.chars.iter() {
            if ch.is_tab() {
                render.push(Ch::ascii(SPACE));
                while render.len() % tab_stop != 0 {
                    render.push(Ch::ascii(SPACE));
                }
            } else {
                render.push(*ch);
            }
        }
        self.render = render;
    }

    /// Rendered column for logical column `cx`: chars before it contribute 1
    /// each, a tab contributes up to the next tab stop.
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let mut rx = 0;
        for ch in self.chars.iter().take(cx) {
            if ch.is_tab() {
                rx += (tab_stop - 1) - rx % tab_stop;
            }
            rx += 1;
        }
        rx
    }

    /// Logical column whose span covers rendered column `rx`, or the line
    /// length when `rx` is past the total width. A position inside a tab's
    /// expansion rounds to the tab itself; the mapping is deliberately not
    /// bijective there.
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, ch) in self.chars.iter().enumerate() {
            if ch.is_tab() {
                cur_rx += (tab_stop - 1) - cur_rx % tab_stop;
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.chars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Row;
    use crate::core::charseq::Ch;

    const TAB_STOP: usize = 8;

    fn row(text: &str) -> Row {
        Row::from_bytes(text.as_bytes(), TAB_STOP)
    }

    #[test]
    fn tab_expands_to_the_next_tab_stop() {
        let row = row("a\tb");
        assert_eq!(row.render().to_string(), format!("a{}b", " ".repeat(7)));
        assert_eq!(row.render().len(), 9);
    }

    #[test]
    fn tab_at_a_stop_boundary_still_advances() {
        // Eight chars land exactly on the stop, so the tab expands to a full
        // interval of spaces.
        let row = row("12345678\tx");
        assert_eq!(row.render().len(), 8 + 8 + 1);
    }

    #[test]
    fn consecutive_tabs_each_reach_a_multiple_of_the_stop() {
        let row = row("\t\t");
        assert_eq!(row.render().len(), 16);
        let row = Row::from_bytes(b"ab\t\t", 4);
        assert_eq!(row.render().len(), 8);
    }

    #[test]
    fn render_recomputes_on_every_mutation() {
        let mut row = row("ab");
        row.insert_char(1, Ch::new(b'\t' as u32).unwrap(), TAB_STOP);
        assert_eq!(row.render().to_string(), format!("a{}b", " ".repeat(7)));
        row.delete_char(1, TAB_STOP);
        assert_eq!(row.render().to_string(), "ab");
    }

    #[test]
    fn cx_to_rx_counts_tab_widths() {
        let row = row("a\tb");
        assert_eq!(row.cx_to_rx(0, TAB_STOP), 0);
        assert_eq!(row.cx_to_rx(1, TAB_STOP), 1);
        assert_eq!(row.cx_to_rx(2, TAB_STOP), 8);
        assert_eq!(row.cx_to_rx(3, TAB_STOP), 9);
    }

    #[test]
    fn cx_to_rx_is_non_decreasing() {
        for text in ["", "abc", "a\tb\tc", "\t\t", "êê\tê"] {
            let row = row(text);
            let mut prev = 0;
            for cx in 0..=row.len() {
                let rx = row.cx_to_rx(cx, TAB_STOP);
                assert!(rx >= prev, "line {text:?} cx {cx}");
                prev = rx;
            }
        }
    }

    #[test]
    fn rx_to_cx_rounds_into_a_tab_to_its_start() {
        let row = row("a\tb");
        // Columns 1..=7 all fall inside the tab's expansion.
        for rx in 1..8 {
            assert_eq!(row.rx_to_cx(rx, TAB_STOP), 1, "rx {rx}");
        }
        assert_eq!(row.rx_to_cx(0, TAB_STOP), 0);
        assert_eq!(row.rx_to_cx(8, TAB_STOP), 2);
    }

    #[test]
    fn rx_past_total_width_maps_to_line_length() {
        let row = row("ab");
        assert_eq!(row.rx_to_cx(99, TAB_STOP), 2);
    }

    #[test]
    fn multibyte_chars_are_single_columns() {
        let row = row("êa");
        assert_eq!(row.cx_to_rx(1, TAB_STOP), 1);
        assert_eq!(row.render().len(), 2);
        assert_eq!(row.render().serialize(), "êa".as_bytes());
    }

    #[test]
    fn split_and_append_keep_render_fresh() {
        let mut row = row("left\tright");
        let tail = row.split_at(5, TAB_STOP);
        assert_eq!(row.chars().to_string(), "left\t");
        assert_eq!(row.render().len(), 8);
        row.append_seq(&tail, TAB_STOP);
        assert_eq!(row.chars().to_string(), "left\tright");
    }
}
