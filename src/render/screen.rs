//! Whole-frame screen composition.
//!
//! Every refresh rebuilds the entire frame into one append buffer and the
//! caller flushes it with a single write; there is no minimal-diff redraw.
//! This module only composes bytes — it never performs I/O itself.

use crate::core::cursor::Cursor;
use crate::core::document::Document;
use crate::core::viewport::Viewport;

pub const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
pub const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
pub const ERASE_LINE: &[u8] = b"\x1b[K";
pub const INVERT_VIDEO: &[u8] = b"\x1b[7m";
pub const RESET_VIDEO: &[u8] = b"\x1b[m";

const FILENAME_DISPLAY_MAX: usize = 20;

/// Borrowed view of everything one frame needs.
pub struct ScreenView<'a> {
    pub document: &'a Document,
    pub viewport: &'a Viewport,
    pub cursor: Cursor,
    pub filename: Option<&'a str>,
    pub dirty: bool,
    /// Status message, already expiry-filtered by the session.
    pub message: Option<&'a str>,
}

/// Compose one frame: hide cursor, home, text rows, status bar, message bar,
/// absolute cursor position, show cursor.
pub fn compose(view: &ScreenView<'_>) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(HIDE_CURSOR);
    frame.extend_from_slice(CURSOR_HOME);

    draw_rows(view, &mut frame);
    draw_status_bar(view, &mut frame);
    draw_message_bar(view, &mut frame);

    let row = view.cursor.cy - view.viewport.row_offset + 1;
    let col = view.cursor.rx - view.viewport.col_offset + 1;
    frame.extend_from_slice(format!("\x1b[{row};{col}H").as_bytes());
    frame.extend_from_slice(SHOW_CURSOR);
    frame
}

fn draw_rows(view: &ScreenView<'_>, frame: &mut Vec<u8>) {
    let vp = view.viewport;
    for y in 0..vp.screen_rows {
        let file_row = y + vp.row_offset;
        if file_row >= view.document.row_count() {
            if view.document.is_empty() && y == vp.screen_rows / 3 {
                draw_welcome(vp.screen_cols, frame);
            } else {
                frame.push(b'~');
            }
        } else if let Some(row) = view.document.row(file_row) {
            let render = row.render();
            let visible = render
                .len()
                .saturating_sub(vp.col_offset)
                .min(vp.screen_cols);
            for at in vp.col_offset..vp.col_offset + visible {
                if let Some(ch) = render.get(at) {
                    frame.extend_from_slice(ch.bytes());
                }
            }
        }
        frame.extend_from_slice(ERASE_LINE);
        frame.extend_from_slice(b"\r\n");
    }
}

fn draw_welcome(screen_cols: usize, frame: &mut Vec<u8>) {
    let welcome = format!("jot editor -- version {}", crate::VERSION);
    let shown: String = welcome.chars().take(screen_cols).collect();
    let mut padding = (screen_cols - shown.len()) / 2;
    if padding > 0 {
        frame.push(b'~');
        padding -= 1;
    }
    frame.extend(std::iter::repeat(b' ').take(padding));
    frame.extend_from_slice(shown.as_bytes());
}

fn draw_status_bar(view: &ScreenView<'_>, frame: &mut Vec<u8>) {
    frame.extend_from_slice(INVERT_VIDEO);

    let name: String = view
        .filename
        .unwrap_or("[No Name]")
        .chars()
        .take(FILENAME_DISPLAY_MAX)
        .collect();
    let modified = if view.dirty { "(modified)" } else { "" };
    let left = format!("{name} - {} lines {modified}", view.document.row_count());
    let right = format!("{}/{}", view.cursor.cy + 1, view.document.row_count());

    let cols = view.viewport.screen_cols;
    let left: String = left.chars().take(cols).collect();
    frame.extend_from_slice(left.as_bytes());

    let mut len = left.chars().count();
    while len < cols {
        if cols - len == right.len() {
            frame.extend_from_slice(right.as_bytes());
            break;
        }
        frame.push(b' ');
        len += 1;
    }

    frame.extend_from_slice(RESET_VIDEO);
    frame.extend_from_slice(b"\r\n");
}

fn draw_message_bar(view: &ScreenView<'_>, frame: &mut Vec<u8>) {
    frame.extend_from_slice(ERASE_LINE);
    if let Some(message) = view.message {
        let shown: String = message.chars().take(view.viewport.screen_cols).collect();
        frame.extend_from_slice(shown.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::{compose, ScreenView};
    use crate::core::cursor::Cursor;
    use crate::core::document::Document;
    use crate::core::viewport::Viewport;

    const TAB_STOP: usize = 8;

    fn frame_for(doc: &Document, vp: &Viewport, cursor: Cursor) -> String {
        let view = ScreenView {
            document: doc,
            viewport: vp,
            cursor,
            filename: Some("notes.txt"),
            dirty: false,
            message: None,
        };
        String::from_utf8(compose(&view)).unwrap()
    }

    #[test]
    fn frame_brackets_with_cursor_hide_and_show() {
        let doc = Document::new();
        let vp = Viewport::new(3, 20);
        let frame = frame_for(&doc, &vp, Cursor::new());
        assert!(frame.starts_with("\x1b[?25l\x1b[H"));
        assert!(frame.ends_with("\x1b[?25h"));
    }

    #[test]
    fn rows_past_end_of_file_show_tilde_markers() {
        let doc = Document::from_lines(["only"], TAB_STOP);
        let vp = Viewport::new(3, 20);
        let frame = frame_for(&doc, &vp, Cursor::new());
        assert!(frame.contains("only\x1b[K\r\n~\x1b[K\r\n~\x1b[K\r\n"));
    }

    #[test]
    fn empty_document_centers_a_welcome_banner() {
        let doc = Document::new();
        let vp = Viewport::new(9, 60);
        let frame = frame_for(&doc, &vp, Cursor::new());
        assert!(frame.contains("jot editor -- version"));
        // Banner row leads with the tilde marker.
        assert!(frame.contains("~ "));
    }

    #[test]
    fn tabs_arrive_preexpanded_in_the_frame() {
        let doc = Document::from_lines(["a\tb"], TAB_STOP);
        let vp = Viewport::new(2, 20);
        let frame = frame_for(&doc, &vp, Cursor::new());
        assert!(frame.contains(&format!("a{}b", " ".repeat(7))));
    }

    #[test]
    fn column_offset_clips_the_visible_window() {
        let doc = Document::from_lines(["abcdefghij"], TAB_STOP);
        let mut vp = Viewport::new(2, 4);
        vp.col_offset = 2;
        let frame = frame_for(&doc, &vp, Cursor::new());
        assert!(frame.contains("cdef\x1b[K"));
        assert!(!frame.contains("cdefg"));
    }

    #[test]
    fn status_bar_is_inverted_and_right_aligns_position() {
        let doc = Document::from_lines(["x"], TAB_STOP);
        let vp = Viewport::new(2, 40);
        let frame = frame_for(&doc, &vp, Cursor::new());
        let bar_start = frame.find("\x1b[7m").unwrap();
        let bar_end = frame.find("\x1b[m").unwrap();
        let bar = &frame[bar_start + 4..bar_end];
        assert!(bar.starts_with("notes.txt - 1 lines"));
        assert!(bar.ends_with("1/1"));
        assert_eq!(bar.chars().count(), 40);
    }

    #[test]
    fn cursor_position_is_relative_to_the_viewport() {
        let doc = Document::from_lines(["one", "two", "three"], TAB_STOP);
        let mut vp = Viewport::new(2, 20);
        vp.row_offset = 1;
        let cursor = Cursor {
            cx: 2,
            cy: 2,
            rx: 2,
        };
        let frame = frame_for(&doc, &vp, cursor);
        assert!(frame.contains("\x1b[2;3H"));
    }

    #[test]
    fn message_bar_shows_the_filtered_status() {
        let doc = Document::new();
        let vp = Viewport::new(2, 40);
        let view = ScreenView {
            document: &doc,
            viewport: &vp,
            cursor: Cursor::new(),
            filename: None,
            dirty: false,
            message: Some("HELP: Ctrl-Q = quit"),
        };
        let frame = String::from_utf8(compose(&view)).unwrap();
        assert!(frame.contains("HELP: Ctrl-Q = quit"));
        assert!(frame.contains("[No Name]"));
    }
}
