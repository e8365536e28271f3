//! Editing session.
//!
//! One `Editor` value owns the document, cursor, viewport and config for the
//! lifetime of the session and is threaded explicitly through every
//! operation. The main loop is strictly read-process-repaint: decode one key,
//! apply one command, rebuild one frame.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::EditorConfig;
use crate::core::charseq::{Ch, CharSeq, Codepoint};
use crate::core::cursor::Cursor;
use crate::core::document::Document;
use crate::core::input::{ctrl, decode_key, Key, Utf8Assembler, BACKSPACE};
use crate::core::row::Row;
use crate::core::terminal::Console;
use crate::core::viewport::Viewport;
use crate::error::Result;
use crate::fileio;
use crate::render::screen::{self, ScreenView};

const MESSAGE_LIFETIME: Duration = Duration::from_secs(5);

/// Rows reserved below the text area for the status and message bars.
const CHROME_ROWS: usize = 2;

pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

#[derive(Debug)]
struct StatusMessage {
    text: String,
    set_at: Instant,
}

#[derive(Debug)]
struct SearchState {
    last_match: Option<usize>,
    forward: bool,
}

/// Per-keystroke observer for the interactive prompt.
type PromptHook = fn(&mut Editor, &str, Key);

pub struct Editor {
    config: EditorConfig,
    document: Document,
    cursor: Cursor,
    viewport: Viewport,
    filename: Option<String>,
    message: Option<StatusMessage>,
    quit_presses_left: u32,
    assembler: Utf8Assembler,
    search: SearchState,
}

impl Editor {
    /// `screen_rows`/`screen_cols` are the full window; two rows are kept for
    /// the status and message bars.
    pub fn new(config: EditorConfig, screen_rows: usize, screen_cols: usize) -> Self {
        Self {
            config,
            document: Document::new(),
            cursor: Cursor::new(),
            viewport: Viewport::new(screen_rows.saturating_sub(CHROME_ROWS), screen_cols),
            filename: None,
            message: None,
            quit_presses_left: config.quit_times,
            assembler: Utf8Assembler::new(),
            search: SearchState {
                last_match: None,
                forward: true,
            },
        }
    }

    /// Load a file into the session. The filename is recorded even when the
    /// load fails, so a later save can create the file.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        self.filename = Some(path.to_string_lossy().into_owned());
        let lines = fileio::load_lines(path)?;
        self.document = Document::from_lines(lines, self.config.tab_stop);
        info!(path = %path.display(), rows = self.document.row_count(), "opened file");
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Transient status message; expires five seconds after it was set.
    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            set_at: Instant::now(),
        });
    }

    pub fn message(&self) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|message| message.set_at.elapsed() < MESSAGE_LIFETIME)
            .map(|message| message.text.as_str())
    }

    pub fn resize(&mut self, screen_rows: usize, screen_cols: usize) {
        self.viewport
            .resize(screen_rows.saturating_sub(CHROME_ROWS), screen_cols);
    }

    /// Recompute the rendered cursor column and clamp the viewport around it.
    fn scroll(&mut self) {
        self.cursor.rx = match self.document.row(self.cursor.cy) {
            Some(row) => row.cx_to_rx(self.cursor.cx, self.config.tab_stop),
            None => 0,
        };
        self.viewport
            .scroll(self.cursor.cy, self.cursor.cx, self.cursor.rx);
    }

    pub fn refresh_screen<T: Console>(&mut self, term: &mut T) -> Result<()> {
        self.scroll();
        let view = ScreenView {
            document: &self.document,
            viewport: &self.viewport,
            cursor: self.cursor,
            filename: self.filename.as_deref(),
            dirty: self.document.is_dirty(),
            message: self
                .message
                .as_ref()
                .filter(|message| message.set_at.elapsed() < MESSAGE_LIFETIME)
                .map(|message| message.text.as_str()),
        };
        let frame = screen::compose(&view);
        term.write(&frame)?;
        Ok(())
    }

    /// Decode one key and apply it. Returns `false` when the session ends.
    pub fn process_keypress<T: Console>(&mut self, term: &mut T) -> Result<bool> {
        let key = decode_key(term)?;
        match key {
            Key::Literal(b'\r') => self.insert_newline(),
            Key::Literal(byte) if byte == ctrl(b'q') => {
                if self.document.is_dirty() && self.quit_presses_left > 0 {
                    let presses = self.quit_presses_left;
                    self.set_status_message(format!(
                        "WARNING!!! File has unsaved changes. \
                         Press Ctrl-Q {presses} more times to quit."
                    ));
                    self.quit_presses_left -= 1;
                    return Ok(true);
                }
                term.write(screen::CLEAR_SCREEN)?;
                term.write(screen::CURSOR_HOME)?;
                info!("session quit");
                return Ok(false);
            }
            Key::Literal(byte) if byte == ctrl(b's') => self.save(term)?,
            Key::Literal(byte) if byte == ctrl(b'f') => self.find(term)?,
            Key::Home => self.cursor.cx = 0,
            Key::End => {
                if let Some(row) = self.document.row(self.cursor.cy) {
                    self.cursor.cx = row.len();
                }
            }
            Key::Delete => {
                self.move_cursor(Key::ArrowRight);
                self.delete_char();
            }
            Key::Literal(byte) if byte == BACKSPACE || byte == ctrl(b'h') => self.delete_char(),
            Key::PageUp | Key::PageDown => self.page_move(key),
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.move_cursor(key)
            }
            Key::Escape => {}
            Key::Literal(byte) if byte == ctrl(b'l') => {}
            Key::Literal(byte) => {
                if let Some(cp) = self.assembler.push(byte) {
                    self.insert_codepoint(cp)?;
                }
            }
        }
        self.quit_presses_left = self.config.quit_times;
        Ok(true)
    }

    fn insert_codepoint(&mut self, cp: Codepoint) -> Result<()> {
        let ch = Ch::new(cp)?;
        let tab_stop = self.config.tab_stop;
        if self.cursor.cy == self.document.row_count() {
            self.document.insert_row(self.cursor.cy, b"", tab_stop);
        }
        if let Some(row) = self.document.row_mut(self.cursor.cy) {
            row.insert_char(self.cursor.cx, ch, tab_stop);
            self.cursor.cx += 1;
        }
        Ok(())
    }

    fn insert_newline(&mut self) {
        let tab_stop = self.config.tab_stop;
        if self.cursor.cx == 0 {
            self.document.insert_row(self.cursor.cy, b"", tab_stop);
        } else {
            self.document
                .split_row(self.cursor.cy, self.cursor.cx, tab_stop);
        }
        self.cursor.cy += 1;
        self.cursor.cx = 0;
    }

    /// Backspace semantics: delete left of the cursor, or join onto the line
    /// above when the cursor sits at column 0.
    fn delete_char(&mut self) {
        let tab_stop = self.config.tab_stop;
        if self.cursor.cy == self.document.row_count() {
            return;
        }
        if self.cursor.cx == 0 && self.cursor.cy == 0 {
            return;
        }
        if self.cursor.cx > 0 {
            if let Some(row) = self.document.row_mut(self.cursor.cy) {
                row.delete_char(self.cursor.cx - 1, tab_stop);
            }
            self.cursor.cx -= 1;
        } else if let Some(join_at) = self.document.join_row(self.cursor.cy, tab_stop) {
            self.cursor.cy -= 1;
            self.cursor.cx = join_at;
        }
    }

    fn move_cursor(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => {
                if self.cursor.cx != 0 {
                    self.cursor.cx -= 1;
                } else if self.cursor.cy > 0 {
                    self.cursor.cy -= 1;
                    self.cursor.cx = self.document.row(self.cursor.cy).map_or(0, Row::len);
                }
            }
            Key::ArrowRight => {
                if let Some(row) = self.document.row(self.cursor.cy) {
                    if self.cursor.cx < row.len() {
                        self.cursor.cx += 1;
                    } else {
                        self.cursor.cy += 1;
                        self.cursor.cx = 0;
                    }
                }
            }
            Key::ArrowUp => {
                if self.cursor.cy != 0 {
                    self.cursor.cy -= 1;
                }
            }
            Key::ArrowDown => {
                if self.cursor.cy < self.document.row_count() {
                    self.cursor.cy += 1;
                }
            }
            _ => {}
        }

        // Snap to the end of the destination line.
        let len = self.document.row(self.cursor.cy).map_or(0, Row::len);
        if self.cursor.cx > len {
            self.cursor.cx = len;
        }
    }

    /// Page keys jump the cursor to the window edge, then move a screenful.
    fn page_move(&mut self, key: Key) {
        let step = match key {
            Key::PageUp => {
                self.cursor.cy = self.viewport.row_offset;
                Key::ArrowUp
            }
            Key::PageDown => {
                let bottom = (self.viewport.row_offset + self.viewport.screen_rows)
                    .saturating_sub(1);
                self.cursor.cy = bottom.min(self.document.row_count());
                Key::ArrowDown
            }
            _ => return,
        };
        for _ in 0..self.viewport.screen_rows {
            self.move_cursor(step);
        }
    }

    fn save<T: Console>(&mut self, term: &mut T) -> Result<()> {
        if self.filename.is_none() {
            match self.prompt(term, "Save as: {}", None)? {
                Some(name) => self.filename = Some(name),
                None => {
                    self.set_status_message("Save aborted");
                    return Ok(());
                }
            }
        }
        let Some(name) = self.filename.clone() else {
            return Ok(());
        };

        let bytes = self.document.to_bytes();
        match fileio::persist(Path::new(&name), &bytes) {
            Ok(written) => {
                self.document.mark_clean();
                info!(path = %name, bytes = written, "saved");
                self.set_status_message(format!("{written} bytes written to disk"));
            }
            Err(err) => {
                warn!(path = %name, error = %err, "save failed");
                self.set_status_message(format!("Can't save! I/O error: {err}"));
            }
        }
        Ok(())
    }

    /// One-line interactive prompt over the message bar.
    ///
    /// `template` contains a `{}` that the input-so-far replaces on every
    /// repaint. Escape cancels, Enter on non-empty input confirms, and the
    /// hook (when given) observes every keystroke including the final one.
    fn prompt<T: Console>(
        &mut self,
        term: &mut T,
        template: &str,
        hook: Option<PromptHook>,
    ) -> Result<Option<String>> {
        let mut input = String::new();
        loop {
            self.set_status_message(template.replace("{}", &input));
            self.refresh_screen(term)?;

            let key = decode_key(term)?;
            match key {
                Key::Escape => {
                    self.set_status_message("");
                    if let Some(hook) = hook {
                        hook(self, &input, key);
                    }
                    return Ok(None);
                }
                Key::Literal(b'\r') => {
                    if !input.is_empty() {
                        self.set_status_message("");
                        if let Some(hook) = hook {
                            hook(self, &input, key);
                        }
                        return Ok(Some(input));
                    }
                }
                Key::Delete => {
                    input.pop();
                }
                Key::Literal(byte) if byte == BACKSPACE || byte == ctrl(b'h') => {
                    input.pop();
                }
                Key::Literal(byte) if byte.is_ascii() && !byte.is_ascii_control() => {
                    input.push(byte as char);
                }
                _ => {}
            }

            if let Some(hook) = hook {
                hook(self, &input, key);
            }
        }
    }

    fn find<T: Console>(&mut self, term: &mut T) -> Result<()> {
        let saved_cursor = self.cursor;
        let saved_row_offset = self.viewport.row_offset;
        let saved_col_offset = self.viewport.col_offset;
        self.search = SearchState {
            last_match: None,
            forward: true,
        };

        let query = self.prompt(
            term,
            "Search: {} (Use ESC/Arrows/Enter to cancel)",
            Some(Editor::search_step),
        )?;

        if query.is_none() {
            self.cursor = saved_cursor;
            self.viewport.row_offset = saved_row_offset;
            self.viewport.col_offset = saved_col_offset;
        }
        Ok(())
    }

    /// Incremental search step, driven by the prompt hook. Arrow keys pick
    /// the direction; the scan wraps around the document. Matching runs over
    /// the render projection, so the hit column converts back through
    /// `rx_to_cx`.
    fn search_step(&mut self, query: &str, key: Key) {
        match key {
            Key::Literal(b'\r') | Key::Escape => {
                self.search.last_match = None;
                self.search.forward = true;
                return;
            }
            Key::ArrowRight | Key::ArrowDown => self.search.forward = true,
            Key::ArrowLeft | Key::ArrowUp => self.search.forward = false,
            _ => {
                self.search.last_match = None;
                self.search.forward = true;
            }
        }
        if self.search.last_match.is_none() {
            self.search.forward = true;
        }
        if query.is_empty() {
            return;
        }

        let rows = self.document.row_count() as i64;
        if rows == 0 {
            return;
        }
        let needle = CharSeq::from_bytes(query.as_bytes());
        let step: i64 = if self.search.forward { 1 } else { -1 };
        let mut current = self.search.last_match.map_or(-1, |at| at as i64);

        for _ in 0..rows {
            current += step;
            if current < 0 {
                current = rows - 1;
            } else if current == rows {
                current = 0;
            }

            let at = current as usize;
            let Some(row) = self.document.row(at) else {
                continue;
            };
            if let Some(match_rx) = row.render().find(&needle) {
                self.search.last_match = Some(at);
                self.cursor.cy = at;
                self.cursor.cx = row.rx_to_cx(match_rx, self.config.tab_stop);
                // Force the next clamp to land the match row at the window top.
                self.viewport.row_offset = rows as usize;
                break;
            }
        }
    }
}

/// Main loop: observe resize, repaint, process one key; repeat until quit.
pub fn run<T: Console>(editor: &mut Editor, term: &mut T) -> Result<()> {
    loop {
        if term.take_resize() {
            let (rows, cols) = term.size()?;
            editor.resize(rows, cols);
            info!(rows, cols, "window resized");
        }
        editor.refresh_screen(term)?;
        if !editor.process_keypress(term)? {
            return Ok(());
        }
    }
}
