//! Process-backed terminal: raw mode, timed reads, size discovery.
//!
//! Raw mode is a scoped resource: the original termios is captured on
//! construction and restored on drop, so every exit path — normal return,
//! error, panic unwind — puts the terminal back. There is no process-exit
//! hook.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use libc::c_int;

use crate::core::input::ByteSource;
use crate::core::terminal::Console;
use crate::error::{Error, Result};

/// Per-read timeout, the only suspension point in the session. Mirrors the
/// classic VTIME=1 tenth-of-a-second granularity.
const READ_TIMEOUT_MS: i32 = 100;

/// Cap on the cursor-position report used as the window-size fallback.
const POSITION_REPORT_MAX: usize = 32;

fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn poll_readable(fd: c_int, timeout_ms: i32) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & libc::POLLIN) != 0
}

fn read_winsize(fd: c_int) -> Option<(usize, usize)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_row as usize, size.ws_col as usize))
    } else {
        None
    }
}

fn write_all_fd(fd: c_int, bytes: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        let remaining = &bytes[written..];
        let result =
            unsafe { libc::write(fd, remaining.as_ptr() as *const libc::c_void, remaining.len()) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
        }
        written += result as usize;
    }
    Ok(())
}

/// Raw-mode terminal over the process stdin/stdout.
pub struct RawTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: libc::termios,
    restored: bool,
    resized: Arc<AtomicBool>,
    _sigwinch: signal_hook::SigId,
}

impl RawTerminal {
    /// Enable raw mode and register resize observation.
    ///
    /// Turns off echo, canonical line buffering, signal generation, flow
    /// control and output processing, and sets the non-blocking read policy
    /// expressed by `READ_TIMEOUT_MS`.
    pub fn new() -> Result<Self> {
        let stdin_fd = libc::STDIN_FILENO;
        let stdout_fd = libc::STDOUT_FILENO;

        let original_termios = get_termios(stdin_fd).map_err(Error::Terminal)?;
        let mut raw = original_termios;
        raw.c_iflag &= !(libc::ICRNL | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 1;
        set_termios(stdin_fd, &raw).map_err(Error::Terminal)?;

        let resized = Arc::new(AtomicBool::new(false));
        let sigwinch =
            signal_hook::flag::register(signal_hook::consts::SIGWINCH, Arc::clone(&resized))
                .map_err(Error::Terminal)?;

        Ok(Self {
            stdin_fd,
            stdout_fd,
            original_termios,
            restored: false,
            resized,
            _sigwinch: sigwinch,
        })
    }

    /// Restore the saved termios. Idempotent; also runs on drop.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        set_termios(self.stdin_fd, &self.original_termios).map_err(Error::Terminal)?;
        self.restored = true;
        Ok(())
    }

    /// Window size via ioctl, falling back to a cursor-position report when
    /// the ioctl is unavailable.
    fn query_size(&mut self) -> Result<(usize, usize)> {
        if let Some(size) = read_winsize(self.stdout_fd) {
            return Ok(size);
        }
        // Push the cursor to the bottom-right corner, then ask where it is.
        write_all_fd(self.stdout_fd, b"\x1b[999C\x1b[999B\x1b[6n").map_err(Error::Terminal)?;
        self.read_position_report()
    }

    fn read_position_report(&mut self) -> Result<(usize, usize)> {
        let mut report = Vec::with_capacity(POSITION_REPORT_MAX);
        while report.len() < POSITION_REPORT_MAX {
            match self.read_byte()? {
                Some(b'R') => break,
                Some(byte) => report.push(byte),
                None => break,
            }
        }
        parse_position_report(&report).ok_or_else(|| {
            Error::Terminal(io::Error::new(
                io::ErrorKind::InvalidData,
                "unparseable cursor position report",
            ))
        })
    }
}

/// Parse the body of a `\x1b[<rows>;<cols>R` report (terminator stripped).
fn parse_position_report(report: &[u8]) -> Option<(usize, usize)> {
    let body = report.strip_prefix(b"\x1b[")?;
    let body = std::str::from_utf8(body).ok()?;
    let (rows, cols) = body.split_once(';')?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}

impl ByteSource for RawTerminal {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if !poll_readable(self.stdin_fd, READ_TIMEOUT_MS) {
            return Ok(None);
        }
        let mut byte = 0u8;
        let result =
            unsafe { libc::read(self.stdin_fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
        match result {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

impl Console for RawTerminal {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        write_all_fd(self.stdout_fd, bytes)
    }

    fn size(&mut self) -> Result<(usize, usize)> {
        self.query_size()
    }

    fn take_resize(&mut self) -> bool {
        self.resized.swap(false, Ordering::SeqCst)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::parse_position_report;

    #[test]
    fn position_report_parses_rows_then_cols() {
        assert_eq!(parse_position_report(b"\x1b[24;80"), Some((24, 80)));
        assert_eq!(parse_position_report(b"\x1b[1;1"), Some((1, 1)));
    }

    #[test]
    fn malformed_reports_are_rejected() {
        assert_eq!(parse_position_report(b""), None);
        assert_eq!(parse_position_report(b"24;80"), None);
        assert_eq!(parse_position_report(b"\x1b[24"), None);
        assert_eq!(parse_position_report(b"\x1b[a;b"), None);
    }
}
