//! Raw-byte input decoding.
//!
//! `decode_key` turns the ambiguous terminal byte stream into a closed set of
//! logical keys. Lookahead after an escape byte is bounded to three bytes and
//! each follow-byte read is bounded by the source's timeout, so a lone Escape
//! press resolves instead of blocking, and bytes belonging to a later
//! sequence are never consumed.

use std::io;

use crate::core::charseq::{run_len, Codepoint, MAX_CODEPOINT};

const ESC: u8 = 0x1b;

pub const BACKSPACE: u8 = 127;

/// Control-key byte for a letter, e.g. `ctrl(b'q')`.
pub const fn ctrl(byte: u8) -> u8 {
    byte & 0x1f
}

/// Logical key event. `Literal` carries a byte that is not part of a
/// recognized escape sequence, control bytes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Literal(u8),
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Delete,
    PageUp,
    PageDown,
}

/// A byte stream with a bounded per-read timeout.
///
/// `Ok(None)` means no byte arrived within the timeout window; it is a normal
/// outcome, not an error.
pub trait ByteSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Read exactly one logical key.
///
/// Blocks (in timeout-sized steps) until a first byte arrives; after an ESC,
/// any timeout or unrecognized combination degrades to `Key::Escape`.
pub fn decode_key<S: ByteSource>(source: &mut S) -> io::Result<Key> {
    let first = loop {
        if let Some(byte) = source.read_byte()? {
            break byte;
        }
    };
    if first != ESC {
        return Ok(Key::Literal(first));
    }

    let Some(seq0) = source.read_byte()? else {
        return Ok(Key::Escape);
    };
    let Some(seq1) = source.read_byte()? else {
        return Ok(Key::Escape);
    };

    let key = match (seq0, seq1) {
        (b'[', b'0'..=b'9') => {
            let Some(seq2) = source.read_byte()? else {
                return Ok(Key::Escape);
            };
            if seq2 != b'~' {
                return Ok(Key::Escape);
            }
            match seq1 {
                b'1' => Key::Home,
                b'3' => Key::Delete,
                b'4' => Key::End,
                b'5' => Key::PageUp,
                b'6' => Key::PageDown,
                _ => Key::Escape,
            }
        }
        (b'[', b'A') => Key::ArrowUp,
        (b'[', b'B') => Key::ArrowDown,
        (b'[', b'C') => Key::ArrowRight,
        (b'[', b'D') => Key::ArrowLeft,
        (b'[', b'H') | (b'O', b'H') => Key::Home,
        (b'[', b'F') | (b'O', b'F') => Key::End,
        _ => Key::Escape,
    };
    Ok(key)
}

/// Assembles literal bytes into whole codepoints for insertion.
///
/// Typed multi-byte UTF-8 arrives one byte per key event; the assembler holds
/// the partial run and yields the codepoint once the final continuation byte
/// lands. The decode recovery policy matches `parse_run`: a malformed or
/// interrupted run is dropped and the interrupting byte is processed on its
/// own.
#[derive(Debug, Default)]
pub struct Utf8Assembler {
    pending: [u8; 4],
    have: usize,
    need: usize,
}

impl Utf8Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8) -> Option<Codepoint> {
        if self.need > 0 {
            if byte & 0xC0 == 0x80 {
                self.pending[self.have] = byte;
                self.have += 1;
                if self.have < self.need {
                    return None;
                }
                let cp = self.complete();
                self.reset();
                return cp;
            }
            // Run interrupted: drop it and treat the new byte fresh.
            self.reset();
        }

        match run_len(byte) {
            Some(1) => Some(byte as Codepoint),
            Some(need) => {
                self.pending[0] = byte;
                self.have = 1;
                self.need = need;
                None
            }
            // Stray continuation or invalid lead.
            None => None,
        }
    }

    fn complete(&self) -> Option<Codepoint> {
        let mut cp = (self.pending[0] as Codepoint) & (0x7F >> self.need);
        for &byte in &self.pending[1..self.need] {
            cp = (cp << 6) | (byte as Codepoint & 0x3F);
        }
        (cp <= MAX_CODEPOINT).then_some(cp)
    }

    fn reset(&mut self) {
        self.have = 0;
        self.need = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::{ctrl, decode_key, ByteSource, Key, Utf8Assembler};
    use std::collections::VecDeque;
    use std::io;

    /// Scripted source: `Some(byte)` arrives, `None` simulates a timeout.
    struct Script {
        steps: VecDeque<Option<u8>>,
    }

    impl Script {
        fn bytes(bytes: &[u8]) -> Self {
            Self {
                steps: bytes.iter().map(|&b| Some(b)).collect(),
            }
        }

        fn steps(steps: &[Option<u8>]) -> Self {
            Self {
                steps: steps.iter().copied().collect(),
            }
        }
    }

    impl ByteSource for Script {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            match self.steps.pop_front() {
                Some(step) => Ok(step),
                None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "script over")),
            }
        }
    }

    fn decode(bytes: &[u8]) -> Key {
        decode_key(&mut Script::bytes(bytes)).unwrap()
    }

    #[test]
    fn literal_bytes_pass_through() {
        assert_eq!(decode(b"a"), Key::Literal(b'a'));
        assert_eq!(decode(b"\r"), Key::Literal(b'\r'));
        assert_eq!(decode(&[ctrl(b'q')]), Key::Literal(0x11));
    }

    #[test]
    fn tilde_sequences_classify_by_digit() {
        assert_eq!(decode(b"\x1b[1~"), Key::Home);
        assert_eq!(decode(b"\x1b[3~"), Key::Delete);
        assert_eq!(decode(b"\x1b[4~"), Key::End);
        assert_eq!(decode(b"\x1b[5~"), Key::PageUp);
        assert_eq!(decode(b"\x1b[6~"), Key::PageDown);
        assert_eq!(decode(b"\x1b[7~"), Key::Escape);
    }

    #[test]
    fn letter_sequences_classify_arrows_home_end() {
        assert_eq!(decode(b"\x1b[A"), Key::ArrowUp);
        assert_eq!(decode(b"\x1b[B"), Key::ArrowDown);
        assert_eq!(decode(b"\x1b[C"), Key::ArrowRight);
        assert_eq!(decode(b"\x1b[D"), Key::ArrowLeft);
        assert_eq!(decode(b"\x1b[H"), Key::Home);
        assert_eq!(decode(b"\x1b[F"), Key::End);
        assert_eq!(decode(b"\x1bOH"), Key::Home);
        assert_eq!(decode(b"\x1bOF"), Key::End);
    }

    #[test]
    fn lone_escape_resolves_on_timeout() {
        let mut source = Script::steps(&[Some(0x1b), None]);
        assert_eq!(decode_key(&mut source).unwrap(), Key::Escape);

        let mut source = Script::steps(&[Some(0x1b), Some(b'['), None]);
        assert_eq!(decode_key(&mut source).unwrap(), Key::Escape);

        let mut source = Script::steps(&[Some(0x1b), Some(b'['), Some(b'5'), None]);
        assert_eq!(decode_key(&mut source).unwrap(), Key::Escape);
    }

    #[test]
    fn first_byte_waits_across_timeouts() {
        let mut source = Script::steps(&[None, None, Some(b'x')]);
        assert_eq!(decode_key(&mut source).unwrap(), Key::Literal(b'x'));
    }

    #[test]
    fn unrecognized_combinations_degrade_to_escape() {
        assert_eq!(decode(b"\x1b[Z"), Key::Escape);
        assert_eq!(decode(b"\x1bOQ"), Key::Escape);
        assert_eq!(decode(b"\x1bxy"), Key::Escape);
        assert_eq!(decode(b"\x1b[5x"), Key::Escape);
    }

    #[test]
    fn decoder_never_reads_past_its_own_sequence() {
        let mut source = Script::bytes(b"\x1b[Aq");
        assert_eq!(decode_key(&mut source).unwrap(), Key::ArrowUp);
        assert_eq!(decode_key(&mut source).unwrap(), Key::Literal(b'q'));
    }

    #[test]
    fn assembler_passes_ascii_straight_through() {
        let mut asm = Utf8Assembler::new();
        assert_eq!(asm.push(b'a'), Some(b'a' as u32));
        assert_eq!(asm.push(b'\t'), Some(b'\t' as u32));
    }

    #[test]
    fn assembler_joins_multibyte_runs() {
        let mut asm = Utf8Assembler::new();
        assert_eq!(asm.push(0xC3), None);
        assert_eq!(asm.push(0xAA), Some(0xEA));

        assert_eq!(asm.push(0xF0), None);
        assert_eq!(asm.push(0x9F), None);
        assert_eq!(asm.push(0x98), None);
        assert_eq!(asm.push(0x80), Some(0x1F600));
    }

    #[test]
    fn assembler_drops_interrupted_runs() {
        let mut asm = Utf8Assembler::new();
        assert_eq!(asm.push(0xE2), None);
        // ASCII interrupts the pending 3-byte run; the run is lost, the
        // interrupting byte is not.
        assert_eq!(asm.push(b'x'), Some(b'x' as u32));
        assert_eq!(asm.push(0x80), None);
    }
}
