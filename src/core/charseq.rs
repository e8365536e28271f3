//! Per-line codepoint buffer.
//!
//! A line is stored as a contiguous growable array of variable-length encoded
//! codepoints, indexed by position. Indexed access is O(1) and insert/delete
//! pay an O(n) shift, which is acceptable because editable lines are short.
//!
//! UTF-8 length table (leading byte determines run length):
//!
//! | First cp | Last cp  | Bytes | Byte 1   | Byte 2   | Byte 3   | Byte 4   |
//! |----------|----------|-------|----------|----------|----------|----------|
//! | 0x0000   | 0x007F   | 1     | 0xxxxxxx |          |          |          |
//! | 0x0080   | 0x07FF   | 2     | 110xxxxx | 10xxxxxx |          |          |
//! | 0x0800   | 0xFFFF   | 3     | 1110xxxx | 10xxxxxx | 10xxxxxx |          |
//! | 0x10000  | 0x10FFFF | 4     | 11110xxx | 10xxxxxx | 10xxxxxx | 10xxxxxx |

use tracing::trace;

use crate::error::Error;

pub type Codepoint = u32;

pub const MAX_CODEPOINT: Codepoint = 0x10FFFF;

const TAB: Codepoint = 0x09;
const CONTINUATION_MASK: u8 = 0xC0;
const CONTINUATION_TAG: u8 = 0x80;

/// One Unicode codepoint with its canonical UTF-8 encoding inline.
///
/// The byte length always matches the standard length table for the
/// codepoint's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ch {
    cp: Codepoint,
    bytes: [u8; 4],
    len: u8,
}

impl Ch {
    /// Encode a codepoint. Values past the Unicode range are rejected.
    pub fn new(cp: Codepoint) -> Result<Self, Error> {
        let mut bytes = [0u8; 4];
        let len = if cp < 0x80 {
            bytes[0] = cp as u8;
            1
        } else if cp <= 0x7FF {
            bytes[0] = 0xC0 | (cp >> 6) as u8;
            bytes[1] = 0x80 | (cp & 0x3F) as u8;
            2
        } else if cp <= 0xFFFF {
            bytes[0] = 0xE0 | (cp >> 12) as u8;
            bytes[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            bytes[2] = 0x80 | (cp & 0x3F) as u8;
            3
        } else if cp <= MAX_CODEPOINT {
            bytes[0] = 0xF0 | (cp >> 18) as u8;
            bytes[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
            bytes[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            bytes[3] = 0x80 | (cp & 0x3F) as u8;
            4
        } else {
            return Err(Error::InvalidCodepoint(cp));
        };
        Ok(Self { cp, bytes, len })
    }

    /// Infallible constructor for the ASCII subset.
    pub(crate) fn ascii(byte: u8) -> Self {
        debug_assert!(byte < 0x80);
        let mut bytes = [0u8; 4];
        bytes[0] = byte;
        Self {
            cp: byte as Codepoint,
            bytes,
            len: 1,
        }
    }

    pub fn codepoint(&self) -> Codepoint {
        self.cp
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn byte_len(&self) -> usize {
        self.len as usize
    }

    pub fn is_tab(&self) -> bool {
        self.cp == TAB
    }
}

/// Number of bytes in the UTF-8 run introduced by `lead`, by its high-bit
/// pattern. `None` for stray continuation bytes and invalid leads.
pub(crate) fn run_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & CONTINUATION_MASK == CONTINUATION_TAG
}

/// Decode a byte run into codepoints.
///
/// Recovery policy: a lead byte whose continuation bytes are missing or
/// malformed is dropped and parsing resumes at the very next byte, so adjacent
/// valid characters are never corrupted. Stray continuation bytes and invalid
/// leads are dropped the same way. Dropped units are logged, never
/// substituted.
pub fn parse_run(bytes: &[u8]) -> Vec<Codepoint> {
    let mut out = Vec::new();
    let mut at = 0;
    while at < bytes.len() {
        let lead = bytes[at];
        let Some(need) = run_len(lead) else {
            trace!(byte = lead, at, "dropping invalid UTF-8 unit");
            at += 1;
            continue;
        };
        if need == 1 {
            out.push(lead as Codepoint);
            at += 1;
            continue;
        }
        let tail = &bytes[at + 1..bytes.len().min(at + need)];
        if tail.len() < need - 1 || !tail.iter().copied().all(is_continuation) {
            trace!(byte = lead, at, "dropping truncated UTF-8 run");
            at += 1;
            continue;
        }
        let mut cp = (lead as Codepoint) & (0x7F >> need);
        for &byte in tail {
            cp = (cp << 6) | (byte as Codepoint & 0x3F);
        }
        if cp <= MAX_CODEPOINT {
            out.push(cp);
        }
        at += need;
    }
    out
}

/// Ordered sequence of codepoints with positional random access and mutation.
///
/// All indices are codepoint positions, never byte offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharSeq {
    chars: Vec<Ch>,
}

impl CharSeq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequence from raw bytes using the lossy decode policy.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut seq = Self::new();
        for cp in parse_run(bytes) {
            // parse_run never yields out-of-range values.
            if let Ok(ch) = Ch::new(cp) {
                seq.chars.push(ch);
            }
        }
        seq
    }

    pub fn push(&mut self, ch: Ch) {
        self.chars.push(ch);
    }

    /// Insert at `index`, shifting the tail. Out-of-range indices clamp to
    /// the nearest valid bound instead of failing.
    pub fn insert(&mut self, index: usize, ch: Ch) {
        let index = index.min(self.chars.len());
        self.chars.insert(index, ch);
    }

    /// No-op outside `[0, len)`.
    pub fn delete_at(&mut self, index: usize) {
        if index < self.chars.len() {
            self.chars.remove(index);
        }
    }

    /// Delete the inclusive range `[from, to]`.
    ///
    /// Sentinels: `from = -1` means the start of the sequence, `to = -1` or
    /// `to >= len` means the end. `to < from` is a no-op. Deleting the full
    /// range leaves an empty sequence with no residual state.
    pub fn delete_range(&mut self, from: isize, to: isize) {
        if self.chars.is_empty() {
            return;
        }
        let last = self.chars.len() as isize - 1;
        let from = from.max(0);
        let to = if to < 0 || to > last { last } else { to };
        if to < from {
            return;
        }
        self.chars.drain(from as usize..=to as usize);
    }

    /// Split off the tail starting at `at`; `at > len` clamps to the end.
    pub fn split_off(&mut self, at: usize) -> Self {
        let at = at.min(self.chars.len());
        Self {
            chars: self.chars.split_off(at),
        }
    }

    pub fn extend_from(&mut self, other: &Self) {
        self.chars.extend_from_slice(&other.chars);
    }

    pub fn get(&self, index: usize) -> Option<&Ch> {
        self.chars.get(index)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ch> {
        self.chars.iter()
    }

    /// Concatenation of each codepoint's byte encoding, in order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.chars.len());
        for ch in &self.chars {
            out.extend_from_slice(ch.bytes());
        }
        out
    }

    /// First codepoint position where `needle` occurs as a contiguous run.
    pub fn find(&self, needle: &Self) -> Option<usize> {
        if needle.is_empty() || needle.len() > self.len() {
            return None;
        }
        let haystack = &self.chars;
        let width = needle.len();
        (0..=haystack.len() - width).find(|&start| {
            haystack[start..start + width]
                .iter()
                .zip(needle.chars.iter())
                .all(|(a, b)| a.cp == b.cp)
        })
    }
}

impl std::fmt::Display for CharSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.serialize()))
    }
}
