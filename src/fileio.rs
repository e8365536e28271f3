//! Durable-storage collaborator: line loading and document persistence.

use std::fs;
use std::io;
use std::path::Path;

/// Read a file as raw line byte-strings with trailing CR/LF trimmed.
pub fn load_lines(path: &Path) -> io::Result<Vec<Vec<u8>>> {
    let bytes = fs::read(path)?;
    let mut lines: Vec<Vec<u8>> = Vec::new();
    for line in bytes.split(|&byte| byte == b'\n') {
        let mut line = line.to_vec();
        while line.last() == Some(&b'\r') {
            line.pop();
        }
        lines.push(line);
    }
    // A trailing newline terminates the last line rather than opening an
    // empty one.
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

/// Write the serialized document, truncating any previous content. Returns
/// the number of bytes written.
pub fn persist(path: &Path, bytes: &[u8]) -> io::Result<usize> {
    fs::write(path, bytes)?;
    Ok(bytes.len())
}
