//! Fixed-width hexadecimal/ASCII dump lines
//!
//! A line covers up to 16 bytes and is always 68 columns wide:
//!
//! ```text
//! xx xx xx xx  xx xx xx xx  xx xx xx xx  xx xx xx xx  abcdefghijklmnop
//! ```
//!
//! Hex digits are uppercase. Bytes from `' '` through `'~'` appear verbatim in
//! the ASCII column, anything else as `.`. Unused positions are blanks.

use crate::error::{Pipe3Error, Result};

/// Bytes rendered per line
pub const BYTES_PER_LINE: usize = 16;

/// Width of every non-empty line
pub const LINE_WIDTH: usize = 68;

const ASCII_COLUMN: usize = 52;
const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Render up to 16 bytes of `bytes` as one dump line.
///
/// Bytes past the sixteenth are ignored. An empty slice yields an empty string.
pub fn hex_line(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    let mut line = [b' '; LINE_WIDTH];
    for (j, &val) in bytes.iter().take(BYTES_PER_LINE).enumerate() {
        let at = j * 3 + j / 4;
        line[at] = DIGITS[usize::from(val >> 4)];
        line[at + 1] = DIGITS[usize::from(val & 0x0f)];
        line[ASCII_COLUMN + j] = if (b' '..=b'~').contains(&val) { val } else { b'.' };
    }

    // Only ASCII was written.
    String::from_utf8_lossy(&line).into_owned()
}

/// Cursor form used by scripts: render the line starting at 1-based `pos`.
///
/// Returns the line and the position of the next unread byte, or 0 once the
/// end of `src` has been reached.
pub fn hex_line_at(src: &[u8], pos: usize) -> Result<(String, usize)> {
    if pos == 0 {
        return Err(Pipe3Error::HexPosition);
    }
    if pos > src.len() {
        return Err(Pipe3Error::HexOutOfRange {
            position: pos,
            length: src.len(),
        });
    }

    let start = pos - 1;
    let end = (start + BYTES_PER_LINE).min(src.len());
    let line = hex_line(&src[start..end]);
    let next = if end >= src.len() { 0 } else { end + 1 };
    Ok((line, next))
}

/// Iterator over the dump lines of a buffer
#[derive(Debug, Clone)]
pub struct HexDump<'a> {
    chunks: std::slice::Chunks<'a, u8>,
}

impl<'a> HexDump<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            chunks: bytes.chunks(BYTES_PER_LINE),
        }
    }
}

impl Iterator for HexDump<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(hex_line)
    }
}
