//! Textual rendering of raw records. Keys and values stay byte strings up to
//! this point; each format here is unambiguous and never emits a raw newline
//! inside a record, so every record occupies exactly one output line.

use clap::ValueEnum;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Output format for dumped records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Format {
    /// A bytes-literal pair such as `(b'alice', b'1')`.
    Repr,

    /// Lowercase hex key and value separated by a tab.
    Hex,
}

/// Writes one record as a single line in the given format.
pub fn write_record<W: Write>(
    out: &mut W,
    format: Format,
    key: &[u8],
    value: &[u8],
) -> io::Result<()> {
    match format {
        Format::Repr => writeln!(out, "({}, {})", bytes_literal(key), bytes_literal(value)),
        Format::Hex => writeln!(out, "{}\t{}", hex(key), hex(value)),
    }
}

/// Renders bytes as a bytes literal: `b` followed by a quoted body in which
/// printable ASCII appears as-is and everything else is escaped.
///
/// Single quotes delimit the literal unless the bytes contain a single quote
/// and no double quote.
pub fn bytes_literal(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };
    let mut rendered = String::with_capacity(bytes.len() + 3);
    rendered.push('b');
    rendered.push(quote as char);
    for &byte in bytes {
        match byte {
            b'\\' => rendered.push_str("\\\\"),
            b'\t' => rendered.push_str("\\t"),
            b'\n' => rendered.push_str("\\n"),
            b'\r' => rendered.push_str("\\r"),
            _ if byte == quote => {
                rendered.push('\\');
                rendered.push(byte as char);
            }
            0x20..=0x7e => rendered.push(byte as char),
            _ => {
                let _ = write!(rendered, "\\x{:02x}", byte);
            }
        }
    }
    rendered.push(quote as char);
    rendered
}

/// Renders bytes as lowercase hex without separators. Empty input renders as
/// an empty string.
pub fn hex(bytes: &[u8]) -> String {
    let mut rendered = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(rendered, "{:02x}", byte);
    }
    rendered
}
