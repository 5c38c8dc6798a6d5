//! Properties text serializer.
//!
//! Output is pure ASCII: anything outside printable ASCII is written as
//! `\uXXXX` UTF-16 code units.

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::io::{self, Write};

/// Format used for the timestamp header line, e.g.
/// `Sat Mar 14 09:26:53 +0100 2026`. The zone is written as a numeric offset
/// since the local zone name is not available portably.
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Write an optional comment block, a timestamp line, and every entry.
pub fn write<'a, W, I>(out: W, entries: I, comments: Option<&str>) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    write_at(out, entries, comments, &Local::now())
}

/// Like [`write`] with an explicit timestamp.
pub fn write_at<'a, W, I>(
    mut out: W,
    entries: I,
    comments: Option<&str>,
    timestamp: &DateTime<Local>,
) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut text = String::new();
    if let Some(comments) = comments {
        text.push_str(&comment_block(comments));
    }
    let _ = writeln!(text, "#{}", timestamp.format(TIMESTAMP_FORMAT));
    for (key, value) in entries {
        let _ = writeln!(
            text,
            "{}={}",
            escape(key, Field::Key),
            escape(value, Field::Value)
        );
    }
    out.write_all(text.as_bytes())?;
    out.flush()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Key,
    Value,
}

fn push_unicode(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        let _ = write!(out, "\\u{:04X}", unit);
    }
}

/// Escape a key or value so the reader decodes it back unchanged.
///
/// Spaces are always escaped in keys. In values only leading and trailing
/// spaces are, since the reader trims unescaped blanks at both ends.
fn escape(text: &str, field: Field) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let leading = text.len() - text.trim_start_matches(' ').len();
    let trailing_from = text.trim_end_matches(' ').len();

    for (i, c) in text.char_indices() {
        match c {
            ' ' if field == Field::Key || i < leading || i >= trailing_from => {
                out.push_str("\\ ")
            }
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => push_unicode(&mut out, c),
        }
    }
    out
}

/// Render comment text as `#` lines; embedded line breaks start new lines.
fn comment_block(comments: &str) -> String {
    let mut out = String::new();
    for line in comments.split(|c: char| c == '\n' || c == '\r').filter(|l| !l.is_empty()) {
        if !(line.starts_with('#') || line.starts_with('!')) {
            out.push('#');
        }
        for c in line.chars() {
            if c.is_ascii() && !c.is_ascii_control() {
                out.push(c);
            } else {
                push_unicode(&mut out, c);
            }
        }
        out.push('\n');
    }
    out
}
