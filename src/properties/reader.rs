//! Properties text parser.
//!
//! Natural lines are joined into logical lines (trailing backslash
//! continuation), comments and blank lines are dropped, and every logical
//! line is split into an unescaped key and value.

use crate::error::{ConfigError, ConfigResult};
use std::io::Read;
use std::str::Chars;
use tracing::warn;

/// One `key`/`value` pair in file order, tagged with its starting line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub line: usize,
    pub key: String,
    pub value: String,
}

/// Parse properties text into entries, in file order.
///
/// Later duplicates are kept; merging into a map resolves them (last wins).
/// Entries with an empty key are skipped.
pub fn parse(content: &str) -> ConfigResult<Vec<Entry>> {
    let mut entries = Vec::new();
    for logical in logical_lines(content) {
        let (raw_key, raw_value) = split_entry(&logical.text);
        let key = unescape(raw_key, logical.number)?;
        if key.is_empty() {
            warn!(line = logical.number, "Skipping property with empty key");
            continue;
        }
        let value = unescape(raw_value, logical.number)?;
        entries.push(Entry {
            line: logical.number,
            key,
            value,
        });
    }
    Ok(entries)
}

/// Read all of `reader` as UTF-8 and parse it.
pub fn read<R: Read>(mut reader: R) -> ConfigResult<Vec<Entry>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse(&content)
}

struct LogicalLine {
    number: usize,
    text: String,
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\x0c'
}

/// Split on `\n`, `\r\n` or a lone `\r`.
fn natural_lines(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&content[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&content[start..i]);
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&content[start..]);
    }
    lines
}

fn trailing_backslashes(text: &str) -> usize {
    text.bytes().rev().take_while(|b| *b == b'\\').count()
}

fn logical_lines(content: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (idx, natural) in natural_lines(content).into_iter().enumerate() {
        let text = natural.trim_start_matches(is_blank);
        let continued = trailing_backslashes(text) % 2 == 1;
        let body = if continued {
            &text[..text.len() - 1]
        } else {
            text
        };

        let mut line = match pending.take() {
            // Comment markers carry no meaning inside a continuation.
            Some(line) => line,
            None => {
                if text.is_empty() || text.starts_with('#') || text.starts_with('!') {
                    continue;
                }
                LogicalLine {
                    number: idx + 1,
                    text: String::new(),
                }
            }
        };
        line.text.push_str(body);

        if continued {
            pending = Some(line);
        } else {
            lines.push(line);
        }
    }

    // A backslash on the last line continues into nothing.
    if let Some(line) = pending {
        lines.push(line);
    }
    lines
}

/// Split a logical line into its raw (still escaped) key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut separator = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                value_start = i + 1;
                separator = true;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                value_start = i + c.len_utf8();
                break;
            }
            _ => {}
        }
    }

    let mut value = line[value_start..].trim_start_matches(is_blank);
    if !separator {
        if let Some(rest) = value.strip_prefix(|c: char| c == '=' || c == ':') {
            value = rest.trim_start_matches(is_blank);
        }
    }
    (&line[..key_end], trim_unescaped_end(value))
}

/// Trim trailing blanks that are not themselves escaped.
fn trim_unescaped_end(value: &str) -> &str {
    let mut end = value.len();
    while let Some(c) = value[..end].chars().next_back() {
        if !is_blank(c) {
            break;
        }
        let before = &value[..end - c.len_utf8()];
        if trailing_backslashes(before) % 2 == 1 {
            break;
        }
        end -= c.len_utf8();
    }
    &value[..end]
}

fn unescape(raw: &str, line: usize) -> ConfigResult<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let unit = read_code_unit(&mut chars, line)?;
                out.push(decode_unit(unit, &mut chars));
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

fn read_code_unit(chars: &mut Chars<'_>, line: usize) -> ConfigResult<u16> {
    let mut unit: u16 = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| ConfigError::parse(line, "malformed \\uxxxx encoding"))?;
        unit = (unit << 4) | digit as u16;
    }
    Ok(unit)
}

/// Turn a UTF-16 code unit into a char, pairing a high surrogate with a
/// directly following `\uXXXX` low surrogate. Unpaired surrogates decode to
/// U+FFFD.
fn decode_unit(unit: u16, chars: &mut Chars<'_>) -> char {
    if (0xD800..0xDC00).contains(&unit) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Ok(low) = read_code_unit(&mut lookahead, 0) {
                if (0xDC00..0xE000).contains(&low) {
                    *chars = lookahead;
                    let scalar =
                        0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    return char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER);
                }
            }
        }
        return char::REPLACEMENT_CHARACTER;
    }
    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)
}
