//! Properties file codec.
//!
//! Reads and writes the line-oriented `key=value` text format:
//!
//! - `key=value`, `key: value` and `key value` are all accepted
//! - `#` and `!` start comment lines
//! - a trailing backslash continues a line
//! - `\t`, `\n`, `\r`, `\f`, `\uXXXX` and backslash-escaped literals are decoded
//!
//! Writing emits an optional comment block, a timestamp line and one
//! escaped `key=value` line per entry.

pub mod reader;
pub mod writer;

pub use reader::{parse, read, Entry};
pub use writer::{write, write_at, TIMESTAMP_FORMAT};
