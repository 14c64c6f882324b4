//! Key/value parameter bag persisted as a `.properties`-style log file
//!
//! Output is one `#` comment line followed by `key=value` lines sorted by key.
//! Loading accepts the full grammar: `#`/`!` comments, `=`/`:`/whitespace
//! separators, backslash escapes (including `\uXXXX`) and continuation lines.

use crate::error::DetectorError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const WHITESPACE: &[char] = &[' ', '\t', '\x0c'];

/// String-to-string map with deterministic serialisation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBag {
    entries: BTreeMap<String, String>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value if any
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialise the bag: a single comment line, then one escaped
    /// `key=value` line per entry.
    pub fn store<W: Write>(&self, mut out: W, comment: &str) -> io::Result<()> {
        writeln!(out, "#{}", comment_lines(comment))?;
        for (key, value) in &self.entries {
            writeln!(out, "{}={}", escape(key, true), escape(value, false))?;
        }
        out.flush()
    }

    /// Write the bag to `path`, creating or truncating the file
    pub fn store_to_path(&self, path: &Path, comment: &str) -> Result<(), DetectorError> {
        let file = File::create(path).map_err(|e| DetectorError::io(path, e))?;
        self.store(BufWriter::new(file), comment)
            .map_err(|e| DetectorError::io(path, e))
    }

    /// Parse a bag from `.properties` text
    pub fn load<R: BufRead>(reader: R) -> io::Result<Self> {
        PropertyBag::parse(reader).map_err(|(_, e)| e)
    }

    /// Read a bag back from a log file. Malformed entries are reported
    /// with the 1-based line on which they start.
    pub fn load_from_path(path: &Path) -> Result<Self, DetectorError> {
        let file = File::open(path).map_err(|e| DetectorError::io(path, e))?;
        PropertyBag::parse(BufReader::new(file)).map_err(|(line, e)| match e.kind() {
            io::ErrorKind::InvalidData => DetectorError::Parse {
                path: path.to_path_buf(),
                line,
                message: e.to_string(),
            },
            _ => DetectorError::io(path, e),
        })
    }

    fn parse<R: BufRead>(reader: R) -> Result<Self, (usize, io::Error)> {
        let mut bag = PropertyBag::new();
        let mut lines = reader.lines();
        let mut number = 0;

        while let Some(line) = lines.next() {
            number += 1;
            let start = number;
            let line = line.map_err(|e| (start, e))?;
            let trimmed = line.trim_start_matches(WHITESPACE);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut logical = trimmed.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                let Some(next) = lines.next() else {
                    break;
                };
                number += 1;
                let next = next.map_err(|e| (number, e))?;
                logical.push_str(next.trim_start_matches(WHITESPACE));
            }

            let (key, value) = split_entry(&logical);
            let key = unescape(key).map_err(|e| (start, e))?;
            let value = unescape(value).map_err(|e| (start, e))?;
            bag.set_property(key, value);
        }

        Ok(bag)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (k, v) in iter {
            bag.set_property(k, v);
        }
        bag
    }
}

/// Comment text with every line break (`\n`, `\r` or `\r\n`) turned into
/// `\n` and the following line marked as a comment, unless it already
/// starts with `#` or `!`
fn comment_lines(comment: &str) -> String {
    let mut out = String::with_capacity(comment.len() + 1);
    let mut chars = comment.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\n' && c != '\r' {
            out.push(c);
            continue;
        }
        if c == '\r' && chars.peek() == Some(&'\n') {
            chars.next();
        }
        out.push('\n');
        if !matches!(chars.peek(), Some('#') | Some('!')) {
            out.push('#');
        }
    }
    out
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' if i == 0 || is_key => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out
}

/// An odd number of trailing backslashes joins the next line
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into its still-escaped key and value
fn split_entry(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
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
                separator = true;
                break;
            }
            ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = &line[key_end..];
    if separator {
        rest = &rest[1..];
    }
    rest = rest.trim_start_matches(WHITESPACE);
    if !separator {
        if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
            rest = stripped.trim_start_matches(WHITESPACE);
        }
    }

    (key, rest)
}

fn unescape(text: &str) -> io::Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

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
                let unit = read_hex4(&mut chars)?;
                if (0xD800..0xDC00).contains(&unit) {
                    // high surrogate: must pair with a following \uDCxx
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(malformed("unpaired surrogate in \\u escape"));
                    }
                    let low = read_hex4(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(malformed("invalid low surrogate in \\u escape"));
                    }
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(code).ok_or_else(|| malformed("invalid code point"))?);
                } else {
                    out.push(char::from_u32(unit).ok_or_else(|| malformed("invalid code point"))?);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> io::Result<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| malformed("malformed \\uXXXX escape"))?;
        value = value * 16 + digit;
    }
    Ok(value)
}

fn malformed(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}
