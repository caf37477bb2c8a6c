//! Property sources: ordered `key = value` maps parsed from text.
//!
//! The accepted syntax is the classic properties format: `#` and `!` start
//! comment lines, the key ends at the first unescaped `=`, `:` or blank, a
//! trailing backslash continues the logical line, and the usual escapes
//! (`\t`, `\n`, `\uXXXX`, ...) are decoded.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::event::{ConfigEvent, EventSink};

/// An ordered string-keyed map with an origin label.
///
/// The origin is used for diagnostics only. Keys are unique: a repeated key
/// overwrites the earlier value in place.
///
/// # Examples
///
/// ```
/// use layercfg::PropertySource;
///
/// let source = PropertySource::parse("inline", "# comment\nPort = 7777  \nName: Arena\n");
/// assert_eq!(source.get("Port"), Some("7777"));
/// assert_eq!(source.get("Name"), Some("Arena"));
/// assert_eq!(source.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySource {
    origin: String,
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl PropertySource {
    /// Creates an empty source with the given origin label.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates an empty, unlabeled source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new("<empty>")
    }

    /// Parses properties text.
    #[must_use]
    pub fn parse(origin: impl Into<String>, text: &str) -> Self {
        let mut source = Self::new(origin);
        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            source.insert(key, value);
        }
        source
    }

    /// Reads and parses properties text from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails or yields invalid UTF-8.
    pub fn from_reader(origin: impl Into<String>, mut reader: impl Read) -> std::io::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::parse(origin, &text))
    }

    /// Loads a properties file, degrading to an empty source when the file
    /// cannot be read.
    ///
    /// A [`ConfigEvent::SourceUnreadable`] warning is emitted in that case.
    pub fn load_file(path: &Path, sink: &dyn EventSink) -> Self {
        let origin = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(origin, &text),
            Err(e) => {
                sink.emit(&ConfigEvent::SourceUnreadable {
                    origin: origin.clone(),
                    reason: e.to_string(),
                });
                Self::new(origin)
            }
        }
    }

    /// The origin label (file path or stream name).
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Looks up a key.
    ///
    /// Surrounding whitespace is dropped when a value is stored, so the
    /// result is already trimmed. Blanks written escaped (`\ `) are kept.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts or replaces a trimmed value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.insert(key.into(), value.into().trim().to_string())
    }

    fn insert(&mut self, key: String, value: String) -> Option<String> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Removes every entry, keeping the origin label.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the source holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Escapes `value` so that parsing `key = <escaped>` yields `value` again.
///
/// Backslashes and control characters are escaped, as are the leading and
/// trailing spaces that parsing would otherwise trim.
pub(crate) fn escape_value(value: &str) -> String {
    let content_end = value.trim_end_matches(' ').len();
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        match c {
            '\\' => out.push_str(r"\\"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\t' => out.push_str(r"\t"),
            '\x0c' => out.push_str(r"\f"),
            ' ' if i == 0 || i >= content_end => out.push_str(r"\ "),
            _ => out.push(c),
        }
    }
    out
}

const BLANKS: [char; 3] = [' ', '\t', '\x0c'];

/// Joins continuation lines and drops blanks and comments.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let stripped = raw.trim_start_matches(BLANKS);
        let mut buffer = match pending.take() {
            Some(buffer) => buffer,
            None => {
                if stripped.is_empty() || stripped.starts_with('#') || stripped.starts_with('!') {
                    continue;
                }
                String::new()
            }
        };

        let trailing = stripped.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            buffer.push_str(&stripped[..stripped.len() - 1]);
            pending = Some(buffer);
        } else {
            buffer.push_str(stripped);
            lines.push(buffer);
        }
    }

    if let Some(buffer) = pending {
        lines.push(buffer);
    }
    lines
}

/// Splits a logical line into an unescaped key and value.
fn split_entry(line: &str) -> (String, String) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if BLANKS.contains(&c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let mut rest = line[key_end..].trim_start_matches(BLANKS);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(BLANKS);
    }

    (unescape(&line[..key_end]), unescape(trim_unescaped_end(rest)))
}

/// Drops trailing blanks, keeping one that is escaped by a backslash.
fn trim_unescaped_end(value: &str) -> &str {
    let trimmed = value.trim_end_matches(BLANKS);
    let slashes = trimmed.chars().rev().take_while(|&c| c == '\\').count();
    if slashes % 2 == 0 {
        return trimmed;
    }
    match value[trimmed.len()..].chars().next() {
        Some(blank) => &value[..trimmed.len() + blank.len_utf8()],
        None => trimmed,
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
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
                let hex: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        out.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    _ => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
