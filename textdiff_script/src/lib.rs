//! Run-length edit scripts and their indexed operation lists.
//!
//! This crate provides:
//! - the closed operation vocabulary (`OpKind`)
//! - a decoder for run-length edit scripts such as `73=3X1D1=` (`EditScript::parse`)
//! - a single forward pass that assigns half-open index ranges to every
//!   operation (`index_operations`)
//!
//! Decoding never fails for text input: a string without any `{digits}{X|I|D|=}`
//! token decodes to an empty script. Untyped inputs that are not text at all are
//! reported as [`DecodeError::InvalidInputType`] so callers can tell the two
//! outcomes apart.
//!
//! # Example
//!
//! ```rust
//! use textdiff_script::{EditScript, OpKind};
//!
//! let script = EditScript::parse("6=2X");
//! assert_eq!(script.entries.len(), 2);
//! assert_eq!(script.entries[1].kind, OpKind::Substitute);
//! assert_eq!(script.to_string(), "6=2X");
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)([XID=])").expect("valid token pattern"));

/// Kind of one run in an edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Equal,
    Substitute,
    Insert,
    Delete,
}

impl OpKind {
    /// Single-character token used in the run-length encoding.
    pub fn symbol(self) -> char {
        match self {
            OpKind::Equal => '=',
            OpKind::Substitute => 'X',
            OpKind::Insert => 'I',
            OpKind::Delete => 'D',
        }
    }

    /// Inverse of [`OpKind::symbol`].
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '=' => Some(OpKind::Equal),
            'X' => Some(OpKind::Substitute),
            'I' => Some(OpKind::Insert),
            'D' => Some(OpKind::Delete),
            _ => None,
        }
    }

    /// Whether the run occupies space in the first (target) text.
    ///
    /// Everything except a deletion does.
    pub fn advances_cursor(self) -> bool {
        !matches!(self, OpKind::Delete)
    }

    /// Whether the run occupies space in the second (source) text.
    pub fn consumes_source(self) -> bool {
        !matches!(self, OpKind::Insert)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::Equal => "equal",
            OpKind::Substitute => "substitute",
            OpKind::Insert => "insert",
            OpKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One `(kind, length)` run; `length` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScriptEntry {
    pub kind: OpKind,
    pub length: usize,
}

/// Operation with its half-open `[start, end)` range on the cursor timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedOperation {
    pub kind: OpKind,
    pub start: usize,
    pub end: usize,
    pub length: usize,
}

/// Failure to decode a value that is not an edit script at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The value handed to the decoder is not text.
    #[error("edit script must be text, got {found}")]
    InvalidInputType { found: String },
    /// A run length does not fit the platform's index type.
    #[error("run length in token `{token}` overflows")]
    LengthOverflow { token: String },
    /// The cumulative cursor runs past the platform's index type.
    #[error("cursor overflows at operation {operation}")]
    CursorOverflow { operation: usize },
}

/// Ordered sequence of decoded runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditScript {
    pub entries: Vec<EditScriptEntry>,
}

impl EditScript {
    /// Decode a run-length edit script.
    ///
    /// Tokens are extracted left to right; anything between tokens is skipped.
    /// Zero-length runs are dropped since they describe no text. Use
    /// [`EditScript::try_parse`] to surface overflowing run lengths instead of
    /// skipping them.
    pub fn parse(input: &str) -> Self {
        let mut entries = Vec::new();
        for caps in TOKEN.captures_iter(input) {
            let Some(kind) = caps[2].chars().next().and_then(OpKind::from_symbol) else {
                continue;
            };
            if let Ok(length) = caps[1].parse::<usize>()
                && length > 0
            {
                entries.push(EditScriptEntry { kind, length });
            }
        }
        debug!(tokens = entries.len(), "decoded edit script");
        Self { entries }
    }

    /// Like [`EditScript::parse`], but rejects run lengths that overflow,
    /// alone or summed along the cursor.
    pub fn try_parse(input: &str) -> Result<Self, DecodeError> {
        for caps in TOKEN.captures_iter(input) {
            if caps[1].parse::<usize>().is_err() {
                return Err(DecodeError::LengthOverflow {
                    token: caps[0].to_string(),
                });
            }
        }
        let script = Self::parse(input);
        script.indexed()?;
        Ok(script)
    }

    /// Decode raw bytes; input that is not UTF-8 text is rejected.
    pub fn from_bytes(input: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(input).map_err(|_| DecodeError::InvalidInputType {
            found: "non-utf8 bytes".to_string(),
        })?;
        Self::try_parse(text)
    }

    /// Decode an untyped JSON value; only strings are edit scripts.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, DecodeError> {
        match value {
            serde_json::Value::String(text) => Self::try_parse(text),
            other => Err(DecodeError::InvalidInputType {
                found: json_type_name(other).to_string(),
            }),
        }
    }

    /// Append a run, merging it into the previous run of the same kind.
    pub fn push(&mut self, kind: OpKind, length: usize) {
        if length == 0 {
            return;
        }
        match self.entries.last_mut() {
            Some(last) if last.kind == kind => {
                last.length = last.length.saturating_add(length);
            }
            _ => self.entries.push(EditScriptEntry { kind, length }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Length of the first text implied by the script (`=`, `X` and `I` runs).
    ///
    /// Saturates at `usize::MAX`.
    pub fn target_len(&self) -> usize {
        self.run_total(OpKind::advances_cursor)
    }

    /// Length of the second text implied by the script (`=`, `X` and `D` runs).
    ///
    /// Saturates at `usize::MAX`.
    pub fn source_len(&self) -> usize {
        self.run_total(OpKind::consumes_source)
    }

    /// Number of chars covered by non-equal runs, saturating at `usize::MAX`.
    pub fn changed_len(&self) -> usize {
        self.run_total(|kind| kind != OpKind::Equal)
    }

    /// Assign half-open ranges to every run; see [`index_operations`].
    pub fn indexed(&self) -> Result<Vec<IndexedOperation>, DecodeError> {
        index_operations(&self.entries)
    }

    fn run_total(&self, include: impl Fn(OpKind) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| include(entry.kind))
            .fold(0, |total, entry| total.saturating_add(entry.length))
    }
}

impl fmt::Display for EditScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}{}", entry.length, entry.kind.symbol())?;
        }
        Ok(())
    }
}

impl FromIterator<EditScriptEntry> for EditScript {
    fn from_iter<T: IntoIterator<Item = EditScriptEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Walk the runs with a single forward cursor and emit their ranges.
///
/// Deletions get a range starting at the cursor but leave it in place. A range
/// end that does not fit `usize` is reported as [`DecodeError::CursorOverflow`].
pub fn index_operations(
    entries: &[EditScriptEntry],
) -> Result<Vec<IndexedOperation>, DecodeError> {
    let mut cursor = 0usize;
    let mut out = Vec::with_capacity(entries.len());
    for (operation, entry) in entries.iter().enumerate() {
        let end = cursor
            .checked_add(entry.length)
            .ok_or(DecodeError::CursorOverflow { operation })?;
        out.push(IndexedOperation {
            kind: entry.kind,
            start: cursor,
            end,
            length: entry.length,
        });
        if entry.kind.advances_cursor() {
            cursor = end;
        }
    }
    Ok(out)
}

/// Name of a JSON value's type, as used in [`DecodeError::InvalidInputType`].
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
