use std::fmt;

use textdiff_script::DecodeError;
use thiserror::Error;

use crate::model::TextSide;

/// Replay state captured where a reconstruction diverged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Index of the offending operation; `None` for the terminal comparison.
    pub operation: Option<usize>,
    pub side: TextSide,
    pub cursor: usize,
    pub shift: isize,
    /// Chars rebuilt (side A) or covered (side B) so far.
    pub rebuilt: usize,
    /// Char length of the text on `side`.
    pub expected: usize,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            Some(idx) => write!(f, "text {} diverged at operation {idx}", self.side)?,
            None => write!(f, "text {} diverged after the last operation", self.side)?,
        }
        write!(
            f,
            " (cursor {}, shift {}, rebuilt {} of {} chars)",
            self.cursor, self.shift, self.rebuilt, self.expected
        )
    }
}

/// Errors surfaced by diff computation and report output.
#[derive(Debug, Error)]
pub enum DiffError {
    /// Edit script input was not decodable.
    #[error("edit script could not be decoded: {0}")]
    Decode(#[from] DecodeError),
    /// Replaying the edit script did not reproduce the texts.
    #[error("reconstruction mismatch: {0}")]
    ReconstructionMismatch(Mismatch),
    /// Similarity ratio requested on values that are not both text.
    #[error("similarity ratio needs two texts, got {a} and {b}")]
    InvalidRatioInput { a: String, b: String },
    /// Report sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiffError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DiffError::Decode(_) => "decode",
            DiffError::ReconstructionMismatch(_) => "reconstruction_mismatch",
            DiffError::InvalidRatioInput { .. } => "invalid_ratio_input",
            DiffError::Io(_) => "io",
            DiffError::Json(_) => "json",
        }
    }
}
