use std::fmt;

use serde::{Deserialize, Serialize};
use textdiff_script::OpKind;

/// Which of the two compared texts a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSide {
    /// The first (target) text, rebuilt by the replay.
    A,
    /// The second (source) text, whose edits are replayed.
    B,
}

impl fmt::Display for TextSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSide::A => f.write_str("A"),
            TextSide::B => f.write_str("B"),
        }
    }
}

/// Literal fragment of one text with its half-open char range in that text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Fully reconstructed operation: kind, length and the fragment on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLogEntry {
    pub kind: OpKind,
    pub length: usize,
    pub a: Segment,
    pub b: Segment,
}

/// Knobs for grouping the operation log into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Equal runs at least this long end the current block.
    pub context_threshold: usize,
    /// Characters of context kept before and after each block.
    pub context_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            context_threshold: 10,
            context_width: 50,
        }
    }
}

impl ReportOptions {
    /// Override the equal-run length that splits blocks.
    pub fn with_context_threshold(mut self, context_threshold: usize) -> Self {
        self.context_threshold = context_threshold;
        self
    }

    /// Override the context width shown around each block.
    pub fn with_context_width(mut self, context_width: usize) -> Self {
        self.context_width = context_width;
        self
    }
}

/// Rendering class for one fragment inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentClass {
    Unchanged,
    Removed,
    Added,
    Substituted,
}

/// Content of one side of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SideContent {
    /// Raw text taken from that side.
    Text(String),
    /// Filler standing in for text that only exists on the other side, one
    /// unit per char.
    Placeholder(usize),
}

impl SideContent {
    /// Char width the content occupies when rendered.
    pub fn width(&self) -> usize {
        match self {
            SideContent::Text(text) => text.chars().count(),
            SideContent::Placeholder(width) => *width,
        }
    }
}

/// Classified pair of side contents produced from one log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub class: FragmentClass,
    pub a: SideContent,
    pub b: SideContent,
}

/// Contiguous group of changes framed by context from the surrounding equal runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position of the block in the report.
    pub ordinal: usize,
    pub key: u64,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
    pub leading_context: String,
    pub trailing_context: String,
    pub fragments: Vec<Fragment>,
}

/// Aggregate counters over an operation log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffStats {
    pub equal_runs: usize,
    pub substitute_runs: usize,
    pub insert_runs: usize,
    pub delete_runs: usize,
    pub equal_chars: usize,
    pub substituted_chars: usize,
    pub inserted_chars: usize,
    pub deleted_chars: usize,
}

/// Top-level result of comparing two texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextDiff {
    /// Name of the alignment engine, or `external` for a caller-supplied script.
    pub aligner: String,
    pub edit_distance: usize,
    pub similarity: f64,
    pub script: String,
    pub options: ReportOptions,
    pub has_changes: bool,
    pub operations: Vec<DiffLogEntry>,
    pub blocks: Vec<Block>,
    pub stats: DiffStats,
}
