//! Edit-script replay and human-readable reports for two texts.
//!
//! This crate turns a run-length edit script into a dual-coordinate operation
//! log, groups that log into context-windowed blocks, and renders reports.
//!
//! Primary entrypoints:
//! - [`diff_texts`] (align with an [`Aligner`], then replay)
//! - [`diff_with_script`] (replay a caller-supplied script)
//! - [`reconstruct`] and [`segment_blocks`] for the individual stages
//! - [`format_markdown_report`], [`format_html_report`], [`write_report`]
//!
//! # Example
//!
//! ```rust
//! use textdiff_align::LevenshteinAligner;
//! use textdiff_report::{ReportOptions, diff_texts};
//!
//! let diff = diff_texts("testABC1", "testABB2", &LevenshteinAligner, ReportOptions::default())
//!     .expect("consistent alignment");
//! assert_eq!(diff.script, "6=2X");
//! assert_eq!(diff.similarity, 0.75);
//! assert_eq!(diff.blocks.len(), 1);
//! ```

mod error;
mod markup;
mod model;
mod ratio;
mod reconstruct;
mod report;
mod segment;
mod util;

use textdiff_align::Aligner;
use textdiff_script::{EditScript, OpKind};
use tracing::debug;

pub use error::{DiffError, Mismatch};
pub use markup::{MarkupConverter, PlainText, TagStripper, escape_html};
pub use model::{
    Block, DiffLogEntry, DiffStats, Fragment, FragmentClass, ReportOptions, Segment, SideContent,
    TextDiff, TextSide,
};
pub use ratio::{similarity_ratio, text_ratio, value_ratio};
pub use reconstruct::reconstruct;
pub use report::{
    ReportFormat, format_html_report, format_markdown_report, render_report, write_report,
};
pub use segment::{classify, segment_blocks};

/// Engine name recorded for scripts that did not come from an [`Aligner`].
pub const EXTERNAL_ALIGNER: &str = "external";

/// Align `a` and `b` with `aligner`, then replay and segment the result.
///
/// `a` is the target text; the script describes how `b` becomes `a`.
pub fn diff_texts<A: Aligner + ?Sized>(
    a: &str,
    b: &str,
    aligner: &A,
    options: ReportOptions,
) -> Result<TextDiff, DiffError> {
    let alignment = aligner.align(a, b);
    build_diff(
        a,
        b,
        &alignment.script,
        aligner.name(),
        alignment.edit_distance,
        options,
    )
}

/// Replay a caller-supplied edit script against `a` and `b`.
///
/// The edit distance is taken to be the number of non-equal chars in the
/// script, which is what a unit-cost engine reports.
pub fn diff_with_script(
    a: &str,
    b: &str,
    script: &EditScript,
    options: ReportOptions,
) -> Result<TextDiff, DiffError> {
    let edit_distance = script.changed_len();
    build_diff(a, b, script, EXTERNAL_ALIGNER, edit_distance, options)
}

/// Index `script` and replay it against both texts.
///
/// Scripts whose cursor overflows fail with [`DiffError::Decode`].
pub fn build_operation_log(
    a: &str,
    b: &str,
    script: &EditScript,
) -> Result<Vec<DiffLogEntry>, DiffError> {
    reconstruct(a, b, &script.indexed()?)
}

fn build_diff(
    a: &str,
    b: &str,
    script: &EditScript,
    aligner: &str,
    edit_distance: usize,
    options: ReportOptions,
) -> Result<TextDiff, DiffError> {
    let operations = build_operation_log(a, b, script)?;
    let blocks = segment_blocks(&operations, &options);
    let stats = build_stats(&operations);
    let has_changes = operations.iter().any(|entry| entry.kind != OpKind::Equal);
    debug!(
        aligner,
        edit_distance,
        operations = operations.len(),
        blocks = blocks.len(),
        "built text diff"
    );

    Ok(TextDiff {
        aligner: aligner.to_string(),
        edit_distance,
        similarity: similarity_ratio(edit_distance, a, b),
        script: script.to_string(),
        options,
        has_changes,
        operations,
        blocks,
        stats,
    })
}

/// Count runs and chars per operation kind.
pub fn build_stats(operations: &[DiffLogEntry]) -> DiffStats {
    let mut stats = DiffStats::default();
    for entry in operations {
        match entry.kind {
            OpKind::Equal => {
                stats.equal_runs += 1;
                stats.equal_chars += entry.length;
            }
            OpKind::Substitute => {
                stats.substitute_runs += 1;
                stats.substituted_chars += entry.length;
            }
            OpKind::Insert => {
                stats.insert_runs += 1;
                stats.inserted_chars += entry.length;
            }
            OpKind::Delete => {
                stats.delete_runs += 1;
                stats.deleted_chars += entry.length;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests;
