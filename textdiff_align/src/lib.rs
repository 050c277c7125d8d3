//! Alignment engines that turn two texts into a run-length edit script.
//!
//! The engine contract is the [`Aligner`] trait: given a target text `a` and a
//! source text `b`, return the edit distance and an [`EditScript`] describing
//! how `b` becomes `a`. Runs of kind `I` exist only in `a`, runs of kind `D`
//! exist only in `b`.
//!
//! [`LevenshteinAligner`] is the built-in engine. It uses unit costs and a full
//! dynamic-programming table, so memory grows with `len(a) * len(b)`; plug in a
//! banded or bit-parallel engine for large inputs.
//!
//! # Example
//!
//! ```rust
//! use textdiff_align::{Aligner, LevenshteinAligner};
//!
//! let alignment = LevenshteinAligner.align("testABC1", "testABB2");
//! assert_eq!(alignment.edit_distance, 2);
//! assert_eq!(alignment.script.to_string(), "6=2X");
//! ```

use serde::Serialize;
use textdiff_script::{EditScript, OpKind};
use tracing::debug;

/// Edit distance plus the edit script that realizes it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Alignment {
    pub edit_distance: usize,
    pub script: EditScript,
}

/// Alignment engine extension point.
pub trait Aligner {
    /// Short engine name recorded in reports.
    fn name(&self) -> &str {
        "unknown"
    }

    /// Align `source` onto `target`.
    fn align(&self, target: &str, source: &str) -> Alignment;

    /// Edit distance only; engines may override with a cheaper computation.
    fn distance(&self, target: &str, source: &str) -> usize {
        self.align(target, source).edit_distance
    }
}

/// Unit-cost global alignment (substitution, insertion and deletion all cost 1).
#[derive(Debug, Default, Clone, Copy)]
pub struct LevenshteinAligner;

/// Align two texts with [`LevenshteinAligner`].
pub fn align_texts(target: &str, source: &str) -> Alignment {
    LevenshteinAligner.align(target, source)
}

impl Aligner for LevenshteinAligner {
    fn name(&self) -> &str {
        "levenshtein"
    }

    fn align(&self, target: &str, source: &str) -> Alignment {
        let a = target.chars().collect::<Vec<_>>();
        let b = source.chars().collect::<Vec<_>>();
        let table = DistanceTable::build(&a, &b);
        let script = table.trace(&a, &b);
        let edit_distance = table.get(a.len(), b.len());
        debug!(
            target_len = a.len(),
            source_len = b.len(),
            edit_distance,
            runs = script.len(),
            "aligned texts"
        );
        Alignment {
            edit_distance,
            script,
        }
    }

    fn distance(&self, target: &str, source: &str) -> usize {
        let a = target.chars().collect::<Vec<_>>();
        let b = source.chars().collect::<Vec<_>>();
        let mut prev = (0..=b.len()).collect::<Vec<_>>();
        let mut row = vec![0usize; b.len() + 1];
        for i in 1..=a.len() {
            row[0] = i;
            for j in 1..=b.len() {
                let cost = usize::from(a[i - 1] != b[j - 1]);
                row[j] = (prev[j - 1] + cost).min(prev[j] + 1).min(row[j - 1] + 1);
            }
            std::mem::swap(&mut prev, &mut row);
        }
        prev[b.len()]
    }
}

struct DistanceTable {
    cols: usize,
    cells: Vec<usize>,
}

impl DistanceTable {
    fn build(a: &[char], b: &[char]) -> Self {
        let cols = b.len() + 1;
        let mut cells = vec![0usize; (a.len() + 1) * cols];
        for (j, cell) in cells.iter_mut().take(cols).enumerate() {
            *cell = j;
        }
        for i in 1..=a.len() {
            cells[i * cols] = i;
            for j in 1..cols {
                let cost = usize::from(a[i - 1] != b[j - 1]);
                let diagonal = cells[(i - 1) * cols + j - 1] + cost;
                let up = cells[(i - 1) * cols + j] + 1;
                let left = cells[i * cols + j - 1] + 1;
                cells[i * cols + j] = diagonal.min(up).min(left);
            }
        }
        Self { cols, cells }
    }

    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }

    // Walks back from the bottom-right corner; ties prefer the diagonal, then
    // target-only (insert), then source-only (delete).
    fn trace(&self, a: &[char], b: &[char]) -> EditScript {
        let mut reversed = Vec::with_capacity(a.len().max(b.len()));
        let (mut i, mut j) = (a.len(), b.len());
        while i > 0 || j > 0 {
            let here = self.get(i, j);
            if i > 0 && j > 0 {
                let same = a[i - 1] == b[j - 1];
                let cost = usize::from(!same);
                if here == self.get(i - 1, j - 1) + cost {
                    reversed.push(if same {
                        OpKind::Equal
                    } else {
                        OpKind::Substitute
                    });
                    i -= 1;
                    j -= 1;
                    continue;
                }
            }
            if i > 0 && here == self.get(i - 1, j) + 1 {
                reversed.push(OpKind::Insert);
                i -= 1;
            } else {
                reversed.push(OpKind::Delete);
                j -= 1;
            }
        }

        let mut script = EditScript::default();
        for kind in reversed.into_iter().rev() {
            script.push(kind, 1);
        }
        script
    }
}
