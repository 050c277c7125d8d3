use textdiff_script::{IndexedOperation, OpKind};
use tracing::warn;

use crate::error::{DiffError, Mismatch};
use crate::model::{DiffLogEntry, Segment, TextSide};
use crate::util::CharText;

/// Running bookkeeping of one replay.
///
/// `cursor` and `emitted_len` count chars of A, `shift` is the drift from A to
/// B coordinates and `insertion_count` the net inserted length. For every
/// consistent replay `emitted_len == cursor` and `shift == -insertion_count`.
#[derive(Debug, Default)]
struct ReplayState {
    cursor: usize,
    shift: isize,
    insertion_count: isize,
    emitted: String,
    emitted_len: usize,
}

impl ReplayState {
    fn mismatch(&self, operation: Option<usize>, side: TextSide, expected: usize) -> DiffError {
        let rebuilt = match side {
            TextSide::A => self.emitted_len,
            TextSide::B => self.source_cursor().unwrap_or(0),
        };
        let mismatch = Mismatch {
            operation,
            side,
            cursor: self.cursor,
            shift: self.shift,
            rebuilt,
            expected,
        };
        warn!(%mismatch, "edit script replay failed");
        DiffError::ReconstructionMismatch(mismatch)
    }

    /// Position in B corresponding to the current cursor in A.
    fn source_cursor(&self) -> Option<usize> {
        self.cursor.checked_add_signed(self.shift)
    }

    /// Position in B of the next deleted fragment.
    fn deletion_origin(&self) -> Option<usize> {
        self.emitted_len.checked_add_signed(-self.insertion_count)
    }

    fn emit(&mut self, fragment: &str, length: usize) {
        self.emitted.push_str(fragment);
        self.emitted_len += length;
    }
}

/// Replay indexed operations against both texts and build the operation log.
///
/// The operations describe how `b` becomes `a`. Every fragment taken from `a`
/// is appended to a scratch copy which must equal `a` once the operations are
/// exhausted; B must be covered exactly as well. Any divergence is a
/// [`DiffError::ReconstructionMismatch`] and no partial log is returned.
pub fn reconstruct(
    a: &str,
    b: &str,
    operations: &[IndexedOperation],
) -> Result<Vec<DiffLogEntry>, DiffError> {
    let a_text = CharText::new(a);
    let b_text = CharText::new(b);
    let mut state = ReplayState::default();
    let mut log = Vec::with_capacity(operations.len());

    for (idx, op) in operations.iter().enumerate() {
        let length = op.length;
        let entry = match op.kind {
            OpKind::Equal | OpKind::Substitute => {
                let a_start = state.cursor;
                let a_fragment = a_text
                    .slice(a_start, length)
                    .ok_or_else(|| state.mismatch(Some(idx), TextSide::A, a_text.len()))?;
                let b_start = state
                    .source_cursor()
                    .ok_or_else(|| state.mismatch(Some(idx), TextSide::B, b_text.len()))?;
                let b_fragment = b_text
                    .slice(b_start, length)
                    .ok_or_else(|| state.mismatch(Some(idx), TextSide::B, b_text.len()))?;

                state.emit(a_fragment, length);
                state.cursor += length;

                DiffLogEntry {
                    kind: op.kind,
                    length,
                    a: segment(a_fragment, a_start, length),
                    b: segment(b_fragment, b_start, length),
                }
            }
            OpKind::Insert => {
                let a_start = state.emitted_len;
                let a_fragment = a_text
                    .slice(a_start, length)
                    .ok_or_else(|| state.mismatch(Some(idx), TextSide::A, a_text.len()))?;
                // Inserted text only exists in A; the B label marks where it lands.
                let b_start = state
                    .source_cursor()
                    .ok_or_else(|| state.mismatch(Some(idx), TextSide::B, b_text.len()))?;

                state.emit(a_fragment, length);
                state.cursor += length;
                state.shift -= signed(length);
                state.insertion_count += signed(length);

                DiffLogEntry {
                    kind: op.kind,
                    length,
                    a: segment(a_fragment, a_start, length),
                    b: segment(a_fragment, b_start, length),
                }
            }
            OpKind::Delete => {
                let b_start = state
                    .deletion_origin()
                    .ok_or_else(|| state.mismatch(Some(idx), TextSide::B, b_text.len()))?;
                let b_fragment = b_text
                    .slice(b_start, length)
                    .ok_or_else(|| state.mismatch(Some(idx), TextSide::B, b_text.len()))?;

                state.shift += signed(length);
                state.insertion_count -= signed(length);

                // Deleted text only exists in B; A gets an empty fragment at
                // `cursor + shift`, taken before the shift update.
                DiffLogEntry {
                    kind: op.kind,
                    length,
                    a: segment("", b_start, length),
                    b: segment(b_fragment, b_start, length),
                }
            }
        };
        log.push(entry);
    }

    if state.emitted != a {
        return Err(state.mismatch(None, TextSide::A, a_text.len()));
    }
    if state.source_cursor() != Some(b_text.len()) {
        return Err(state.mismatch(None, TextSide::B, b_text.len()));
    }

    Ok(log)
}

fn segment(text: &str, start: usize, length: usize) -> Segment {
    Segment {
        text: text.to_string(),
        start,
        end: start + length,
    }
}

fn signed(length: usize) -> isize {
    isize::try_from(length).unwrap_or(isize::MAX)
}
