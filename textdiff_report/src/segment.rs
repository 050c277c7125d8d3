use textdiff_script::OpKind;
use tracing::debug;

use crate::model::{Block, DiffLogEntry, Fragment, FragmentClass, ReportOptions, SideContent};
use crate::util::{derive_block_key, head_chars, tail_chars};

#[derive(Debug, Default)]
struct OpenBlock {
    a_start: usize,
    b_start: usize,
    a_end: usize,
    b_end: usize,
    leading_context: String,
    fragments: Vec<Fragment>,
}

impl OpenBlock {
    fn after(entry: &DiffLogEntry, width: usize) -> Self {
        Self {
            a_start: entry.a.end,
            b_start: entry.b.end,
            a_end: entry.a.end,
            b_end: entry.b.end,
            leading_context: tail_chars(&entry.a.text, width),
            fragments: Vec::new(),
        }
    }

    fn push(&mut self, entry: &DiffLogEntry, fragment: Fragment) {
        // Inserts occupy no room in B and deletes none in A.
        if entry.kind != OpKind::Delete {
            self.a_end = entry.a.end;
        }
        if entry.kind != OpKind::Insert {
            self.b_end = entry.b.end;
        }
        self.fragments.push(fragment);
    }

    fn has_changes(&self) -> bool {
        self.fragments
            .iter()
            .any(|fragment| fragment.class != FragmentClass::Unchanged)
    }

    fn close(self, ordinal: usize, a_end: usize, b_end: usize, trailing_context: String) -> Block {
        let key = derive_block_key(ordinal, &self.fragments);
        debug!(
            ordinal,
            a_start = self.a_start,
            a_end,
            b_start = self.b_start,
            b_end,
            fragments = self.fragments.len(),
            "finalized block"
        );
        Block {
            ordinal,
            key,
            a_start: self.a_start,
            a_end,
            b_start: self.b_start,
            b_end,
            leading_context: self.leading_context,
            trailing_context,
            fragments: self.fragments,
        }
    }
}

/// Group an operation log into report blocks.
///
/// An equal run of at least `context_threshold` chars closes the block being
/// built (when it holds a change) and opens the next one. The closing block
/// takes the run's first `context_width` chars as trailing context, the new
/// block its last `context_width` chars as leading context. Shorter equal runs
/// stay inline. A block still open after the last entry becomes the final
/// block with no trailing context. Blocks made only of unchanged text are
/// dropped.
pub fn segment_blocks(entries: &[DiffLogEntry], options: &ReportOptions) -> Vec<Block> {
    let width = options.context_width;
    let mut blocks = Vec::new();
    let mut open = OpenBlock::default();

    for entry in entries {
        match entry.kind {
            OpKind::Equal if entry.length >= options.context_threshold => {
                let next = OpenBlock::after(entry, width);
                let done = std::mem::replace(&mut open, next);
                if done.has_changes() {
                    let ordinal = blocks.len() + 1;
                    blocks.push(done.close(
                        ordinal,
                        entry.a.start,
                        entry.b.start,
                        head_chars(&entry.a.text, width),
                    ));
                }
            }
            _ => open.push(entry, classify(entry)),
        }
    }

    if open.has_changes() {
        let ordinal = blocks.len() + 1;
        let (a_end, b_end) = (open.a_end, open.b_end);
        blocks.push(open.close(ordinal, a_end, b_end, String::new()));
    }

    blocks
}

/// Classify one log entry into its rendered fragment.
pub fn classify(entry: &DiffLogEntry) -> Fragment {
    match entry.kind {
        OpKind::Equal => Fragment {
            class: FragmentClass::Unchanged,
            a: SideContent::Text(entry.a.text.clone()),
            b: SideContent::Text(entry.b.text.clone()),
        },
        OpKind::Delete => Fragment {
            class: FragmentClass::Removed,
            a: SideContent::Placeholder(entry.b.text.chars().count()),
            b: SideContent::Text(entry.b.text.clone()),
        },
        OpKind::Insert => Fragment {
            class: FragmentClass::Added,
            a: SideContent::Text(entry.a.text.clone()),
            b: SideContent::Placeholder(entry.a.text.chars().count()),
        },
        OpKind::Substitute => Fragment {
            class: FragmentClass::Substituted,
            a: SideContent::Text(entry.a.text.clone()),
            b: SideContent::Text(entry.b.text.clone()),
        },
    }
}
