use xxhash_rust::xxh3::xxh3_64;

use crate::model::{Fragment, SideContent};

/// Text with a char-boundary table so ranges can be sliced by char index.
pub(crate) struct CharText<'a> {
    text: &'a str,
    offsets: Vec<usize>,
}

impl<'a> CharText<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut offsets = text.char_indices().map(|(idx, _)| idx).collect::<Vec<_>>();
        offsets.push(text.len());
        Self { text, offsets }
    }

    pub(crate) fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Slice `length` chars starting at char index `start`.
    pub(crate) fn slice(&self, start: usize, length: usize) -> Option<&'a str> {
        let end = start.checked_add(length)?;
        if end > self.len() {
            return None;
        }
        Some(&self.text[self.offsets[start]..self.offsets[end]])
    }
}

pub(crate) fn head_chars(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

pub(crate) fn tail_chars(text: &str, width: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(width)).collect()
}

/// Derive a stable block key from its ordinal and raw fragment content.
pub(crate) fn derive_block_key(ordinal: usize, fragments: &[Fragment]) -> u64 {
    let mut canonical = format!("o={ordinal}");
    for fragment in fragments {
        canonical.push_str(&format!(
            "|c={:?}|a={}|b={}",
            fragment.class,
            side_tag(&fragment.a),
            side_tag(&fragment.b)
        ));
    }
    xxh3_64(canonical.as_bytes())
}

fn side_tag(content: &SideContent) -> String {
    match content {
        SideContent::Text(text) => format!("t{}:{text}", text.len()),
        SideContent::Placeholder(width) => format!("p{width}"),
    }
}

pub(crate) fn key_label(key: u64) -> String {
    format!("0x{key:016x}")
}
