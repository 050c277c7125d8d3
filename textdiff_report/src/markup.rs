use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("valid tag pattern"));

/// Converts a raw fragment into display text.
///
/// Called only when rendering; index arithmetic always uses raw fragments.
pub trait MarkupConverter {
    fn to_display(&self, fragment: &str) -> String;
}

/// Passes fragments through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainText;

impl MarkupConverter for PlainText {
    fn to_display(&self, fragment: &str) -> String {
        fragment.to_string()
    }
}

/// Drops complete `<...>` tags and decodes the common character entities.
///
/// Fragments are arbitrary slices, so a tag cut in half by a fragment
/// boundary is left as literal text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagStripper;

impl MarkupConverter for TagStripper {
    fn to_display(&self, fragment: &str) -> String {
        let stripped = TAG.replace_all(fragment, "");
        decode_entities(&stripped)
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
