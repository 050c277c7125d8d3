use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::DiffError;
use crate::markup::{MarkupConverter, escape_html};
use crate::model::{Block, Fragment, FragmentClass, SideContent, TextDiff};
use crate::util::key_label;

/// Output artifact produced from a [`TextDiff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Html,
    Json,
    Operations,
}

const PLACEHOLDER: char = '_';

const STYLE: &str = "body { font-family: monospace; }\n\
.binfo { display: block; font-weight: bold; margin-top: 1em; }\n\
.ctx { color: #777777; }\n\
.ins { background: #c8f0c8; }\n\
.sbst { background: #f0e0a0; }\n\
.row { white-space: pre-wrap; }\n";

/// Format a markdown-oriented human report from a diff result.
pub fn format_markdown_report(
    diff: &TextDiff,
    a_label: &str,
    b_label: &str,
    converter: &dyn MarkupConverter,
) -> String {
    let mut out = String::new();
    out.push_str("# Text Diff Report\n\n");
    out.push_str(&format!("- A: `{a_label}`\n"));
    out.push_str(&format!("- B: `{b_label}`\n"));
    out.push_str(&format!("- Aligner: `{}`\n", diff.aligner));
    out.push_str(&format!("- Edit distance: {}\n", diff.edit_distance));
    out.push_str(&format!("- Similarity: {:.4}\n\n", diff.similarity));

    out.push_str("## Stats\n\n");
    let stats = &diff.stats;
    out.push_str(&format!(
        "- Equal: {} run(s), {} char(s)\n",
        stats.equal_runs, stats.equal_chars
    ));
    out.push_str(&format!(
        "- Substitute: {} run(s), {} char(s)\n",
        stats.substitute_runs, stats.substituted_chars
    ));
    out.push_str(&format!(
        "- Insert: {} run(s), {} char(s)\n",
        stats.insert_runs, stats.inserted_chars
    ));
    out.push_str(&format!(
        "- Delete: {} run(s), {} char(s)\n\n",
        stats.delete_runs, stats.deleted_chars
    ));

    out.push_str("## Blocks\n\n");
    if diff.blocks.is_empty() {
        out.push_str("No changes detected.\n");
        return out;
    }

    for block in &diff.blocks {
        out.push_str(&format!(
            "### Block {}: A [{}:{}], B [{}:{}] (key {})\n\n",
            block.ordinal,
            block.a_start,
            block.a_end,
            block.b_start,
            block.b_end,
            key_label(block.key),
        ));
        out.push_str("```text\n");
        out.push_str(&format!("A: {}\n", markdown_row(block, converter, |f| &f.a)));
        out.push_str(&format!("B: {}\n", markdown_row(block, converter, |f| &f.b)));
        out.push_str("```\n\n");
    }

    out
}

fn markdown_row(
    block: &Block,
    converter: &dyn MarkupConverter,
    side: impl Fn(&Fragment) -> &SideContent,
) -> String {
    let mut row = flatten(&converter.to_display(&block.leading_context));
    for fragment in &block.fragments {
        let text = match side(fragment) {
            SideContent::Text(raw) => flatten(&converter.to_display(raw)),
            SideContent::Placeholder(width) => placeholder(*width),
        };
        match fragment.class {
            FragmentClass::Unchanged => row.push_str(&text),
            FragmentClass::Added => row.push_str(&format!("{{+{text}+}}")),
            FragmentClass::Removed => row.push_str(&format!("[-{text}-]")),
            FragmentClass::Substituted => row.push_str(&format!("{{~{text}~}}")),
        }
    }
    row.push_str(&flatten(&converter.to_display(&block.trailing_context)));
    row
}

/// Format a standalone HTML report with one section per block.
pub fn format_html_report(
    diff: &TextDiff,
    a_label: &str,
    b_label: &str,
    converter: &dyn MarkupConverter,
) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>Text Diff Report: {} vs {}</title>\n",
        escape_html(a_label),
        escape_html(b_label)
    ));
    out.push_str(&format!("<style>\n{STYLE}</style>\n</head>\n<body>\n"));
    out.push_str("<h1>Text Diff Report</h1>\n");
    out.push_str(&format!(
        "<p class='meta'>A: {} | B: {} | edit distance {} | similarity {:.4}</p>\n",
        escape_html(a_label),
        escape_html(b_label),
        diff.edit_distance,
        diff.similarity
    ));

    if diff.blocks.is_empty() {
        out.push_str("<p>No changes detected.</p>\n");
    }
    for block in &diff.blocks {
        out.push_str("<div class='block'>\n");
        out.push_str(&format!(
            "<span class='binfo'>BLOCK{} [{}:{}] in A, [{}:{}] in B</span>\n",
            block.ordinal, block.a_start, block.a_end, block.b_start, block.b_end
        ));
        out.push_str(&html_row(block, converter, |f| &f.a));
        out.push_str(&html_row(block, converter, |f| &f.b));
        out.push_str("</div>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn html_row(
    block: &Block,
    converter: &dyn MarkupConverter,
    side: impl Fn(&Fragment) -> &SideContent,
) -> String {
    let mut row = String::from("<div class='row'>");
    row.push_str(&html_context(&block.leading_context, converter));
    row.push_str("  ");
    for fragment in &block.fragments {
        let text = match side(fragment) {
            SideContent::Text(raw) => html_text(raw, converter),
            SideContent::Placeholder(width) => placeholder(*width),
        };
        match fragment.class {
            FragmentClass::Unchanged => row.push_str(&text),
            FragmentClass::Added | FragmentClass::Removed => {
                row.push_str(&format!("<span class='ins'>{text}</span>"))
            }
            FragmentClass::Substituted => {
                row.push_str(&format!("<span class='sbst'>{text}</span>"))
            }
        }
    }
    row.push_str("  ");
    row.push_str(&html_context(&block.trailing_context, converter));
    row.push_str("</div>\n");
    row
}

fn html_context(raw: &str, converter: &dyn MarkupConverter) -> String {
    if raw.is_empty() {
        return String::new();
    }
    format!("<span class='ctx'>{}</span>", html_text(raw, converter))
}

fn html_text(raw: &str, converter: &dyn MarkupConverter) -> String {
    flatten(&escape_html(&converter.to_display(raw)))
}

fn flatten(text: &str) -> String {
    text.replace(['\n', '\r', '\t'], " ")
}

fn placeholder(width: usize) -> String {
    std::iter::repeat_n(PLACEHOLDER, width).collect()
}

/// Render `diff` in the requested format.
pub fn render_report(
    diff: &TextDiff,
    format: ReportFormat,
    a_label: &str,
    b_label: &str,
    converter: &dyn MarkupConverter,
) -> Result<String, DiffError> {
    let rendered = match format {
        ReportFormat::Markdown => format_markdown_report(diff, a_label, b_label, converter),
        ReportFormat::Html => format_html_report(diff, a_label, b_label, converter),
        ReportFormat::Json => serde_json::to_string_pretty(diff)?,
        ReportFormat::Operations => serde_json::to_string_pretty(&diff.operations)?,
    };
    Ok(rendered)
}

/// Render the whole report, then hand it to `sink` in a single write.
///
/// Rendering failures leave the sink untouched.
pub fn write_report<W: Write + ?Sized>(
    sink: &mut W,
    diff: &TextDiff,
    format: ReportFormat,
    a_label: &str,
    b_label: &str,
    converter: &dyn MarkupConverter,
) -> Result<(), DiffError> {
    let mut rendered = render_report(diff, format, a_label, b_label, converter)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    sink.write_all(rendered.as_bytes())?;
    sink.flush()?;
    Ok(())
}
