use serde_json::json;
use textdiff_align::LevenshteinAligner;
use textdiff_script::{DecodeError, EditScript, EditScriptEntry, OpKind};

use super::{
    DiffError, DiffLogEntry, FragmentClass, MarkupConverter, PlainText, ReportOptions, Segment,
    SideContent, TagStripper, TextSide, build_operation_log, build_stats, classify,
    diff_with_script, escape_html, format_html_report, format_markdown_report, reconstruct,
    segment_blocks, similarity_ratio, text_ratio, value_ratio,
};

const A: &str = "abcdefghijklXYmnopqrstuvwx1";
const B: &str = "abcdefghijklZmnopqrstuvwx23";
const SCRIPT: &str = "12=1X1I12=1X1D";

fn seg(text: &str, start: usize, end: usize) -> Segment {
    Segment {
        text: text.to_string(),
        start,
        end,
    }
}

fn narrow() -> ReportOptions {
    ReportOptions::default()
        .with_context_threshold(10)
        .with_context_width(4)
}

fn mismatch_of(err: DiffError) -> super::Mismatch {
    match err {
        DiffError::ReconstructionMismatch(mismatch) => mismatch,
        other => panic!("expected reconstruction mismatch, got {other:?}"),
    }
}

#[test]
fn replays_equal_and_substitute_runs() {
    let log = build_operation_log("testABC1", "testABB2", &EditScript::parse("6=2X"))
        .expect("consistent script");
    assert_eq!(
        log,
        vec![
            DiffLogEntry {
                kind: OpKind::Equal,
                length: 6,
                a: seg("testAB", 0, 6),
                b: seg("testAB", 0, 6),
            },
            DiffLogEntry {
                kind: OpKind::Substitute,
                length: 2,
                a: seg("C1", 6, 8),
                b: seg("B2", 6, 8),
            },
        ]
    );
}

#[test]
fn replay_tracks_drift_across_inserts_and_deletes() {
    let log = build_operation_log(A, B, &EditScript::parse(SCRIPT)).expect("consistent script");

    assert_eq!(log[2].kind, OpKind::Insert);
    assert_eq!(log[2].a, seg("Y", 13, 14));
    assert_eq!(log[2].b, seg("Y", 13, 14));

    assert_eq!(log[3].a, seg("mnopqrstuvwx", 14, 26));
    assert_eq!(log[3].b, seg("mnopqrstuvwx", 13, 25));

    assert_eq!(log[4].a, seg("1", 26, 27));
    assert_eq!(log[4].b, seg("2", 25, 26));

    assert_eq!(log[5].kind, OpKind::Delete);
    assert_eq!(log[5].a, seg("", 26, 27));
    assert_eq!(log[5].b, seg("3", 26, 27));
}

#[test]
fn deleted_fragment_is_located_in_b() {
    let log = build_operation_log("ac", "abbc", &EditScript::parse("1=2D1=")).expect("consistent");
    assert_eq!(log[1].b, seg("bb", 1, 3));
    assert_eq!(log[1].a, seg("", 1, 3));
    assert_eq!(log[2].a, seg("c", 1, 2));
    assert_eq!(log[2].b, seg("c", 3, 4));
}

#[test]
fn multibyte_text_is_indexed_by_char() {
    let log = build_operation_log("zażółć", "zażolc", &EditScript::parse("4=1X1="))
        .expect("consistent");
    assert_eq!(log[0].a, seg("zażó", 0, 4));
    assert_eq!(log[1].a, seg("ł", 4, 5));
    assert_eq!(log[1].b, seg("l", 4, 5));
}

#[test]
fn short_script_fails_the_terminal_check() {
    let err = build_operation_log("abc", "abc", &EditScript::parse("2=")).expect_err("short");
    let mismatch = mismatch_of(err);
    assert_eq!(mismatch.operation, None);
    assert_eq!(mismatch.side, TextSide::A);
    assert_eq!(mismatch.rebuilt, 2);
    assert_eq!(mismatch.expected, 3);
}

#[test]
fn overrunning_a_names_the_operation() {
    let err = build_operation_log("abc", "abcd", &EditScript::parse("2=1X2I")).expect_err("overrun");
    let mismatch = mismatch_of(err);
    assert_eq!(mismatch.operation, Some(2));
    assert_eq!(mismatch.side, TextSide::A);
    assert_eq!(mismatch.cursor, 3);
}

#[test]
fn overrunning_b_is_a_mismatch() {
    let err = build_operation_log("abc", "ab", &EditScript::parse("3=")).expect_err("overrun");
    let mismatch = mismatch_of(err);
    assert_eq!(mismatch.operation, Some(0));
    assert_eq!(mismatch.side, TextSide::B);
}

#[test]
fn uncovered_b_tail_is_a_mismatch() {
    let err = build_operation_log("abc", "abcd", &EditScript::parse("3=")).expect_err("uncovered");
    let mismatch = mismatch_of(err);
    assert_eq!(mismatch.operation, None);
    assert_eq!(mismatch.side, TextSide::B);
    assert_eq!(mismatch.rebuilt, 3);
    assert_eq!(mismatch.expected, 4);
}

#[test]
fn empty_script_only_matches_empty_texts() {
    assert_eq!(reconstruct("", "", &[]).expect("empty"), Vec::new());
    assert!(reconstruct("a", "", &[]).is_err());
}

#[test]
fn overflowing_cursor_is_a_decode_error() {
    let script = EditScript::parse(&format!("{}=1=", usize::MAX));
    let err = diff_with_script("ab", "ab", &script, ReportOptions::default())
        .expect_err("cursor overflow");
    assert!(matches!(
        err,
        DiffError::Decode(DecodeError::CursorOverflow { operation: 1 })
    ));
    assert_eq!(err.code(), "decode");
}

#[test]
fn mismatch_message_carries_replay_state() {
    let err = build_operation_log("abc", "abc", &EditScript::parse("2=")).expect_err("short");
    let message = err.to_string();
    assert!(message.contains("reconstruction mismatch"));
    assert!(message.contains("after the last operation"));
    assert!(message.contains("rebuilt 2 of 3 chars"));
}

#[test]
fn long_equal_runs_split_blocks_with_context() {
    let log = build_operation_log(A, B, &EditScript::parse(SCRIPT)).expect("consistent");
    let blocks = segment_blocks(&log, &narrow());
    assert_eq!(blocks.len(), 2);

    let first = &blocks[0];
    assert_eq!(first.ordinal, 1);
    assert_eq!((first.a_start, first.a_end), (12, 14));
    assert_eq!((first.b_start, first.b_end), (12, 13));
    assert_eq!(first.leading_context, "ijkl");
    assert_eq!(first.trailing_context, "mnop");
    assert_eq!(first.fragments.len(), 2);
    assert_eq!(first.fragments[1].class, FragmentClass::Added);
    assert_eq!(first.fragments[1].b, SideContent::Placeholder(1));

    let second = &blocks[1];
    assert_eq!(second.ordinal, 2);
    assert_eq!((second.a_start, second.a_end), (26, 27));
    assert_eq!((second.b_start, second.b_end), (25, 27));
    assert_eq!(second.leading_context, "uvwx");
    assert_eq!(second.trailing_context, "");
    assert_eq!(second.fragments[1].class, FragmentClass::Removed);
    assert_eq!(second.fragments[1].a, SideContent::Placeholder(1));
}

#[test]
fn short_equal_runs_stay_inline() {
    let log = build_operation_log(A, B, &EditScript::parse(SCRIPT)).expect("consistent");
    let blocks = segment_blocks(&log, &narrow().with_context_threshold(13));
    assert_eq!(blocks.len(), 1);
    let block = &blocks[0];
    assert_eq!((block.a_start, block.a_end), (0, 27));
    assert_eq!((block.b_start, block.b_end), (0, 27));
    assert_eq!(block.leading_context, "");
    assert_eq!(block.fragments.len(), 6);
    assert_eq!(block.fragments[0].class, FragmentClass::Unchanged);
}

#[test]
fn threshold_is_inclusive() {
    let log = build_operation_log(A, B, &EditScript::parse(SCRIPT)).expect("consistent");
    assert_eq!(segment_blocks(&log, &narrow().with_context_threshold(12)).len(), 2);
}

#[test]
fn leading_equal_run_does_not_open_an_empty_block() {
    let log = build_operation_log("abcdefghijklmnop", "abcdefghijklmnop", &EditScript::parse("16="))
        .expect("identical");
    assert!(segment_blocks(&log, &narrow()).is_empty());
}

#[test]
fn blocks_without_changes_are_dropped() {
    let script = [
        EditScriptEntry {
            kind: OpKind::Equal,
            length: 3,
        },
        EditScriptEntry {
            kind: OpKind::Equal,
            length: 13,
        },
    ]
    .into_iter()
    .collect::<EditScript>();
    let log = build_operation_log("abcdefghijklmnop", "abcdefghijklmnop", &script)
        .expect("consistent");
    assert_eq!(log.len(), 2);
    assert!(segment_blocks(&log, &narrow()).is_empty());

    let log = build_operation_log("abc", "abc", &EditScript::parse("3=")).expect("consistent");
    assert!(segment_blocks(&log, &ReportOptions::default()).is_empty());
}

#[test]
fn context_is_cut_by_char_not_byte() {
    let a = "ąęółśżźćńąęółśżź!";
    let b = "ąęółśżźćńąęółśżź?";
    let log = build_operation_log(a, b, &EditScript::parse("16=1X")).expect("consistent");
    let blocks = segment_blocks(&log, &narrow());
    assert_eq!(blocks[0].leading_context, "łśżź");
}

#[test]
fn placeholders_match_removed_width_in_chars() {
    let entry = DiffLogEntry {
        kind: OpKind::Delete,
        length: 2,
        a: seg("", 0, 0),
        b: seg("żó", 0, 2),
    };
    let fragment = classify(&entry);
    assert_eq!(fragment.a, SideContent::Placeholder(2));
    assert_eq!(fragment.a.width(), fragment.b.width());
}

#[test]
fn block_keys_are_stable_and_distinct() {
    let log = build_operation_log(A, B, &EditScript::parse(SCRIPT)).expect("consistent");
    let one = segment_blocks(&log, &narrow());
    let two = segment_blocks(&log, &narrow());
    assert_eq!(one, two);
    assert_ne!(one[0].key, one[1].key);
}

#[test]
fn stats_count_runs_and_chars() {
    let log = build_operation_log(A, B, &EditScript::parse(SCRIPT)).expect("consistent");
    let stats = build_stats(&log);
    assert_eq!(stats.equal_runs, 2);
    assert_eq!(stats.equal_chars, 24);
    assert_eq!(stats.substitute_runs, 2);
    assert_eq!(stats.inserted_chars, 1);
    assert_eq!(stats.deleted_chars, 1);
}

#[test]
fn external_script_distance_counts_changed_chars() {
    let diff = diff_with_script(A, B, &EditScript::parse(SCRIPT), narrow()).expect("consistent");
    assert_eq!(diff.aligner, "external");
    assert_eq!(diff.edit_distance, 4);
    assert!(diff.has_changes);
    assert_eq!(diff.script, SCRIPT);
}

#[test]
fn markdown_rows_mark_each_fragment_class() {
    let diff = diff_with_script(A, B, &EditScript::parse(SCRIPT), narrow()).expect("consistent");
    let report = format_markdown_report(&diff, "a.txt", "b.txt", &PlainText);
    assert!(report.contains("# Text Diff Report"));
    assert!(report.contains("### Block 1: A [12:14], B [12:13] (key 0x"));
    assert!(report.contains("A: ijkl{~X~}{+Y+}mnop\n"));
    assert!(report.contains("B: ijkl{~Z~}{+_+}mnop\n"));
    assert!(report.contains("A: uvwx{~1~}[-_-]\n"));
    assert!(report.contains("B: uvwx{~2~}[-3-]\n"));
}

#[test]
fn html_report_uses_block_markup() {
    let diff = diff_with_script(A, B, &EditScript::parse(SCRIPT), narrow()).expect("consistent");
    let html = format_html_report(&diff, "a.txt", "b<x>.txt", &PlainText);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<span class='binfo'>BLOCK1 [12:14] in A, [12:13] in B</span>"));
    assert!(html.contains(
        "<div class='row'><span class='ctx'>uvwx</span>  <span class='sbst'>2</span><span class='ins'>3</span>  </div>"
    ));
    assert!(html.contains("b&lt;x&gt;.txt"));
}

#[test]
fn html_escapes_fragment_text_and_flattens_newlines() {
    let a = "<b>\nkept text here</b>";
    let b = "<i>\nkept text here</b>";
    let script = EditScript::parse("1=1X20=");
    let diff = diff_with_script(a, b, &script, narrow()).expect("consistent");
    let html = format_html_report(&diff, "a", "b", &PlainText);
    assert!(html.contains("&lt;<span class='sbst'>b</span>  <span class='ctx'>&gt; ke</span>"));
    assert!(!html.contains("<b>"));
}

#[test]
fn tag_stripper_drops_tags_and_decodes_entities() {
    assert_eq!(
        TagStripper.to_display("<title>What &amp; why</title>"),
        "What & why"
    );
    assert_eq!(TagStripper.to_display("x <ti"), "x <ti");
    assert_eq!(TagStripper.to_display("a &lt;b&gt;"), "a <b>");
    assert_eq!(PlainText.to_display("<p>"), "<p>");
}

#[test]
fn escape_html_covers_special_characters() {
    assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
}

#[test]
fn similarity_ratio_uses_the_longer_text() {
    assert_eq!(similarity_ratio(2, "testABC1", "testABB2"), 0.75);
    assert_eq!(similarity_ratio(0, "", ""), 1.0);
    let ratio = text_ratio(&LevenshteinAligner, "Ala ma kota", "Alan ma psa");
    assert!((ratio - 0.636_363_636_363_636_4).abs() < 1e-12);
}

#[test]
fn ratio_rejects_values_that_are_not_text() {
    let err = value_ratio(&LevenshteinAligner, &json!(1), &json!("999")).expect_err("number");
    match err {
        DiffError::InvalidRatioInput { a, b } => {
            assert_eq!(a, "number");
            assert_eq!(b, "string");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(value_ratio(&LevenshteinAligner, &json!(3987), &json!(4789)).is_err());
    let ok = value_ratio(&LevenshteinAligner, &json!("testABC1"), &json!("testABB2"))
        .expect("two strings");
    assert_eq!(ok, 0.75);
}
