use std::fs;
use std::path::Path;

use serde::Deserialize;
use textdiff_align::LevenshteinAligner;
use textdiff_report::{DiffError, ReportOptions, TextDiff, diff_texts, diff_with_script};
use textdiff_script::EditScript;

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    text_a: String,
    text_b: String,
    /// Left untyped so fixtures can exercise non-text scripts.
    #[serde(default)]
    script: Option<serde_json::Value>,
    #[serde(default)]
    options: ReportOptions,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    edit_distance: Option<usize>,
    #[serde(default)]
    ratio: Option<f64>,
    #[serde(default)]
    block_count: Option<usize>,
    #[serde(default)]
    kinds: Option<Vec<String>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let fixtures_dir = repo_root.join("fixtures");

    let mut entries = fs::read_dir(&fixtures_dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.path());

    let mut checked = 0usize;
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let raw = fs::read_to_string(&path)?;
        let fixture: Fixture = serde_json::from_str(&raw)?;
        check_fixture(&fixture)?;
        checked += 1;
    }

    println!("replayed {checked} fixture(s)");
    Ok(())
}

fn run_fixture(fixture: &Fixture) -> Result<TextDiff, DiffError> {
    match &fixture.script {
        Some(value) => {
            let script = EditScript::from_value(value)?;
            diff_with_script(&fixture.text_a, &fixture.text_b, &script, fixture.options)
        }
        None => diff_texts(
            &fixture.text_a,
            &fixture.text_b,
            &LevenshteinAligner,
            fixture.options,
        ),
    }
}

fn check_fixture(fixture: &Fixture) -> Result<(), Box<dyn std::error::Error>> {
    let expected = &fixture.expected;
    let diff = match (run_fixture(fixture), &expected.error) {
        (Err(err), Some(code)) if err.code() == code.as_str() => return Ok(()),
        (Err(err), _) => {
            return Err(format!("fixture {}: unexpected error: {err}", fixture.name).into());
        }
        (Ok(_), Some(code)) => {
            return Err(format!("fixture {}: expected error {code}, got success", fixture.name).into());
        }
        (Ok(diff), None) => diff,
    };

    if let Some(distance) = expected.edit_distance
        && distance != diff.edit_distance
    {
        return Err(format!(
            "fixture {}: edit_distance mismatch: expected {}, got {}",
            fixture.name, distance, diff.edit_distance
        )
        .into());
    }

    if let Some(ratio) = expected.ratio
        && (ratio - diff.similarity).abs() > 1e-9
    {
        return Err(format!(
            "fixture {}: ratio mismatch: expected {}, got {}",
            fixture.name, ratio, diff.similarity
        )
        .into());
    }

    if let Some(count) = expected.block_count
        && count != diff.blocks.len()
    {
        return Err(format!(
            "fixture {}: block_count mismatch: expected {}, got {}",
            fixture.name,
            count,
            diff.blocks.len()
        )
        .into());
    }

    if let Some(kinds) = &expected.kinds {
        let actual = diff
            .operations
            .iter()
            .map(|entry| entry.kind.to_string())
            .collect::<Vec<_>>();
        if &actual != kinds {
            return Err(format!(
                "fixture {}: kinds mismatch: expected {:?}, got {:?}",
                fixture.name, kinds, actual
            )
            .into());
        }
    }

    Ok(())
}
