use serde_json::Value;
use textdiff_align::Aligner;
use textdiff_script::json_type_name;

use crate::error::DiffError;

/// `1 - edit_distance / max(len(a), len(b))`, lengths in chars.
///
/// Two empty texts are identical and score `1.0`.
pub fn similarity_ratio(edit_distance: usize, a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - edit_distance as f64 / longest as f64
}

/// Align two texts and score their similarity.
pub fn text_ratio<A: Aligner + ?Sized>(aligner: &A, a: &str, b: &str) -> f64 {
    similarity_ratio(aligner.distance(a, b), a, b)
}

/// Score two untyped values; anything but two strings is rejected.
pub fn value_ratio<A: Aligner + ?Sized>(aligner: &A, a: &Value, b: &Value) -> Result<f64, DiffError> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Ok(text_ratio(aligner, a, b)),
        _ => Err(DiffError::InvalidRatioInput {
            a: json_type_name(a).to_string(),
            b: json_type_name(b).to_string(),
        }),
    }
}
