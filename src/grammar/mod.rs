use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::detector::Detector;
use crate::error::ApiError;

/// Half-open character range `[start, end)` in byte offsets of the original
/// UTF-8 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

/// One proposed edit: replace the text at `location` (which should read
/// `old_text`) with `new_text`. An empty `new_text` is a pure deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    pub location: Location,
    pub old_text: String,
    pub new_text: String,
}

/// Validates input, runs the configured detector, and normalizes whatever it
/// returns into well-formed [`Correction`] records.
///
/// Holds no per-request state; one instance is shared across all requests.
#[derive(Clone)]
pub struct GrammarFixer {
    detector: Arc<dyn Detector>,
}

impl GrammarFixer {
    pub fn new(detector: Arc<dyn Detector>) -> Self {
        Self { detector }
    }

    /// Fixes grammar in the provided text.
    ///
    /// Fails with `InvalidInput` for an empty string before the detector is
    /// ever invoked; detector faults surface as `Internal`.
    pub async fn fix_grammar(&self, text: &str) -> crate::error::Result<Vec<Correction>> {
        if text.is_empty() {
            return Err(ApiError::InvalidInput(
                "text must be a non-empty string".to_string(),
            ));
        }

        let raw_corrections = self.detector.analyze(text).await?;
        Ok(self.process_corrections(text, &raw_corrections))
    }

    /// Completes raw detector entries into fully-typed corrections.
    ///
    /// Each entry is handled independently: a missing or wrong-typed
    /// `start`/`end` defaults to `0`, a missing or wrong-typed
    /// `oldText`/`newText` defaults to the empty string. Output length and
    /// order always match the input; nothing is dropped, merged, or
    /// reordered. Ranges are not cross-checked against the original text
    /// and overlapping ranges are passed through as-is.
    pub fn process_corrections(&self, original_text: &str, raw_corrections: &[Value]) -> Vec<Correction> {
        debug!(
            "formatting {} raw corrections for {} bytes of text",
            raw_corrections.len(),
            original_text.len()
        );

        raw_corrections
            .iter()
            .map(|raw| Correction {
                location: Location {
                    start: raw.get("start").and_then(Value::as_u64).unwrap_or(0) as usize,
                    end: raw.get("end").and_then(Value::as_u64).unwrap_or(0) as usize,
                },
                old_text: raw
                    .get("oldText")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                new_text: raw
                    .get("newText")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
            })
            .collect()
    }
}

/// Finds the first occurrence of `substring` in `text` at or after
/// `start_index`, using exact case-sensitive matching.
///
/// Returns `None` when there is no match or when `start_index` is past the
/// end of the text or not a character boundary; absence of a match is a
/// normal outcome, not an error. An empty `substring` matches at
/// `start_index` itself, yielding an empty range.
pub fn find_substring_position(text: &str, substring: &str, start_index: usize) -> Option<Location> {
    let tail = text.get(start_index..)?;
    let start = start_index + tail.find(substring)?;

    Some(Location {
        start,
        end: start + substring.len(),
    })
}

/// Strict well-formedness check for a raw correction entry, independent of
/// the lenient defaulting in [`GrammarFixer::process_corrections`].
///
/// True only when the entry is an object with an object `location` whose
/// `start` and `end` are integers, and string `oldText` and `newText`.
/// Deliberately does not check `start <= end` or that `oldText` matches the
/// original text at that range.
pub fn is_valid_correction(correction: &Value) -> bool {
    let Some(entry) = correction.as_object() else {
        return false;
    };
    let Some(location) = entry.get("location").and_then(Value::as_object) else {
        return false;
    };

    let is_integer =
        |value: Option<&Value>| value.is_some_and(|v| v.is_i64() || v.is_u64());
    if !is_integer(location.get("start")) || !is_integer(location.get("end")) {
        return false;
    }

    entry.get("oldText").is_some_and(Value::is_string)
        && entry.get("newText").is_some_and(Value::is_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{MockDetector, NoopDetector};
    use serde_json::json;

    fn placeholder_fixer() -> GrammarFixer {
        GrammarFixer::new(Arc::new(NoopDetector))
    }

    #[tokio::test]
    async fn test_fix_grammar_empty_string() {
        let error = placeholder_fixer().fix_grammar("").await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid input: text must be a non-empty string"
        );
    }

    #[tokio::test]
    async fn test_fix_grammar_placeholder_returns_empty() {
        let corrections = placeholder_fixer()
            .fix_grammar("She dont like apples")
            .await
            .unwrap();
        assert!(corrections.is_empty());
    }

    #[tokio::test]
    async fn test_fix_grammar_multiple_texts() {
        let fixer = placeholder_fixer();
        for text in ["This is correct", "She dont like it", "He go to school"] {
            assert!(fixer.fix_grammar(text).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_fix_grammar_normalizes_detector_output() {
        let mut detector = MockDetector::new();
        detector.expect_analyze().returning(|_| {
            Ok(vec![
                json!({"start": 4, "end": 8, "oldText": "dont", "newText": "doesn't"}),
                json!({"oldText": "go"}),
                json!({}),
            ])
        });

        let fixer = GrammarFixer::new(Arc::new(detector));
        let corrections = fixer.fix_grammar("She dont like apples").await.unwrap();

        assert_eq!(corrections.len(), 3);
        assert_eq!(corrections[0].location, Location { start: 4, end: 8 });
        assert_eq!(corrections[0].old_text, "dont");
        assert_eq!(corrections[0].new_text, "doesn't");
        assert_eq!(corrections[1].location, Location { start: 0, end: 0 });
        assert_eq!(corrections[1].old_text, "go");
        assert_eq!(corrections[1].new_text, "");
        assert_eq!(corrections[2].old_text, "");
    }

    #[tokio::test]
    async fn test_fix_grammar_detector_fault_is_internal() {
        let mut detector = MockDetector::new();
        detector
            .expect_analyze()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let fixer = GrammarFixer::new(Arc::new(detector));
        let error = fixer.fix_grammar("some text").await.unwrap_err();
        assert!(matches!(error, ApiError::Internal(_)));
    }

    #[test]
    fn test_process_corrections_preserves_order_and_length() {
        let raw: Vec<Value> = (0..5)
            .map(|i| json!({"start": i, "end": i + 1, "oldText": format!("w{i}"), "newText": ""}))
            .collect();
        let corrections = placeholder_fixer().process_corrections("some text", &raw);

        assert_eq!(corrections.len(), 5);
        for (i, correction) in corrections.iter().enumerate() {
            assert_eq!(correction.location.start, i);
            assert_eq!(correction.old_text, format!("w{i}"));
        }
    }

    #[test]
    fn test_process_corrections_empty_input() {
        assert!(placeholder_fixer().process_corrections("text", &[]).is_empty());
    }

    #[test]
    fn test_process_corrections_wrong_typed_fields_default() {
        let raw = vec![json!({"start": "x", "end": 3.5, "oldText": 7, "newText": null})];
        let corrections = placeholder_fixer().process_corrections("text", &raw);

        assert_eq!(corrections[0].location, Location { start: 0, end: 0 });
        assert_eq!(corrections[0].old_text, "");
        assert_eq!(corrections[0].new_text, "");
    }

    #[test]
    fn test_correction_wire_format() {
        let correction = Correction {
            location: Location { start: 4, end: 8 },
            old_text: "dont".to_string(),
            new_text: "doesn't".to_string(),
        };
        let wire = serde_json::to_value(&correction).unwrap();
        assert_eq!(
            wire,
            json!({
                "location": {"start": 4, "end": 8},
                "oldText": "dont",
                "newText": "doesn't",
            })
        );
    }

    #[test]
    fn test_is_valid_correction_well_formed() {
        let correction = json!({
            "location": {"start": 0, "end": 5},
            "oldText": "dont",
            "newText": "doesn't",
        });
        assert!(is_valid_correction(&correction));
    }

    #[test]
    fn test_is_valid_correction_missing_location() {
        assert!(!is_valid_correction(
            &json!({"oldText": "dont", "newText": "doesn't"})
        ));
    }

    #[test]
    fn test_is_valid_correction_non_integer_start() {
        assert!(!is_valid_correction(&json!({
            "location": {"start": "invalid", "end": 5},
            "oldText": "dont",
            "newText": "doesn't",
        })));
    }

    #[test]
    fn test_is_valid_correction_non_integer_end() {
        assert!(!is_valid_correction(&json!({
            "location": {"start": 0, "end": "invalid"},
            "oldText": "dont",
            "newText": "doesn't",
        })));
    }

    #[test]
    fn test_is_valid_correction_fractional_offset() {
        assert!(!is_valid_correction(&json!({
            "location": {"start": 0.5, "end": 5},
            "oldText": "dont",
            "newText": "doesn't",
        })));
    }

    #[test]
    fn test_is_valid_correction_non_string_old_text() {
        assert!(!is_valid_correction(&json!({
            "location": {"start": 0, "end": 5},
            "oldText": 123,
            "newText": "doesn't",
        })));
    }

    #[test]
    fn test_is_valid_correction_non_string_new_text() {
        assert!(!is_valid_correction(&json!({
            "location": {"start": 0, "end": 5},
            "oldText": "dont",
            "newText": 123,
        })));
    }

    #[test]
    fn test_is_valid_correction_null_and_non_object() {
        assert!(!is_valid_correction(&Value::Null));
        assert!(!is_valid_correction(&json!("invalid")));
        assert!(!is_valid_correction(&json!(42)));
    }

    #[test]
    fn test_is_valid_correction_does_not_check_range_order() {
        // start > end and out-of-text ranges are deliberately accepted.
        assert!(is_valid_correction(&json!({
            "location": {"start": 9, "end": 2},
            "oldText": "a",
            "newText": "b",
        })));
    }

    #[test]
    fn test_find_substring_at_beginning() {
        assert_eq!(
            find_substring_position("Hello world", "Hello", 0),
            Some(Location { start: 0, end: 5 })
        );
    }

    #[test]
    fn test_find_substring_in_middle() {
        assert_eq!(
            find_substring_position("Hello world", "world", 0),
            Some(Location { start: 6, end: 11 })
        );
    }

    #[test]
    fn test_find_substring_at_end() {
        assert_eq!(
            find_substring_position("Hello world", "ld", 0),
            Some(Location { start: 9, end: 11 })
        );
    }

    #[test]
    fn test_find_substring_not_found() {
        assert_eq!(find_substring_position("Hello world", "xyz", 0), None);
    }

    #[test]
    fn test_find_substring_with_start_index() {
        assert_eq!(
            find_substring_position("Hello world hello", "hello", 6),
            Some(Location { start: 12, end: 17 })
        );
    }

    #[test]
    fn test_find_substring_empty_substring() {
        assert_eq!(
            find_substring_position("Hello world", "", 0),
            Some(Location { start: 0, end: 0 })
        );
    }

    #[test]
    fn test_find_substring_is_case_sensitive() {
        assert_eq!(find_substring_position("Hello world", "hello", 0), None);
    }

    #[test]
    fn test_find_substring_start_index_past_end() {
        assert_eq!(find_substring_position("short", "s", 99), None);
    }

    #[test]
    fn test_find_substring_is_idempotent() {
        let first = find_substring_position("Hello world", "world", 0);
        let second = find_substring_position("Hello world", "world", 0);
        assert_eq!(first, second);
    }
}
