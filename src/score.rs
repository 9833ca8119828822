//! Score model: rubric dimensions, the final result object, and the
//! clamp/rescale arithmetic.
//!
//! The model's raw verdict is a percentage; callers think in marks
//! ("out of 15"). The only arithmetic this crate performs on scores is the
//! linear rescale here — the rubric sub-scores are reported as received and
//! never reconciled against the raw total.

use serde::{Deserialize, Serialize};

/// Per-dimension rubric sub-scores, as reported by the model.
///
/// The weights (40/20/15/10/10/5, summing to 100) are stated in the system
/// prompt; the model is trusted to respect them. Missing or non-numeric
/// dimensions default to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RubricScore {
    #[serde(default)]
    pub content_relevance_accuracy: f64,
    #[serde(default)]
    pub analysis_depth_linkages: f64,
    #[serde(default)]
    pub structure_intro_body_conclusion: f64,
    #[serde(default)]
    pub use_of_examples_cases_data_diagrams: f64,
    #[serde(default)]
    pub clarity_language_and_presentation: f64,
    #[serde(default)]
    pub value_add: f64,
}

/// The normalized outcome of one evaluation.
///
/// Built once per request from whatever the model returned, with every
/// field defaulted when absent; never mutated afterwards, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Raw model score, clamped into `[0, 100]`.
    pub raw_out_of_100: f64,
    /// Rubric sub-scores (possibly partial; defaults to all zeros).
    pub rubric: RubricScore,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub inline_comments: Vec<String>,
    /// `round(raw_out_of_100 / 100 * max_marks)`.
    pub total_scaled: u32,
    /// The caller's mark scale, echoed back.
    pub max_marks: f64,
}

/// Clamp a raw model score into `[0, 100]`.
///
/// Non-numeric values (`NaN`, or `None` upstream) are treated as 0 — a
/// garbled verdict scores nothing rather than failing the request.
pub fn clamp_raw_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}

/// Rescale a clamped 0–100 score onto the caller's mark scale.
pub fn scale_marks(raw_out_of_100: f64, max_marks: f64) -> u32 {
    (raw_out_of_100 / 100.0 * max_marks).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_raw_score(-5.0), 0.0);
        assert_eq!(clamp_raw_score(0.0), 0.0);
        assert_eq!(clamp_raw_score(62.5), 62.5);
        assert_eq!(clamp_raw_score(100.0), 100.0);
        assert_eq!(clamp_raw_score(140.0), 100.0);
        assert_eq!(clamp_raw_score(f64::NAN), 0.0);
    }

    #[test]
    fn scaled_score_stays_within_marks() {
        for raw in [0.0, 1.0, 49.9, 50.0, 99.0, 100.0] {
            for max in [1.0, 10.0, 15.0, 250.0] {
                let scaled = scale_marks(raw, max);
                assert!(scaled as f64 <= max, "raw={raw} max={max} → {scaled}");
            }
        }
    }

    #[test]
    fn scale_rounds_to_nearest() {
        // 70% of 15 marks is 10.5 → rounds to 11.
        assert_eq!(scale_marks(70.0, 15.0), 11);
        assert_eq!(scale_marks(100.0, 15.0), 15);
        assert_eq!(scale_marks(0.0, 15.0), 0);
        assert_eq!(scale_marks(33.0, 10.0), 3);
    }

    #[test]
    fn rubric_defaults_to_zeroed_dimensions() {
        let r: RubricScore = serde_json::from_str("{}").unwrap();
        assert_eq!(r, RubricScore::default());
    }

    #[test]
    fn result_serialises_camel_case() {
        let result = EvaluationResult {
            raw_out_of_100: 70.0,
            rubric: RubricScore::default(),
            strengths: vec!["clear thesis".into()],
            weaknesses: vec![],
            suggestions: vec![],
            inline_comments: vec![],
            total_scaled: 11,
            max_marks: 15.0,
        };
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["rawOutOf100"], 70.0);
        assert_eq!(v["totalScaled"], 11);
        assert_eq!(v["maxMarks"], 15.0);
        // Rubric keys stay snake_case — that is the schema the model is
        // prompted to emit and the one clients already consume.
        assert!(v["rubric"].get("content_relevance_accuracy").is_some());
    }
}
