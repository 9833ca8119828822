//! Evaluation orchestration: validate, prompt, call the model once, and
//! normalize its verdict.
//!
//! ## Defensive parsing
//!
//! The model's verdict is untrusted input. It may arrive wrapped in
//! markdown fences, with missing fields, with a string where a number
//! belongs, or not as JSON at all. The policy is degradation, never
//! failure: a verdict that cannot be parsed becomes an empty object, and
//! every absent field resolves to a documented default (empty list, zeroed
//! rubric, raw score 0). The caller always gets a response once the model
//! call itself succeeded.
//!
//! ## What is NOT here
//!
//! No retry, no verdict caching, no local re-derivation of the raw score
//! from the rubric sub-scores. The model's `rawOutOf100` is authoritative;
//! the only arithmetic applied is the clamp and the linear rescale onto
//! the caller's mark scale.

use crate::config::GraderConfig;
use crate::error::GraderError;
use crate::payload::EvaluationRequest;
use crate::prompts::{instruction_block, RECOGNITION_INSTRUCTION, RUBRIC_SYSTEM_PROMPT};
use crate::score::{clamp_raw_score, scale_marks, EvaluationResult, RubricScore};
use crate::scorer::{ModelRequest, ScoringModel};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Marker appended when the concatenated answer text is truncated.
const TRIM_MARKER: &str = "...[trimmed]";

/// Grade one submission.
///
/// Performs exactly one model call. Fatal errors are limited to invalid
/// request fields and the call itself failing; everything the model says
/// (or fails to say) is absorbed into defaults.
pub async fn evaluate<S: ScoringModel>(
    scorer: &S,
    request: &EvaluationRequest,
    config: &GraderConfig,
) -> Result<EvaluationResult, GraderError> {
    // ── Step 1: Validate ─────────────────────────────────────────────────
    if request.question.trim().is_empty() {
        return Err(GraderError::MissingQuestion);
    }
    if !(request.max_marks > 0.0) {
        return Err(GraderError::InvalidMaxMarks {
            got: request.max_marks,
        });
    }

    // ── Step 2: Build the content block ──────────────────────────────────
    let exam_type = request
        .exam_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&config.default_exam_type);

    let mut user_text = instruction_block(
        &request.question,
        exam_type,
        request.time_limit,
        request.max_marks,
    );

    if !request.texts.is_empty() {
        let concatenated = request
            .texts
            .iter()
            .map(|t| format!("### Source: {}\n{}", t.source, t.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        user_text.push_str("\nCandidate answer:\n");
        user_text.push_str(&truncate_text(&concatenated, config.limits.max_text_chars));
    }

    let images: Vec<_> = request
        .images
        .iter()
        .take(config.limits.max_images)
        .cloned()
        .collect();
    if request.images.len() > images.len() {
        warn!(
            "Submission supplied {} images; forwarding the first {}",
            request.images.len(),
            images.len()
        );
    }
    if !images.is_empty() {
        user_text.push('\n');
        user_text.push_str(RECOGNITION_INSTRUCTION);
    }

    info!(
        "Evaluating: {} text sources, {} images, max marks {}",
        request.texts.len(),
        images.len(),
        request.max_marks
    );

    // ── Step 3: One model call ───────────────────────────────────────────
    let system = config
        .system_prompt
        .clone()
        .unwrap_or_else(|| RUBRIC_SYSTEM_PROMPT.to_string());

    let raw_output = scorer
        .score(ModelRequest {
            system,
            user_text,
            images,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
        .await?;

    // ── Step 4: Normalize the verdict ────────────────────────────────────
    Ok(parse_verdict(&raw_output, request.max_marks))
}

/// Truncate to the hard cap, appending the trim marker when cut.
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(TRIM_MARKER);
    out
}

static RE_JSON_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").unwrap());

/// Parse the model output into an [`EvaluationResult`], defaulting every
/// absent or malformed field.
fn parse_verdict(raw_output: &str, max_marks: f64) -> EvaluationResult {
    let stripped = strip_json_fences(raw_output);
    let value: Value = match serde_json::from_str(&stripped) {
        Ok(v) => v,
        Err(e) => {
            warn!("Verdict was not valid JSON ({e}); scoring 0");
            Value::Object(Default::default())
        }
    };

    let raw = clamp_raw_score(value.get("rawOutOf100").and_then(Value::as_f64).unwrap_or(0.0));
    let total_scaled = scale_marks(raw, max_marks);
    debug!("Raw score {raw}/100 → {total_scaled}/{max_marks}");

    EvaluationResult {
        raw_out_of_100: raw,
        rubric: parse_rubric(value.get("rubric")),
        strengths: string_list(&value, "strengths"),
        weaknesses: string_list(&value, "weaknesses"),
        suggestions: string_list(&value, "suggestions"),
        inline_comments: string_list(&value, "inline_comments"),
        total_scaled,
        max_marks,
    }
}

/// Undo the model wrapping its JSON in markdown fences despite the prompt.
fn strip_json_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(caps) = RE_JSON_FENCES.captures(trimmed) {
        caps[1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Per-dimension extraction so one string-typed field costs only itself.
fn parse_rubric(value: Option<&Value>) -> RubricScore {
    let dim = |key: &str| -> f64 {
        value
            .and_then(|v| v.get(key))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    RubricScore {
        content_relevance_accuracy: dim("content_relevance_accuracy"),
        analysis_depth_linkages: dim("analysis_depth_linkages"),
        structure_intro_body_conclusion: dim("structure_intro_body_conclusion"),
        use_of_examples_cases_data_diagrams: dim("use_of_examples_cases_data_diagrams"),
        clarity_language_and_presentation: dim("clarity_language_and_presentation"),
        value_add: dim("value_add"),
    }
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
