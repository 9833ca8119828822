//! System and user prompts for rubric-based grading.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the rubric (weights, penalty
//!    wording, output schema) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without a
//!    live model, so a weight accidentally edited to 45 is caught in CI.
//!
//! Callers can override the grading prompt via
//! [`crate::config::GraderConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

/// Default system prompt encoding the grading rubric.
///
/// The weights sum to 100 and are documented to the model, not enforced in
/// code: the raw score the model reports is taken as authoritative.
pub const RUBRIC_SYSTEM_PROMPT: &str = r#"You are a strict, experienced examiner grading a written exam answer against a mark scheme.

Score the answer out of 100 using this fixed rubric (weights in brackets, summing to 100):

1. content_relevance_accuracy [40] — does the answer address the question directly, with factually accurate, relevant content covering the demand of the question?
2. analysis_depth_linkages [20] — depth of analysis, cause-effect reasoning, inter-linkages across topics, balanced multi-dimensional treatment.
3. structure_intro_body_conclusion [15] — clear introduction, logically ordered body, conclusion that answers the question.
4. use_of_examples_cases_data_diagrams [10] — concrete examples, case studies, data, committee reports, or diagrams where appropriate.
5. clarity_language_and_presentation [10] — clear, precise language; legible presentation; appropriate use of keywords.
6. value_add [5] — flow charts, maps, current-affairs linkages, or original insight beyond the expected answer.

Penalties:
- Deduct for content that is off-topic, factually wrong, or padded.
- An answer that ignores a directive word (critically examine, discuss, evaluate) cannot score above 50 on content.
- Keep the rubric sub-scores consistent with the overall score.

Respond with ONLY a JSON object, no commentary and no markdown fences, using exactly this schema:
{
  "rawOutOf100": <number 0-100>,
  "rubric": {
    "content_relevance_accuracy": <number>,
    "analysis_depth_linkages": <number>,
    "structure_intro_body_conclusion": <number>,
    "use_of_examples_cases_data_diagrams": <number>,
    "clarity_language_and_presentation": <number>,
    "value_add": <number>
  },
  "strengths": [<strings>],
  "weaknesses": [<strings>],
  "suggestions": [<strings>],
  "inline_comments": [<strings>]
}"#;

/// Instruction appended when the submission includes images.
///
/// Vision models will happily grade an unread photo; this forces the
/// recognition pass to happen first.
pub const RECOGNITION_INSTRUCTION: &str = "The answer (or part of it) is attached as images. \
First perform careful recognition of the handwriting or print in every image, \
then grade the recognised text exactly as you would typed text. \
If a section is illegible, treat it as missing content rather than guessing.";

/// Build the leading instruction block embedding the question and mark scheme.
pub fn instruction_block(
    question: &str,
    exam_type: &str,
    time_limit: Option<f64>,
    max_marks: f64,
) -> String {
    let mut block = format!(
        "Exam type: {exam_type}\nQuestion: {question}\nMaximum marks: {max_marks}\n"
    );
    if let Some(minutes) = time_limit {
        block.push_str(&format!("Time limit: {minutes} minutes\n"));
    }
    block.push_str(
        "Grade the candidate's answer below against the rubric. \
         Score out of 100 regardless of the maximum marks; scaling is handled by the caller.\n",
    );
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rubric_weights_are_stated() {
        for weight in ["[40]", "[20]", "[15]", "[10]", "[5]"] {
            assert!(
                RUBRIC_SYSTEM_PROMPT.contains(weight),
                "missing weight {weight}"
            );
        }
    }

    #[test]
    fn rubric_names_every_output_key() {
        for key in [
            "rawOutOf100",
            "content_relevance_accuracy",
            "analysis_depth_linkages",
            "structure_intro_body_conclusion",
            "use_of_examples_cases_data_diagrams",
            "clarity_language_and_presentation",
            "value_add",
            "strengths",
            "weaknesses",
            "suggestions",
            "inline_comments",
        ] {
            assert!(RUBRIC_SYSTEM_PROMPT.contains(key), "missing key {key}");
        }
    }

    #[test]
    fn instruction_block_embeds_fields() {
        let block = instruction_block("Discuss X", "GS", Some(10.0), 15.0);
        assert!(block.contains("Discuss X"));
        assert!(block.contains("GS"));
        assert!(block.contains("10 minutes"));
        assert!(block.contains("15"));
    }

    #[test]
    fn instruction_block_omits_absent_time_limit() {
        let block = instruction_block("Discuss X", "GS", None, 15.0);
        assert!(!block.contains("Time limit"));
    }
}
