//! Orchestrator integration tests with a canned scoring model.
//!
//! The stub records the exact `ModelRequest` the orchestrator built, so
//! these tests pin down prompt composition (instruction block, source
//! labels, truncation, image cap, recognition note) as well as verdict
//! normalization — without any network access.

use scriptmark::{
    evaluate, EvaluationRequest, GraderConfig, GraderError, ImageBlob, ModelRequest, ScoringModel,
    TextSource,
};
use std::sync::Mutex;

/// Scorer returning a fixed reply and capturing what it was asked.
struct StubScorer {
    reply: Result<String, String>,
    seen: Mutex<Option<ModelRequest>>,
}

impl StubScorer {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            seen: Mutex::new(None),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            seen: Mutex::new(None),
        }
    }

    fn seen(&self) -> ModelRequest {
        self.seen
            .lock()
            .unwrap()
            .clone()
            .expect("scorer was never called")
    }
}

impl ScoringModel for StubScorer {
    async fn score(&self, request: ModelRequest) -> Result<String, GraderError> {
        *self.seen.lock().unwrap() = Some(request);
        self.reply
            .clone()
            .map_err(|message| GraderError::ModelCallFailed { message })
    }
}

fn request_with_text(question: &str, max_marks: f64, text: &str) -> EvaluationRequest {
    EvaluationRequest {
        question: question.to_string(),
        max_marks,
        texts: vec![TextSource {
            source: "a.docx".to_string(),
            text: text.to_string(),
        }],
        ..Default::default()
    }
}

#[tokio::test]
async fn end_to_end_scaling() {
    let scorer = StubScorer::replying(
        r#"{"rawOutOf100": 70, "rubric": {"content_relevance_accuracy": 30,
            "analysis_depth_linkages": 14, "structure_intro_body_conclusion": 10,
            "use_of_examples_cases_data_diagrams": 7,
            "clarity_language_and_presentation": 6, "value_add": 3},
            "strengths": ["focused"], "weaknesses": [], "suggestions": [],
            "inline_comments": []}"#,
    );
    let request = request_with_text("Discuss X", 15.0, "the answer body");
    let result = evaluate(&scorer, &request, &GraderConfig::default())
        .await
        .unwrap();

    assert_eq!(result.raw_out_of_100, 70.0);
    assert_eq!(result.total_scaled, 11); // round(70/100 * 15)
    assert_eq!(result.max_marks, 15.0);
    assert_eq!(result.strengths, vec!["focused"]);
}

#[tokio::test]
async fn prompt_embeds_question_and_source_labels() {
    let scorer = StubScorer::replying("{}");
    let request = request_with_text("Discuss the 73rd Amendment", 10.0, "panchayati raj");
    evaluate(&scorer, &request, &GraderConfig::default())
        .await
        .unwrap();

    let seen = scorer.seen();
    assert!(seen.user_text.contains("Discuss the 73rd Amendment"));
    assert!(seen.user_text.contains("### Source: a.docx"));
    assert!(seen.user_text.contains("panchayati raj"));
    assert!(seen.user_text.contains("Exam type: GS"), "default exam type");
    assert_eq!(seen.temperature, 0.2);
    assert!(seen.system.contains("content_relevance_accuracy"));
}

#[tokio::test]
async fn oversized_text_is_truncated_with_marker() {
    let scorer = StubScorer::replying("{}");
    let request = request_with_text("Q", 10.0, &"x".repeat(200_000));
    evaluate(&scorer, &request, &GraderConfig::default())
        .await
        .unwrap();

    let seen = scorer.seen();
    assert!(seen.user_text.contains("...[trimmed]"));
    // The answer block is capped even though the surrounding instruction
    // text adds a little on top.
    assert!(seen.user_text.len() < 151_000);
}

#[tokio::test]
async fn images_are_capped_and_trigger_recognition_note() {
    let scorer = StubScorer::replying("{}");
    let request = EvaluationRequest {
        question: "Q".to_string(),
        max_marks: 10.0,
        images: (0..20)
            .map(|_| ImageBlob::from_bytes("image/jpeg", b"img"))
            .collect(),
        ..Default::default()
    };
    evaluate(&scorer, &request, &GraderConfig::default())
        .await
        .unwrap();

    let seen = scorer.seen();
    assert_eq!(seen.images.len(), 12);
    assert!(seen.user_text.contains("recognition"));
}

#[tokio::test]
async fn text_only_request_has_no_recognition_note() {
    let scorer = StubScorer::replying("{}");
    let request = request_with_text("Q", 10.0, "typed answer");
    evaluate(&scorer, &request, &GraderConfig::default())
        .await
        .unwrap();
    assert!(!scorer.seen().user_text.contains("recognition"));
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let scorer = StubScorer::replying("{}");
    let request = request_with_text("   ", 10.0, "body");
    let err = evaluate(&scorer, &request, &GraderConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GraderError::MissingQuestion));
}

#[tokio::test]
async fn non_positive_marks_are_rejected() {
    let scorer = StubScorer::replying("{}");
    for max_marks in [0.0, -5.0, f64::NAN] {
        let request = request_with_text("Q", max_marks, "body");
        let err = evaluate(&scorer, &request, &GraderConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GraderError::InvalidMaxMarks { .. }));
    }
}

#[tokio::test]
async fn garbled_verdict_degrades_to_zero() {
    let scorer = StubScorer::replying("Sorry, I cannot grade this.");
    let request = request_with_text("Q", 15.0, "body");
    let result = evaluate(&scorer, &request, &GraderConfig::default())
        .await
        .unwrap();
    assert_eq!(result.raw_out_of_100, 0.0);
    assert_eq!(result.total_scaled, 0);
    assert!(result.strengths.is_empty());
}

#[tokio::test]
async fn model_call_failure_is_fatal() {
    let scorer = StubScorer::failing("upstream 503");
    let request = request_with_text("Q", 15.0, "body");
    let err = evaluate(&scorer, &request, &GraderConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GraderError::ModelCallFailed { .. }));
}

#[tokio::test]
async fn explicit_exam_type_overrides_default() {
    let scorer = StubScorer::replying("{}");
    let request = EvaluationRequest {
        exam_type: Some("Law".to_string()),
        time_limit: Some(8.0),
        ..request_with_text("Q", 10.0, "body")
    };
    evaluate(&scorer, &request, &GraderConfig::default())
        .await
        .unwrap();
    let seen = scorer.seen();
    assert!(seen.user_text.contains("Exam type: Law"));
    assert!(seen.user_text.contains("8 minutes"));
}
