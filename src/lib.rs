//! # scriptmark
//!
//! Grade written exam answers with a Vision Language Model against a fixed
//! rubric.
//!
//! ## Why this crate?
//!
//! Hand-marking essay answers is slow and inconsistent; naive "paste into a
//! chatbot" grading is unbounded and unstructured. scriptmark sits in
//! between: it reduces whatever the candidate uploads (typed documents,
//! slide decks, photographed handwriting) to a bounded payload, asks the
//! model for a schema-shaped verdict at low temperature, and normalizes
//! that verdict defensively so callers always receive a well-formed,
//! rescaled score.
//!
//! ## Pipeline Overview
//!
//! ```text
//! files (≤10)
//!  │
//!  ├─ 1. Assemble  PDF text (or page-render fallback), DOCX/PPTX runs,
//!  │               raw images → {texts, images}
//!  ├─ 2. Prompt    question + exam type + mark scheme + answer content,
//!  │               truncated at 150k chars, ≤12 images
//!  ├─ 3. Score     one vision-LLM call, rubric system prompt, temp 0.2
//!  ├─ 4. Parse     defensive JSON: absent fields → defaults, never a failure
//!  └─ 5. Rescale   clamp to [0,100], round(raw/100 × maxMarks)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scriptmark::{assemble, evaluate, EvaluationRequest, GraderConfig, LlmScorer, SubmittedFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = GraderConfig::default();
//!     let scorer = LlmScorer::from_config(&config)?;
//!
//!     let files = vec![SubmittedFile::new(
//!         "answer.pdf",
//!         Some("application/pdf"),
//!         std::fs::read("answer.pdf")?,
//!     )];
//!     let payload = assemble(&files, &config).await;
//!
//!     let request = EvaluationRequest {
//!         question: "Discuss the causes of the 1991 balance-of-payments crisis.".into(),
//!         max_marks: 15.0,
//!         texts: payload.texts,
//!         images: payload.images,
//!         ..Default::default()
//!     };
//!     let result = evaluate(&scorer, &request, &config).await?;
//!     println!("{}/{} marks", result.total_scaled, result.max_marks);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `scriptmark` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! scriptmark = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod error;
pub mod grade;
pub mod payload;
pub mod prompts;
pub mod score;
pub mod scorer;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{assemble, AssembledPayload};
pub use config::{GraderConfig, GraderConfigBuilder, Limits};
pub use error::{FileError, GraderError};
pub use grade::evaluate;
pub use payload::{EvaluationRequest, FileKind, FileStatus, ImageBlob, SubmittedFile, TextSource};
pub use score::{EvaluationResult, RubricScore};
pub use scorer::{LlmScorer, ModelRequest, ScoringModel};
pub use server::{create_router, AppState};
