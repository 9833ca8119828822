//! Configuration types for answer-sheet grading.
//!
//! All behaviour is controlled through [`GraderConfig`], built via its
//! [`GraderConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the config across the server state, serialise the
//! limits for logging, and diff two runs to understand why their outputs
//! differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::GraderError;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Structural resource bounds enforced during assembly and prompting.
///
/// These are caps, not tuning knobs: they exist so no request can hand the
/// model unbounded input, and they are enforced in code rather than left to
/// backpressure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    /// Files processed per submission; excess is silently truncated. Default: 10.
    pub max_files: usize,

    /// Images forwarded to the model per request. Default: 12.
    pub max_images: usize,

    /// PDF pages consulted for text extraction. Default: 20.
    pub pdf_text_pages: usize,

    /// PDF pages rendered to images when text extraction falls short. Default: 8.
    ///
    /// Smaller than the text cap on purpose: each rendered page is an
    /// expensive vision input, whereas page text is nearly free.
    pub pdf_render_pages: usize,

    /// Minimum extracted-text length (chars) for a PDF to count as digital
    /// rather than scanned. Default: 500.
    ///
    /// Below this the whole document is re-submitted as rendered page
    /// images instead — a binary choice, never a mix of both.
    pub pdf_text_threshold: usize,

    /// PPTX slides consulted. Default: 40.
    pub max_slides: usize,

    /// Hard cap (chars) on the concatenated text block sent to the model.
    /// Default: 150,000.
    pub max_text_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_images: 12,
            pdf_text_pages: 20,
            pdf_render_pages: 8,
            pdf_text_threshold: 500,
            max_slides: 40,
            max_text_chars: 150_000,
        }
    }
}

/// Configuration for grading a submission.
///
/// Built via [`GraderConfig::builder()`] or using
/// [`GraderConfig::default()`].
///
/// # Example
/// ```rust
/// use scriptmark::GraderConfig;
///
/// let config = GraderConfig::builder()
///     .model("gpt-4.1-mini")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GraderConfig {
    /// LLM model identifier, e.g. "gpt-4.1-mini", "claude-sonnet-4-20250514".
    /// If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, uses `ProviderFactory::from_env()`.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the scoring completion. Default: 0.2.
    ///
    /// Pinned low so repeated submissions of the same answer earn nearly
    /// the same marks. Higher values introduce run-to-run variance that is
    /// indefensible in a grading context.
    pub temperature: f32,

    /// Maximum tokens the model may generate per verdict. Default: 4096.
    ///
    /// The verdict JSON with six rubric dimensions plus inline comments
    /// rarely exceeds 1,500 output tokens; 4,096 leaves comfortable room
    /// for long feedback lists without ever truncating mid-object.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses the built-in rubric prompt.
    pub system_prompt: Option<String>,

    /// Exam type label used when a request omits one. Default: "GS".
    pub default_exam_type: String,

    /// Maximum rendered image dimension (width or height) in pixels for
    /// PDF fallback renders. Default: 1600.
    ///
    /// A safety cap so an A0-sized scan cannot exhaust memory; large
    /// enough that handwriting stays legible to the vision model.
    pub max_rendered_pixels: u32,

    /// Structural resource bounds. See [`Limits`].
    pub limits: Limits,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 4096,
            system_prompt: None,
            default_exam_type: "GS".to_string(),
            max_rendered_pixels: 1600,
            limits: Limits::default(),
        }
    }
}

impl fmt::Debug for GraderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraderConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("default_exam_type", &self.default_exam_type)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("limits", &self.limits)
            .finish()
    }
}

impl GraderConfig {
    /// Create a new builder for `GraderConfig`.
    pub fn builder() -> GraderConfigBuilder {
        GraderConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GraderConfig`].
#[derive(Debug)]
pub struct GraderConfigBuilder {
    config: GraderConfig,
}

impl GraderConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn default_exam_type(mut self, t: impl Into<String>) -> Self {
        self.config.default_exam_type = t.into();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GraderConfig, GraderError> {
        let c = &self.config;
        if c.limits.max_files == 0 {
            return Err(GraderError::InvalidConfig(
                "max_files must be ≥ 1".into(),
            ));
        }
        if c.limits.max_text_chars == 0 {
            return Err(GraderError::InvalidConfig(
                "max_text_chars must be ≥ 1".into(),
            ));
        }
        if c.limits.pdf_render_pages == 0 {
            return Err(GraderError::InvalidConfig(
                "pdf_render_pages must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
