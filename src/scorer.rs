//! The scoring-model seam: one trait, one production implementation.
//!
//! The orchestrator is generic over [`ScoringModel`] so tests can grade
//! against a canned verdict and the server can be exercised without
//! network access. The only production implementation, [`LlmScorer`],
//! wraps an `edgequake_llm` provider and performs exactly one chat
//! completion per request — no retry, no streaming, no caching.

use crate::config::GraderConfig;
use crate::error::GraderError;
use crate::payload::ImageBlob;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Model used when neither the config nor the environment names one.
const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Everything the model needs for one scoring call.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// System instruction (the rubric prompt).
    pub system: String,
    /// Assembled user content: instruction block + answer text.
    pub user_text: String,
    /// Inline images, already capped by the orchestrator.
    pub images: Vec<ImageBlob>,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// A model that can score one assembled submission.
///
/// Implementations must be cheap to share across requests; the server
/// holds one instance for the process lifetime.
pub trait ScoringModel: Send + Sync {
    /// Run one completion and return the raw model output.
    ///
    /// The output is expected to be the verdict JSON but is treated as an
    /// untrusted string: parsing and all defensive defaults happen in the
    /// orchestrator, not here.
    fn score(
        &self,
        request: ModelRequest,
    ) -> impl Future<Output = Result<String, GraderError>> + Send;
}

/// Production scorer over an `edgequake_llm` provider.
#[derive(Clone)]
pub struct LlmScorer {
    provider: Arc<dyn LLMProvider>,
}

impl LlmScorer {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the provider from the config, from most-specific to
    /// least-specific:
    ///
    /// 1. **Pre-built provider** (`config.provider`) — the caller
    ///    constructed it entirely; used as-is.
    /// 2. **Named provider + model** (`config.provider_name`) — reads the
    ///    corresponding API key (`OPENAI_API_KEY`, etc.) from the
    ///    environment.
    /// 3. **Environment pair** (`SCRIPTMARK_LLM_PROVIDER` +
    ///    `SCRIPTMARK_MODEL`) — a deployment-level choice, honoured even
    ///    when multiple API keys are present.
    /// 4. **Full auto-detection** — prefer OpenAI when its key is set,
    ///    else let `ProviderFactory::from_env` scan all known keys.
    pub fn from_config(config: &GraderConfig) -> Result<Self, GraderError> {
        if let Some(ref provider) = config.provider {
            return Ok(Self::new(Arc::clone(provider)));
        }

        if let Some(ref name) = config.provider_name {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider(name, model).map(Self::new);
        }

        if let (Ok(prov), Ok(model)) = (
            std::env::var("SCRIPTMARK_LLM_PROVIDER"),
            std::env::var("SCRIPTMARK_MODEL"),
        ) {
            if !prov.is_empty() && !model.is_empty() {
                return create_provider(&prov, &model).map(Self::new);
            }
        }

        // Prefer OpenAI explicitly when an OpenAI API key is present, so
        // users with multiple provider keys get a deterministic default.
        if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
            if !openai_key.is_empty() {
                let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
                return create_provider("openai", model).map(Self::new);
            }
        }

        let (llm_provider, _embedding) =
            ProviderFactory::from_env().map_err(|e| GraderError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                     Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                     Error: {}",
                    e
                ),
            })?;

        Ok(Self::new(llm_provider))
    }
}

/// Instantiate a named provider with the given model.
fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, GraderError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        GraderError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

impl ScoringModel for LlmScorer {
    async fn score(&self, request: ModelRequest) -> Result<String, GraderError> {
        let image_data: Vec<ImageData> = request
            .images
            .iter()
            .map(|blob: &ImageBlob| {
                ImageData::new(blob.base64_payload().to_string(), &blob.mime)
                    .with_detail("high")
            })
            .collect();

        // One system turn carrying the rubric, one user turn carrying the
        // submission; the images ride on the user turn.
        let messages = vec![
            ChatMessage::system(request.system),
            ChatMessage::user_with_images(request.user_text, image_data),
        ];

        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| GraderError::ModelCallFailed {
                message: format!("{e}"),
            })?;

        debug!(
            "Verdict received: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        Ok(response.content)
    }
}
