use async_trait::async_trait;
use tokio::task;

use crate::{
    config::AppConfig,
    error::ServiceError,
    model::{
        TranslationRequest, TranslationResponse, build_prompt, loader::ModelArtifacts,
        translator::Translator,
    },
};

/// Owns the loaded model and tokenizer for the process lifetime. Loaded once
/// at startup, read-only afterwards; never reloaded or torn down.
pub struct ModelRuntime {
    artifacts: ModelArtifacts,
    max_output_tokens: usize,
}

impl ModelRuntime {
    pub fn initialize(config: &AppConfig) -> Result<Self, ServiceError> {
        let artifacts = ModelArtifacts::load(config)?;
        Ok(Self {
            artifacts,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl Translator for ModelRuntime {
    async fn translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResponse, ServiceError> {
        let prompt = build_prompt(
            &request.source_language,
            &request.target_language,
            &request.source_sentence,
        );

        let tokenizer = self.artifacts.tokenizer.clone();
        let model = self.artifacts.model.clone();
        let max_output_tokens = self.max_output_tokens;

        // Generation is blocking CPU/GPU work; keep it off the async runtime.
        let translated_text = task::spawn_blocking(move || {
            model.generate(&tokenizer, &prompt, max_output_tokens)
        })
        .await
        .map_err(|err| ServiceError::Translation(format!("inference task failed: {err}")))??;

        Ok(TranslationResponse { translated_text })
    }
}
