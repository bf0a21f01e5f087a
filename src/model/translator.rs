use async_trait::async_trait;

use crate::{
    error::ServiceError,
    model::{TranslationRequest, TranslationResponse},
};

/// Seam between the HTTP handlers and the inference backend.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResponse, ServiceError>;
}

/// Instruction template fed to the seq2seq model.
pub fn build_prompt(source_language: &str, target_language: &str, source_sentence: &str) -> String {
    format!("translate {source_language} to {target_language}: {source_sentence}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_follows_instruction_template() {
        assert_eq!(
            build_prompt("English", "Spanish", "Hello"),
            "translate English to Spanish: Hello"
        );
    }

    #[test]
    fn prompt_passes_language_names_through_verbatim() {
        // No whitelist at this layer; whatever the client sent goes in.
        assert_eq!(
            build_prompt("Klingon", "", "qapla'"),
            "translate Klingon to : qapla'"
        );
    }
}
