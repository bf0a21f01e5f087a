use serde::{Deserialize, Serialize};

/// Free-text fields throughout; language names are advisory and passed to
/// the model verbatim, never checked against the /languages list.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationRequest {
    pub source_language: String,
    pub target_language: String,
    pub source_sentence: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationResponse {
    pub translated_text: String,
}
