use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{Value, json};

use translingua_service::{
    AppConfig, IdentityVerifier, TranslationRequest, TranslationResponse, Translator,
    build_router,
    error::ServiceError,
    model::build_prompt,
};

/// Test double that echoes the prompt the runtime would feed the model.
struct EchoPromptTranslator;

#[async_trait]
impl Translator for EchoPromptTranslator {
    async fn translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResponse, ServiceError> {
        Ok(TranslationResponse {
            translated_text: build_prompt(
                &request.source_language,
                &request.target_language,
                &request.source_sentence,
            ),
        })
    }
}

struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(
        &self,
        _request: TranslationRequest,
    ) -> Result<TranslationResponse, ServiceError> {
        Err(ServiceError::Translation("model execution failed".into()))
    }
}

fn test_config(require_auth: bool) -> AppConfig {
    AppConfig {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        model_path: "model.pt".into(),
        tokenizer_path: "tokenizer.json".into(),
        service_account_path: "serviceAccountKey.json".into(),
        allowed_origin: "http://localhost:3000".into(),
        max_output_tokens: 256,
        require_auth,
        #[cfg(feature = "tch-backend")]
        device: tch::Device::Cpu,
    }
}

fn test_server(translator: Arc<dyn Translator>, require_auth: bool) -> TestServer {
    let config = Arc::new(test_config(require_auth));
    let verifier = Arc::new(IdentityVerifier::for_project("demo-project".into()));
    let router = build_router(config, translator, verifier).unwrap();
    TestServer::new(router).unwrap()
}

#[tokio::test]
async fn translate_returns_translated_text() {
    let server = test_server(Arc::new(EchoPromptTranslator), false);

    let response = server
        .post("/translate")
        .json(&json!({
            "source_language": "English",
            "target_language": "Spanish",
            "source_sentence": "Hello",
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(
        body["translated_text"],
        "translate English to Spanish: Hello"
    );
}

#[tokio::test]
async fn translate_accepts_unknown_language_names() {
    // Language names are advisory; nothing is validated against /languages.
    let server = test_server(Arc::new(EchoPromptTranslator), false);

    let response = server
        .post("/translate")
        .json(&json!({
            "source_language": "Klingon",
            "target_language": "Esperanto",
            "source_sentence": "nuqneH",
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert!(body["translated_text"].is_string());
}

#[tokio::test]
async fn translate_maps_runtime_failures_to_500() {
    let server = test_server(Arc::new(FailingTranslator), false);

    let response = server
        .post("/translate")
        .json(&json!({
            "source_language": "English",
            "target_language": "Spanish",
            "source_sentence": "Hello",
        }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("Translation error:")
    );
}

#[tokio::test]
async fn languages_is_a_pure_constant() {
    let server = test_server(Arc::new(EchoPromptTranslator), false);

    let first = server.get("/languages").await;
    first.assert_status(StatusCode::OK);
    let first_body: Value = first.json();
    let languages = first_body["languages"].as_array().unwrap();
    assert_eq!(languages.len(), 20);
    assert_eq!(languages[0], "English");
    assert_eq!(languages[19], "Indonesian");

    let second = server.get("/languages").await;
    let second_body: Value = second.json();
    assert_eq!(first_body, second_body);
}

#[tokio::test]
async fn enforced_translate_rejects_missing_authorization_header() {
    let server = test_server(Arc::new(EchoPromptTranslator), true);

    let response = server
        .post("/translate")
        .json(&json!({
            "source_language": "English",
            "target_language": "Spanish",
            "source_sentence": "Hello",
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(axum::http::header::WWW_AUTHENTICATE)
            .unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn enforced_translate_rejects_invalid_bearer_token() {
    let server = test_server(Arc::new(EchoPromptTranslator), true);

    let response = server
        .post("/translate")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer not-a-valid-token"),
        )
        .json(&json!({
            "source_language": "English",
            "target_language": "Spanish",
            "source_sentence": "Hello",
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("Invalid authentication credentials:")
    );
}

#[tokio::test]
async fn languages_stays_open_when_auth_is_enforced() {
    let server = test_server(Arc::new(EchoPromptTranslator), true);

    let response = server.get("/languages").await;
    response.assert_status(StatusCode::OK);
}
