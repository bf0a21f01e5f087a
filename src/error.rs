use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("startup failure: {0}")]
    Startup(String),
    #[error("Invalid authentication credentials: {0}")]
    Auth(String),
    #[error("Translation error: {0}")]
    Translation(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Translation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Startup(_) | ServiceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "detail": self.to_string(),
        });

        // Bearer challenge required on every 401
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], axum::Json(body)).into_response()
        } else {
            (status, axum::Json(body)).into_response()
        }
    }
}
