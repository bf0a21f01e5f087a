use std::{collections::HashMap, path::Path, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::Deserialize;

use crate::{error::ServiceError, server::AppState};

const JWK_SET_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    project_id: String,
    client_email: String,
}

/// Decoded identity attributes of a verified bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub aud: String,
    pub iss: String,
    pub exp: u64,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonWebKey {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JsonWebKeySet {
    keys: Vec<JsonWebKey>,
}

/// Delegates all signature and expiry checking to the identity provider's
/// published signing keys; no cryptographic logic lives in this crate.
pub struct IdentityVerifier {
    project_id: String,
    http: reqwest::Client,
    keys: RwLock<HashMap<String, JsonWebKey>>,
}

static VERIFIER: OnceCell<Arc<IdentityVerifier>> = OnceCell::new();

impl IdentityVerifier {
    /// Reads the service-account credential file and registers the verifier
    /// process-wide. Idempotent: a second call returns the existing instance.
    pub fn initialize(service_account_path: &Path) -> Result<Arc<Self>, ServiceError> {
        if let Some(existing) = VERIFIER.get() {
            return Ok(existing.clone());
        }

        let raw = std::fs::read_to_string(service_account_path).map_err(|e| {
            ServiceError::Startup(format!(
                "service account file unreadable at {}: {e}",
                service_account_path.display()
            ))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| ServiceError::Startup(format!("service account file malformed: {e}")))?;

        tracing::info!(
            project_id = %key.project_id,
            client_email = %key.client_email,
            "identity provider initialized"
        );

        let verifier = Arc::new(Self::for_project(key.project_id));
        let _ = VERIFIER.set(verifier.clone());
        Ok(verifier)
    }

    pub fn for_project(project_id: String) -> Self {
        Self {
            project_id,
            http: reqwest::Client::new(),
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Verifies an opaque bearer token and returns its decoded claims. Every
    /// failure cause maps to `ServiceError::Auth`, carrying the underlying
    /// message as diagnostic detail.
    pub async fn verify(&self, token: &str) -> Result<IdentityClaims, ServiceError> {
        let header = decode_header(token).map_err(|e| ServiceError::Auth(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| ServiceError::Auth("token header missing key id".into()))?;

        let jwk = self.signing_key(&kid).await?;
        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| ServiceError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[format!(
            "https://securetoken.google.com/{}",
            self.project_id
        )]);

        let data = decode::<IdentityClaims>(token, &decoding_key, &validation)
            .map_err(|e| ServiceError::Auth(e.to_string()))?;
        Ok(data.claims)
    }

    async fn signing_key(&self, kid: &str) -> Result<JsonWebKey, ServiceError> {
        if let Some(key) = self.keys.read().get(kid) {
            return Ok(key.clone());
        }

        // Cache miss: the provider rotates keys, so refresh the whole set.
        let set: JsonWebKeySet = self
            .http
            .get(JWK_SET_URL)
            .send()
            .await
            .map_err(|e| ServiceError::Auth(format!("identity provider unreachable: {e}")))?
            .json()
            .await
            .map_err(|e| ServiceError::Auth(format!("identity provider response invalid: {e}")))?;

        let mut keys = self.keys.write();
        for key in set.keys {
            keys.insert(key.kid.clone(), key);
        }
        keys.get(kid)
            .cloned()
            .ok_or_else(|| ServiceError::Auth(format!("no signing key for kid {kid}")))
    }
}

/// Route-level middleware enforcing `Authorization: Bearer <token>`. Verified
/// claims are stored in request extensions for downstream handlers.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ServiceError::Auth("authorization header missing".into()))?;
    let claims = state.verifier.verify(token).await?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
