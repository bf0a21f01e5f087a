pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod server;

pub use auth::{IdentityClaims, IdentityVerifier};
pub use config::AppConfig;
#[cfg(feature = "tch-backend")]
pub use model::ModelRuntime;
pub use model::{TranslationRequest, TranslationResponse, Translator};
pub use server::build_router;
