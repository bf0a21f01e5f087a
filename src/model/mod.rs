#[cfg(feature = "tch-backend")]
mod loader;
#[cfg(feature = "tch-backend")]
mod runtime;
mod translator;
mod types;

#[cfg(feature = "tch-backend")]
pub use loader::ModelArtifacts;
#[cfg(feature = "tch-backend")]
pub use runtime::ModelRuntime;
pub use translator::{Translator, build_prompt};
pub use types::{TranslationRequest, TranslationResponse};
