use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

#[cfg(feature = "tch-backend")]
use tch::Device;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub service_account_path: PathBuf,
    pub allowed_origin: String,
    pub max_output_tokens: usize,
    pub require_auth: bool,
    #[cfg(feature = "tch-backend")]
    pub device: Device,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let listen_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".into())
            .parse()
            .unwrap_or_else(|_| SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8000));

        let model_path =
            PathBuf::from(env::var("MODEL_PATH").unwrap_or_else(|_| "model.pt".to_string()));
        let tokenizer_path = PathBuf::from(
            env::var("TOKENIZER_PATH").unwrap_or_else(|_| "tokenizer.json".to_string()),
        );
        let service_account_path = PathBuf::from(
            env::var("SERVICE_ACCOUNT_PATH")
                .unwrap_or_else(|_| "serviceAccountKey.json".to_string()),
        );

        let allowed_origin =
            env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let max_output_tokens = env::var("MAX_OUTPUT_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(256);

        let require_auth = env::var("REQUIRE_AUTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        // Device selection is an environment capability, fixed for the
        // process lifetime.
        #[cfg(feature = "tch-backend")]
        let device = Device::cuda_if_available();

        Ok(Self {
            listen_addr,
            model_path,
            tokenizer_path,
            service_account_path,
            allowed_origin,
            max_output_tokens,
            require_auth,
            #[cfg(feature = "tch-backend")]
            device,
        })
    }
}
