//! Application configuration.
//!
//! Values come from a YAML file (see `cli::runtime::load_config`) and are then
//! overridden by environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_API_URL: &str = "API_URL";
pub const ENV_DB_URI: &str = "DB_URI";
pub const ENV_MODEL_ID: &str = "SCA_MODEL_ID";
pub const ENV_INDEX_PATH: &str = "SCA_INDEX_PATH";
pub const ENV_CSV_PATH: &str = "SCA_CSV_PATH";
pub const ENV_ROUTER_RULES: &str = "SCA_ROUTER_RULES";
pub const ENV_SERVER_PORT: &str = "SCA_PORT";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub retrieval: RetrievalConfig,
    pub documents: DocumentsConfig,
    pub server: ServerConfig,
    pub policy: PolicyConfig,
    pub router: RouterSettings,
}

/// HTTP model gateway used for answers and embeddings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub api_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model_id: String,
    pub embedding_model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// humantime string, e.g. `30s`.
    pub timeout: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            model_id: "claude-3.5-sonnet".into(),
            embedding_model_id: "amazon-embedding-v2".into(),
            max_tokens: 512,
            temperature: 0.3,
            timeout: "30s".into(),
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        match humantime::parse_duration(self.timeout.trim()) {
            Ok(duration) => duration,
            Err(err) => {
                warn!(value = %self.timeout, ?err, "invalid gateway timeout; using 30s");
                Duration::from_secs(30)
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_uri: String,
    pub csv_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_uri: "sqlite://data/inventory.db".into(),
            csv_path: PathBuf::from("data/DataCoSupplyChainDataset.csv"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub index_path: PathBuf,
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("vectorstore/index.json"),
            top_k: 4,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub context_passages: usize,
    pub format_answers: bool,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            context_passages: agent_core::DEFAULT_CONTEXT_PASSAGES,
            format_answers: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".into(),
                "http://localhost:5173".into(),
            ],
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    pub rules_path: Option<PathBuf>,
}

impl AppConfig {
    /// Environment variables win over file values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = env_value(ENV_API_KEY) {
            self.gateway.api_key = value;
        }
        if let Some(value) = env_value(ENV_API_URL) {
            self.gateway.api_url = value;
        }
        if let Some(value) = env_value(ENV_MODEL_ID) {
            self.gateway.model_id = value;
        }
        if let Some(value) = env_value(ENV_DB_URI) {
            self.storage.db_uri = value;
        }
        if let Some(value) = env_value(ENV_CSV_PATH) {
            self.storage.csv_path = PathBuf::from(value);
        }
        if let Some(value) = env_value(ENV_INDEX_PATH) {
            self.retrieval.index_path = PathBuf::from(value);
        }
        if let Some(value) = env_value(ENV_ROUTER_RULES) {
            self.router.rules_path = Some(PathBuf::from(value));
        }
        if let Some(value) = env_value(ENV_SERVER_PORT) {
            match value.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(%value, "ignoring invalid {ENV_SERVER_PORT}"),
            }
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
