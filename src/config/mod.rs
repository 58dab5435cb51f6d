use serde::Deserialize;

use crate::services::gateway::ModelProtocol;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:5000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the colorization model server.
    #[serde(default = "default_model_server_url")]
    pub model_server_url: String,

    /// Wire protocol spoken to the model server: "multipart" or "base64".
    #[serde(default)]
    pub model_protocol: ModelProtocol,

    /// Directory colorized output images are stored in.
    #[serde(default = "default_processed_dir")]
    pub processed_dir: String,

    /// Seconds a job may sit in processing before a poll fails it.
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,

    /// Per-request timeout for model server calls, in seconds.
    #[serde(default = "default_model_request_timeout_secs")]
    pub model_request_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_model_server_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_processed_dir() -> String {
    "processed".to_string()
}

fn default_job_timeout_secs() -> u64 {
    300
}

fn default_model_request_timeout_secs() -> u64 {
    120
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
