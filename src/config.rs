//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; handlers only see the resulting
//! [`Config`] through shared state.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID for Firestore
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Directory where uploaded images are stored and served from
    pub uploads_dir: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 3000,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            uploads_dir: "uploads".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In production the secrets arrive as env vars injected by the
    /// deployment; locally a `.env` file works the same way.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
