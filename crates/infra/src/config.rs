//! Configuration loader
//!
//! Loads the integration configuration from environment variables.
//!
//! ## Environment Variables
//! - `DEALSYNC_CLIENT_ID`: OAuth client id (required)
//! - `DEALSYNC_CLIENT_SECRET`: OAuth client secret (required)
//! - `DEALSYNC_REDIRECT_URI`: OAuth callback URL (required)
//! - `DEALSYNC_ENCRYPTION_KEY`: master secret for the credential vault;
//!   falls back to `DEALSYNC_SERVICE_SECRET` when unset
//! - `DEALSYNC_API_BASE_URL`, `DEALSYNC_AUTHORIZE_URL`,
//!   `DEALSYNC_TOKEN_URL`, `DEALSYNC_REVOKE_URL`: endpoint overrides,
//!   defaulting to the remote platform's production endpoints

use dealsync_domain::{Result, SyncError};

/// Default remote API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.bexio.com";
/// Default authorization endpoint
pub const DEFAULT_AUTHORIZE_URL: &str = "https://idp.bexio.com/authorize";
/// Default token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://idp.bexio.com/token";
/// Default revocation endpoint
pub const DEFAULT_REVOKE_URL: &str = "https://idp.bexio.com/revoke";

/// Configuration for the accounting integration
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Long-lived secret the vault key is derived from
    pub encryption_secret: String,
    pub api_base_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub revoke_url: String,
}

impl IntegrationConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns `SyncError::Config` when a required variable is missing.
    pub fn from_env() -> Result<Self> {
        let encryption_secret = std::env::var("DEALSYNC_ENCRYPTION_KEY")
            .or_else(|_| std::env::var("DEALSYNC_SERVICE_SECRET"))
            .map_err(|_| {
                SyncError::Config(
                    "no encryption key available; set DEALSYNC_ENCRYPTION_KEY or \
                     DEALSYNC_SERVICE_SECRET"
                        .into(),
                )
            })?;

        let config = Self {
            client_id: env_var("DEALSYNC_CLIENT_ID")?,
            client_secret: env_var("DEALSYNC_CLIENT_SECRET")?,
            redirect_uri: env_var("DEALSYNC_REDIRECT_URI")?,
            encryption_secret,
            api_base_url: env_or("DEALSYNC_API_BASE_URL", DEFAULT_API_BASE_URL),
            authorize_url: env_or("DEALSYNC_AUTHORIZE_URL", DEFAULT_AUTHORIZE_URL),
            token_url: env_or("DEALSYNC_TOKEN_URL", DEFAULT_TOKEN_URL),
            revoke_url: env_or("DEALSYNC_REVOKE_URL", DEFAULT_REVOKE_URL),
        };

        tracing::debug!("integration configuration loaded from environment");
        Ok(config)
    }
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| SyncError::Config(format!("missing environment variable: {name}")))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
