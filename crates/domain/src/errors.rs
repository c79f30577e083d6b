//! Error types used throughout the integration core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the accounting integration
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum SyncError {
    /// Encrypted envelope does not have the `iv:tag:ciphertext` structure
    #[error("Invalid encrypted envelope format")]
    InvalidEnvelopeFormat,

    /// Envelope structure was valid but authentication failed on decrypt
    #[error("Encrypted envelope failed authentication")]
    TamperedCiphertext,

    /// OAuth callback state failed structural validation (CSRF check)
    #[error("Invalid OAuth state parameter: {0}")]
    InvalidState(String),

    /// Authorization-code exchange was rejected by the identity provider
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Refresh-token exchange failed; the tenant must re-authorize
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Remote API returned 429; the caller decides whether to retry
    #[error("Rate limited by remote API, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    /// Remote API returned a non-success status
    #[error("Remote API error {status}: {body}")]
    RemoteApi { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Repository error: {0}")]
    Repository(String),

    /// Tenant has no stored credential record
    #[error("Accounting integration not connected: {0}")]
    NotConnected(String),
}

impl SyncError {
    /// Whether the error means the stored credential is unusable and the
    /// tenant has to run the authorization flow again.
    #[must_use]
    pub const fn requires_reauthorization(&self) -> bool {
        matches!(self, Self::TokenExchangeFailed(_) | Self::TokenRefreshFailed(_))
    }
}

/// Result type alias for integration operations
pub type Result<T> = std::result::Result<T, SyncError>;
