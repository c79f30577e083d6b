//! OAuth 2.0 client for the remote identity provider
//!
//! Implements the authorization-code grant with refresh tokens. The
//! token and revocation endpoints authenticate the application with
//! HTTP Basic credentials as the provider requires; token material only
//! ever travels in the form body.

use std::time::Duration;

use async_trait::async_trait;
use dealsync_core::ports::OAuthFlow;
use dealsync_domain::constants::NETWORK_TIMEOUT_SECS;
use dealsync_domain::{Result, SyncError, TokenSet};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::IntegrationConfig;

/// Scopes requested on authorization
const SCOPES: &[&str] = &[
    "openid",
    "profile",
    "contact_edit",
    "contact_show",
    "kb_invoice_edit",
    "kb_invoice_show",
    "kb_offer_edit",
    "kb_offer_show",
    "article_show",
];

/// Token endpoint response shape
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

/// OAuth 2.0 client bound to one application registration
#[derive(Debug)]
pub struct OAuthClient {
    config: IntegrationConfig,
    http: reqwest::Client,
}

impl OAuthClient {
    /// Create a client from the integration configuration.
    ///
    /// # Errors
    /// Returns `SyncError::Config` if the HTTP client cannot be built.
    pub fn new(config: IntegrationConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(NETWORK_TIMEOUT_SECS))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet> {
        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::TokenExchangeFailed(format!("{status}: {body}")));
        }

        let tokens: TokenResponse =
            response.json().await.map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(TokenSet::new(tokens.access_token, tokens.refresh_token, tokens.expires_in))
    }
}

#[async_trait]
impl OAuthFlow for OAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}&response_type=code",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
            urlencoding::encode(state),
        )
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        debug!("exchanging authorization code for tokens");
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.config.redirect_uri),
        ])
        .await
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet> {
        debug!("refreshing access token");
        self.token_request(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await
            .map_err(|e| match e {
                SyncError::TokenExchangeFailed(detail) => SyncError::TokenRefreshFailed(detail),
                other => other,
            })
    }

    #[instrument(skip(self, token))]
    async fn revoke(&self, token: &str) {
        let result = self
            .http
            .post(&self.config.revoke_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("token", token)])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("token revoked");
            }
            Ok(response) => {
                warn!(status = %response.status(), "token revocation rejected");
            }
            Err(e) => {
                warn!(error = %e, "token revocation request failed");
            }
        }
    }
}
