//! Connection lifecycle for the accounting integration
//!
//! Connect (authorization URL), callback completion (state validation,
//! code exchange, credential storage) and disconnect (best-effort revoke,
//! credential removal). Transport-free: the host product's web layer
//! calls these from its own routes.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use dealsync_domain::{CredentialRecord, Result, SyncError};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::ports::{AccountingApiFactory, CredentialStore, OAuthFlow, TokenCipher};

/// State carried through the OAuth redirect
///
/// Encoded as base64 of JSON. Decoding enforces structural validity;
/// a malformed state aborts the callback flow (`InvalidState`) — this is
/// the CSRF/tenant-binding check and is never skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectState {
    pub tenant_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    /// Issuance timestamp, unix milliseconds
    pub issued_at: i64,
}

impl ConnectState {
    #[must_use]
    pub fn new(tenant_id: Uuid, return_url: Option<String>) -> Self {
        Self { tenant_id, return_url, issued_at: Utc::now().timestamp_millis() }
    }

    /// Encode as base64(JSON) for the `state` query parameter.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serializing a struct of these types cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        BASE64.encode(json)
    }

    /// Decode and structurally validate a `state` parameter.
    pub fn decode(state: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(state)
            .map_err(|_| SyncError::InvalidState("state is not valid base64".into()))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| SyncError::InvalidState("state payload failed validation".into()))
    }
}

/// Orchestrates connect, OAuth callback, and disconnect for one tenant
pub struct ConnectionService {
    oauth: Arc<dyn OAuthFlow>,
    cipher: Arc<dyn TokenCipher>,
    credentials: Arc<dyn CredentialStore>,
    api_factory: Arc<dyn AccountingApiFactory>,
}

impl ConnectionService {
    pub fn new(
        oauth: Arc<dyn OAuthFlow>,
        cipher: Arc<dyn TokenCipher>,
        credentials: Arc<dyn CredentialStore>,
        api_factory: Arc<dyn AccountingApiFactory>,
    ) -> Self {
        Self { oauth, cipher, credentials, api_factory }
    }

    /// Build the authorization URL that starts the OAuth flow for a
    /// tenant. The encoded state binds the callback to this tenant.
    #[must_use]
    pub fn connect_url(&self, tenant_id: Uuid, return_url: Option<String>) -> String {
        let state = ConnectState::new(tenant_id, return_url);
        self.oauth.authorization_url(&state.encode())
    }

    /// Complete the OAuth callback: validate state, exchange the code,
    /// encrypt and persist the tokens, then best-effort fetch the remote
    /// company profile for display purposes.
    #[instrument(skip(self, code, state))]
    pub async fn complete_callback(&self, code: &str, state: &str) -> Result<ConnectState> {
        let decoded = ConnectState::decode(state)?;
        let tenant_id = decoded.tenant_id;

        let tokens = self.oauth.exchange_code(code).await?;

        let record = CredentialRecord {
            tenant_id,
            access_token_envelope: self.cipher.encrypt(&tokens.access_token)?,
            refresh_token_envelope: self.cipher.encrypt(&tokens.refresh_token)?,
            expires_at: tokens.expires_at,
            remote_company_id: None,
            remote_company_name: None,
            connected_at: Utc::now(),
            last_synced_at: None,
        };
        self.credentials.record_connection(&record).await?;
        info!(%tenant_id, "accounting connection established");

        // The connection works without the profile; failures here are
        // logged and otherwise ignored.
        match self.fetch_company(tenant_id).await {
            Ok(()) => {}
            Err(e) => warn!(%tenant_id, error = %e, "could not fetch remote company profile"),
        }

        Ok(decoded)
    }

    /// Disconnect a tenant: revoke both tokens best-effort, then remove
    /// the credential record. Revocation failures are logged, not raised,
    /// because the remote tokens may already be invalid.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, tenant_id: Uuid) -> Result<()> {
        if let Some(record) = self.credentials.credentials(tenant_id).await? {
            for envelope in [&record.access_token_envelope, &record.refresh_token_envelope] {
                match self.cipher.decrypt(envelope) {
                    Ok(token) => self.oauth.revoke(&token).await,
                    Err(e) => warn!(%tenant_id, error = %e, "skipping revoke, envelope unreadable"),
                }
            }
        }

        self.credentials.clear_connection(tenant_id).await?;
        info!(%tenant_id, "accounting connection removed");
        Ok(())
    }

    async fn fetch_company(&self, tenant_id: Uuid) -> Result<()> {
        let api = self.api_factory.for_tenant(tenant_id).await?;
        let profile = api.company_profile().await?;
        self.credentials.record_company(tenant_id, profile.id, &profile.name).await
    }
}
