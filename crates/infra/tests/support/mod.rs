//! Shared test doubles for the infra integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealsync_core::ports::{CredentialStore, OAuthFlow, TokenCipher};
use dealsync_domain::{CredentialRecord, Result, SyncError, TokenSet};
use uuid::Uuid;

/// OAuth double that counts refreshes and holds each one briefly, so
/// overlapping callers would be caught double-refreshing.
#[derive(Default)]
pub struct CountingOAuth {
    pub refresh_calls: AtomicUsize,
    pub fail_refresh: bool,
}

impl CountingOAuth {
    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthFlow for CountingOAuth {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://idp.test/authorize?state={state}")
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenSet> {
        Ok(TokenSet::new("access-exchanged".into(), "refresh-exchanged".into(), 3600))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenSet> {
        let call = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_refresh {
            return Err(SyncError::TokenRefreshFailed("invalid_grant".into()));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(TokenSet::new(format!("access-refreshed-{call}"), "refresh-rotated".into(), 3600))
    }

    async fn revoke(&self, _token: &str) {}
}

/// Reversible stand-in cipher; envelopes are the plaintext with a prefix.
pub struct PrefixCipher;

impl TokenCipher for PrefixCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        Ok(format!("enc:{plaintext}"))
    }

    fn decrypt(&self, envelope: &str) -> Result<String> {
        envelope
            .strip_prefix("enc:")
            .map(str::to_string)
            .ok_or(SyncError::InvalidEnvelopeFormat)
    }
}

/// Credential store double recording every token save.
#[derive(Default)]
pub struct RecordingStore {
    pub record: Mutex<Option<CredentialRecord>>,
    pub saved_tokens: Mutex<Vec<(String, String, DateTime<Utc>)>>,
}

#[async_trait]
impl CredentialStore for RecordingStore {
    async fn credentials(&self, _tenant_id: Uuid) -> Result<Option<CredentialRecord>> {
        Ok(self.record.lock().unwrap().clone())
    }

    async fn save_tokens(
        &self,
        _tenant_id: Uuid,
        access_token_envelope: &str,
        refresh_token_envelope: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.saved_tokens.lock().unwrap().push((
            access_token_envelope.to_string(),
            refresh_token_envelope.to_string(),
            expires_at,
        ));
        Ok(())
    }

    async fn record_connection(&self, record: &CredentialRecord) -> Result<()> {
        *self.record.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    async fn record_company(
        &self,
        _tenant_id: Uuid,
        _company_id: i64,
        _company_name: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn clear_connection(&self, _tenant_id: Uuid) -> Result<()> {
        *self.record.lock().unwrap() = None;
        Ok(())
    }

    async fn set_last_synced(&self, _tenant_id: Uuid, _synced_at: DateTime<Utc>) -> Result<()> {
        Ok(())
    }
}

/// Credential record whose access token expires `expires_in_secs` from now.
pub fn record_expiring_in(tenant_id: Uuid, expires_in_secs: i64) -> CredentialRecord {
    CredentialRecord {
        tenant_id,
        access_token_envelope: "enc:access-stored".into(),
        refresh_token_envelope: "enc:refresh-stored".into(),
        expires_at: Utc::now() + chrono::Duration::seconds(expires_in_secs),
        remote_company_id: None,
        remote_company_name: None,
        connected_at: Utc::now(),
        last_synced_at: None,
    }
}
