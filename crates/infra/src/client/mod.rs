//! Rate-limited authenticated client for the remote accounting API
//!
//! Every call goes through the same pipeline: ensure a fresh access
//! token (refreshing and re-persisting it when inside the expiry
//! buffer), wait for a pacing slot, then send with bearer
//! authentication. Token state lives behind an async mutex that is held
//! across the whole check-refresh-persist sequence, so concurrent
//! callers trigger at most one refresh and all reuse its result.

mod pacer;

pub use pacer::RequestPacer;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealsync_core::ports::{
    AccountingApi, AccountingApiFactory, CredentialStore, OAuthFlow, TokenCipher,
};
use dealsync_core::remote::{
    CompanyProfile, Contact, ContactPayload, ContactSearchCriterion, InvoicePayload, InvoicePdf,
    RemoteInvoice, SendInvoicePayload, SendInvoiceResult,
};
use dealsync_domain::constants::{
    DEFAULT_RETRY_AFTER_SECS, NETWORK_TIMEOUT_SECS, REQUEST_MIN_INTERVAL_MS,
    TOKEN_REFRESH_BUFFER_SECS,
};
use dealsync_domain::{CredentialRecord, Result, SyncError};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Append offset/limit query parameters to a list endpoint path.
fn paged(path: &str, offset: Option<u32>, limit: Option<u32>) -> String {
    let mut params = Vec::new();
    if let Some(offset) = offset {
        params.push(format!("offset={offset}"));
    }
    if let Some(limit) = limit {
        params.push(format!("limit={limit}"));
    }
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", params.join("&"))
    }
}

/// Decrypted token material held in memory for the client's lifetime
#[derive(Debug, Clone)]
struct TokenState {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

/// Authenticated client bound to one tenant's stored credential
pub struct AccountingClient {
    tenant_id: Uuid,
    base_url: String,
    http: reqwest::Client,
    oauth: Arc<dyn OAuthFlow>,
    cipher: Arc<dyn TokenCipher>,
    store: Arc<dyn CredentialStore>,
    token: Mutex<TokenState>,
    pacer: RequestPacer,
    refresh_buffer: chrono::Duration,
}

impl AccountingClient {
    /// Build a client from a stored credential record, decrypting its
    /// token envelopes.
    ///
    /// # Errors
    /// Returns envelope errors when the stored material cannot be
    /// decrypted, or `SyncError::Config` if the HTTP client cannot be
    /// built.
    pub fn from_record(
        record: &CredentialRecord,
        base_url: &str,
        oauth: Arc<dyn OAuthFlow>,
        cipher: Arc<dyn TokenCipher>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        let token = TokenState {
            access_token: cipher.decrypt(&record.access_token_envelope)?,
            refresh_token: cipher.decrypt(&record.refresh_token_envelope)?,
            expires_at: record.expires_at,
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(NETWORK_TIMEOUT_SECS))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            tenant_id: record.tenant_id,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            oauth,
            cipher,
            store,
            token: Mutex::new(token),
            pacer: RequestPacer::new(Duration::from_millis(REQUEST_MIN_INTERVAL_MS)),
            refresh_buffer: chrono::Duration::seconds(TOKEN_REFRESH_BUFFER_SECS),
        })
    }

    /// Override the pacing interval (tests)
    #[must_use]
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.pacer = RequestPacer::new(interval);
        self
    }

    /// Override the refresh buffer (tests)
    #[must_use]
    pub fn with_refresh_buffer(mut self, buffer: chrono::Duration) -> Self {
        self.refresh_buffer = buffer;
        self
    }

    /// Return an access token valid for at least the refresh buffer,
    /// refreshing and re-persisting the credential when necessary.
    ///
    /// The token lock is held across the refresh so concurrent requests
    /// wait for the in-flight refresh instead of racing their own.
    async fn ensure_fresh_token(&self) -> Result<String> {
        let mut state = self.token.lock().await;

        if Utc::now() + self.refresh_buffer < state.expires_at {
            return Ok(state.access_token.clone());
        }

        debug!(tenant_id = %self.tenant_id, "access token near expiry, refreshing");
        let refreshed = self.oauth.refresh(&state.refresh_token).await?;

        let access_envelope = self.cipher.encrypt(&refreshed.access_token)?;
        let refresh_envelope = self.cipher.encrypt(&refreshed.refresh_token)?;
        self.store
            .save_tokens(self.tenant_id, &access_envelope, &refresh_envelope, refreshed.expires_at)
            .await?;

        state.access_token = refreshed.access_token;
        state.refresh_token = refreshed.refresh_token;
        state.expires_at = refreshed.expires_at;
        Ok(state.access_token.clone())
    }

    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let access_token = self.ensure_fresh_token().await?;
        self.pacer.wait_turn().await;

        let url = format!("{}{path}", self.base_url);
        let mut builder = self.http.request(method, &url).bearer_auth(access_token);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| SyncError::Network(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_seconds = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!(tenant_id = %self.tenant_id, retry_after_seconds, "remote API rate limit hit");
            return Err(SyncError::RateLimited { retry_after_seconds });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(T::default());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RemoteApi { status: status.as_u16(), body });
        }

        response.json().await.map_err(|e| SyncError::Network(e.to_string()))
    }

    async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        self.request(Method::GET, path, None::<&()>).await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// List contacts, optionally paginated
    pub async fn contacts(&self, offset: Option<u32>, limit: Option<u32>) -> Result<Vec<Contact>> {
        self.get(&paged("/2.0/contact", offset, limit)).await
    }

    /// Read one contact by remote id
    pub async fn contact(&self, remote_id: i64) -> Result<Contact> {
        self.get(&format!("/2.0/contact/{remote_id}")).await
    }

    /// Search contacts by field criteria
    pub async fn search_contacts(
        &self,
        criteria: &[ContactSearchCriterion],
    ) -> Result<Vec<Contact>> {
        self.post("/2.0/contact/search", criteria).await
    }

    /// List invoices, optionally paginated
    pub async fn invoices(
        &self,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<RemoteInvoice>> {
        self.get(&paged("/2.0/kb_invoice", offset, limit)).await
    }

    /// Read one invoice by remote id
    pub async fn invoice(&self, remote_id: i64) -> Result<RemoteInvoice> {
        self.get(&format!("/2.0/kb_invoice/{remote_id}")).await
    }

    /// Transition a draft invoice to issued
    pub async fn issue_invoice(&self, remote_id: i64) -> Result<RemoteInvoice> {
        self.post(&format!("/2.0/kb_invoice/{remote_id}/issue"), &serde_json::json!({})).await
    }

    /// Fetch the rendered PDF of an invoice
    pub async fn invoice_pdf(&self, remote_id: i64) -> Result<InvoicePdf> {
        self.get(&format!("/2.0/kb_invoice/{remote_id}/pdf")).await
    }

    /// Send an invoice by email through the remote system
    pub async fn send_invoice_email(
        &self,
        remote_id: i64,
        payload: &SendInvoicePayload,
    ) -> Result<SendInvoiceResult> {
        self.post(&format!("/2.0/kb_invoice/{remote_id}/send"), payload).await
    }
}

#[async_trait]
impl AccountingApi for AccountingClient {
    #[instrument(skip(self, payload), fields(tenant_id = %self.tenant_id))]
    async fn create_contact(&self, payload: &ContactPayload) -> Result<Contact> {
        self.post("/2.0/contact", payload).await
    }

    #[instrument(skip(self, payload), fields(tenant_id = %self.tenant_id))]
    async fn update_contact(&self, remote_id: i64, payload: &ContactPayload) -> Result<Contact> {
        self.put(&format!("/2.0/contact/{remote_id}"), payload).await
    }

    #[instrument(skip(self, payload), fields(tenant_id = %self.tenant_id))]
    async fn create_invoice(&self, payload: &InvoicePayload) -> Result<RemoteInvoice> {
        self.post("/2.0/kb_invoice", payload).await
    }

    #[instrument(skip(self), fields(tenant_id = %self.tenant_id))]
    async fn company_profile(&self) -> Result<CompanyProfile> {
        let profiles: Vec<CompanyProfile> = self.get("/2.0/company_profile").await?;
        profiles.into_iter().next().ok_or_else(|| SyncError::RemoteApi {
            status: 404,
            body: "no company profile on the connected account".into(),
        })
    }
}

/// Builds [`AccountingClient`]s from stored tenant credentials
pub struct ClientFactory {
    base_url: String,
    oauth: Arc<dyn OAuthFlow>,
    cipher: Arc<dyn TokenCipher>,
    store: Arc<dyn CredentialStore>,
}

impl ClientFactory {
    pub fn new(
        base_url: &str,
        oauth: Arc<dyn OAuthFlow>,
        cipher: Arc<dyn TokenCipher>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self { base_url: base_url.to_string(), oauth, cipher, store }
    }
}

#[async_trait]
impl AccountingApiFactory for ClientFactory {
    async fn for_tenant(&self, tenant_id: Uuid) -> Result<Arc<dyn AccountingApi>> {
        let record = self
            .store
            .credentials(tenant_id)
            .await?
            .ok_or_else(|| SyncError::NotConnected(tenant_id.to_string()))?;

        let client = AccountingClient::from_record(
            &record,
            &self.base_url,
            self.oauth.clone(),
            self.cipher.clone(),
            self.store.clone(),
        )?;
        Ok(Arc::new(client))
    }
}
