//! Port interfaces for the accounting integration
//!
//! All side effects of the integration core flow through these traits.
//! Storage ports are implemented by the host product against its own
//! persistence layer; the HTTP and crypto ports are implemented in
//! `dealsync-infra`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealsync_domain::{CredentialRecord, Customer, InvoiceWithCustomer, Result, TokenSet};
use uuid::Uuid;

use crate::remote::{CompanyProfile, Contact, ContactPayload, InvoicePayload, RemoteInvoice};

/// Access to locally stored customers
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Load all customers belonging to a tenant, in stable order
    async fn customers_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Customer>>;

    /// Attach the remote id and sync timestamp after a successful sync.
    /// Must be durable before the next entity is processed.
    async fn mark_synced(
        &self,
        customer_id: Uuid,
        remote_id: i64,
        synced_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Access to locally stored invoices
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Load invoices pending sync for a tenant, each joined with its
    /// customer, in stable order
    async fn unsynced_invoices(&self, tenant_id: Uuid) -> Result<Vec<InvoiceWithCustomer>>;

    /// Attach the remote id and sync timestamp after a successful sync
    async fn mark_synced(
        &self,
        invoice_id: Uuid,
        remote_id: i64,
        synced_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Durable store for per-tenant credential records
///
/// `save_tokens` is invoked from the token-refresh path and must be a
/// single read-modify-write update on the tenant record.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the credential record for a tenant, if connected
    async fn credentials(&self, tenant_id: Uuid) -> Result<Option<CredentialRecord>>;

    /// Persist freshly encrypted token envelopes after a refresh
    async fn save_tokens(
        &self,
        tenant_id: Uuid,
        access_token_envelope: &str,
        refresh_token_envelope: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Store a new credential record on OAuth callback
    async fn record_connection(&self, record: &CredentialRecord) -> Result<()>;

    /// Attach the remote company identity after a successful profile fetch
    async fn record_company(
        &self,
        tenant_id: Uuid,
        company_id: i64,
        company_name: &str,
    ) -> Result<()>;

    /// Remove the credential record on disconnect
    async fn clear_connection(&self, tenant_id: Uuid) -> Result<()>;

    /// Update the tenant-level last-synced timestamp after a full sync
    async fn set_last_synced(&self, tenant_id: Uuid, synced_at: DateTime<Utc>) -> Result<()>;
}

/// OAuth 2.0 flow operations against the remote identity provider
#[async_trait]
pub trait OAuthFlow: Send + Sync {
    /// Build the authorization redirect URL carrying the opaque state
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens (one-shot)
    async fn exchange_code(&self, code: &str) -> Result<TokenSet>;

    /// Exchange a refresh token for a new token set. Failure is terminal
    /// for the stored credential; the tenant must re-authorize.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet>;

    /// Best-effort token revocation; failures are logged by the
    /// implementation, never raised
    async fn revoke(&self, token: &str);
}

/// Symmetric encryption of token material for at-rest storage
pub trait TokenCipher: Send + Sync {
    /// Encrypt a plaintext secret into a self-contained envelope
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt an envelope produced by [`TokenCipher::encrypt`]
    fn decrypt(&self, envelope: &str) -> Result<String>;
}

/// The remote accounting API surface the sync engine drives
///
/// Implemented by the rate-limited authenticated client in
/// `dealsync-infra`; mocked in engine tests.
#[async_trait]
pub trait AccountingApi: Send + Sync {
    /// Create a contact, returning the remote record
    async fn create_contact(&self, payload: &ContactPayload) -> Result<Contact>;

    /// Update an existing contact by remote id
    async fn update_contact(&self, remote_id: i64, payload: &ContactPayload) -> Result<Contact>;

    /// Create an invoice, returning the remote record
    async fn create_invoice(&self, payload: &InvoicePayload) -> Result<RemoteInvoice>;

    /// Read the connected company's profile
    async fn company_profile(&self) -> Result<CompanyProfile>;
}

/// Builds an [`AccountingApi`] client for a connected tenant
///
/// Needed wherever a fresh client must be constructed from stored
/// credentials (e.g. right after the OAuth callback persists them).
#[async_trait]
pub trait AccountingApiFactory: Send + Sync {
    /// Construct a client bound to the tenant's stored credential
    async fn for_tenant(&self, tenant_id: Uuid) -> Result<std::sync::Arc<dyn AccountingApi>>;
}
