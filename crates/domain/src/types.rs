//! Domain types for the accounting integration
//!
//! Local entities (Customer, Invoice) carry an optional `remote_id`
//! referencing the corresponding record in the external accounting system,
//! plus the timestamp of the last successful sync. The sync subsystem only
//! ever attaches these two fields; it never deletes entities or clears a
//! remote id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a customer is a company or a private individual.
///
/// Drives the remote contact type selection (companies and persons are
/// distinct contact types on the accounting platform).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Company,
    Individual,
}

/// A customer owned by the product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_type: CustomerType,
    pub company_name: Option<String>,
    pub salutation: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    /// ISO 3166 alpha-2 country code
    pub country: String,
    /// Identifier of the corresponding remote contact, once synced
    pub remote_id: Option<i64>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Human-readable label used in sync error reports.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.customer_type, &self.company_name) {
            (CustomerType::Company, Some(name)) => name.clone(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// A single invoice line item
///
/// Monetary values are integer minor units (e.g. Rappen); conversion to
/// decimal major units happens only at the remote API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub title: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price_minor: i64,
}

/// An invoice owned by the product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItem>,
    /// Identifier of the corresponding remote invoice, once synced.
    /// Remote invoices are immutable; a set id means no further API calls.
    pub remote_id: Option<i64>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// An invoice joined with its customer, as loaded for a sync run
#[derive(Debug, Clone)]
pub struct InvoiceWithCustomer {
    pub invoice: Invoice,
    pub customer: Customer,
}

/// Per-tenant OAuth credential record
///
/// Tokens are stored only in encrypted envelope form; the plaintext never
/// reaches durable storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub tenant_id: Uuid,
    pub access_token_envelope: String,
    pub refresh_token_envelope: String,
    pub expires_at: DateTime<Utc>,
    pub remote_company_id: Option<i64>,
    pub remote_company_name: Option<String>,
    pub connected_at: DateTime<Utc>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// OAuth access and refresh tokens with expiry metadata
///
/// In-memory only; the vault produces the encrypted envelopes that are
/// actually persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds, as reported by the provider
    pub expires_in: i64,
    /// Absolute expiration timestamp, derived at token receipt
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Create a token set, deriving `expires_at` from now + `expires_in`.
    #[must_use]
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(expires_in);
        Self { access_token, refresh_token, expires_in, expires_at }
    }

    /// Check if the access token is expired or will expire within the
    /// given threshold.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        Utc::now() + chrono::Duration::seconds(threshold_seconds) >= self.expires_at
    }
}

/// Kind of local entity, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    Invoice,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Invoice => write!(f, "invoice"),
        }
    }
}

/// Result of syncing a single entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Remote identifier now associated with the entity
    pub remote_id: i64,
    /// True when a remote record was created, false on update
    pub created: bool,
}

/// One failed entity within a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailure {
    pub kind: EntityKind,
    pub entity_id: Uuid,
    /// Display label identifying the entity (name or invoice number)
    pub label: String,
    pub error: String,
}

/// Aggregate result of a full sync run
///
/// Batch runs never fail on individual entities; partial progress is
/// reported here and retried on the next run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub customers_created: u32,
    pub customers_updated: u32,
    pub invoices_created: u32,
    pub invoices_skipped: u32,
    pub errors: Vec<SyncFailure>,
}

impl SyncReport {
    /// A run is successful when every entity synced cleanly.
    #[must_use]
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}
