//! Shared test helpers for `dealsync-core` integration tests.
//!
//! In-memory mocks for all port traits, so engine and connection tests
//! are deterministic and need no network or database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealsync_core::ports::{
    AccountingApi, AccountingApiFactory, CredentialStore, CustomerRepository, InvoiceRepository,
    OAuthFlow, TokenCipher,
};
use dealsync_core::remote::{
    CompanyProfile, Contact, ContactPayload, InvoicePayload, RemoteInvoice,
};
use dealsync_domain::{
    CredentialRecord, Customer, CustomerType, Invoice, InvoiceItem, InvoiceWithCustomer,
    Result as DomainResult, SyncError, TokenSet,
};
use uuid::Uuid;

/// In-memory store implementing all three storage ports.
///
/// Customers and invoices share one state so that a `mark_synced` from
/// the customer phase is visible when the invoice phase loads its join,
/// like a real database.
#[derive(Default)]
pub struct InMemoryStore {
    pub customers: Mutex<Vec<Customer>>,
    pub invoices: Mutex<Vec<Invoice>>,
    pub credentials: Mutex<Option<CredentialRecord>>,
    pub saved_tokens: Mutex<Vec<(String, String)>>,
    pub company: Mutex<Option<(i64, String)>>,
    pub last_synced: Mutex<Option<DateTime<Utc>>>,
}

impl InMemoryStore {
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self { customers: Mutex::new(customers), ..Self::default() }
    }

    pub fn push_invoice(&self, invoice: Invoice) {
        self.invoices.lock().unwrap().push(invoice);
    }

    pub fn customer(&self, id: Uuid) -> Option<Customer> {
        self.customers.lock().unwrap().iter().find(|c| c.id == id).cloned()
    }

    pub fn invoice(&self, id: Uuid) -> Option<Invoice> {
        self.invoices.lock().unwrap().iter().find(|i| i.id == id).cloned()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn customers_for_tenant(&self, tenant_id: Uuid) -> DomainResult<Vec<Customer>> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn mark_synced(
        &self,
        customer_id: Uuid,
        remote_id: i64,
        synced_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut customers = self.customers.lock().unwrap();
        let customer = customers
            .iter_mut()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| SyncError::Repository("customer not found".into()))?;
        customer.remote_id = Some(remote_id);
        customer.last_synced_at = Some(synced_at);
        Ok(())
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryStore {
    async fn unsynced_invoices(&self, tenant_id: Uuid) -> DomainResult<Vec<InvoiceWithCustomer>> {
        let customers = self.customers.lock().unwrap();
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.tenant_id == tenant_id)
            .map(|invoice| {
                let customer = customers
                    .iter()
                    .find(|c| c.id == invoice.customer_id)
                    .cloned()
                    .ok_or_else(|| SyncError::Repository("invoice customer missing".into()))?;
                Ok(InvoiceWithCustomer { invoice: invoice.clone(), customer })
            })
            .collect::<DomainResult<Vec<_>>>()?)
    }

    async fn mark_synced(
        &self,
        invoice_id: Uuid,
        remote_id: i64,
        synced_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .iter_mut()
            .find(|i| i.id == invoice_id)
            .ok_or_else(|| SyncError::Repository("invoice not found".into()))?;
        invoice.remote_id = Some(remote_id);
        invoice.last_synced_at = Some(synced_at);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn credentials(&self, _tenant_id: Uuid) -> DomainResult<Option<CredentialRecord>> {
        Ok(self.credentials.lock().unwrap().clone())
    }

    async fn save_tokens(
        &self,
        _tenant_id: Uuid,
        access_token_envelope: &str,
        refresh_token_envelope: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.saved_tokens
            .lock()
            .unwrap()
            .push((access_token_envelope.to_string(), refresh_token_envelope.to_string()));
        if let Some(record) = self.credentials.lock().unwrap().as_mut() {
            record.access_token_envelope = access_token_envelope.to_string();
            record.refresh_token_envelope = refresh_token_envelope.to_string();
            record.expires_at = expires_at;
        }
        Ok(())
    }

    async fn record_connection(&self, record: &CredentialRecord) -> DomainResult<()> {
        *self.credentials.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    async fn record_company(
        &self,
        _tenant_id: Uuid,
        company_id: i64,
        company_name: &str,
    ) -> DomainResult<()> {
        *self.company.lock().unwrap() = Some((company_id, company_name.to_string()));
        Ok(())
    }

    async fn clear_connection(&self, _tenant_id: Uuid) -> DomainResult<()> {
        *self.credentials.lock().unwrap() = None;
        Ok(())
    }

    async fn set_last_synced(&self, _tenant_id: Uuid, synced_at: DateTime<Utc>) -> DomainResult<()> {
        *self.last_synced.lock().unwrap() = Some(synced_at);
        Ok(())
    }
}

/// Configurable in-memory remote API.
///
/// Assigns incrementing remote ids and can be told to reject specific
/// contact names or invoice titles with a validation error.
#[derive(Default)]
pub struct MockApi {
    next_id: AtomicI64,
    pub contact_creates: Mutex<Vec<ContactPayload>>,
    pub contact_updates: Mutex<Vec<(i64, ContactPayload)>>,
    pub invoice_creates: Mutex<Vec<InvoicePayload>>,
    pub reject_contact_names: Mutex<HashSet<String>>,
    pub profile: Mutex<Option<CompanyProfile>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self { next_id: AtomicI64::new(1000), ..Self::default() }
    }

    pub fn reject_contact(&self, name: &str) {
        self.reject_contact_names.lock().unwrap().insert(name.to_string());
    }

    pub fn set_profile(&self, id: i64, name: &str) {
        *self.profile.lock().unwrap() =
            Some(CompanyProfile { id, name: name.to_string(), city: None, mail: None });
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn check_contact(&self, payload: &ContactPayload) -> DomainResult<()> {
        if self.reject_contact_names.lock().unwrap().contains(&payload.name_1) {
            return Err(SyncError::RemoteApi {
                status: 422,
                body: format!("validation failed for {}", payload.name_1),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AccountingApi for MockApi {
    async fn create_contact(&self, payload: &ContactPayload) -> DomainResult<Contact> {
        self.check_contact(payload)?;
        self.contact_creates.lock().unwrap().push(payload.clone());
        Ok(Contact { id: self.allocate_id(), ..Contact::default() })
    }

    async fn update_contact(
        &self,
        remote_id: i64,
        payload: &ContactPayload,
    ) -> DomainResult<Contact> {
        self.check_contact(payload)?;
        self.contact_updates.lock().unwrap().push((remote_id, payload.clone()));
        Ok(Contact { id: remote_id, ..Contact::default() })
    }

    async fn create_invoice(&self, payload: &InvoicePayload) -> DomainResult<RemoteInvoice> {
        self.invoice_creates.lock().unwrap().push(payload.clone());
        Ok(RemoteInvoice { id: self.allocate_id(), ..RemoteInvoice::default() })
    }

    async fn company_profile(&self) -> DomainResult<CompanyProfile> {
        self.profile
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SyncError::RemoteApi { status: 404, body: "no profile".into() })
    }
}

/// OAuth mock recording exchanged codes and revoked tokens.
#[derive(Default)]
pub struct MockOAuth {
    pub exchanged_codes: Mutex<Vec<String>>,
    pub revoked: Mutex<Vec<String>>,
}

#[async_trait]
impl OAuthFlow for MockOAuth {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://idp.example.test/authorize?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> DomainResult<TokenSet> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        Ok(TokenSet::new("access-plain".into(), "refresh-plain".into(), 3600))
    }

    async fn refresh(&self, _refresh_token: &str) -> DomainResult<TokenSet> {
        Ok(TokenSet::new("access-refreshed".into(), "refresh-rotated".into(), 3600))
    }

    async fn revoke(&self, token: &str) {
        self.revoked.lock().unwrap().push(token.to_string());
    }
}

/// Reversible stand-in cipher: prefixes instead of encrypting.
pub struct PrefixCipher;

impl TokenCipher for PrefixCipher {
    fn encrypt(&self, plaintext: &str) -> DomainResult<String> {
        Ok(format!("enc:{plaintext}"))
    }

    fn decrypt(&self, envelope: &str) -> DomainResult<String> {
        envelope
            .strip_prefix("enc:")
            .map(ToString::to_string)
            .ok_or(SyncError::InvalidEnvelopeFormat)
    }
}

/// Factory handing out a shared [`MockApi`].
pub struct MockApiFactory(pub std::sync::Arc<MockApi>);

#[async_trait]
impl AccountingApiFactory for MockApiFactory {
    async fn for_tenant(
        &self,
        _tenant_id: Uuid,
    ) -> DomainResult<std::sync::Arc<dyn AccountingApi>> {
        Ok(self.0.clone())
    }
}

/// Build a minimal unsynced customer for a tenant.
pub fn customer(tenant_id: Uuid, last_name: &str) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        tenant_id,
        customer_type: CustomerType::Individual,
        company_name: None,
        salutation: Some("Herr".into()),
        first_name: "Max".into(),
        last_name: last_name.into(),
        email: Some("max@example.ch".into()),
        phone: None,
        mobile: None,
        street: None,
        postal_code: None,
        city: None,
        country: "CH".into(),
        remote_id: None,
        last_synced_at: None,
    }
}

/// Build a minimal unsynced invoice referencing a customer.
pub fn invoice(tenant_id: Uuid, customer_id: Uuid, number: &str) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        tenant_id,
        customer_id,
        invoice_number: number.into(),
        invoice_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        due_date: None,
        items: vec![InvoiceItem {
            title: "Ablieferungspauschale".into(),
            description: None,
            quantity: 1.0,
            unit_price_minor: 45_000,
        }],
        remote_id: None,
        last_synced_at: None,
    }
}
