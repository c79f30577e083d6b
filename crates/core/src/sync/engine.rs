//! Entity sync engine
//!
//! Decides create-vs-update per entity and drives batch runs with
//! per-item error isolation. Single-entity operations raise; batch
//! operations catch per entity, append to the error list, and continue.
//! Remote ids and sync timestamps are persisted immediately after each
//! successful remote call so a crash mid-batch never duplicates a create.

use std::sync::Arc;

use chrono::Utc;
use dealsync_domain::{
    Customer, EntityKind, Invoice, Result, SyncFailure, SyncOutcome, SyncReport,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::mapper;
use crate::ports::{AccountingApi, CredentialStore, CustomerRepository, InvoiceRepository};

/// Result of a customer batch run
#[derive(Debug, Default)]
pub struct CustomerBatchSummary {
    pub created: u32,
    pub updated: u32,
    pub errors: Vec<SyncFailure>,
}

/// Result of an invoice batch run
///
/// Invoices that already carry a remote id are immutable on the remote
/// side and are counted as skipped, never updated.
#[derive(Debug, Default)]
pub struct InvoiceBatchSummary {
    pub created: u32,
    pub skipped: u32,
    pub errors: Vec<SyncFailure>,
}

/// Sync engine scoped to one tenant run
///
/// Operations are expected to be invoked sequentially within a logical
/// run; entities are processed in the order the repositories return them.
pub struct SyncEngine {
    api: Arc<dyn AccountingApi>,
    customers: Arc<dyn CustomerRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    credentials: Arc<dyn CredentialStore>,
}

impl SyncEngine {
    pub fn new(
        api: Arc<dyn AccountingApi>,
        customers: Arc<dyn CustomerRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self { api, customers, invoices, credentials }
    }

    /// Sync a single customer: update when a remote id exists, create
    /// otherwise. The caller persists the returned remote id.
    pub async fn sync_customer(&self, customer: &Customer) -> Result<SyncOutcome> {
        let payload = mapper::contact_payload(customer);

        match customer.remote_id {
            Some(remote_id) => {
                let updated = self.api.update_contact(remote_id, &payload).await?;
                Ok(SyncOutcome { remote_id: updated.id, created: false })
            }
            None => {
                let created = self.api.create_contact(&payload).await?;
                Ok(SyncOutcome { remote_id: created.id, created: true })
            }
        }
    }

    /// Sync a single invoice against an existing remote contact.
    ///
    /// An invoice that already has a remote id is returned as-is without
    /// any API call; issued remote invoices are not safely mutable.
    pub async fn sync_invoice(
        &self,
        invoice: &Invoice,
        remote_contact_id: i64,
    ) -> Result<SyncOutcome> {
        if let Some(remote_id) = invoice.remote_id {
            return Ok(SyncOutcome { remote_id, created: false });
        }

        let payload = mapper::invoice_payload(invoice, remote_contact_id);
        let created = self.api.create_invoice(&payload).await?;
        Ok(SyncOutcome { remote_id: created.id, created: true })
    }

    /// Sync every customer of a tenant, isolating per-entity failures.
    #[instrument(skip(self))]
    pub async fn sync_all_customers(&self, tenant_id: Uuid) -> Result<CustomerBatchSummary> {
        let customers = self.customers.customers_for_tenant(tenant_id).await?;
        let mut summary = CustomerBatchSummary::default();

        for customer in &customers {
            match self.sync_and_persist_customer(customer).await {
                Ok(outcome) => {
                    if outcome.created {
                        summary.created += 1;
                    } else {
                        summary.updated += 1;
                    }
                }
                Err(e) => {
                    warn!(customer = %customer.display_name(), error = %e, "customer sync failed");
                    summary.errors.push(SyncFailure {
                        kind: EntityKind::Customer,
                        entity_id: customer.id,
                        label: customer.display_name(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            failed = summary.errors.len(),
            "customer batch finished"
        );
        Ok(summary)
    }

    /// Sync every pending invoice of a tenant, isolating per-entity
    /// failures. An invoice whose customer has no remote contact yet
    /// triggers an inline customer sync first.
    #[instrument(skip(self))]
    pub async fn sync_all_invoices(&self, tenant_id: Uuid) -> Result<InvoiceBatchSummary> {
        let invoices = self.invoices.unsynced_invoices(tenant_id).await?;
        let mut summary = InvoiceBatchSummary::default();

        for entry in &invoices {
            let invoice = &entry.invoice;

            if invoice.remote_id.is_some() {
                summary.skipped += 1;
                continue;
            }

            match self.sync_one_invoice(invoice, &entry.customer).await {
                Ok(()) => summary.created += 1,
                Err(e) => {
                    warn!(invoice = %invoice.invoice_number, error = %e, "invoice sync failed");
                    summary.errors.push(SyncFailure {
                        kind: EntityKind::Invoice,
                        entity_id: invoice.id,
                        label: invoice.invoice_number.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.errors.len(),
            "invoice batch finished"
        );
        Ok(summary)
    }

    /// Run a full sync: customers first, then invoices, then the
    /// tenant-level last-synced timestamp. The phases are independent;
    /// invoice failures never roll back customer progress.
    #[instrument(skip(self))]
    pub async fn full_sync(&self, tenant_id: Uuid) -> Result<SyncReport> {
        let customer_summary = self.sync_all_customers(tenant_id).await?;
        let invoice_summary = self.sync_all_invoices(tenant_id).await?;

        if let Err(e) = self.credentials.set_last_synced(tenant_id, Utc::now()).await {
            warn!(error = %e, "failed to update tenant last-synced timestamp");
        }

        let mut errors = customer_summary.errors;
        errors.extend(invoice_summary.errors);

        Ok(SyncReport {
            customers_created: customer_summary.created,
            customers_updated: customer_summary.updated,
            invoices_created: invoice_summary.created,
            invoices_skipped: invoice_summary.skipped,
            errors,
        })
    }

    async fn sync_and_persist_customer(&self, customer: &Customer) -> Result<SyncOutcome> {
        let outcome = self.sync_customer(customer).await?;
        self.customers.mark_synced(customer.id, outcome.remote_id, Utc::now()).await?;
        Ok(outcome)
    }

    async fn sync_one_invoice(&self, invoice: &Invoice, customer: &Customer) -> Result<()> {
        // Dependent customer sync: the contact must exist remotely before
        // the invoice references it.
        let remote_contact_id = match customer.remote_id {
            Some(id) => id,
            None => self.sync_and_persist_customer(customer).await?.remote_id,
        };

        let outcome = self.sync_invoice(invoice, remote_contact_id).await?;
        self.invoices.mark_synced(invoice.id, outcome.remote_id, Utc::now()).await?;
        Ok(())
    }
}
