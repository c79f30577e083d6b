//! # DealSync Domain
//!
//! Business domain types and models for the accounting-platform
//! integration.
//!
//! This crate contains:
//! - Domain data types (Customer, Invoice, credential records)
//! - Domain error types and Result definitions
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other DealSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{Result, SyncError};
pub use types::{
    CredentialRecord, Customer, CustomerType, EntityKind, Invoice, InvoiceItem,
    InvoiceWithCustomer, SyncFailure, SyncOutcome, SyncReport, TokenSet,
};
