//! Entity synchronization: field mapping and the batch sync engine

pub mod engine;
pub mod mapper;

pub use engine::{CustomerBatchSummary, InvoiceBatchSummary, SyncEngine};
