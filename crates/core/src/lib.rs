//! # DealSync Core
//!
//! Business logic of the accounting integration: port traits, field
//! mapping, the entity sync engine, and the connection lifecycle service.
//!
//! ## Architecture
//! - Depends only on `dealsync-domain` and external crates
//! - All I/O goes through port traits; implementations live in
//!   `dealsync-infra` (HTTP, crypto) and in the host product (storage)

pub mod connection;
pub mod ports;
pub mod remote;
pub mod sync;

pub use connection::{ConnectState, ConnectionService};
pub use sync::engine::SyncEngine;
