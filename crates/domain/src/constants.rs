//! Domain-level constants for the accounting integration.

/// Refresh the access token this many seconds before it expires.
pub const TOKEN_REFRESH_BUFFER_SECS: i64 = 300;

/// Minimum interval between outgoing remote API requests.
///
/// The remote platform allows roughly 100 requests per minute; pacing one
/// request per 100ms keeps a full sync comfortably under that limit.
pub const REQUEST_MIN_INTERVAL_MS: u64 = 100;

/// Timeout applied to every remote network call.
pub const NETWORK_TIMEOUT_SECS: u64 = 30;

/// Fallback retry hint when a 429 response carries no `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Default country identifier on the remote platform (Switzerland).
pub const DEFAULT_COUNTRY_ID: i64 = 1;
