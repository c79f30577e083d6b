//! # DealSync Infra
//!
//! Infrastructure implementations of the `dealsync-core` ports:
//! - [`vault`]: AES-256-GCM credential vault for at-rest token storage
//! - [`oauth`]: OAuth 2.0 flow against the remote identity provider
//! - [`client`]: rate-limited, token-refreshing remote API client
//! - [`config`]: environment-based configuration loading

pub mod client;
pub mod config;
pub mod oauth;
pub mod vault;

pub use client::{AccountingClient, ClientFactory};
pub use config::IntegrationConfig;
pub use oauth::OAuthClient;
pub use vault::TokenVault;
