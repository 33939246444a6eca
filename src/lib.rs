//! Synapse SDK for Rust.
//!
//! A client for the Synapse banking API: users, nodes, transactions,
//! subnets and subscriptions.
//!
//! # What This SDK Provides
//!
//! - High-level client: [`SynapseClient`]
//! - Low-level transport: [`http::HttpClient`] executing [`http::ApiRequest`]s
//! - Typed resources: [`User`], [`Node`], [`Transaction`], [`Subnet`], [`Subscription`]
//! - Typed errors classified from the API envelope: [`SynapseError`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use synapse_sdk::{ClientConfig, QueryOptions, SynapseClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), synapse_sdk::SynapseError> {
//!     let config = ClientConfig::new("client_id", "client_secret", "127.0.0.1")
//!         .fingerprint("device-fingerprint");
//!     let mut client = SynapseClient::new(config)?;
//!
//!     let mut user = client.get_user("5bd9e16314c7fa00a3076960", false).await?;
//!     client.authenticate(&mut user, None).await?;
//!
//!     let nodes = client.get_user_nodes(&mut user, &QueryOptions::default()).await?;
//!     for node in &nodes.nodes {
//!         println!("{} {:?}", node.id, node.nickname());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Authentication
//!
//! Every user-scoped call carries the user's `oauth_key` in the `X-SP-USER`
//! header. When the API answers 401, the client exchanges the user's refresh
//! token for a fresh key once and repeats the call once. A second failure is
//! returned as-is. Users whose fingerprint is not yet registered go through
//! [`SynapseClient::select_2fa_device`] and [`SynapseClient::confirm_2fa_pin`].
//!
//! # Concurrency
//!
//! The session (gateway credentials, fingerprint, IP, bearer token) is owned
//! by one [`SynapseClient`], and calls that may refresh the token take
//! `&mut self`. Use one client per task, or put a shared client behind a lock.
//!
//! # Logging
//!
//! This crate emits debug-level logs through the [`log`](https://docs.rs/log/) facade
//! for transport, auth and client calls. Tokens and secrets are never logged.
//! Configure any compatible logger in your binary, then set `RUST_LOG=debug`.
//!
//! # Errors
//!
//! All fallible operations return [`SynapseError`]. API failures map to
//! `Unauthorized`, `RateLimited`, `NotFound`, `ValidationFailed`,
//! `ServerError`, `Timeout` or `Unknown`, each keeping the original HTTP code
//! and message. Failures that never reached the API surface as `HttpError`,
//! `JsonError` or `UrlError`.
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod paths;
pub mod session;
mod users;

// Re-export primary types for convenience.
pub use auth::AuthRetry;
pub use client::SynapseClient;
pub use config::{ClientConfig, Environment, EnvironmentConfig, DEFAULT_TIMEOUT};
pub use errors::{ApiError, Result, SynapseError};
pub use http::{ApiRequest, HttpClient, RequestBody};
pub use models::*;
pub use session::{HeaderOverrides, HeaderUpdate, SessionConfig};
