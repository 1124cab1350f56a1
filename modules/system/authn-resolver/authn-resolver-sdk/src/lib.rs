//! `AuthN` Resolver SDK
//!
//! This crate provides the public API for the `authn_resolver` module:
//!
//! - [`AuthNResolverClient`] - Public API trait for consumers (session layer)
//! - [`CredentialVerifier`] - Plugin API trait for credential verifiers
//! - [`Credentials`], [`AuthenticationResult`] - Authentication models
//! - [`AuthNResolverError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use authn_resolver_sdk::{AuthNResolverClient, Credentials};
//! use kdb_security::Scope;
//!
//! let login = authn.login(&Credentials::basic("alice", "secret")).await;
//! if login.is_anonymous() {
//!     // the session layer decides whether to reject the connection
//! }
//! let ctx = login.authorize(&Scope::database("movies")?);
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;

// Re-export main types at crate root
pub use api::AuthNResolverClient;
pub use error::AuthNResolverError;
pub use models::{AuthenticationResult, Credentials};
pub use plugin_api::CredentialVerifier;
