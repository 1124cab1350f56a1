#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Credential Verifier
//!
//! Verifies credentials against a user and token table taken from
//! configuration. Intended for development, tests, and embedded setups
//! without an external directory.
//!
//! - **`Basic`** credentials are matched against `users`.
//! - **`Bearer`** credentials are matched against `tokens`.
//!
//! Empty passwords and tokens never match.
//!
//! ## Configuration
//!
//! ```yaml
//! security:
//!   static_authn:
//!     priority: 100
//!     users:
//!       - name: alice
//!         password: "change-me"
//!         roles: [reader, editor]
//!     tokens:
//!       - token: "ci-token"
//!         name: ci
//!         roles: [admin]
//! ```

pub mod config;
pub mod domain;

pub use config::StaticAuthNPluginConfig;
pub use domain::Service as StaticAuthNPlugin;
