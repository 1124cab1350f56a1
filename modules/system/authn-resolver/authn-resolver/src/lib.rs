//! `AuthN` Resolver
//!
//! Runs presented credentials through the configured credential verifiers
//! in priority order and turns the outcome into a
//! [`LoginContext`](kdb_security::LoginContext).
//!
//! Exposes [`AuthNResolverLocalClient`], the in-process implementation of
//! `AuthNResolverClient` consumed by the session layer.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::AuthNResolverConfig;
pub use domain::{AuthNResolverLocalClient, DomainError, Service};
