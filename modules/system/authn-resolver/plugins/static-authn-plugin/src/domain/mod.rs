//! Domain layer for the static credential verifier.

pub mod client;
pub mod service;

pub use service::Service;
