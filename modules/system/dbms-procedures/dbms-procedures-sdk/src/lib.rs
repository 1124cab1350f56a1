//! DBMS Procedures SDK
//!
//! This crate provides the public API for the `dbms_procedures` module:
//!
//! - [`DbmsProceduresClient`] - Administrative procedures exposed to procedure dispatch
//! - [`TransactionManager`] - Interface the procedures consume to see and cancel live queries
//! - [`ProcedureSignature`], [`ProcedureGuard`] - Declarative procedure permissions
//! - [`ProcedureError`] - Error types
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;
pub mod signature;

pub use api::{DbmsProceduresClient, TransactionManager};
pub use error::ProcedureError;
pub use models::{
    CancelOutcome, KillResult, QueryId, QueryRow, RoleRow, RunningQuery, TransactionId,
};
pub use signature::{ProcedureGuard, ProcedureMode, ProcedureSignature};
