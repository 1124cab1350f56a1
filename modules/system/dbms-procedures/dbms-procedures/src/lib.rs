//! DBMS Procedures
//!
//! Administrative procedures that act across transactions: listing the
//! queries running in the kernel, terminating them, and listing roles.
//! Every procedure consults the caller's
//! [`SecurityContext`](kdb_security::SecurityContext) before it reveals or
//! touches anything owned by another subject.
//!
//! [`KernelTransactions`] is the in-process transaction manager the
//! procedures run against.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;

pub use config::DbmsProceduresConfig;
pub use domain::Service;
pub use infra::{KernelTransaction, KernelTransactions, QueryExecution};
