//! Domain layer for the DBMS procedures.

pub mod service;

pub use service::Service;
