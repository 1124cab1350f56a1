//! Infrastructure for the DBMS procedures.

pub mod kernel_transactions;

pub use kernel_transactions::{KernelTransaction, KernelTransactions, QueryExecution};
