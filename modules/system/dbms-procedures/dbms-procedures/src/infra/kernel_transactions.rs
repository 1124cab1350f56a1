//! In-process transaction manager.
//!
//! Tracks the queries executing in open transactions, each with the
//! security context bound to its transaction, a liveness lock and a
//! cancellation token. Cancellation only signals: the executing code
//! observes the token and stops on its own. Closing a transaction finishes
//! its queries, so no enforcement point ever consults a closed context.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use dashmap::DashMap;
use dbms_procedures_sdk::{CancelOutcome, QueryId, RunningQuery, TransactionId, TransactionManager};
use kdb_security::{SecurityContext, SecurityError, TransactionBinding};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Liveness {
    Running,
    Cancelled,
    Finished,
}

struct QueryEntry {
    info: RunningQuery,
    liveness: Mutex<Liveness>,
    token: CancellationToken,
}

impl QueryEntry {
    fn is_live(&self) -> bool {
        *self.liveness.lock() != Liveness::Finished
    }
}

/// Registry of open transactions and their running queries.
#[derive(Default)]
pub struct KernelTransactions {
    next_transaction: AtomicU64,
    next_query: AtomicU64,
    queries: DashMap<QueryId, Arc<QueryEntry>>,
}

impl KernelTransactions {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Begin a transaction bound to `ctx` for its whole life.
    #[must_use]
    pub fn begin(self: &Arc<Self>, ctx: SecurityContext) -> KernelTransaction {
        let id = TransactionId::new(self.next_transaction.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::debug!(transaction = %id, subject = %ctx.subject(), "transaction started");
        KernelTransaction {
            id,
            binding: TransactionBinding::new(ctx),
            manager: Arc::clone(self),
        }
    }

    /// Number of queries currently registered.
    #[must_use]
    pub fn active_queries(&self) -> usize {
        self.queries.len()
    }

    fn register(self: &Arc<Self>, info: RunningQuery) -> QueryExecution {
        let entry = Arc::new(QueryEntry {
            info,
            liveness: Mutex::new(Liveness::Running),
            token: CancellationToken::new(),
        });
        self.queries.insert(entry.info.query_id, Arc::clone(&entry));
        QueryExecution {
            entry,
            manager: Arc::clone(self),
        }
    }

    fn lookup(&self, query_id: QueryId) -> Option<Arc<QueryEntry>> {
        self.queries.get(&query_id).map(|e| Arc::clone(e.value()))
    }

    /// Finish and deregister every query of a closing transaction.
    fn finish_transaction(&self, transaction_id: TransactionId) -> usize {
        let entries: Vec<Arc<QueryEntry>> = self
            .queries
            .iter()
            .filter(|e| e.value().info.transaction_id == transaction_id)
            .map(|e| Arc::clone(e.value()))
            .collect();

        for entry in &entries {
            *entry.liveness.lock() = Liveness::Finished;
            entry.token.cancel();
            self.queries.remove(&entry.info.query_id);
        }
        entries.len()
    }
}

impl TransactionManager for KernelTransactions {
    fn running_queries(&self) -> Vec<RunningQuery> {
        let entries: Vec<Arc<QueryEntry>> =
            self.queries.iter().map(|e| Arc::clone(e.value())).collect();
        entries
            .into_iter()
            .filter(|e| e.is_live())
            .map(|e| e.info.clone())
            .collect()
    }

    fn snapshot(&self, query_id: QueryId) -> Option<RunningQuery> {
        self.lookup(query_id)
            .filter(|e| e.is_live())
            .map(|e| e.info.clone())
    }

    fn cancel(&self, query_id: QueryId) -> CancelOutcome {
        let Some(entry) = self.lookup(query_id) else {
            return CancelOutcome::NotFound;
        };

        let mut liveness = entry.liveness.lock();
        match *liveness {
            Liveness::Running => {
                entry.token.cancel();
                *liveness = Liveness::Cancelled;
                tracing::info!(query = %query_id, transaction = %entry.info.transaction_id, "query cancellation signalled");
                CancelOutcome::Cancelled
            }
            Liveness::Cancelled | Liveness::Finished => CancelOutcome::AlreadyFinished,
        }
    }
}

/// A transaction registered with [`KernelTransactions`].
pub struct KernelTransaction {
    id: TransactionId,
    binding: TransactionBinding,
    manager: Arc<KernelTransactions>,
}

impl KernelTransaction {
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// The security context bound to this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::ContextClosed`] after [`close`](Self::close).
    pub fn security_context(&self) -> Result<&Arc<SecurityContext>, SecurityError> {
        self.binding.context()
    }

    /// Start executing a query in this transaction.
    ///
    /// The query stays visible to the transaction manager until the returned
    /// [`QueryExecution`] is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::ContextClosed`] if the transaction is closed.
    pub fn execute(
        &self,
        query: impl Into<String>,
        parameters: BTreeMap<String, String>,
    ) -> Result<QueryExecution, SecurityError> {
        let owner = Arc::clone(self.binding.context()?);
        let query_id = QueryId::new(self.manager.next_query.fetch_add(1, Ordering::Relaxed) + 1);
        let info = RunningQuery {
            query_id,
            transaction_id: self.id,
            owner,
            query: query.into(),
            parameters,
            started_at: SystemTime::now(),
        };
        tracing::debug!(query = %query_id, transaction = %self.id, "query started");
        let execution = self.manager.register(info);
        // lost a race with close(): the sweep may already have run
        self.binding.context()?;
        Ok(execution)
    }

    /// Close the transaction.
    ///
    /// Its queries are cancelled and deregistered immediately, whether or
    /// not their executions have been dropped yet.
    pub fn close(&self) {
        self.binding.close();
        let finished = self.manager.finish_transaction(self.id);
        tracing::debug!(transaction = %self.id, finished, "transaction closed");
    }
}

impl Drop for KernelTransaction {
    fn drop(&mut self) {
        self.close();
    }
}

/// Handle held by the code executing a query.
///
/// Dropping it marks the query finished and removes it from the registry.
pub struct QueryExecution {
    entry: Arc<QueryEntry>,
    manager: Arc<KernelTransactions>,
}

impl QueryExecution {
    #[must_use]
    pub fn id(&self) -> QueryId {
        self.entry.info.query_id
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.entry.token.is_cancelled()
    }

    /// Resolves once the query has been cancelled.
    pub async fn cancelled(&self) {
        self.entry.token.cancelled().await;
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.entry.token.clone()
    }
}

impl Drop for QueryExecution {
    fn drop(&mut self) {
        *self.entry.liveness.lock() = Liveness::Finished;
        self.manager.queries.remove(&self.entry.info.query_id);
        tracing::debug!(query = %self.entry.info.query_id, "query finished");
    }
}
