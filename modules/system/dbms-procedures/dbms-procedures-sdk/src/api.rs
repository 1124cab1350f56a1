//! Interfaces of the DBMS procedures.

use kdb_security::SecurityContext;

use crate::error::ProcedureError;
use crate::models::{CancelOutcome, KillResult, QueryId, QueryRow, RoleRow, RunningQuery};

/// Transaction manager as seen by the procedures.
///
/// Implementations expose live queries together with the security context
/// bound to their owning transaction, and accept cancellations keyed by
/// query id. They perform no authorization of their own.
pub trait TransactionManager: Send + Sync {
    /// Snapshot of every query currently executing.
    fn running_queries(&self) -> Vec<RunningQuery>;

    /// Snapshot of a single query, if it is still executing.
    fn snapshot(&self, query_id: QueryId) -> Option<RunningQuery>;

    /// Signal cancellation.
    ///
    /// Takes the query's liveness lock; a query that finished since the
    /// caller's snapshot is reported as [`CancelOutcome::AlreadyFinished`]
    /// or [`CancelOutcome::NotFound`] and nothing happens.
    fn cancel(&self, query_id: QueryId) -> CancelOutcome;
}

/// Administrative procedures callable from a transaction.
///
/// Every call receives the caller's security context; an anonymous context
/// is never granted anything beyond an empty listing.
pub trait DbmsProceduresClient: Send + Sync {
    /// List running queries visible to the caller.
    ///
    /// Administrators see every query, other subjects only their own,
    /// anonymous callers nothing.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` only if the procedure's signature refuses
    /// the caller outright.
    fn list_queries(&self, ctx: &SecurityContext) -> Result<Vec<QueryRow>, ProcedureError>;

    /// Terminate a running query.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` for anonymous callers, and for callers that are
    ///   neither administrators nor the query's owner
    /// - `InvalidQueryId` if `query_id` is malformed
    fn kill_query(&self, ctx: &SecurityContext, query_id: &str) -> Result<KillResult, ProcedureError>;

    /// Terminate several queries. Permission is checked for every target
    /// before any is cancelled.
    ///
    /// # Errors
    ///
    /// Same as [`kill_query`](Self::kill_query); on any error nothing is
    /// cancelled.
    fn kill_queries(
        &self,
        ctx: &SecurityContext,
        query_ids: &[&str],
    ) -> Result<Vec<KillResult>, ProcedureError>;

    /// List the role table.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` unless the caller is an administrator or
    /// holds one of the procedure's allowed roles.
    fn list_roles(&self, ctx: &SecurityContext) -> Result<Vec<RoleRow>, ProcedureError>;
}
