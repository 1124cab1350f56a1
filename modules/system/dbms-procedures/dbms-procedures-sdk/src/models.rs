//! Models shared between the procedures and the transaction manager.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use kdb_security::SecurityContext;
use serde::Serialize;

use crate::error::ProcedureError;

const QUERY_ID_PREFIX: &str = "query-";
const TRANSACTION_ID_PREFIX: &str = "transaction-";

/// Username reported for a kill whose target was not found.
pub const UNKNOWN_USERNAME: &str = "n/a";
pub const QUERY_FOUND: &str = "Query found";
pub const QUERY_NOT_FOUND: &str = "No Query found with this id";

/// Kernel-wide query identifier, rendered `query-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryId(u64);

impl QueryId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{QUERY_ID_PREFIX}{}", self.0)
    }
}

impl FromStr for QueryId {
    type Err = ProcedureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .strip_prefix(QUERY_ID_PREFIX)
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|n| n.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| ProcedureError::InvalidQueryId(s.to_owned()))
    }
}

impl Serialize for QueryId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TRANSACTION_ID_PREFIX}{}", self.0)
    }
}

/// Snapshot of a query executing in some transaction.
///
/// `owner` is the security context bound to the owning transaction; it is
/// shared, never copied, so enforcement points see exactly what the owner
/// was granted.
#[derive(Debug, Clone)]
pub struct RunningQuery {
    pub query_id: QueryId,
    pub transaction_id: TransactionId,
    pub owner: Arc<SecurityContext>,
    pub query: String,
    pub parameters: BTreeMap<String, String>,
    pub started_at: SystemTime,
}

impl RunningQuery {
    /// Time since the query started. Zero if the clock went backwards.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed().unwrap_or_default()
    }
}

/// One row of the query listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRow {
    pub query_id: QueryId,
    pub username: String,
    pub query: String,
    pub parameters: BTreeMap<String, String>,
    /// Start time as milliseconds since the Unix epoch.
    pub started_at: u64,
    /// Elapsed time in milliseconds at listing time.
    pub elapsed_ms: u64,
}

impl From<&RunningQuery> for QueryRow {
    fn from(q: &RunningQuery) -> Self {
        Self {
            query_id: q.query_id,
            username: q.owner.subject().name().to_owned(),
            query: q.query.clone(),
            parameters: q.parameters.clone(),
            started_at: millis(q.started_at.duration_since(UNIX_EPOCH).unwrap_or_default()),
            elapsed_ms: millis(q.elapsed()),
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Result row of a kill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KillResult {
    pub query_id: String,
    pub username: String,
    pub message: String,
}

impl KillResult {
    #[must_use]
    pub fn found(query_id: QueryId, username: &str) -> Self {
        Self {
            query_id: query_id.to_string(),
            username: username.to_owned(),
            message: QUERY_FOUND.to_owned(),
        }
    }

    #[must_use]
    pub fn not_found(query_id: QueryId) -> Self {
        Self {
            query_id: query_id.to_string(),
            username: UNKNOWN_USERNAME.to_owned(),
            message: QUERY_NOT_FOUND.to_owned(),
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        self.message == QUERY_FOUND
    }
}

/// What the transaction manager did with a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The query was running and has been signalled.
    Cancelled,
    /// The query had already finished or been cancelled.
    AlreadyFinished,
    /// No query with this id is known.
    NotFound,
}

/// One row of the role listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRow {
    pub role: String,
    pub privileges: Vec<String>,
}
