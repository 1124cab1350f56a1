//! Domain service for the DBMS procedures.

use std::sync::Arc;

use dbms_procedures_sdk::signature::names;
use dbms_procedures_sdk::{
    CancelOutcome, DbmsProceduresClient, KillResult, ProcedureError, ProcedureGuard,
    ProcedureMode, ProcedureSignature, QueryId, QueryRow, RoleRow, RunningQuery,
    TransactionManager,
};
use kdb_security::{Grant, Resource, RoleRegistry, SecurityContext};
use tracing::{debug, info, warn};

use crate::config::DbmsProceduresConfig;

/// DBMS procedures service.
pub struct Service {
    transactions: Arc<dyn TransactionManager>,
    registry: Arc<RoleRegistry>,
    list_roles: ProcedureSignature,
}

impl Service {
    #[must_use]
    pub fn new(
        transactions: Arc<dyn TransactionManager>,
        registry: Arc<RoleRegistry>,
        config: &DbmsProceduresConfig,
    ) -> Self {
        Self {
            transactions,
            registry,
            list_roles: ProcedureSignature::new(names::LIST_ROLES, ProcedureMode::Dbms)
                .allow_roles(config.list_roles_allowed.iter().cloned()),
        }
    }

    /// Resolve and authorize the targets of a kill.
    ///
    /// Runs the permission check for every target that exists before the
    /// caller cancels anything. Targets that do not exist are returned as
    /// `None`.
    fn authorize_kill(
        &self,
        ctx: &SecurityContext,
        raw_ids: &[&str],
        action: &str,
    ) -> Result<Vec<(QueryId, Option<RunningQuery>)>, ProcedureError> {
        let is_admin = match ctx.grant() {
            Grant::Anonymous => {
                warn!(action, "anonymous caller refused");
                return Err(ProcedureError::permission_denied(action));
            }
            Grant::Authenticated { is_admin, .. } => *is_admin,
        };

        let ids = raw_ids
            .iter()
            .map(|raw| raw.parse::<QueryId>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut targets = Vec::with_capacity(ids.len());
        for id in ids {
            let target = self.transactions.snapshot(id);
            if let Some(query) = &target
                && !is_admin
                && !ctx.is_same_subject(&query.owner)
            {
                warn!(
                    action,
                    subject = %ctx.subject(),
                    query = %id,
                    owner = %query.owner.subject(),
                    "kill refused for query owned by another subject"
                );
                return Err(ProcedureError::permission_denied(action));
            }
            targets.push((id, target));
        }
        Ok(targets)
    }

    fn terminate(&self, id: QueryId, target: Option<RunningQuery>) -> KillResult {
        let Some(query) = target else {
            debug!(query = %id, "kill target not found");
            return KillResult::not_found(id);
        };

        match self.transactions.cancel(id) {
            CancelOutcome::Cancelled => {
                info!(query = %id, owner = %query.owner.subject(), "query killed");
            }
            CancelOutcome::AlreadyFinished | CancelOutcome::NotFound => {
                debug!(query = %id, "kill target finished before cancellation");
            }
        }
        KillResult::found(id, query.owner.subject().name())
    }
}

impl DbmsProceduresClient for Service {
    #[tracing::instrument(skip_all, fields(subject = %ctx.subject()))]
    fn list_queries(&self, ctx: &SecurityContext) -> Result<Vec<QueryRow>, ProcedureError> {
        let is_admin = match ctx.grant() {
            Grant::Anonymous => {
                debug!("anonymous caller sees no queries");
                return Ok(Vec::new());
            }
            Grant::Authenticated { is_admin, .. } => *is_admin,
        };

        let mut rows: Vec<QueryRow> = self
            .transactions
            .running_queries()
            .iter()
            .filter(|q| is_admin || ctx.is_same_subject(&q.owner))
            .map(QueryRow::from)
            .collect();
        rows.sort_by_key(|r| r.query_id);
        Ok(rows)
    }

    #[tracing::instrument(skip_all, fields(subject = %ctx.subject(), query = query_id))]
    fn kill_query(&self, ctx: &SecurityContext, query_id: &str) -> Result<KillResult, ProcedureError> {
        let mut targets = self.authorize_kill(ctx, &[query_id], names::KILL_QUERY)?;
        match targets.pop() {
            Some((id, target)) => Ok(self.terminate(id, target)),
            None => Err(ProcedureError::InvalidQueryId(query_id.to_owned())),
        }
    }

    #[tracing::instrument(skip_all, fields(subject = %ctx.subject(), count = query_ids.len()))]
    fn kill_queries(
        &self,
        ctx: &SecurityContext,
        query_ids: &[&str],
    ) -> Result<Vec<KillResult>, ProcedureError> {
        let targets = self.authorize_kill(ctx, query_ids, names::KILL_QUERIES)?;
        Ok(targets
            .into_iter()
            .map(|(id, target)| self.terminate(id, target))
            .collect())
    }

    #[tracing::instrument(skip_all, fields(subject = %ctx.subject()))]
    fn list_roles(&self, ctx: &SecurityContext) -> Result<Vec<RoleRow>, ProcedureError> {
        ProcedureGuard::check(ctx, &self.list_roles, &Resource::Dbms)?;

        Ok(self
            .registry
            .snapshot()
            .roles()
            .map(|role| RoleRow {
                role: role.name().to_owned(),
                privileges: role
                    .privileges()
                    .classes()
                    .map(|op| op.as_str().to_owned())
                    .collect(),
            })
            .collect())
    }
}
