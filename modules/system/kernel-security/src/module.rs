//! Kernel security module.

use std::sync::Arc;

use authn_resolver::{AuthNResolverLocalClient, Service as AuthNService};
use dbms_procedures::{KernelTransactions, Service as ProceduresService};
use dbms_procedures_sdk::TransactionManager;
use kdb_security::RoleRegistry;
use static_authn_plugin::StaticAuthNPlugin;
use tracing::info;

use crate::config::{KernelSecurityConfig, RbacConfig};
use crate::error::KernelSecurityError;

/// The wired security components of one kernel instance.
///
/// Built once at startup. Role reloads go through
/// [`reload_roles`](Self::reload_roles) and affect only security contexts
/// authorized afterwards.
pub struct KernelSecurity {
    registry: Arc<RoleRegistry>,
    authn: Arc<AuthNResolverLocalClient>,
    transactions: Arc<KernelTransactions>,
    procedures: Arc<ProceduresService>,
}

impl KernelSecurity {
    /// Wire the module from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Roles` if the role table is invalid.
    #[tracing::instrument(skip_all)]
    pub fn init(cfg: &KernelSecurityConfig) -> Result<Self, KernelSecurityError> {
        let registry = Arc::new(RoleRegistry::new(cfg.rbac.snapshot()?));

        let verifier = Arc::new(StaticAuthNPlugin::from_config(&cfg.static_authn));
        let authn_svc = AuthNService::new(Arc::clone(&registry), &cfg.authn).with_verifier(verifier);
        let authn = Arc::new(AuthNResolverLocalClient::new(Arc::new(authn_svc)));

        let transactions = KernelTransactions::new();
        let procedures = Arc::new(ProceduresService::new(
            Arc::clone(&transactions) as Arc<dyn TransactionManager>,
            Arc::clone(&registry),
            &cfg.procedures,
        ));

        info!(
            roles = registry.snapshot().len(),
            "Kernel security module initialized"
        );

        Ok(Self {
            registry,
            authn,
            transactions,
            procedures,
        })
    }

    /// Replace the role table. Returns the new snapshot version.
    ///
    /// # Errors
    ///
    /// Returns `Roles` if the new table is invalid; the current table stays
    /// in effect.
    pub fn reload_roles(&self, rbac: &RbacConfig) -> Result<u64, KernelSecurityError> {
        Ok(self.registry.reload(rbac.roles()?)?)
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn authn(&self) -> &Arc<AuthNResolverLocalClient> {
        &self.authn
    }

    #[must_use]
    pub fn transactions(&self) -> &Arc<KernelTransactions> {
        &self.transactions
    }

    #[must_use]
    pub fn procedures(&self) -> &Arc<ProceduresService> {
        &self.procedures
    }
}
