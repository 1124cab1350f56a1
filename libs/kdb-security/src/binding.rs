//! Lifecycle of a security context inside one transaction.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::context::SecurityContext;
use crate::error::SecurityError;

/// State of a [`TransactionBinding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Bound at transaction begin, not yet consulted.
    Created,
    /// Consulted at least once.
    Active,
    /// The transaction ended.
    Closed,
}

const CREATED: u8 = 0;
const ACTIVE: u8 = 1;
const CLOSED: u8 = 2;

/// Binds one [`SecurityContext`] to one transaction.
///
/// The context itself is immutable and shared by `Arc` with cross-transaction
/// observers. The binding only tracks whether the owning transaction is
/// still open: after [`close`](Self::close), [`context`](Self::context)
/// fails fast with [`SecurityError::ContextClosed`] instead of answering.
#[derive(Debug)]
pub struct TransactionBinding {
    context: Arc<SecurityContext>,
    state: AtomicU8,
}

impl TransactionBinding {
    #[must_use]
    pub fn new(context: SecurityContext) -> Self {
        Self {
            context: Arc::new(context),
            state: AtomicU8::new(CREATED),
        }
    }

    /// The bound context.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::ContextClosed`] once the transaction closed.
    pub fn context(&self) -> Result<&Arc<SecurityContext>, SecurityError> {
        match self
            .state
            .compare_exchange(CREATED, ACTIVE, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) | Err(ACTIVE) => Ok(&self.context),
            Err(_) => {
                tracing::error!(
                    subject = %self.context.subject(),
                    "security context consulted after transaction close"
                );
                Err(SecurityError::ContextClosed)
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> BindingState {
        match self.state.load(Ordering::Acquire) {
            CREATED => BindingState::Created,
            ACTIVE => BindingState::Active,
            _ => BindingState::Closed,
        }
    }

    /// Mark the transaction closed. Idempotent.
    pub fn close(&self) {
        self.state.store(CLOSED, Ordering::Release);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state() == BindingState::Closed
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::scope::Scope;

    #[test]
    fn moves_through_lifecycle() {
        let binding = TransactionBinding::new(SecurityContext::anonymous(Scope::Dbms));
        assert_eq!(binding.state(), BindingState::Created);

        assert!(binding.context().is_ok());
        assert_eq!(binding.state(), BindingState::Active);
        assert!(binding.context().is_ok());

        binding.close();
        assert!(binding.is_closed());
        assert_eq!(binding.context().unwrap_err(), SecurityError::ContextClosed);
    }

    #[test]
    fn close_before_first_use_fails_fast() {
        let binding = TransactionBinding::new(SecurityContext::system());
        binding.close();
        binding.close();
        assert_eq!(binding.context().unwrap_err(), SecurityError::ContextClosed);
    }
}
