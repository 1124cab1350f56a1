//! Errors raised while loading configuration and wiring the module.

use std::path::PathBuf;

use kdb_security::SecurityError;

#[derive(thiserror::Error, Debug)]
pub enum KernelSecurityError {
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(Box<figment::Error>),

    #[error("invalid role configuration: {0}")]
    Roles(#[from] SecurityError),
}

impl From<figment::Error> for KernelSecurityError {
    fn from(e: figment::Error) -> Self {
        Self::Config(Box::new(e))
    }
}
