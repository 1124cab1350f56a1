//! Authorization scopes and the resources they cover.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SecurityError;

const MAX_DATABASE_NAME_LEN: usize = 63;

/// Token that selects the DBMS-wide scope when parsing a [`Scope`].
pub const DBMS_SCOPE_TOKEN: &str = "dbms";

/// Validated database (tenant) name.
///
/// ASCII alphanumerics plus `_`, `-` and `.`, starting with a letter,
/// at most 63 characters. Compared case-insensitively by normalising to
/// lowercase at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Parse and normalise a database name.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::InvalidScope`] if the name is empty, too long,
    /// or contains characters outside the allowed set.
    pub fn new(raw: &str) -> Result<Self, SecurityError> {
        let invalid = |reason: &str| SecurityError::InvalidScope {
            token: raw.to_owned(),
            reason: reason.to_owned(),
        };

        let Some(first) = raw.chars().next() else {
            return Err(invalid("database name is empty"));
        };
        if raw.len() > MAX_DATABASE_NAME_LEN {
            return Err(invalid("database name is too long"));
        }
        if !first.is_ascii_alphabetic() {
            return Err(invalid("database name must start with a letter"));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(invalid(&format!("unexpected character '{bad}'")));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DatabaseName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// Scope requested when a login authorizes a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Server-wide scope, covers every resource.
    Dbms,
    /// A single database (tenant).
    Database(DatabaseName),
}

impl Scope {
    /// Database scope from a raw name.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::InvalidScope`] if the name is not valid.
    pub fn database(name: &str) -> Result<Self, SecurityError> {
        DatabaseName::new(name).map(Self::Database)
    }

    /// Returns `true` if a context of this scope may act on `resource`.
    ///
    /// A database scope covers its own database and the DBMS-wide resource,
    /// since administrative procedures are invoked from ordinary database
    /// transactions. It never covers another database.
    #[must_use]
    pub fn covers(&self, resource: &Resource) -> bool {
        match (self, resource) {
            (Self::Dbms, _) | (Self::Database(_), Resource::Dbms) => true,
            (Self::Database(own), Resource::Database(target)) => own == target,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dbms => f.write_str(DBMS_SCOPE_TOKEN),
            Self::Database(name) => write!(f, "database:{name}"),
        }
    }
}

impl FromStr for Scope {
    type Err = SecurityError;

    /// Accepts `dbms`, `database:<name>` or a bare database name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case(DBMS_SCOPE_TOKEN) {
            return Ok(Self::Dbms);
        }
        let name = token.strip_prefix("database:").unwrap_or(token);
        Self::database(name)
    }
}

/// Target of a guarded operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Server-wide objects: running queries, transactions, users and roles.
    Dbms,
    /// Data and schema of one database.
    Database(DatabaseName),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dbms => f.write_str(DBMS_SCOPE_TOKEN),
            Self::Database(name) => write!(f, "database:{name}"),
        }
    }
}
