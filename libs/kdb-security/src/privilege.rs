//! Operation classes and the privilege bit set that grants them.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::SecurityError;

/// Coarse class of a guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    /// Reading data.
    Read,
    /// Creating, updating or deleting data.
    Write,
    /// Creating or dropping indexes and constraints.
    Schema,
    /// Server administration: user/role management, other sessions' queries.
    Admin,
}

impl OperationClass {
    /// All operation classes, in privilege order.
    pub const ALL: [Self; 4] = [Self::Read, Self::Write, Self::Schema, Self::Admin];

    /// The privilege bit that grants this class.
    #[must_use]
    pub const fn privilege(self) -> Privileges {
        match self {
            Self::Read => Privileges::READ,
            Self::Write => Privileges::WRITE,
            Self::Schema => Privileges::SCHEMA,
            Self::Admin => Privileges::ADMIN,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Schema => "schema",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationClass {
    type Err = SecurityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "schema" => Ok(Self::Schema),
            "admin" => Ok(Self::Admin),
            _ => Err(SecurityError::UnknownPrivilege { name: s.to_owned() }),
        }
    }
}

bitflags! {
    /// Set of granted privileges. Empty means no access.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Privileges: u8 {
        const READ   = 0b0001;
        const WRITE  = 0b0010;
        const SCHEMA = 0b0100;
        const ADMIN  = 0b1000;
    }
}

impl Privileges {
    /// Every privilege. Reserved for the full-access mode.
    pub const FULL: Self = Self::READ
        .union(Self::WRITE)
        .union(Self::SCHEMA)
        .union(Self::ADMIN);

    /// Returns `true` if this set grants the given operation class.
    #[must_use]
    pub const fn grants(self, op: OperationClass) -> bool {
        self.contains(op.privilege())
    }

    /// Operation classes granted by this set, in privilege order.
    pub fn classes(self) -> impl Iterator<Item = OperationClass> {
        OperationClass::ALL
            .into_iter()
            .filter(move |op| self.grants(*op))
    }

    /// Parse a list of privilege names (`read`, `write`, `schema`, `admin`).
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::UnknownPrivilege`] on the first unknown name.
    pub fn parse_names<I, S>(names: I) -> Result<Self, SecurityError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().try_fold(Self::empty(), |acc, name| {
            let op: OperationClass = name.as_ref().parse()?;
            Ok(acc | op.privilege())
        })
    }
}

impl fmt::Display for Privileges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for op in self.classes() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(op.as_str())?;
            first = false;
        }
        Ok(())
    }
}
