//! Configuration for the static credential verifier.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthNPluginConfig {
    /// Verifier name reported in logs.
    pub name: String,

    /// Verifier priority (lower = tried first).
    pub priority: i16,

    /// Principals accepted with `Basic` credentials.
    pub users: Vec<UserEntry>,

    /// Tokens accepted with `Bearer` credentials.
    pub tokens: Vec<TokenEntry>,
}

impl Default for StaticAuthNPluginConfig {
    fn default() -> Self {
        Self {
            name: "static".to_owned(),
            priority: 100,
            users: Vec::new(),
            tokens: Vec::new(),
        }
    }
}

/// A principal with its password and role assignment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserEntry {
    pub name: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: SecretString,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Maps a bearer token to a principal and its roles.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenEntry {
    #[serde(deserialize_with = "deserialize_secret")]
    pub token: SecretString,
    /// Principal name the token authenticates as.
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}
