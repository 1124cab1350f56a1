//! Service implementation for the static credential verifier.

use std::collections::HashMap;

use authn_resolver_sdk::{AuthNResolverError, AuthenticationResult, Credentials};
use kdb_security::Identity;
use secrecy::{ExposeSecret, SecretString};

use crate::config::StaticAuthNPluginConfig;

struct UserRecord {
    password: SecretString,
    roles: Vec<String>,
}

struct TokenRecord {
    token: SecretString,
    name: String,
    roles: Vec<String>,
}

/// Static credential verifier.
pub struct Service {
    name: String,
    priority: i16,
    users: HashMap<String, UserRecord>,
    tokens: Vec<TokenRecord>,
}

impl Service {
    /// Create a service from plugin configuration.
    ///
    /// Entries with an empty name or secret are skipped. A later entry for
    /// the same principal replaces an earlier one.
    #[must_use]
    pub fn from_config(cfg: &StaticAuthNPluginConfig) -> Self {
        let mut users = HashMap::with_capacity(cfg.users.len());
        for u in &cfg.users {
            if u.name.trim().is_empty() || u.password.expose_secret().is_empty() {
                tracing::warn!(user = %u.name, "Skipping user entry with empty name or password");
                continue;
            }
            users.insert(
                u.name.clone(),
                UserRecord {
                    password: u.password.clone(),
                    roles: u.roles.clone(),
                },
            );
        }

        let tokens = cfg
            .tokens
            .iter()
            .filter(|t| {
                let usable = !t.name.trim().is_empty() && !t.token.expose_secret().is_empty();
                if !usable {
                    tracing::warn!(principal = %t.name, "Skipping token entry with empty name or token");
                }
                usable
            })
            .map(|t| TokenRecord {
                token: t.token.clone(),
                name: t.name.clone(),
                roles: t.roles.clone(),
            })
            .collect();

        Self {
            name: cfg.name.clone(),
            priority: cfg.priority,
            users,
            tokens,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn priority(&self) -> i16 {
        self.priority
    }

    /// Verify credentials against the configured tables.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the principal or token is unknown, or the
    ///   password does not match
    /// - `UnsupportedCredentials` if no credentials were presented
    pub fn verify(&self, credentials: &Credentials) -> Result<AuthenticationResult, AuthNResolverError> {
        match credentials {
            Credentials::Basic {
                principal,
                password,
            } => self.verify_password(principal, password),
            Credentials::Bearer(token) => self.verify_token(token),
            Credentials::None => Err(AuthNResolverError::UnsupportedCredentials(
                "no credentials presented".to_owned(),
            )),
        }
    }

    fn verify_password(
        &self,
        principal: &str,
        password: &SecretString,
    ) -> Result<AuthenticationResult, AuthNResolverError> {
        let presented = password.expose_secret();
        let record = self
            .users
            .get(principal)
            .filter(|r| !presented.is_empty() && r.password.expose_secret() == presented)
            .ok_or_else(|| AuthNResolverError::Unauthorized("invalid principal or password".to_owned()))?;

        build_result(principal, &record.roles)
    }

    fn verify_token(&self, token: &SecretString) -> Result<AuthenticationResult, AuthNResolverError> {
        let presented = token.expose_secret();
        if presented.is_empty() {
            return Err(AuthNResolverError::Unauthorized("empty token".to_owned()));
        }

        let record = self
            .tokens
            .iter()
            .find(|r| r.token.expose_secret() == presented)
            .ok_or_else(|| AuthNResolverError::Unauthorized("invalid token".to_owned()))?;

        build_result(&record.name, &record.roles)
    }
}

fn build_result(principal: &str, roles: &[String]) -> Result<AuthenticationResult, AuthNResolverError> {
    let identity =
        Identity::authenticated(principal).map_err(|e| AuthNResolverError::Internal(e.to_string()))?;
    Ok(AuthenticationResult::new(identity, roles.iter().cloned()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{TokenEntry, UserEntry};

    fn config() -> StaticAuthNPluginConfig {
        StaticAuthNPluginConfig {
            users: vec![
                UserEntry {
                    name: "alice".to_owned(),
                    password: SecretString::from("wonderland"),
                    roles: vec!["reader".to_owned(), "editor".to_owned()],
                },
                UserEntry {
                    name: "mallory".to_owned(),
                    password: SecretString::from(""),
                    roles: vec!["admin".to_owned()],
                },
            ],
            tokens: vec![TokenEntry {
                token: SecretString::from("ci-token"),
                name: "ci".to_owned(),
                roles: vec!["admin".to_owned()],
            }],
            ..StaticAuthNPluginConfig::default()
        }
    }

    #[test]
    fn basic_credentials_return_configured_roles() {
        let service = Service::from_config(&config());

        let auth = service
            .verify(&Credentials::basic("alice", "wonderland"))
            .unwrap();

        assert_eq!(auth.identity.name(), "alice");
        assert!(auth.identity.is_authenticated());
        assert!(auth.roles.contains("reader"));
        assert!(auth.roles.contains("editor"));
        assert_eq!(auth.roles.len(), 2);
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let service = Service::from_config(&config());

        let err = service
            .verify(&Credentials::basic("alice", "looking-glass"))
            .unwrap_err();
        assert!(matches!(err, AuthNResolverError::Unauthorized(_)));
    }

    #[test]
    fn unknown_principal_is_unauthorized() {
        let service = Service::from_config(&config());

        let err = service.verify(&Credentials::basic("bob", "x")).unwrap_err();
        assert!(matches!(err, AuthNResolverError::Unauthorized(_)));
    }

    #[test]
    fn entry_with_empty_password_never_matches() {
        let service = Service::from_config(&config());

        let err = service.verify(&Credentials::basic("mallory", "")).unwrap_err();
        assert!(matches!(err, AuthNResolverError::Unauthorized(_)));
    }

    #[test]
    fn bearer_token_maps_to_principal() {
        let service = Service::from_config(&config());

        let auth = service.verify(&Credentials::bearer("ci-token")).unwrap();
        assert_eq!(auth.identity.name(), "ci");
        assert!(auth.roles.contains("admin"));
    }

    #[test]
    fn unknown_or_empty_token_is_unauthorized() {
        let service = Service::from_config(&config());

        for token in ["nope", ""] {
            let err = service.verify(&Credentials::bearer(token)).unwrap_err();
            assert!(matches!(err, AuthNResolverError::Unauthorized(_)));
        }
    }

    #[test]
    fn missing_credentials_are_unsupported() {
        let service = Service::from_config(&config());

        let err = service.verify(&Credentials::None).unwrap_err();
        assert!(matches!(err, AuthNResolverError::UnsupportedCredentials(_)));
    }
}
