//! Role-gated authorization policies.
//!
//! A policy is built and validated once at startup, then shared immutably by
//! every request to the operation it protects.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{AccessGate, AccountContext, AuthError, ConfigurationError, Role};

/// Pre-validated permitted-role set for one protected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    name: Arc<str>,
    permitted: BTreeSet<Role>,
}

impl AccessPolicy {
    pub fn builder(name: impl Into<String>) -> AccessPolicyBuilder {
        AccessPolicyBuilder {
            name: name.into(),
            roles: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Policy admitting any authenticated, active account.
    pub fn any_role(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            permitted: Role::ALL.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permits(&self, role: Role) -> bool {
        self.permitted.contains(&role)
    }

    /// Role check against an already authenticated account.
    pub fn check(&self, account: &AccountContext) -> Result<(), AuthError> {
        if self.permits(account.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                role: account.role,
                policy: self.name.to_string(),
            })
        }
    }

    /// Full per-request chain: token -> identity -> role.
    ///
    /// Nothing is cached between calls.
    pub async fn authorize(
        &self,
        gate: &AccessGate,
        bearer: &str,
        now: DateTime<Utc>,
    ) -> Result<AccountContext, AuthError> {
        let account = gate.authenticate(bearer, now).await?;
        self.check(&account)?;
        Ok(account)
    }
}

impl core::fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let roles: Vec<&str> = self.permitted.iter().map(Role::as_str).collect();
        write!(f, "{} {{{}}}", self.name, roles.join(", "))
    }
}

/// Builder for [`AccessPolicy`].
///
/// Role names given as text are checked against the registry in [`build`];
/// an unknown name is a configuration error, not a request-time failure.
///
/// [`build`]: AccessPolicyBuilder::build
#[derive(Debug, Clone)]
pub struct AccessPolicyBuilder {
    name: String,
    roles: Vec<Role>,
    named: Vec<String>,
}

impl AccessPolicyBuilder {
    pub fn allow(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn allow_named(mut self, role: impl Into<String>) -> Self {
        self.named.push(role.into());
        self
    }

    pub fn build(self) -> Result<AccessPolicy, ConfigurationError> {
        let mut permitted: BTreeSet<Role> = self.roles.into_iter().collect();

        for raw in self.named {
            let role = raw.parse::<Role>().map_err(|_| ConfigurationError::UnknownRole {
                policy: self.name.clone(),
                role: raw.clone(),
            })?;
            permitted.insert(role);
        }

        if permitted.is_empty() {
            return Err(ConfigurationError::EmptyRoleSet(self.name));
        }

        Ok(AccessPolicy {
            name: Arc::from(self.name),
            permitted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountStatus, AuthFailure, Credential, CredentialStore, InMemoryCredentialStore, NewCredential, TokenService};
    use chrono::Duration;
    use crafterp_core::CredentialId;

    fn account(role: Role) -> AccountContext {
        AccountContext {
            id: CredentialId::new(1),
            username: "alice".to_string(),
            role,
            status: AccountStatus::Active,
        }
    }

    #[test]
    fn accounts_policy_rejects_sales_and_accepts_accounts() {
        let policy = AccessPolicy::builder("accounts.reports")
            .allow(Role::Accounts)
            .build()
            .unwrap();

        assert!(matches!(
            policy.check(&account(Role::Sales)),
            Err(AuthError::Forbidden { role: Role::Sales, .. })
        ));
        assert_eq!(policy.check(&account(Role::Accounts)), Ok(()));
    }

    #[test]
    fn multiple_roles_are_allowed() {
        let policy = AccessPolicy::builder("accounts.summary")
            .allow_named("accounts")
            .allow_named("admin")
            .build()
            .unwrap();

        assert!(policy.permits(Role::Accounts));
        assert!(policy.permits(Role::Admin));
        assert!(!policy.permits(Role::Hr));
        assert_eq!(policy.to_string(), "accounts.summary {admin, accounts}");
    }

    #[test]
    fn unknown_role_fails_at_build_time() {
        let err = AccessPolicy::builder("reports")
            .allow(Role::Admin)
            .allow_named("auditor")
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::UnknownRole {
                policy: "reports".to_string(),
                role: "auditor".to_string(),
            }
        );
    }

    #[test]
    fn empty_policy_is_rejected() {
        let err = AccessPolicy::builder("nobody").build().unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyRoleSet("nobody".to_string()));
    }

    #[test]
    fn any_role_admits_every_registered_role() {
        let policy = AccessPolicy::any_role("me");
        assert!(Role::ALL.into_iter().all(|r| policy.permits(r)));
    }

    async fn seeded_gate(role: Role, status: AccountStatus) -> (AccessGate, Credential) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let credential = store
            .insert_credential(NewCredential {
                staff_id: None,
                username: "alice".to_string(),
                password_hash: "digest".to_string(),
                role,
                status,
            })
            .await
            .unwrap();
        let tokens = Arc::new(TokenService::new("secret", Duration::minutes(60)));
        (AccessGate::new(tokens, store), credential)
    }

    #[tokio::test]
    async fn authorize_runs_gate_then_role_check() {
        let (gate, credential) = seeded_gate(Role::Sales, AccountStatus::Active).await;
        let now = Utc::now();
        let token = gate.tokens().issue(credential.id, credential.role, now).unwrap();

        let sales = AccessPolicy::builder("sales").allow(Role::Sales).allow(Role::Crm).build().unwrap();
        let admin = AccessPolicy::builder("admin").allow(Role::Admin).build().unwrap();

        let ctx = sales.authorize(&gate, &token, now).await.unwrap();
        assert_eq!(ctx.role, Role::Sales);
        assert!(matches!(
            admin.authorize(&gate, &token, now).await,
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn authentication_failure_wins_over_role_check() {
        let (gate, credential) = seeded_gate(Role::Admin, AccountStatus::Inactive).await;
        let now = Utc::now();
        let token = gate.tokens().issue(credential.id, credential.role, now).unwrap();

        let admin = AccessPolicy::builder("admin").allow(Role::Admin).build().unwrap();
        assert_eq!(
            admin.authorize(&gate, &token, now).await,
            Err(AuthError::Unauthenticated(AuthFailure::InactiveAccount))
        );
    }
}
