//! Login, registration and credential lifecycle.
//!
//! bcrypt work runs on the blocking pool so it cannot stall the I/O threads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::OnceCell;

use crafterp_core::{CredentialId, DomainError, DomainResult, StaffId};

use crate::password::MAX_PASSWORD_BYTES;
use crate::{
    AccountStatus, AuthError, AuthFailure, CredentialStore, NewCredential, PasswordHasher,
    PublicAccount, Role, TokenService,
};

/// Hashed once and checked against when a login names an unknown username.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-usernames";

/// Role given to self-registered accounts.
pub const DEFAULT_SIGNUP_ROLE: Role = Role::Sales;

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// An account created by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub staff_id: Option<StaffId>,
    pub role: Role,
    pub status: AccountStatus,
}

#[derive(Clone)]
pub struct Authenticator {
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    store: Arc<dyn CredentialStore>,
    bootstrap_first_admin: bool,
    decoy_digest: Arc<OnceCell<String>>,
}

impl Authenticator {
    pub fn new(hasher: PasswordHasher, tokens: Arc<TokenService>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            hasher,
            tokens,
            store,
            bootstrap_first_admin: false,
            decoy_digest: Arc::new(OnceCell::new()),
        }
    }

    /// When enabled, the first account ever registered through signup becomes `admin`.
    pub fn with_first_admin_bootstrap(mut self, enabled: bool) -> Self {
        self.bootstrap_first_admin = enabled;
        self
    }

    /// Exchange username/password for a bearer token.
    ///
    /// Unknown user, wrong password and inactive account are indistinguishable
    /// to the caller. Every path that reaches the store runs one bcrypt verify.
    pub async fn login(&self, username: &str, password: &str, now: DateTime<Utc>) -> Result<TokenResponse, AuthError> {
        validate_username(username)?;
        validate_password(password)?;

        let Some(credential) = self.store.find_credential_by_username(username).await? else {
            let decoy = self.decoy_digest().await?;
            self.verify_off_thread(password, decoy).await?;
            tracing::debug!(%username, "login for unknown username");
            return Err(AuthError::unauthenticated(AuthFailure::BadPassword));
        };

        if !self.verify_off_thread(password, &credential.password_hash).await? {
            tracing::debug!(%username, "login with wrong password");
            return Err(AuthError::unauthenticated(AuthFailure::BadPassword));
        }

        if !credential.is_active() {
            tracing::info!(%username, "login refused for inactive account");
            return Err(AuthError::unauthenticated(AuthFailure::InactiveAccount));
        }

        let token = self
            .tokens
            .issue(credential.id, credential.role, now)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(subject = %credential.id, role = %credential.role, "issued access token");
        Ok(TokenResponse::bearer(token))
    }

    /// Self-service registration. The role is never caller-chosen.
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        staff_id: StaffId,
    ) -> Result<PublicAccount, AuthError> {
        let role = if self.bootstrap_first_admin && self.store.count_credentials().await? == 0 {
            tracing::warn!(%username, "first registered account promoted to admin");
            Role::Admin
        } else {
            DEFAULT_SIGNUP_ROLE
        };

        self.create_account(NewAccount {
            username: username.to_string(),
            password: password.to_string(),
            staff_id: Some(staff_id),
            role,
            status: AccountStatus::Active,
        })
        .await
    }

    pub async fn create_account(&self, account: NewAccount) -> Result<PublicAccount, AuthError> {
        validate_username(&account.username)?;
        validate_password(&account.password)?;

        if self.store.find_credential_by_username(&account.username).await?.is_some() {
            return Err(DomainError::conflict("username already exists").into());
        }

        let password_hash = self.hash_off_thread(account.password).await?;
        let credential = self
            .store
            .insert_credential(NewCredential {
                staff_id: account.staff_id,
                username: account.username,
                password_hash,
                role: account.role,
                status: account.status,
            })
            .await?;

        tracing::info!(id = %credential.id, role = %credential.role, "credential created");
        Ok(PublicAccount::from(&credential))
    }

    pub async fn account(&self, id: CredentialId) -> Result<PublicAccount, AuthError> {
        self.store
            .find_credential_by_id(id)
            .await?
            .map(|c| PublicAccount::from(&c))
            .ok_or(AuthError::NotFound)
    }

    pub async fn set_status(&self, id: CredentialId, status: AccountStatus) -> Result<PublicAccount, AuthError> {
        let credential = self
            .store
            .update_credential_status(id, status)
            .await?
            .ok_or(AuthError::NotFound)?;

        tracing::info!(%id, %status, "credential status changed");
        Ok(PublicAccount::from(&credential))
    }

    /// Soft delete: the row stays, only the status flips.
    pub async fn deactivate(&self, id: CredentialId) -> Result<PublicAccount, AuthError> {
        self.set_status(id, AccountStatus::Inactive).await
    }

    pub async fn set_role(&self, id: CredentialId, role: Role) -> Result<PublicAccount, AuthError> {
        let credential = self
            .store
            .update_credential_role(id, role)
            .await?
            .ok_or(AuthError::NotFound)?;

        tracing::info!(%id, %role, "credential role changed");
        Ok(PublicAccount::from(&credential))
    }

    async fn hash_off_thread(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher;
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))??;
        Ok(digest)
    }

    async fn decoy_digest(&self) -> Result<&str, AuthError> {
        self.decoy_digest
            .get_or_try_init(|| self.hash_off_thread(DECOY_PASSWORD.to_string()))
            .await
            .map(String::as_str)
    }

    async fn verify_off_thread(&self, password: &str, digest: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        let password = password.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
    }
}

impl core::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Authenticator")
            .field("hasher", &self.hasher)
            .field("bootstrap_first_admin", &self.bootstrap_first_admin)
            .finish_non_exhaustive()
    }
}

pub fn validate_username(username: &str) -> DomainResult<()> {
    if username.trim().is_empty() {
        return Err(DomainError::validation("username is required"));
    }
    Ok(())
}

/// Oversized passwords are rejected outright rather than silently truncated.
pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.is_empty() {
        return Err(DomainError::validation("password is required"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(DomainError::validation(format!(
            "password cannot exceed {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}
