//! Credential records and the store contract the auth layer consumes.
//!
//! The store is an external collaborator; this crate only defines the
//! contract. Implementations live in `crafterp-infra`.

use core::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crafterp_core::{CredentialId, StaffId};

use crate::{AccountContext, Role};

/// Account status. Deactivation is a status flip; rows are never deleted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown account status '{0}'")]
pub struct UnknownStatus(pub String);

impl AccountStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored credential row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: CredentialId,
    /// Linked staff record, if any.
    pub staff_id: Option<StaffId>,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn context(&self) -> AccountContext {
        AccountContext {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            status: self.status,
        }
    }
}

/// Values for a credential about to be inserted (id and timestamp are store-assigned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub staff_id: Option<StaffId>,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub status: AccountStatus,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or the query failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A unique constraint (username) was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value falls outside the closed role/status sets.
    #[error("invalid credential record: {0}")]
    InvalidRecord(String),
}

/// Persistence contract for credentials (the identity resolver).
///
/// Every call borrows at most one pooled connection and returns it before
/// completing. No retries happen at this layer.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_credential_by_id(&self, id: CredentialId) -> Result<Option<Credential>, StoreError>;

    async fn find_credential_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError>;

    async fn insert_credential(&self, new: NewCredential) -> Result<Credential, StoreError>;

    /// Returns `None` when no row has this id.
    async fn update_credential_status(
        &self,
        id: CredentialId,
        status: AccountStatus,
    ) -> Result<Option<Credential>, StoreError>;

    /// Returns `None` when no row has this id.
    async fn update_credential_role(
        &self,
        id: CredentialId,
        role: Role,
    ) -> Result<Option<Credential>, StoreError>;

    async fn count_credentials(&self) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn find_credential_by_id(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        (**self).find_credential_by_id(id).await
    }

    async fn find_credential_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        (**self).find_credential_by_username(username).await
    }

    async fn insert_credential(&self, new: NewCredential) -> Result<Credential, StoreError> {
        (**self).insert_credential(new).await
    }

    async fn update_credential_status(
        &self,
        id: CredentialId,
        status: AccountStatus,
    ) -> Result<Option<Credential>, StoreError> {
        (**self).update_credential_status(id, status).await
    }

    async fn update_credential_role(
        &self,
        id: CredentialId,
        role: Role,
    ) -> Result<Option<Credential>, StoreError> {
        (**self).update_credential_role(id, role).await
    }

    async fn count_credentials(&self) -> Result<u64, StoreError> {
        (**self).count_credentials().await
    }
}
