use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crafterp_core::CredentialId;

use crate::{AccountStatus, Credential, CredentialStore, NewCredential, Role, StoreError};

/// In-memory credential store for tests/dev.
///
/// Mirrors the Postgres store: sequential ids starting at 1 and unique usernames.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<CredentialId, Credential>,
    next_id: i64,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("credential store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("credential store lock poisoned".to_string()))
    }

    fn update<F>(&self, id: CredentialId, f: F) -> Result<Option<Credential>, StoreError>
    where
        F: FnOnce(&mut Credential),
    {
        let mut inner = self.write()?;
        Ok(inner.rows.get_mut(&id).map(|row| {
            f(row);
            row.clone()
        }))
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_credential_by_id(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn find_credential_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self
            .read()?
            .rows
            .values()
            .find(|row| row.username == username)
            .cloned())
    }

    async fn insert_credential(&self, new: NewCredential) -> Result<Credential, StoreError> {
        let mut inner = self.write()?;
        if inner.rows.values().any(|row| row.username == new.username) {
            return Err(StoreError::Conflict(format!("username '{}' already exists", new.username)));
        }

        inner.next_id += 1;
        let credential = Credential {
            id: CredentialId::new(inner.next_id),
            staff_id: new.staff_id,
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            status: new.status,
            created_at: Utc::now(),
        };
        inner.rows.insert(credential.id, credential.clone());
        Ok(credential)
    }

    async fn update_credential_status(
        &self,
        id: CredentialId,
        status: AccountStatus,
    ) -> Result<Option<Credential>, StoreError> {
        self.update(id, |row| row.status = status)
    }

    async fn update_credential_role(
        &self,
        id: CredentialId,
        role: Role,
    ) -> Result<Option<Credential>, StoreError> {
        self.update(id, |row| row.role = role)
    }

    async fn count_credentials(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.rows.len() as u64)
    }
}
