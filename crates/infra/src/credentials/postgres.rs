//! Postgres-backed credential store.
//!
//! Table contract (migrations live outside this crate):
//!
//! ```sql
//! CREATE TABLE staff_credentials (
//!     id            BIGSERIAL PRIMARY KEY,
//!     staff_id      BIGINT,
//!     username      TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     role          TEXT NOT NULL,
//!     status        TEXT NOT NULL DEFAULT 'active',
//!     created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! ## Error Mapping
//!
//! | SQLx error | code | `StoreError` |
//! |---|---|---|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | column decode / unknown role or status text | n/a | `InvalidRecord` |
//! | anything else (pool closed, timeouts, network) | n/a | `Unavailable` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crafterp_auth::{AccountStatus, Credential, CredentialStore, NewCredential, Role, StoreError};
use crafterp_core::{CredentialId, StaffId};

#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip(self, id), fields(id = %id), err)]
    async fn find_credential_by_id(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, staff_id, username, password_hash, role, status, created_at
            FROM staff_credentials
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_credential_by_id", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_credential_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, staff_id, username, password_hash, role, status, created_at
            FROM staff_credentials
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_credential_by_username", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self, new), fields(username = %new.username, role = %new.role), err)]
    async fn insert_credential(&self, new: NewCredential) -> Result<Credential, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO staff_credentials (staff_id, username, password_hash, role, status, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            RETURNING id, staff_id, username, password_hash, role, status, created_at
            "#,
        )
        .bind(new.staff_id.map(|s| s.get()))
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(new.status.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_credential", e))?;

        decode_row(&row)
    }

    #[instrument(skip(self, id, status), fields(id = %id, status = %status), err)]
    async fn update_credential_status(
        &self,
        id: CredentialId,
        status: AccountStatus,
    ) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE staff_credentials
            SET status = $1
            WHERE id = $2
            RETURNING id, staff_id, username, password_hash, role, status, created_at
            "#,
        )
        .bind(status.as_str())
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_credential_status", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self, id, role), fields(id = %id, role = %role), err)]
    async fn update_credential_role(
        &self,
        id: CredentialId,
        role: Role,
    ) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE staff_credentials
            SET role = $1
            WHERE id = $2
            RETURNING id, staff_id, username, password_hash, role, status, created_at
            "#,
        )
        .bind(role.as_str())
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_credential_role", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn count_credentials(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM staff_credentials")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_credentials", e))?;

        Ok(count.max(0) as u64)
    }
}

/// Raw text becomes typed role/status here and nowhere else.
fn decode_row(row: &PgRow) -> Result<Credential, StoreError> {
    let column = |e: sqlx::Error| StoreError::InvalidRecord(format!("failed to decode credential row: {e}"));

    let id: i64 = row.try_get("id").map_err(column)?;
    let staff_id: Option<i64> = row.try_get("staff_id").map_err(column)?;
    let username: String = row.try_get("username").map_err(column)?;
    let password_hash: String = row.try_get("password_hash").map_err(column)?;
    let role: String = row.try_get("role").map_err(column)?;
    let status: String = row.try_get("status").map_err(column)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column)?;

    Ok(Credential {
        id: CredentialId::new(id),
        staff_id: staff_id.map(StaffId::new),
        username,
        password_hash,
        role: role
            .parse()
            .map_err(|e| StoreError::InvalidRecord(format!("credential {id}: {e}")))?,
        status: status
            .parse()
            .map_err(|e| StoreError::InvalidRecord(format!("credential {id}: {e}")))?,
        created_at,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            StoreError::InvalidRecord(format!("decode error in {}: {}", operation, err))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}
