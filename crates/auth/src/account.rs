use serde::Serialize;

use crafterp_core::{CredentialId, StaffId};

use crate::{AccountStatus, Credential, Role};

/// Authenticated account context handed to protected handlers.
///
/// Built from the stored credential, never from token contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountContext {
    pub id: CredentialId,
    pub username: String,
    pub role: Role,
    pub status: AccountStatus,
}

/// Public view of a credential (no password digest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicAccount {
    pub id: CredentialId,
    pub username: String,
    pub role: Role,
    pub staff_id: Option<StaffId>,
    pub is_active: bool,
}

impl From<&Credential> for PublicAccount {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id,
            username: credential.username.clone(),
            role: credential.role,
            staff_id: credential.staff_id,
            is_active: credential.is_active(),
        }
    }
}
