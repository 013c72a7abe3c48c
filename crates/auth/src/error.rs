use thiserror::Error;

use crafterp_core::DomainError;

use crate::{PasswordError, Role, StoreError, TokenError};

/// Why authentication failed. Kept for logs; never sent to clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("missing bearer credentials")]
    MissingCredentials,

    #[error("token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("no account for token subject")]
    UnknownAccount,

    #[error("account is inactive")]
    InactiveAccount,

    #[error("stored account record is invalid")]
    InvalidAccountRecord,

    #[error("username or password mismatch")]
    BadPassword,
}

/// Request-level failure of the auth layer.
///
/// Every variant short-circuits before a protected handler runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// 401. The reason is for logs only.
    #[error("authentication failed: {0}")]
    Unauthenticated(AuthFailure),

    /// 403: identity is valid but its role is not permitted.
    #[error("role '{role}' is not permitted by policy '{policy}'")]
    Forbidden { role: Role, policy: String },

    /// 400: malformed payload.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    /// 500: the store lookup failed. Not retried here.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn unauthenticated(reason: impl Into<AuthFailure>) -> Self {
        Self::Unauthenticated(reason.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<DomainError> for AuthError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound => Self::NotFound,
            DomainError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::InvalidRecord(msg) => Self::Internal(msg),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(value: PasswordError) -> Self {
        Self::Internal(value.to_string())
    }
}

/// Startup-time policy misconfiguration. Fatal; never produced per request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("policy '{policy}' references unknown role '{role}'")]
    UnknownRole { policy: String, role: String },

    #[error("policy '{0}' permits no roles")]
    EmptyRoleSet(String),
}
