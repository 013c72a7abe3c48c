//! Authentication: bearer token -> live account context.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{AccountContext, AuthError, AuthFailure, CredentialStore, StoreError, TokenService};

/// Verifies a bearer token and re-reads the account it names.
///
/// Server state is authoritative: the token's embedded role is ignored and a
/// deactivated account is rejected even while its token is still unexpired.
#[derive(Clone)]
pub struct AccessGate {
    tokens: Arc<TokenService>,
    store: Arc<dyn CredentialStore>,
}

impl AccessGate {
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn CredentialStore>) -> Self {
        Self { tokens, store }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    pub async fn authenticate(&self, bearer: &str, now: DateTime<Utc>) -> Result<AccountContext, AuthError> {
        let bearer = bearer.trim();
        if bearer.is_empty() {
            return Err(AuthError::unauthenticated(AuthFailure::MissingCredentials));
        }

        let claims = self
            .tokens
            .verify(bearer, now)
            .map_err(AuthError::unauthenticated)?;

        let credential = match self.store.find_credential_by_id(claims.subject).await {
            Ok(Some(credential)) => credential,
            Ok(None) => return Err(AuthError::unauthenticated(AuthFailure::UnknownAccount)),
            Err(StoreError::InvalidRecord(msg)) => {
                tracing::warn!(subject = %claims.subject, error = %msg, "credential row failed to decode");
                return Err(AuthError::unauthenticated(AuthFailure::InvalidAccountRecord));
            }
            Err(err) => return Err(err.into()),
        };

        if !credential.is_active() {
            return Err(AuthError::unauthenticated(AuthFailure::InactiveAccount));
        }

        if credential.role != claims.role {
            tracing::debug!(
                subject = %claims.subject,
                token_role = %claims.role,
                stored_role = %credential.role,
                "token role is stale; using stored role"
            );
        }

        Ok(credential.context())
    }
}

impl core::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccessGate")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
