//! `crafterp-auth`: authentication and role-based authorization.
//!
//! This crate is decoupled from HTTP; storage is reached only through the
//! [`CredentialStore`] contract.

pub mod account;
pub mod authenticator;
pub mod authorize;
pub mod claims;
pub mod credential;
pub mod error;
pub mod gate;
pub mod in_memory_store;
pub mod password;
pub mod roles;
pub mod token;

pub use account::{AccountContext, PublicAccount};
pub use authenticator::{Authenticator, NewAccount, TokenResponse};
pub use authorize::{AccessPolicy, AccessPolicyBuilder};
pub use claims::{JwtClaims, TokenClaims, validate_claims};
pub use credential::{AccountStatus, Credential, CredentialStore, NewCredential, StoreError, UnknownStatus};
pub use error::{AuthError, AuthFailure, ConfigurationError};
pub use gate::AccessGate;
pub use in_memory_store::InMemoryCredentialStore;
pub use password::{PasswordError, PasswordHasher};
pub use roles::{Role, UnknownRole};
pub use token::{TokenError, TokenService};
