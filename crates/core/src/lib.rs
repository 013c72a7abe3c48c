//! `crafterp-core`: shared identifiers and error model.
//!
//! This crate contains **pure** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{CredentialId, StaffId};
