//! Credential persistence.

pub mod postgres;

pub use postgres::PostgresCredentialStore;
