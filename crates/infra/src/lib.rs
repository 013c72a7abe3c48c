//! Infrastructure layer: configuration, database pool, credential persistence.

pub mod config;
pub mod credentials;
pub mod db;


pub use config::{AppConfig, AuthSettings, DatabaseSettings};
pub use credentials::PostgresCredentialStore;
pub use db::Database;
