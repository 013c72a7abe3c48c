//! One-way password hashing (bcrypt).
//!
//! Digests are self-describing (`$2b$<cost>$<salt><hash>`), so verification
//! needs nothing but the stored string.

use thiserror::Error;

/// Input limit of the bcrypt primitive, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Adaptive cost bounds accepted by the primitive.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("bcrypt cost {0} is outside {min}..={max}", min = MIN_COST, max = MAX_COST)]
    InvalidCost(u32),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// bcrypt hasher with a fixed cost.
///
/// Both paths truncate the password to its first [`MAX_PASSWORD_BYTES`] bytes
/// (byte-wise, not character-wise) before touching the primitive.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        bcrypt::hash(truncate(password), self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Hash with a caller-supplied salt (deterministic output).
    pub fn hash_with_salt(&self, password: &str, salt: [u8; 16]) -> Result<String, PasswordError> {
        bcrypt::hash_with_salt(truncate(password), self.cost, salt)
            .map(|parts| parts.format_for_version(bcrypt::Version::TwoB))
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Returns `false` for a mismatch and for a malformed digest alike.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match bcrypt::verify(truncate(password), digest) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::debug!(error = %err, "stored password digest is malformed");
                false
            }
        }
    }
}

fn truncate(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}
