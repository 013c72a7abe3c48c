use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crafterp_core::CredentialId;

use crate::{Role, TokenError};

/// JWT claims as they appear on the wire.
///
/// Timestamps are NumericDate seconds; `sub` is the decimal credential id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: credential identifier.
    pub sub: String,

    /// Role at issue time. Advisory only; the stored role is authoritative.
    pub role: Role,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,

    /// Token identifier, unique per issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Verified, typed view of a token's claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: CredentialId,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<JwtClaims> for TokenClaims {
    type Error = TokenError;

    fn try_from(claims: JwtClaims) -> Result<Self, Self::Error> {
        let subject = claims.sub.parse().map_err(|_| TokenError::Malformed)?;
        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::Malformed)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Malformed)?;
        Ok(Self {
            subject,
            role: claims.role,
            issued_at,
            expires_at,
        })
    }
}

/// Deterministically validate the time window of already-verified claims.
///
/// Signature verification happens before this is called; an expired token
/// with a good signature therefore surfaces as `Expired`.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::Malformed);
    }
    if now >= claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}
