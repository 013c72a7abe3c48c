use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use crafterp_auth::AuthError;

/// Outward form of an `AuthError`.
///
/// 401 responses never say which check failed.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            AuthError::Unauthenticated(reason) => {
                tracing::debug!(%reason, "authentication failed");
                let mut res = json_error(
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "could not validate credentials",
                );
                res.headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                res
            }
            AuthError::Forbidden { .. } => json_error(StatusCode::FORBIDDEN, "forbidden", "insufficient role"),
            AuthError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
            AuthError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
            AuthError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
            AuthError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "credential store unavailable");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
            }
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "internal auth error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crafterp_auth::{AuthFailure, Role, TokenError};

    #[test]
    fn every_authentication_failure_looks_the_same() {
        for reason in [
            AuthFailure::MissingCredentials,
            AuthFailure::Token(TokenError::Expired),
            AuthFailure::Token(TokenError::SignatureInvalid),
            AuthFailure::InactiveAccount,
            AuthFailure::UnknownAccount,
        ] {
            let res = ApiError(AuthError::Unauthenticated(reason)).into_response();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
        }
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let forbidden = AuthError::Forbidden {
            role: Role::Sales,
            policy: "admin".to_string(),
        };
        let cases = [
            (forbidden, StatusCode::FORBIDDEN),
            (AuthError::validation("bad"), StatusCode::BAD_REQUEST),
            (AuthError::Conflict("dup".to_string()), StatusCode::CONFLICT),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (AuthError::StoreUnavailable("down".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
