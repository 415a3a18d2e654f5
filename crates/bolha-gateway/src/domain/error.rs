//! Gateway error types.
//!
//! Every failed request is answered with `{ "error": <code>, "message": <text> }`.

use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bolha_connections::{ConnectionError, ErrorKind};
use serde::{Deserialize, Serialize};
use shared_types::IdError;

/// Stable error codes produced by the gateway itself.
pub mod codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const INVALID_USER_ID: &str = "invalid_user_id";
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    pub const TIMEOUT: &str = "timeout";
    pub const INTERNAL: &str = "internal";
}

/// Error body on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// An HTTP error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Malformed body or parameters
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::INVALID_REQUEST, details)
    }

    /// Missing or rejected credentials
    pub fn unauthenticated(details: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHENTICATED, details)
    }

    /// Internal error
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL, details)
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code.clone(),
            message: self.message.clone(),
        }
    }
}

/// Status code for each domain error class.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Capacity | ErrorKind::Conflict | ErrorKind::ConcurrentModification => {
            StatusCode::CONFLICT
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        // The only domain auth failure is an authenticated but unknown actor.
        ErrorKind::Auth => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ConnectionError> for ApiError {
    fn from(e: ConnectionError) -> Self {
        let status = status_for(e.kind());
        // Internal details stay in the logs.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal error".to_string()
        } else {
            e.to_string()
        };
        Self::new(status, e.code(), message)
    }
}

impl From<IdError> for ApiError {
    fn from(e: IdError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::INVALID_USER_ID, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, codes::INVALID_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body())).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Gateway-level errors (startup, binding, storage)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Connection store could not be opened
    #[error("storage error: {0}")]
    Storage(String),

    /// Server stopped with an error
    #[error("server error: {0}")]
    Server(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolha_connections::Side;
    use shared_types::UserId;
    use std::time::Duration;

    fn uid(raw: u64) -> UserId {
        UserId::new(raw).unwrap()
    }

    #[test]
    fn test_domain_mapping() {
        let cases = [
            (ConnectionError::SelfTarget(uid(1)), StatusCode::BAD_REQUEST, "self_target"),
            (
                ConnectionError::CapacityExceeded {
                    user: uid(1),
                    side: Side::Actor,
                    capacity: 15,
                },
                StatusCode::CONFLICT,
                "capacity_exceeded",
            ),
            (
                ConnectionError::AlreadyConnected {
                    actor: uid(1),
                    peer: uid(2),
                },
                StatusCode::CONFLICT,
                "already_connected",
            ),
            (
                ConnectionError::NoPendingRequest {
                    actor: uid(1),
                    peer: uid(2),
                },
                StatusCode::NOT_FOUND,
                "no_pending_request",
            ),
            (ConnectionError::UserNotFound(uid(9)), StatusCode::NOT_FOUND, "user_not_found"),
            (ConnectionError::UnknownActor(uid(9)), StatusCode::FORBIDDEN, "unknown_actor"),
            (
                ConnectionError::ConcurrentModification { attempts: 5 },
                StatusCode::CONFLICT,
                "concurrent_modification",
            ),
            (
                ConnectionError::Timeout {
                    waited: Duration::from_secs(2),
                },
                StatusCode::SERVICE_UNAVAILABLE,
                "timeout",
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_id_errors_map_to_invalid_user_id() {
        for err in [IdError::Zero, IdError::Malformed("abc".into())] {
            let api: ApiError = err.into();
            assert_eq!(api.status, StatusCode::BAD_REQUEST);
            assert_eq!(api.code, codes::INVALID_USER_ID);
        }
    }

    #[test]
    fn test_internal_message_is_generic() {
        let api: ApiError = ConnectionError::Store("disk /dev/sda1 gone".into()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "internal error");
    }

    #[test]
    fn test_unauthorized_sets_challenge() {
        let response = ApiError::unauthenticated("missing").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
