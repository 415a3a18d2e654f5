//! Caller authentication.
//!
//! Sessions live in the fronting auth proxy. The gateway only checks that
//! the proxy presented the shared API key (when one is configured) and reads
//! the authenticated account id from the actor header.

use crate::domain::error::{codes, ApiError};
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
};
use shared_types::UserId;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Paths reachable without credentials
const PUBLIC_PATHS: &[&str] = &["/health"];

/// API key layer
#[derive(Clone)]
pub struct AuthLayer {
    api_key: Option<Arc<str>>,
}

impl AuthLayer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.map(Arc::from),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            api_key: self.api_key.clone(),
        }
    }
}

/// API key service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    api_key: Option<Arc<str>>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let api_key = self.api_key.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path();
            if let Some(expected) = api_key.as_deref() {
                if !PUBLIC_PATHS.contains(&path) && !check_api_key(req.headers(), expected) {
                    warn!(path = %path, "Request rejected - missing or invalid API key");
                    return Ok(
                        ApiError::unauthenticated("missing or invalid API key").into_response()
                    );
                }
            }

            inner.call(req).await
        })
    }
}

/// Check the presented API key (Bearer token or `x-api-key`)
fn check_api_key(headers: &HeaderMap, expected: &str) -> bool {
    if let Some(auth) = headers.get("authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return constant_time_compare(token, expected);
            }
        }
    }

    if let Some(api_key) = headers.get("x-api-key") {
        if let Ok(key_str) = api_key.to_str() {
            return constant_time_compare(key_str, expected);
        }
    }

    false
}

/// Constant-time string comparison.
///
/// Runs in time independent of how many leading bytes match; a length
/// mismatch is folded into the same comparison.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());

    // Different pad bytes guarantee a mismatch when lengths differ.
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}

/// Read the authenticated actor id from `header`.
///
/// A missing header is 401 `unauthenticated`; a value that is not a
/// positive integer is 400 `invalid_user_id`.
pub fn actor_from_headers(headers: &HeaderMap, header: &str) -> Result<UserId, ApiError> {
    let raw = headers
        .get(header)
        .ok_or_else(|| ApiError::unauthenticated(format!("missing {header} header")))?;

    let text = raw.to_str().map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_USER_ID,
            format!("{header} is not valid text"),
        )
    })?;

    let actor = text.trim().parse::<UserId>()?;
    debug!(actor = %actor, "Authenticated actor");
    Ok(actor)
}
