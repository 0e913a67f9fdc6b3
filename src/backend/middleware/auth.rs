/**
 * Caller Identity Extraction
 *
 * Every workspace operation receives the caller's identity as an explicit
 * `Option<Uuid>`. The `Caller` extractor produces it from the
 * `Authorization: Bearer <jwt>` header.
 *
 * Extraction never rejects a request and never touches storage. A missing
 * header, a malformed header, or an invalid or expired token yields an
 * anonymous caller (`Caller(None)`). Each operation then applies its own
 * unauthenticated semantics: some fail with 401, some return an empty list
 * or `null`. Storage failures surface from the operations themselves.
 */

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::backend::auth::sessions::{verify_token, SessionError};

/// Identity of the requesting user, `None` when anonymous
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caller(pub Option<Uuid>);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(resolve_caller(&parts.headers)))
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// User id named by a valid bearer token, if any
pub fn resolve_caller(headers: &HeaderMap) -> Option<Uuid> {
    let token = bearer_token(headers)?;

    match verify_token(token) {
        Ok(user_id) => Some(user_id),
        Err(SessionError::Expired) => {
            tracing::debug!("Ignoring expired token");
            None
        }
        Err(e) => {
            tracing::warn!("Ignoring invalid token: {}", e);
            None
        }
    }
}
