//! Caller identity
//!
//! Authentication happens in front of this service. The gateway forwards the
//! authenticated user's id in the `x-user-id` header.

use axum::{extract::FromRequestParts, http::request::Parts};
use wayfarer_core::models::UserId;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthenticated("Missing x-user-id header"))?;

        raw.to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(|id| CurrentUser(UserId(id)))
            .ok_or_else(|| ApiError::unauthenticated("Malformed x-user-id header"))
    }
}
