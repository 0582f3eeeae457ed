use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, models::UserId};

/// HTTP header carrying the authenticated user id.
///
/// Authentication itself happens upstream; this service trusts the header
/// set by the gateway in front of it.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor resolving the user a request acts on behalf of
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))?;

        raw.to_str()
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|id| CurrentUser(UserId(id)))
            .ok_or_else(|| AppError::Unauthorized(format!("malformed {} header", USER_ID_HEADER)))
    }
}
