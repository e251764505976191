//! Authenticated principal forwarded by the gateway.

use crate::errors::AppError;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};

/// Header carrying the numeric id of the authenticated user.
pub const PRINCIPAL_HEADER: &str = "x-user-id";

/// Optional id of the caller, taken from [`PRINCIPAL_HEADER`].
///
/// Authentication happens upstream; a missing header means a system or
/// anonymous caller. A present but non-numeric header is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal(pub Option<i64>);

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(PRINCIPAL_HEADER) else {
            return Ok(Principal(None));
        };

        value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|id| Principal(Some(id)))
            .ok_or_else(|| {
                AppError::BadRequest(format!("Invalid {} header", PRINCIPAL_HEADER)).into_response()
            })
    }
}
