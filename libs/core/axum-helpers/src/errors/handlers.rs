use axum::response::Response;

use super::{error_response, ErrorCode};

/// Router fallback rendering the standard 404 body.
pub async fn not_found() -> Response {
    error_response(ErrorCode::NotFound, "The requested route does not exist")
}
