use axum::{http::StatusCode, response::IntoResponse};

/// No content response helper for successful writes
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> axum::response::Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
