// handlers/mod.rs - route handlers
//
// Every route passes through the basic auth middleware first; handlers only
// run once the caller is authorized for the route.
pub mod docs;
pub mod user;

use axum::http::Uri;

use crate::error::ApiError;

/// Fallback for paths with no route
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
