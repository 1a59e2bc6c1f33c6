use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::security::{parse_basic_credentials, AccessDecision};
use crate::state::AppState;

/// Basic authentication followed by role-based authorization.
///
/// Supplied credentials must be valid even on paths that would not need
/// them. On success the `Principal` is injected into request extensions.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = parse_basic_credentials(request.headers()).map_err(|e| {
        tracing::debug!("Rejecting malformed Authorization header: {}", e);
        ApiError::from_auth(e, &state.realm)
    })?;

    let principal = match credentials {
        Some(creds) => Some(
            state
                .users
                .authenticate(&creds.username, &creds.password)
                .map_err(|e| {
                    tracing::warn!("Authentication failed for user '{}'", creds.username);
                    ApiError::from_auth(e, &state.realm)
                })?,
        ),
        None => None,
    };

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match state.policy.decide(&method, &path, principal.as_ref()) {
        AccessDecision::Granted => {}
        AccessDecision::Unauthenticated => {
            tracing::debug!("Anonymous request to {} {} needs authentication", method, path);
            return Err(ApiError::unauthorized(
                "Full authentication is required to access this resource",
                state.realm.as_ref(),
            ));
        }
        AccessDecision::Forbidden { required } => {
            let username = principal.as_ref().map(|p| p.username.as_str()).unwrap_or("<anonymous>");
            tracing::info!(
                "Access denied for '{}' on {} {} (requires one of: {})",
                username,
                method,
                path,
                required.join(", ")
            );
            return Err(ApiError::forbidden("Access is denied"));
        }
    }

    if let Some(principal) = principal {
        request.extensions_mut().insert(principal);
    }

    Ok(next.run(request).await)
}
