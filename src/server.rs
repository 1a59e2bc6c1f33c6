use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::basic_auth_middleware;
use crate::state::AppState;

/// Route table with the security layer applied to every route and the fallback
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new().merge(user_routes());

    if config.docs.enabled {
        router = router.merge(docs_routes());
    }

    let router = router
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), basic_auth_middleware))
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

fn user_routes() -> Router<AppState> {
    use handlers::user;

    Router::new()
        .route("/user", post(user::create_user))
        .route("/user/:username", get(user::get_user))
}

fn docs_routes() -> Router<AppState> {
    use handlers::docs;

    Router::new()
        .route("/v2/api-docs", get(docs::api_docs))
        .route("/swagger-resources", get(docs::swagger_resources))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(CorsLayer::new().allow_origin(AllowOrigin::list(origins)))
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = app(state, config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("User access API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
