// handlers/docs.rs - documentation endpoints

use axum::{extract::State, Json};

use crate::docs::{SwaggerDocument, SwaggerResource};
use crate::state::AppState;

/// GET /v2/api-docs - Swagger 2.0 document, generated once at startup
pub async fn api_docs(State(state): State<AppState>) -> Json<SwaggerDocument> {
    Json(state.docs.as_ref().clone())
}

/// GET /swagger-resources - documentation groups
pub async fn swagger_resources() -> Json<Vec<SwaggerResource>> {
    Json(vec![SwaggerResource::default_group()])
}
