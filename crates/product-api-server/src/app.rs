use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::state::AppState;
use crate::utils::error::ApiError;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route("/ask", post(handlers::ask::ask_handler))
        .route("/categories", get(handlers::products::list_categories_handler))
        .route("/brands", get(handlers::products::list_brands_handler))
        .route("/search", get(handlers::products::search_handler))
        .route("/products", get(handlers::products::list_products_handler))
        .route("/products/random", get(handlers::products::random_products_handler))
        .route("/products/{id}", get(handlers::products::get_product_handler))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

/// Panic di handler jadi 500 dengan body JSON yang sama seperti error lain
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::InternalError(format!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{ErrorResponse, GENERIC_ERROR_MESSAGE};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_panic_becomes_json_internal_error() {
        let response = handle_panic(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "InternalError");
        assert_eq!(body.message, GENERIC_ERROR_MESSAGE);
    }
}
