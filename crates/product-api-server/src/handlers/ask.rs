use crate::models::{AskRequest, AskResponse};
use crate::services::AssistantService;
use crate::utils::error::ApiError;
use crate::utils::extract::ApiJson;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

/// POST /ask - jawaban AI + produk yang cocok dengan pertanyaan
pub async fn ask_handler(
    State(assistant): State<Arc<AssistantService>>,
    ApiJson(request): ApiJson<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    info!("Ask request: {}", request.question);

    let response = assistant.ask(&request).await?;

    Ok(Json(response))
}
