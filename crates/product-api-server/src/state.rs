use axum::extract::FromRef;
use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::services::AssistantService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub assistant: Arc<AssistantService>,
}

impl FromRef<AppState> for Arc<CatalogService> {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}

impl FromRef<AppState> for Arc<AssistantService> {
    fn from_ref(state: &AppState) -> Self {
        state.assistant.clone()
    }
}
