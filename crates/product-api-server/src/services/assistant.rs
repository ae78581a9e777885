use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::catalog::CatalogService;
use crate::config::AssistantConfig;
use crate::models::{AskRequest, AskResponse, IntentInfo};
use crate::services::provider::AnswerProvider;
use crate::services::query_analyzer::QueryAnalyzer;
use crate::utils::error::ApiError;

/// Combines the AI answer with catalog products matching the question's intent
pub struct AssistantService {
    catalog: Arc<CatalogService>,
    provider: Option<Arc<dyn AnswerProvider>>,
    config: AssistantConfig,
}

impl AssistantService {
    pub fn new(
        catalog: Arc<CatalogService>,
        provider: Option<Arc<dyn AnswerProvider>>,
        config: AssistantConfig,
    ) -> Self {
        Self {
            catalog,
            provider,
            config,
        }
    }

    pub fn ai_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(ApiError::BadRequest("question must not be empty".to_string()));
        }

        let request_id = Uuid::new_v4();
        let start = Instant::now();

        let intent = QueryAnalyzer::extract_intent(question);
        let relevant = self.catalog.get_relevant(intent.category, intent.max_price);

        let answer = match &self.provider {
            None => {
                warn!("[{}] AI provider not configured, answering from catalog only", request_id);
                self.config.unavailable_message.clone()
            }
            Some(provider) => {
                let limit = Duration::from_secs(self.config.ai_timeout_seconds.max(1));
                match tokio::time::timeout(limit, provider.get_response(question)).await {
                    Ok(Ok(answer)) => answer,
                    Ok(Err(e)) => self.on_ai_failure(request_id, question, format!("{:#}", e))?,
                    Err(_) => self.on_ai_failure(
                        request_id,
                        question,
                        format!("timed out after {:?}", limit),
                    )?,
                }
            }
        };

        info!(
            "[{}] Answered question: category={:?}, max_price={:?}, products={}, took={:?}",
            request_id,
            intent.category,
            intent.max_price,
            relevant.products.len(),
            start.elapsed()
        );

        Ok(AskResponse {
            answer,
            products: relevant.products,
            question: request.question.clone(),
            note: relevant.note,
            intent: IntentInfo::from(&intent),
        })
    }

    fn on_ai_failure(
        &self,
        request_id: Uuid,
        question: &str,
        cause: String,
    ) -> Result<String, ApiError> {
        error!(
            "[{}] AI provider failed for question '{}': {}",
            request_id, question, cause
        );

        if self.config.degrade_on_ai_error {
            Ok(self.config.failure_message.clone())
        } else {
            Err(ApiError::InternalError(format!(
                "[{}] AI provider failed: {}",
                request_id, cause
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogOrigin, LoadedCatalog};
    use crate::models::Product;
    use crate::services::provider::MockAnswerProvider;
    use async_trait::async_trait;
    use serde_json::json;

    fn catalog() -> Arc<CatalogService> {
        let products = vec![
            Product::normalize(&json!({
                "id": "P001", "name": "iPhone 15 Pro", "category": "smartphone", "price": 21999000
            })),
            Product::normalize(&json!({
                "id": "L001", "name": "MacBook Pro 14", "category": "laptop", "price": 37999000
            })),
        ];
        Arc::new(CatalogService::new(
            LoadedCatalog {
                products,
                origin: CatalogOrigin::File { encoding: "utf-8" },
            },
            5,
        ))
    }

    fn config(degrade_on_ai_error: bool) -> AssistantConfig {
        AssistantConfig {
            ai_timeout_seconds: 1,
            degrade_on_ai_error,
            unavailable_message: "AI tidak tersedia".to_string(),
            failure_message: "AI sedang gangguan".to_string(),
        }
    }

    fn ask(question: &str) -> AskRequest {
        AskRequest {
            question: question.to_string(),
        }
    }

    fn ids(response: &AskResponse) -> Vec<&str> {
        response.products.iter().map(|p| p.id.as_str()).collect()
    }

    struct SlowProvider;

    #[async_trait]
    impl AnswerProvider for SlowProvider {
        async fn get_response(&self, _question: &str) -> anyhow::Result<String> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok("terlambat".to_string())
        }
    }

    #[tokio::test]
    async fn test_answer_combines_ai_text_and_products() {
        let mut provider = MockAnswerProvider::new();
        provider
            .expect_get_response()
            .times(1)
            .returning(|q| Ok(format!("Jawaban untuk: {}", q)));

        let service = AssistantService::new(catalog(), Some(Arc::new(provider)), config(false));
        let response = service
            .ask(&ask("rekomendasi hp di bawah 25 juta"))
            .await
            .unwrap();

        assert_eq!(response.answer, "Jawaban untuk: rekomendasi hp di bawah 25 juta");
        assert_eq!(ids(&response), vec!["P001"]);
        assert_eq!(response.question, "rekomendasi hp di bawah 25 juta");
        assert_eq!(response.intent.category.as_deref(), Some("smartphone"));
        assert_eq!(response.intent.max_price, Some(25_000_000.0));
        assert!(!response.note.is_empty());
    }

    #[tokio::test]
    async fn test_no_match_still_answers_with_note() {
        let mut provider = MockAnswerProvider::new();
        provider
            .expect_get_response()
            .returning(|_| Ok("Belum ada laptop semurah itu.".to_string()));

        let service = AssistantService::new(catalog(), Some(Arc::new(provider)), config(false));
        let response = service.ask(&ask("laptop 1 juta")).await.unwrap();

        assert!(response.products.is_empty());
        assert_eq!(response.note, crate::catalog::service::NO_MATCH_NOTE);
    }

    #[tokio::test]
    async fn test_provider_error_becomes_internal_error() {
        let mut provider = MockAnswerProvider::new();
        provider
            .expect_get_response()
            .returning(|_| Err(anyhow::anyhow!("quota exceeded")));

        let service = AssistantService::new(catalog(), Some(Arc::new(provider)), config(false));
        let result = service.ask(&ask("hp murah")).await;

        assert!(matches!(result, Err(ApiError::InternalError(_))));
    }

    #[tokio::test]
    async fn test_provider_error_degrades_when_configured() {
        let mut provider = MockAnswerProvider::new();
        provider
            .expect_get_response()
            .returning(|_| Err(anyhow::anyhow!("network down")));

        let service = AssistantService::new(catalog(), Some(Arc::new(provider)), config(true));
        let response = service.ask(&ask("laptop")).await.unwrap();

        assert_eq!(response.answer, "AI sedang gangguan");
        assert_eq!(ids(&response), vec!["L001"]);
    }

    #[tokio::test]
    async fn test_missing_provider_answers_from_catalog() {
        let service = AssistantService::new(catalog(), None, config(false));
        let response = service.ask(&ask("ada apa saja?")).await.unwrap();

        assert!(!service.ai_configured());
        assert_eq!(response.answer, "AI tidak tersedia");
        assert_eq!(ids(&response), vec!["P001", "L001"]);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let service = AssistantService::new(catalog(), Some(Arc::new(SlowProvider)), config(false));
        let result = service.ask(&ask("hp")).await;

        assert!(matches!(result, Err(ApiError::InternalError(_))));
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let service = AssistantService::new(catalog(), None, config(false));
        let result = service.ask(&ask("   ")).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
