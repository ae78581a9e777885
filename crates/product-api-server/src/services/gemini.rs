use crate::config::GeminiConfig;
use crate::services::provider::AnswerProvider;
use crate::utils::error::ApiError;
use crate::utils::limiters::Limiters;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

// Minimal OpenAI-compatible request (Gemini v1beta/openai endpoint)
#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    max_tokens: usize,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OpenAiMessage {
    pub role: String,
    pub content: String,
}

// Response Structures
#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    config: GeminiConfig,
    system_prompt: String,
    limiters: Arc<Limiters>,
}

impl GeminiService {
    pub fn new(config: GeminiConfig, system_prompt: String, limiters: Arc<Limiters>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .context("Failed to create Gemini HTTP client")?;

        Ok(Self {
            client,
            config,
            system_prompt,
            limiters,
        })
    }

    /// Generate a chat completion (non-streaming) for a single user question
    pub async fn generate(&self, question: &str) -> Result<String, ApiError> {
        let _permit = self
            .limiters
            .acquire_llm("gemini_chat")
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let request = OpenAiChatRequest {
            model: &self.config.model,
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: self.system_prompt.clone(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: question.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        debug!("Calling Gemini model {} ({} chars)", self.config.model, question.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(format!("Gemini Network Error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::ServiceUnavailable(format!(
                "Gemini Chat API Error ({}): {}",
                status, text
            )));
        }

        let body: OpenAiChatResponse = response.json().await.map_err(|e| {
            ApiError::InternalError(format!("Failed to parse Gemini response: {}", e))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ApiError::InternalError("Gemini returned no answer".to_string()))
    }
}

#[async_trait]
impl AnswerProvider for GeminiService {
    async fn get_response(&self, question: &str) -> Result<String> {
        self.generate(question).await.map_err(|e| anyhow::anyhow!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(base_url: String) -> GeminiService {
        let mut config = GeminiConfig::with_api_key("test-key");
        config.base_url = base_url;
        config.timeout_seconds = 5;

        let limiters = Arc::new(Limiters::new(&LimitsConfig {
            llm_concurrency: 2,
            acquire_timeout_ms: 1000,
        }));

        GeminiService::new(config, "Kamu asisten belanja.".to_string(), limiters).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gemini-1.5-flash",
                "stream": false,
                "messages": [
                    { "role": "system", "content": "Kamu asisten belanja." },
                    { "role": "user", "content": "hp bagus?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "  Coba Redmi Note 13.  " } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = service(server.uri()).get_response("hp bagus?").await.unwrap();
        assert_eq!(answer, "Coba Redmi Note 13.");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = service(server.uri()).generate("hp bagus?").await.unwrap_err();
        match err {
            ApiError::ServiceUnavailable(msg) => assert!(msg.contains("429")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        assert!(service(server.uri()).get_response("halo").await.is_err());
    }
}
