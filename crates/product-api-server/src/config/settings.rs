use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
    pub limits: LimitsConfig,
    pub assistant: AssistantConfig,
    pub prompts: PromptsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    pub path: PathBuf,
    pub default_limit: usize,
    pub load_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_gemini_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_gemini_temperature")]
    pub temperature: f32,
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_gemini_timeout() -> u64 {
    30
}

fn default_gemini_max_tokens() -> usize {
    1024
}

fn default_gemini_temperature() -> f32 {
    0.7
}

impl GeminiConfig {
    /// Config with every field defaulted except the key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            timeout_seconds: default_gemini_timeout(),
            max_tokens: default_gemini_max_tokens(),
            temperature: default_gemini_temperature(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LimitsConfig {
    pub llm_concurrency: usize,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssistantConfig {
    pub ai_timeout_seconds: u64,
    /// Jawab dengan produk + pesan statis kalau AI gagal (bukan 500)
    pub degrade_on_ai_error: bool,
    pub unavailable_message: String,
    pub failure_message: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptsConfig {
    pub system_prompt: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub filter: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("catalog.path", "data/products.json")?
            .set_default("catalog.default_limit", 5)?
            .set_default("catalog.load_timeout_seconds", 10)?
            .set_default("limits.llm_concurrency", 8)?
            .set_default("limits.acquire_timeout_ms", 5000)?
            .set_default("assistant.ai_timeout_seconds", 30)?
            .set_default("assistant.degrade_on_ai_error", false)?
            .set_default(
                "assistant.unavailable_message",
                "Asisten AI sedang tidak tersedia. Berikut produk yang mungkin sesuai dengan pertanyaan Anda.",
            )?
            .set_default(
                "assistant.failure_message",
                "Maaf, asisten AI sedang mengalami gangguan. Berikut produk yang mungkin sesuai.",
            )?
            .set_default(
                "prompts.system_prompt",
                "Kamu adalah asisten belanja yang membantu pelanggan memilih produk elektronik. \
                 Jawab dengan singkat, ramah, dan dalam Bahasa Indonesia.",
            )?
            .set_default("logging.json", true)?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;

        if settings.gemini.is_none() {
            if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
                if !api_key.trim().is_empty() {
                    settings.gemini = Some(GeminiConfig::with_api_key(api_key.trim()));
                }
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be > 0");
        }

        if self.catalog.default_limit == 0 {
            anyhow::bail!("catalog.default_limit must be >= 1");
        }

        if let Some(gemini) = &self.gemini {
            if gemini.api_key.trim().is_empty() {
                anyhow::bail!("gemini.api_key must not be empty when [gemini] is configured");
            }
        }

        Ok(())
    }
}
