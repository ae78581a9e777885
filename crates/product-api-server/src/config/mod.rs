pub mod settings;

pub use settings::{
    AssistantConfig, CatalogConfig, GeminiConfig, LimitsConfig, LoggingConfig, PromptsConfig,
    ServerConfig, Settings,
};
