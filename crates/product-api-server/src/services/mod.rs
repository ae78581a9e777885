pub mod assistant;
pub mod gemini;
pub mod provider;
pub mod query_analyzer;

pub use assistant::AssistantService;
pub use gemini::GeminiService;
pub use provider::AnswerProvider;
pub use query_analyzer::{QueryAnalyzer, QueryIntent};
