use anyhow::Result;
use async_trait::async_trait;

/// External text-generation collaborator used by `/ask`.
///
/// Implementations may fail on network, quota or auth problems; callers treat
/// the returned text as opaque.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn get_response(&self, question: &str) -> Result<String>;
}
