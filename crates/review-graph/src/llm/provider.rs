//! TextGenerator trait definition

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a text-generation client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Connection refused, non-2xx status, or a malformed response.
    #[error("request failed: {0}")]
    Request(String),

    #[error("model identifier is empty")]
    EmptyModel,
}

/// Stateless request/response text generation.
///
/// One prompt per call; implementations keep no conversation memory between
/// calls. The model identifier is configuration and is passed through
/// unchanged.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct Echo;
///
/// #[async_trait]
/// impl TextGenerator for Echo {
///     async fn generate(&self, _model: &str, prompt: &str) -> Result<String, GenerationError> {
///         Ok(prompt.to_string())
///     }
///
///     fn name(&self) -> &str { "echo" }
/// }
/// ```
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a single prompt.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
