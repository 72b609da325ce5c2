//! Ollama text generation via Rig
//!
//! Wraps rig-core's Ollama client. A fresh single-turn agent is built per
//! call, so no conversation state survives between prompts.

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::ollama;
use tracing::debug;

use super::provider::{GenerationError, TextGenerator};

/// Standard Ollama endpoint.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Ollama-backed [`TextGenerator`].
///
/// # Example
///
/// ```rust,ignore
/// let generator = OllamaGenerator::new("http://localhost:11434");
/// let text = generator.generate("codellama", "Summarize ...").await?;
/// ```
pub struct OllamaGenerator {
    client: ollama::Client,
    host: String,
}

impl OllamaGenerator {
    /// Create a generator talking to the given Ollama host.
    ///
    /// Rig's Ollama client reads its base URL from `OLLAMA_API_BASE_URL`, so
    /// this must run before any generation task is spawned.
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        std::env::set_var("OLLAMA_API_BASE_URL", &host);
        let client = ollama::Client::from_env();

        debug!(host = %host, "Ollama client configured");

        Self { client, host }
    }

    /// Base URL of the Ollama server.
    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        if model.trim().is_empty() {
            return Err(GenerationError::EmptyModel);
        }

        let agent = self.client.agent(model).build();
        let prompt = prompt.to_string();

        agent
            .prompt(&prompt)
            .await
            .map_err(|e| GenerationError::Request(format!("Ollama completion failed: {}", e)))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
