//! Generation service integration.
//!
//! Every orchestration step that needs text generation goes through the
//! [`GenerationService`] trait. Backends: Gemini (hosted) and Ollama (local),
//! with an ordered fallback chain in [`GenerationManager`].

mod gemini;
mod ollama;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

use async_trait::async_trait;

use crate::core::AiConfig;

/// Generation service errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Empty response from model")]
    NoResponse,
}

/// A black-box text generation backend.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate text for a prompt under the given system instructions.
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, ServiceError>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Check if the provider is reachable/configured.
    async fn is_available(&self) -> bool;
}

/// Provider chain with fallback.
///
/// Tries providers in order: Gemini (if API key set) -> Ollama (if running).
pub struct GenerationManager {
    providers: Vec<Box<dyn GenerationService>>,
}

impl GenerationManager {
    /// Create a manager with the default provider chain, applying the
    /// configured model to the hosted provider.
    pub async fn new(config: &AiConfig) -> Self {
        let mut providers: Vec<Box<dyn GenerationService>> = Vec::new();

        if let Some(gemini) = gemini_from_env(config) {
            if gemini.is_available().await {
                providers.push(Box::new(gemini));
            }
        }

        let ollama = OllamaProvider::new();
        if ollama.is_available().await {
            providers.push(Box::new(ollama));
        }

        Self { providers }
    }

    /// Create with an explicit provider list.
    pub fn with_providers(providers: Vec<Box<dyn GenerationService>>) -> Self {
        Self { providers }
    }

    /// Check if any provider is available.
    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Name of the provider that will be tried first.
    pub fn active_provider(&self) -> Option<&str> {
        self.providers.first().map(|p| p.name())
    }
}

/// Build the Gemini provider from the environment, with the configured model.
fn gemini_from_env(config: &AiConfig) -> Option<GeminiProvider> {
    GeminiProvider::new().ok().map(|p| p.with_model(config.model.clone()))
}

#[async_trait]
impl GenerationService for GenerationManager {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, ServiceError> {
        for provider in &self.providers {
            match provider.generate(prompt, system).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                }
            }
        }

        Err(ServiceError::ProviderNotAvailable("no generation provider available".to_string()))
    }

    fn name(&self) -> &str {
        "manager"
    }

    async fn is_available(&self) -> bool {
        self.is_configured()
    }
}
