//! Turns the `[llm]` config section into a ready client.

use std::sync::Arc;

use super::{LlmHttpConfig, LlmProvider, OllamaClient, OpenAiClient};
use crate::config::{LlmConfig, LlmProviderKind};
use crate::{Error, Result};

/// `OpenAI` client with the config's model, base URL, token limit and
/// timeouts applied over the defaults.
#[must_use]
pub fn build_openai_client(llm_config: &LlmConfig) -> OpenAiClient {
    let client = OpenAiClient::new().with_http_config(LlmHttpConfig::from_config(llm_config));
    let client = match llm_config.model.as_deref() {
        Some(model) => client.with_model(model),
        None => client,
    };
    let client = match llm_config.base_url.as_deref() {
        Some(url) => client.with_endpoint(url),
        None => client,
    };
    match llm_config.max_tokens {
        Some(limit) => client.with_max_tokens(limit),
        None => client,
    }
}

/// Ollama client with the config's model, base URL and timeouts applied.
#[must_use]
pub fn build_ollama_client(llm_config: &LlmConfig) -> OllamaClient {
    let client = OllamaClient::new().with_http_config(LlmHttpConfig::from_config(llm_config));
    let client = match llm_config.model.as_deref() {
        Some(model) => client.with_model(model),
        None => client,
    };
    match llm_config.base_url.as_deref() {
        Some(url) => client.with_endpoint(url),
        None => client,
    }
}

/// Builds the provider selected by `llm_config.provider`.
///
/// # Errors
///
/// Returns [`Error::NotConfigured`] when `openai` is selected without an
/// API key in the environment.
pub fn build_provider(llm_config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match llm_config.provider {
        LlmProviderKind::OpenAi => {
            let client = build_openai_client(llm_config);
            if !client.has_api_key() {
                return Err(Error::NotConfigured(
                    "OPENAI_API_KEY must be set to use the openai provider".to_string(),
                ));
            }
            Arc::new(client)
        },
        LlmProviderKind::Ollama => Arc::new(build_ollama_client(llm_config)),
    };
    tracing::debug!(provider = provider.name(), "Built LLM provider");
    Ok(provider)
}
