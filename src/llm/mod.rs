//! LLM client abstraction.
//!
//! Provides a unified interface for the providers used by extraction,
//! keyword expansion, and answer synthesis.

mod factory;
mod ollama;
mod openai;

pub use factory::{build_ollama_client, build_openai_client, build_provider};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::{Error, Result};
use std::time::Duration;

/// A text-completion backend.
///
/// Extraction, keyword expansion, and answer synthesis each make one call per
/// chunk or question. Implementations are blocking.
pub trait LlmProvider: Send + Sync {
    /// Short provider name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Completes a single user prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply cannot be decoded.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Completes a user prompt under a system instruction.
    ///
    /// The default prepends the system text to the prompt; providers with
    /// native system messages override it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply cannot be decoded.
    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.complete(&format!("{system}\n\n{user}"))
    }
}

/// Timeouts for provider HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmHttpConfig {
    /// Whole-request timeout in milliseconds; 0 disables it.
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds; 0 disables it.
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            connect_timeout_ms: 5_000,
        }
    }
}

impl LlmHttpConfig {
    /// Takes the `[llm]` timeouts, keeping defaults for unset values.
    #[must_use]
    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        let defaults = Self::default();
        Self {
            timeout_ms: config.timeout_ms.unwrap_or(defaults.timeout_ms),
            connect_timeout_ms: config
                .connect_timeout_ms
                .unwrap_or(defaults.connect_timeout_ms),
        }
    }
}

/// Builds a blocking HTTP client for LLM requests with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build LLM HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// Classifies a transport error for logging.
fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_request() {
        "request"
    } else {
        "unknown"
    }
}

/// Maps a failed send to `OperationFailed`, logging the failure kind.
pub(crate) fn transport_error(
    provider: &'static str,
    operation: &str,
    e: &reqwest::Error,
) -> Error {
    let kind = error_kind(e);
    tracing::error!(provider, error = %e, error_kind = kind, "LLM request failed");
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("{kind} error: {e}"),
    }
}

/// Passes 2xx responses through; anything else becomes `OperationFailed`
/// carrying the response body.
pub(crate) fn ensure_success(
    provider: &'static str,
    operation: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    tracing::error!(provider, %status, body = %body, "LLM provider rejected request");
    Err(Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("{provider} returned {status}: {body}"),
    })
}

/// Returns the JSON payload of a model reply.
///
/// A fenced code block wins over bare JSON. Otherwise the span from the first
/// `{` or `[` to the last matching closer is returned. A reply with no JSON
/// comes back trimmed.
#[must_use]
pub fn extract_json_from_response(response: &str) -> &str {
    let text = response.trim();
    fenced_block(text)
        .or_else(|| bracketed(text))
        .unwrap_or(text)
}

/// Body of the first fenced block, without its `json` info string.
fn fenced_block(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once("```")?;
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let (body, _) = rest.split_once("```")?;
    let body = body.trim();
    Some(bracketed(body).unwrap_or(body))
}

/// Span from the first opening bracket to the last closer of the same kind.
fn bracketed(text: &str) -> Option<&str> {
    let open = text.find(['{', '['])?;
    let closer = if text[open..].starts_with('{') { '}' } else { ']' };
    let close = text.rfind(closer).filter(|&close| close > open)?;
    Some(&text[open..=close])
}
