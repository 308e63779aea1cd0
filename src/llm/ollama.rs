//! Client for a local Ollama server.

use super::{LlmHttpConfig, LlmProvider, build_http_client, ensure_success, transport_error};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Talks to Ollama's `/api/generate` and `/api/chat` endpoints.
pub struct OllamaClient {
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:11434";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "llama3.2";

    /// Creates a client for the default local server.
    ///
    /// Honors `OLLAMA_HOST` and `OLLAMA_MODEL` when set.
    #[must_use]
    pub fn new() -> Self {
        let endpoint =
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string());
        let model =
            std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            client: build_http_client(LlmHttpConfig::default()),
        }
    }

    /// Points the client at another Ollama server.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Rebuilds the HTTP client with the given timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Returns the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Posts a JSON body to an Ollama API path and decodes the reply.
    fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
        body: &Req,
    ) -> Result<Resp> {
        metrics::counter!("llm_requests_total", "provider" => "ollama").increment(1);
        tracing::debug!(provider = "ollama", model = %self.model, path, "Sending request");

        let response = self
            .client
            .post(format!("{}{path}", self.endpoint))
            .json(body)
            .send()
            .map_err(|e| transport_error("ollama", operation, &e))?;

        ensure_success("ollama", operation, response)?
            .json()
            .map_err(|e| {
                tracing::warn!(provider = "ollama", model = %self.model, error = %e, "Undecodable reply");
                Error::OperationFailed {
                    operation: format!("{operation}_response"),
                    cause: e.to_string(),
                }
            })
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let response: GenerateResponse = self.post("/api/generate", "ollama_request", &request)?;
        Ok(response.response)
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
        };
        let response: ChatResponse = self.post("/api/chat", "ollama_chat", &request)?;
        Ok(response.message.content)
    }
}

/// Request to the generate endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from the generate endpoint.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Request to the chat endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response from the chat endpoint.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let client = OllamaClient::new()
            .with_endpoint("http://gpu-box:11434/")
            .with_model("mistral");

        assert_eq!(client.name(), "ollama");
        assert_eq!(client.endpoint, "http://gpu-box:11434");
        assert_eq!(client.model(), "mistral");
    }

    #[test]
    fn test_generate_request_disables_streaming() {
        let request = GenerateRequest {
            model: "llama3.2",
            prompt: "hi",
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["prompt"], "hi");
    }

    #[test]
    fn test_unreachable_server_is_operation_failed() {
        let client = OllamaClient::new()
            .with_endpoint("http://127.0.0.1:9")
            .with_http_config(LlmHttpConfig {
                timeout_ms: 500,
                connect_timeout_ms: 200,
            });

        let err = client.complete("hello").unwrap_err();
        assert!(matches!(err, Error::OperationFailed { ref operation, .. } if operation == "ollama_request"));
    }
}
