//! Vision-service clients.
//!
//! [`VisionClient`] is the seam between the pipeline and the external
//! classification service: one async call from PNG bytes and a prompt to
//! the service's raw text response. [`HttpVisionClient`] talks to an
//! OpenAI-style chat-completions endpoint with the crop embedded as a
//! base64 data URL; [`NullVisionClient`] always fails, which the adapter
//! turns into fabricated failure classifications (used for classification-
//! disabled runs).

use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use vizscout_core::ClassifyConfig;

/// One classification call against the external vision service.
///
/// Implementations must be safe for concurrent use by multiple in-flight
/// requests; the HTTP client's connection pool is the only shared mutable
/// resource in the pipeline.
#[allow(async_fn_in_trait)] // callers await in-task; no Send bound needed
pub trait VisionClient {
    /// Send one crop to the service and return its raw text response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response. The
    /// adapter contains the failure; it never propagates.
    async fn classify(&self, png_data: &[u8], prompt: &str) -> Result<String>;
}

/// Chat-completions request for the vision endpoint.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: usize,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
struct ImageUrl {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Chat-completions response, reduced to the message text.
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// HTTP client for an OpenAI-style vision endpoint.
#[derive(Debug, Clone)]
pub struct HttpVisionClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: usize,
    detail: String,
}

impl HttpVisionClient {
    /// Create a client from the classification config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api_key: String, config: &ClassifyConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            detail: config.detail.clone(),
        })
    }

    /// Create a client reading the API key from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or the client cannot be
    /// built.
    pub fn from_env(config: &ClassifyConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable not set")?;
        Self::new(api_key, config)
    }
}

impl VisionClient for HttpVisionClient {
    async fn classify(&self, png_data: &[u8], prompt: &str) -> Result<String> {
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(png_data);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/png;base64,{image_b64}"),
                            detail: Some(self.detail.clone()),
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            // Zero temperature keeps the semantic labels reproducible
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send vision API request")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read vision API response")?;

        if !status.is_success() {
            anyhow::bail!("vision API request failed with status {status}: {response_text}");
        }

        let chat_response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse vision API response")?;

        chat_response
            .choices
            .first()
            .context("No choices in vision response")?
            .message
            .content
            .clone()
            .context("No content in vision response")
    }
}

/// Client that refuses every call. Runs with classification disabled use
/// this so every candidate still yields a visible failure record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVisionClient;

impl VisionClient for NullVisionClient {
    async fn classify(&self, _png_data: &[u8], _prompt: &str) -> Result<String> {
        anyhow::bail!("classification disabled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_config() {
        let config = ClassifyConfig::default();
        let client = HttpVisionClient::new("test-key".to_string(), &config).unwrap();
        assert_eq!(client.base_url, "https://api.openai.com/v1");
        assert_eq!(client.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_null_client_always_fails() {
        let result = NullVisionClient.classify(&[1, 2, 3], "prompt").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("disabled"));
    }

    #[test]
    fn test_request_serializes_multimodal_content() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: "describe".to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,AAAA".to_string(),
                            detail: Some("high".to_string()),
                        },
                    },
                ],
            }],
            max_tokens: 256,
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(json["response_format"]["type"], "json_object");
    }
}
