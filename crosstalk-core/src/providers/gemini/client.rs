//! Gemini client implementation

use super::streaming::parse_stream;
use super::types::{GeminiError, GeminiContent, GenerateContentRequest};
use crate::config::ProviderConfig;
use crate::providers::{ChunkStream, GenerativeBackend, ModelConfig, ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

const API_KEY_HEADER: &str = "x-goog-api-key";
const EVENT_STREAM: &str = "text/event-stream";

/// Streaming client for the Generative Language API
pub struct GeminiClient {
    base_url: String,
    timeout_secs: u64,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        if config.api_key.is_empty() {
            return Err(ProviderError::Configuration("API key is empty".to_string()));
        }

        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| ProviderError::Configuration("API key is not a valid header value".to_string()))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static(EVENT_STREAM));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .user_agent(concat!("crosstalk/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(|e| ProviderError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    /// URL of the streaming endpoint for a model
    fn stream_url(&self, model: &str) -> ProviderResult<Url> {
        let mut url = Url::parse(&format!(
            "{}/models/{}:streamGenerateContent",
            self.base_url, model
        ))
        .map_err(|e| ProviderError::Configuration(format!("Invalid base URL: {}", e)))?;
        url.query_pairs_mut().append_pair("alt", "sse");
        Ok(url)
    }

    fn map_send_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout_secs)
        } else {
            ProviderError::from(err)
        }
    }

    /// Handle API errors
    fn handle_error_response(&self, status: StatusCode, body: String) -> ProviderError {
        // Try to parse the Google error envelope
        if let Ok(error) = serde_json::from_str::<GeminiError>(&body) {
            let detail = error.error;
            match detail.status.as_str() {
                "UNAUTHENTICATED" | "PERMISSION_DENIED" => ProviderError::Authentication(detail.message),
                "RESOURCE_EXHAUSTED" => ProviderError::RateLimit {
                    message: detail.message,
                    retry_after_secs: None,
                },
                "NOT_FOUND" => ProviderError::ModelNotFound(detail.message),
                "INVALID_ARGUMENT" | "FAILED_PRECONDITION" => ProviderError::InvalidRequest(detail.message),
                "UNAVAILABLE" | "INTERNAL" => ProviderError::ServiceUnavailable(detail.message),
                "DEADLINE_EXCEEDED" => ProviderError::Timeout(self.timeout_secs),
                _ => ProviderError::Api {
                    code: if detail.status.is_empty() {
                        status.as_u16().to_string()
                    } else {
                        detail.status
                    },
                    message: detail.message,
                },
            }
        } else {
            // Fallback to status code-based error
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication(body),
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimit {
                    message: body,
                    retry_after_secs: None,
                },
                StatusCode::BAD_REQUEST => ProviderError::InvalidRequest(body),
                StatusCode::NOT_FOUND => ProviderError::ModelNotFound(body),
                StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT => ProviderError::ServiceUnavailable(body),
                _ => ProviderError::Api {
                    code: status.as_u16().to_string(),
                    message: body,
                },
            }
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream_generate_content(
        &self,
        model: &ModelConfig,
        contents: Vec<GeminiContent>,
    ) -> ProviderResult<ChunkStream> {
        let request = GenerateContentRequest::new(contents, model);
        let url = self.stream_url(&model.model)?;

        tracing::debug!(
            model = %model.model,
            contents = request.contents.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "starting streamGenerateContent call"
        );

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(self.handle_error_response(status, body));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with(EVENT_STREAM) {
            return Err(ProviderError::IncompatibleStream(format!(
                "expected {} response, got '{}'",
                EVENT_STREAM, content_type
            )));
        }

        Ok(parse_stream(response.bytes_stream()))
    }
}
