use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse};
use super::GeminiError;
use crate::config::GeminiConfig;

/// Generative model abstraction (allows mocking).
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError>;

    /// Model identifier recorded alongside persisted results.
    fn model_name(&self) -> &str;
}

/// HTTP client for the Gemini API.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeminiError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeminiError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    GeminiError::Connection(self.base_url.clone())
                } else {
                    GeminiError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            tracing::warn!(
                model = %self.model,
                status = status.as_u16(),
                "Model API returned an error status"
            );
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::ResponseParsing(e.to_string()))?;

        tracing::debug!(
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            candidates = parsed.candidates.len(),
            "Model call complete"
        );

        Ok(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Mock client for testing: returns a configured response and records requests.
pub struct MockGenerativeClient {
    response: Result<GenerateContentResponse, GeminiError>,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl MockGenerativeClient {
    /// Reply with a single text part.
    pub fn new(text: &str) -> Self {
        Self::with_response(GenerateContentResponse::from_text(text))
    }

    pub fn with_response(response: GenerateContentResponse) -> Self {
        Self {
            response: Ok(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: GeminiError) -> Self {
        Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The most recent request received, if any.
    pub fn last_request(&self) -> Option<GenerateContentRequest> {
        self.requests
            .lock()
            .ok()
            .and_then(|requests| requests.last().cloned())
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GenerativeClient for MockGenerativeClient {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.response.clone()
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
