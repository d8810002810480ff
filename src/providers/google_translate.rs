use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, header};
use serde_json::Value;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Public unauthenticated translate endpoint
pub const DEFAULT_GOOGLE_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Browser user agent; the endpoint rejects unknown clients
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// Single segment translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    /// Text to translate
    pub text: String,
    /// Source language code, e.g. `zh-CN`
    pub source_language: String,
    /// Target language code, e.g. `en`
    pub target_language: String,
}

impl TranslateRequest {
    /// Create a request for the given language pair
    pub fn new(text: impl Into<String>, source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }
}

/// Translated segments, in the order the endpoint returned them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateResponse {
    pub segments: Vec<String>,
}

impl TranslateResponse {
    /// Parse the endpoint's nested array payload.
    ///
    /// The payload is `[[[translated, original, ...], ...], ...]`; only the first
    /// element of each pair in the first array is used. A `null` first array
    /// means nothing was translated.
    pub fn from_json(value: &Value) -> Result<Self, ProviderError> {
        let outer = value.as_array()
            .ok_or_else(|| ProviderError::ParseError("expected a JSON array".to_string()))?;

        let pairs = match outer.first() {
            Some(Value::Array(pairs)) => pairs,
            Some(Value::Null) => return Ok(Self::default()),
            _ => return Err(ProviderError::ParseError("missing segment list".to_string())),
        };

        let mut segments = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let pair = pair.as_array()
                .ok_or_else(|| ProviderError::ParseError("segment is not an array".to_string()))?;
            match pair.first() {
                Some(Value::String(text)) => segments.push(text.clone()),
                Some(Value::Null) | None => {}
                Some(other) => {
                    return Err(ProviderError::ParseError(format!("unexpected segment value: {}", other)));
                }
            }
        }

        Ok(Self { segments })
    }

    /// Reassembled translation with no separator between segments
    pub fn text(&self) -> String {
        self.segments.concat()
    }
}

/// Client for the unauthenticated Google web translate endpoint
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint URL
    endpoint: String,
}

impl GoogleTranslate {
    /// Create a new client with the default timeout
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::new_with_config(endpoint, 30)
    }

    /// Create a new client with an explicit request timeout
    pub fn new_with_config(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: if endpoint.is_empty() {
                DEFAULT_GOOGLE_TRANSLATE_ENDPOINT.to_string()
            } else {
                endpoint
            },
        }
    }

    /// Full request URL with the query string for `request`
    pub fn request_url(&self, request: &TranslateRequest) -> Result<Url, ProviderError> {
        Url::parse_with_params(&self.endpoint, &[
            ("client", "gtx"),
            ("sl", request.source_language.as_str()),
            ("tl", request.target_language.as_str()),
            ("dt", "t"),
            ("q", request.text.as_str()),
        ])
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid translate endpoint {}: {}", self.endpoint, e)))
    }

    /// Translate one segment
    pub async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse, ProviderError> {
        let url = self.request_url(&request)?;
        debug!("Google Translate request: {} chars", request.text.chars().count());

        let response = self.client.get(url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Translate error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let value: Value = response.json().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Google Translate response: {}", e)))?;
        TranslateResponse::from_json(&value)
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    type Request = TranslateRequest;
    type Response = TranslateResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        self.translate(request).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.translate(TranslateRequest::new("你好", "zh-CN", "en")).await.map(|_| ())
    }

    fn extract_text(response: &Self::Response) -> Result<String, ProviderError> {
        Ok(response.text())
    }
}
