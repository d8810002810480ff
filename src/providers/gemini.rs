use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Public Gemini API base URL
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Harm categories recognised by the Gemini safety filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    #[serde(rename = "HARM_CATEGORY_CIVIC_INTEGRITY")]
    CivicIntegrity,
}

impl HarmCategory {
    /// Every category the filter knows about
    pub const ALL: [HarmCategory; 5] = [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
        HarmCategory::CivicIntegrity,
    ];
}

/// Blocking threshold for a harm category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// One entry of the request's safety configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Safety configuration that never blocks translation input.
///
/// Novels routinely contain violence and crude dialogue; a refusal would leave a
/// hole in the output, so every category is set to `BLOCK_NONE`.
pub static PERMISSIVE_SAFETY_SETTINGS: Lazy<Vec<SafetySetting>> = Lazy::new(|| {
    HarmCategory::ALL
        .iter()
        .map(|&category| SafetySetting {
            category,
            threshold: HarmBlockThreshold::BlockNone,
        })
        .collect()
});

/// A text part of a content block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A content block (user turn, model turn or system instruction)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text.into()) }],
        }
    }
}

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Model id, sent in the URL rather than the body
    #[serde(skip)]
    pub model: String,

    pub contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    /// Create a single-turn request carrying `content` as the user message
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            contents: vec![Content::text(Some("user"), content)],
            system_instruction: None,
            safety_settings: Vec::new(),
        }
    }

    /// Set the system instruction
    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::text(None, instruction));
        self
    }

    /// The user payload text
    pub fn user_text(&self) -> String {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    /// The system instruction text, if any
    pub fn system_text(&self) -> Option<String> {
        self.system_instruction.as_ref().map(|c| {
            c.parts.iter().filter_map(|p| p.text.as_deref()).collect()
        })
    }
}

/// Token accounting returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u64>,
    #[serde(default)]
    pub candidates_token_count: Option<u64>,
}

/// Why the prompt itself was rejected
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// One generated candidate
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// generateContent response body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Build a response holding a single text candidate
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content::text(Some("model"), text)),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
            usage_metadata: None,
        }
    }
}

/// Gemini client for the generateContent API
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Safety configuration attached to every request
    safety_settings: Vec<SafetySetting>,
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Gemini {
    /// Create a new Gemini client with the default timeout
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, 120)
    }

    /// Create a new Gemini client with an explicit request timeout
    pub fn new_with_config(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: if endpoint.is_empty() {
                DEFAULT_GEMINI_ENDPOINT.to_string()
            } else {
                endpoint.trim_end_matches('/').to_string()
            },
            safety_settings: PERMISSIVE_SAFETY_SETTINGS.clone(),
        }
    }

    /// Attach the client's safety configuration to an outgoing request
    pub fn prepare(&self, mut request: GenerateContentRequest) -> GenerateContentRequest {
        request.safety_settings = self.safety_settings.clone();
        request
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }

    /// Send a generateContent request
    pub async fn generate(&self, request: GenerateContentRequest) -> Result<GenerateContentResponse, ProviderError> {
        let request = self.prepare(request);
        let url = self.generate_url(&request.model);
        debug!("Gemini request: model={}, {} chars", request.model, request.user_text().chars().count());

        let response = self.client.post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response.json::<GenerateContentResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))
    }

    /// Extract the generated text, treating refusals and empty output as errors
    pub fn extract_text_from_response(response: &GenerateContentResponse) -> Result<String, ProviderError> {
        let Some(candidate) = response.candidates.first() else {
            if let Some(reason) = response.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
                return Err(ProviderError::ContentBlocked(format!("prompt blocked: {}", reason)));
            }
            return Err(ProviderError::ParseError("Gemini returned no candidates".to_string()));
        };

        let text: String = candidate.content.iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            return Err(match candidate.finish_reason.as_deref() {
                Some(reason) if reason != "STOP" => {
                    ProviderError::ContentBlocked(format!("generation stopped: {}", reason))
                }
                _ => ProviderError::ParseError("Gemini returned an empty candidate".to_string()),
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl Provider for Gemini {
    type Request = GenerateContentRequest;
    type Response = GenerateContentResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        self.generate(request).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.endpoint);
        let response = self.client.get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ProviderError::from_status(status.as_u16(), error_text))
        }
    }

    fn extract_text(response: &Self::Response) -> Result<String, ProviderError> {
        Self::extract_text_from_response(response)
    }
}
