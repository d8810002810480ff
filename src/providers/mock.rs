/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockPrimary::working()` - Always succeeds, tagging every line of input
 * - `MockPrimary::failing()` - Always fails with an error
 * - `MockPrimary::dropping_last_line()` - Succeeds but loses the final line
 * - `MockFallback::working()` - Deterministic segment translation
 * - `MockFallback::failing()` - Always fails, like an unreachable endpoint
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::providers::gemini::{GenerateContentRequest, GenerateContentResponse};
use crate::providers::google_translate::{TranslateRequest, TranslateResponse};

/// Behavior mode for the mock backends
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Succeeds but omits the last line of a multi-line payload
    DropLastLine,
    /// Returns an empty response
    Empty,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Shared call accounting for a mock backend
#[derive(Debug, Default)]
struct CallStats {
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl CallStats {
    fn enter(&self) -> usize {
        let count = self.requests.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        count
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Deterministic tag applied to each line by the working primary mock
pub fn primary_translation(model: &str, line: &str) -> String {
    format!("[{}] {}", model, line)
}

/// Deterministic output of the working fallback mock
pub fn fallback_translation(segment: &str) -> String {
    format!("<en>{}</en>", segment)
}

/// Mock generative backend
#[derive(Debug, Clone)]
pub struct MockPrimary {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counters shared across clones
    stats: Arc<CallStats>,
    /// Every request received, in order
    received: Arc<Mutex<Vec<GenerateContentRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&GenerateContentRequest) -> String>,
}

impl MockPrimary {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            stats: Arc::new(CallStats::default()),
            received: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create an intermittently failing mock
    ///
    /// A period of zero is treated as one, so every request fails.
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a mock that loses the last line of its output
    pub fn dropping_last_line() -> Self {
        Self::new(MockBehavior::DropLastLine)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&GenerateContentRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.stats.requests.load(Ordering::SeqCst)
    }

    /// Snapshot of all received requests
    pub fn received_requests(&self) -> Vec<GenerateContentRequest> {
        self.received.lock().clone()
    }

    fn translate_lines(request: &GenerateContentRequest) -> Vec<String> {
        request.user_text()
            .split('\n')
            .map(|line| primary_translation(&request.model, line))
            .collect()
    }

    async fn respond(&self, request: &GenerateContentRequest, count: usize) -> Result<String, ProviderError> {
        match self.behavior {
            MockBehavior::Working => Ok(match self.custom_response {
                Some(generator) => generator(request),
                None => Self::translate_lines(request).join("\n"),
            }),
            MockBehavior::Intermittent { fail_every } => {
                let fail_every = fail_every.max(1);
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::translate_lines(request).join("\n"))
                }
            }
            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
            MockBehavior::DropLastLine => {
                let mut lines = Self::translate_lines(request);
                lines.pop();
                Ok(lines.join("\n"))
            }
            MockBehavior::Empty => Ok(String::new()),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::translate_lines(request).join("\n"))
            }
        }
    }
}

#[async_trait]
impl Provider for MockPrimary {
    type Request = GenerateContentRequest;
    type Response = GenerateContentResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.stats.enter();
        self.received.lock().push(request.clone());
        let result = self.respond(&request, count).await;
        self.stats.leave();
        result.map(GenerateContentResponse::from_text)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> Result<String, ProviderError> {
        crate::providers::gemini::Gemini::extract_text_from_response(response)
    }
}

/// Mock fallback segment translator
#[derive(Debug, Clone)]
pub struct MockFallback {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counters shared across clones
    stats: Arc<CallStats>,
    /// Every segment received, in order of arrival
    received: Arc<Mutex<Vec<String>>>,
}

impl MockFallback {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            stats: Arc::new(CallStats::default()),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a working mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.stats.requests.load(Ordering::SeqCst)
    }

    /// Highest number of requests that were in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.stats.max_in_flight.load(Ordering::SeqCst)
    }

    /// Snapshot of all received segments
    pub fn received_segments(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    async fn respond(&self, request: &TranslateRequest, count: usize) -> Result<TranslateResponse, ProviderError> {
        let translated = || TranslateResponse {
            segments: vec![fallback_translation(&request.text)],
        };

        match self.behavior {
            MockBehavior::Working | MockBehavior::DropLastLine => Ok(translated()),
            MockBehavior::Intermittent { fail_every } => {
                let fail_every = fail_every.max(1);
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ConnectionError(format!("Simulated outage (request #{})", count + 1)))
                } else {
                    Ok(translated())
                }
            }
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            MockBehavior::Empty => Ok(TranslateResponse::default()),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(translated())
            }
        }
    }
}

#[async_trait]
impl Provider for MockFallback {
    type Request = TranslateRequest;
    type Response = TranslateResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.stats.enter();
        self.received.lock().push(request.text.clone());
        let result = self.respond(&request, count).await;
        self.stats.leave();
        result
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> Result<String, ProviderError> {
        Ok(response.text())
    }
}
