/*!
 * Provider implementations for the translation backends.
 *
 * This module contains client implementations for the two backends:
 * - Gemini: authenticated generative model, the primary translator
 * - Google Translate: unauthenticated web endpoint, the fallback translator
 * - Mock: deterministic in-process stand-ins for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> Result<String, ProviderError>;
}

/// A provider usable as the primary, generative translator
pub trait PrimaryProvider:
    Provider<Request = gemini::GenerateContentRequest, Response = gemini::GenerateContentResponse>
{
}

impl<T> PrimaryProvider for T where
    T: Provider<Request = gemini::GenerateContentRequest, Response = gemini::GenerateContentResponse>
{
}

/// A provider usable as the fallback, segment translator
pub trait FallbackProvider:
    Provider<Request = google_translate::TranslateRequest, Response = google_translate::TranslateResponse>
{
}

impl<T> FallbackProvider for T where
    T: Provider<Request = google_translate::TranslateRequest, Response = google_translate::TranslateResponse>
{
}

pub mod gemini;
pub mod google_translate;
pub mod mock;
