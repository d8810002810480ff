/*!
 * Fallback translation through the unauthenticated web endpoint.
 *
 * Used only when the generative backend fails. Long text is chunked at
 * sentence boundaries and the translated chunks are concatenated in order.
 * Failures here are final: there is no further tier to fall back to.
 */

use log::debug;

use crate::errors::TranslationError;
use crate::providers::FallbackProvider;
use crate::providers::google_translate::TranslateRequest;

use super::chunking::{self, DEFAULT_MAX_CHUNK_CHARS};

/// Label recorded as the model for fallback-produced text
pub const FALLBACK_MODEL_LABEL: &str = "google translate";

/// Default source language of the input novels
pub const DEFAULT_SOURCE_LANGUAGE: &str = "zh-CN";

/// Default target language
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// Chunking translator over a fallback provider
#[derive(Debug)]
pub struct FallbackTranslator<F> {
    /// Segment translation backend
    provider: F,
    /// Source language code sent with every request
    source_language: String,
    /// Target language code sent with every request
    target_language: String,
    /// Maximum characters per request
    max_chunk_chars: usize,
}

impl<F: FallbackProvider> FallbackTranslator<F> {
    /// Create a Chinese-to-English fallback translator
    pub fn new(provider: F) -> Self {
        Self {
            provider,
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }

    /// Override the language pair
    pub fn with_languages(mut self, source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        self.source_language = source_language.into();
        self.target_language = target_language.into();
        self
    }

    /// Override the chunk size bound
    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars.max(1);
        self
    }

    /// The underlying provider
    pub fn provider(&self) -> &F {
        &self.provider
    }

    /// Translate arbitrary text, chunking as needed
    pub async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        let chunks = chunking::chunk(text, self.max_chunk_chars);
        debug!("Fallback translation: {} chars in {} chunk(s)", text.chars().count(), chunks.len());

        let mut result = String::new();
        for chunk in &chunks {
            result.push_str(&self.translate_segment(chunk).await?);
        }
        Ok(result)
    }

    /// Translate one piece of text in a single request, without chunking
    pub async fn translate_segment(&self, text: &str) -> Result<String, TranslationError> {
        // Blank text has nothing to translate and the endpoint answers it with null
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = TranslateRequest::new(text, &self.source_language, &self.target_language);
        let response = self.provider.complete(request).await
            .map_err(TranslationError::FallbackUnavailable)?;
        F::extract_text(&response).map_err(TranslationError::FallbackUnavailable)
    }
}
