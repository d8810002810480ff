/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct, which sends text to
 * the generative backend and, when that fails for any reason, downgrades to
 * the fallback translator instead of surfacing the failure.
 */

use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::errors::{ProviderError, TranslationError};
use crate::providers::{FallbackProvider, PrimaryProvider};
use crate::providers::gemini::GenerateContentRequest;

use super::fallback::{FALLBACK_MODEL_LABEL, FallbackTranslator};

/// Translation policy for chapter bodies
pub const CHAPTER_INSTRUCTION: &str = "You are a strict translator of Chinese web novels into English. \
Do not change the story, the characters or their intent. \
Keep every personal name as it is; translate names of techniques, items, places and organizations when that reads better in English. \
Aim for natural English while keeping the original tone, including humor, sarcasm and bluntness. \
Translate idioms and culture-specific terms literally when the meaning survives; otherwise adapt them and add a short footnote. \
Dialogue must keep the original's directness or subtlety, punctuation included. \
Return only the translation.";

/// Translation policy for a newline-separated batch of titles
pub const TITLE_INSTRUCTION: &str = "Translate these novel chapter titles into English, keeping their meaning and style. \
Return exactly one translated title per line, in the same order, with no numbering or commentary.";

/// Which frozen system instruction accompanies a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionProfile {
    /// A single chapter body
    Chapter,
    /// Newline-separated chapter titles
    Titles,
}

impl InstructionProfile {
    /// The system instruction text for this profile
    pub fn system_instruction(self) -> &'static str {
        match self {
            Self::Chapter => CHAPTER_INSTRUCTION,
            Self::Titles => TITLE_INSTRUCTION,
        }
    }
}

/// Model label for text no backend produced: blank input, or a chapter that
/// failed on both backends under `continue_on_error`
pub const UNTRANSLATED_MODEL_LABEL: &str = "untranslated";

/// Result of translating one unit of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    /// Translated text
    pub text: String,
    /// Primary model id, or the fallback label when the fallback produced the text
    pub model_used: String,
    /// Whether the fallback produced the text
    pub via_fallback: bool,
}

/// Log entry for capturing issues during a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
}

impl LogEntry {
    /// Warning entry
    pub fn warn(message: impl Into<String>) -> Self {
        Self { level: "WARN".to_string(), message: message.into() }
    }

    /// Error entry
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: "ERROR".to_string(), message: message.into() }
    }
}

/// Shared sink for issues raised while translating
pub type LogCapture = Arc<Mutex<Vec<LogEntry>>>;

/// Create an empty issue sink
pub fn new_log_capture() -> LogCapture {
    Arc::new(Mutex::new(Vec::new()))
}

/// Primary translator with automatic fallback
#[derive(Debug)]
pub struct TranslationService<P, F> {
    /// Generative backend
    primary: P,
    /// Chunking fallback translator
    fallback: FallbackTranslator<F>,
}

impl<P: PrimaryProvider, F: FallbackProvider> TranslationService<P, F> {
    /// Create a new translation service from its two tiers
    pub fn new(primary: P, fallback: FallbackTranslator<F>) -> Self {
        Self { primary, fallback }
    }

    /// The generative backend
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The fallback tier
    pub fn fallback(&self) -> &FallbackTranslator<F> {
        &self.fallback
    }

    /// Check that both backends answer
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        self.primary.test_connection().await?;
        self.fallback.provider().test_connection().await
            .map_err(TranslationError::FallbackUnavailable)
    }

    /// One call to the generative backend, without fallback
    pub async fn translate_primary(
        &self,
        content: &str,
        model: &str,
        profile: InstructionProfile,
    ) -> Result<String, ProviderError> {
        let request = GenerateContentRequest::new(model, content)
            .system(profile.system_instruction());
        let response = self.primary.complete(request).await?;
        P::extract_text(&response)
    }

    /// Translate one unit of text, downgrading to the fallback on any primary failure.
    ///
    /// Only a failure of the fallback itself is returned as an error. Blank
    /// content is returned as-is without any request and is labelled
    /// [`UNTRANSLATED_MODEL_LABEL`].
    pub async fn translate(
        &self,
        content: &str,
        model: &str,
        profile: InstructionProfile,
        log_capture: Option<&LogCapture>,
    ) -> Result<TranslationOutcome, TranslationError> {
        if content.trim().is_empty() {
            return Ok(TranslationOutcome {
                text: String::new(),
                model_used: UNTRANSLATED_MODEL_LABEL.to_string(),
                via_fallback: false,
            });
        }

        let start_time = Instant::now();
        match self.translate_primary(content, model, profile).await {
            Ok(text) => {
                debug!("{} answered in {:?}", model, start_time.elapsed());
                Ok(TranslationOutcome {
                    text,
                    model_used: model.to_string(),
                    via_fallback: false,
                })
            }
            Err(e) => {
                let notice = format!("{} failed ({}). Falling back to Google Translate…", model, e);
                warn!("{}", notice);
                if let Some(log) = log_capture {
                    log.lock().push(LogEntry::warn(notice));
                }

                let text = self.fallback.translate(content).await?;
                Ok(TranslationOutcome {
                    text,
                    model_used: FALLBACK_MODEL_LABEL.to_string(),
                    via_fallback: true,
                })
            }
        }
    }
}
