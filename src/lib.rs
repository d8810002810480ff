/*!
 * # novelwai - Chinese web novel translation with Gemini
 *
 * A Rust library for batch translation of novel chapters into English.
 *
 * ## Features
 *
 * - Select a sub-range of chapters with a forgiving `start-end` syntax
 * - Translate all titles in a single request, bodies one chapter at a time
 * - Gemini as the primary translator, with a frozen system instruction
 *   and permissive safety settings
 * - Automatic fallback to the Google web translate endpoint, chunked at
 *   sentence boundaries
 * - Fixed pacing between chapters, cooperative cancellation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `chapters`: Chapter input sources and the output document
 * - `translation`: Translation orchestration:
 *   - `translation::range`: Chapter range selection
 *   - `translation::chunking`: Sentence-boundary text splitting
 *   - `translation::fallback`: Chunked fallback translation
 *   - `translation::core`: Primary translation with fallback
 *   - `translation::batch`: The batch state machine
 *   - `translation::concurrency`: Pacing and cancellation
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for the backends:
 *   - `providers::gemini`: Gemini generateContent client
 *   - `providers::google_translate`: Google web translate client
 *   - `providers::mock`: Deterministic test doubles
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod chapters;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use chapters::{ChapterSource, InputItem, OutputDocument, ResultItem};
pub use errors::{AppError, ProviderError, TranslationError};
pub use translation::{BatchTranslator, ChapterRange, TranslationOutcome, TranslationService};
