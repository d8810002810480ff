/*!
 * Chapter translation with a generative primary backend and a web fallback.
 *
 * This module is split into several submodules:
 *
 * - `range`: Parsing of the requested chapter range
 * - `chunking`: Sentence-boundary splitting of long text
 * - `fallback`: Chunked translation through the fallback backend
 * - `core`: Primary translation with automatic fallback
 * - `batch`: The batch state machine driving a whole run
 * - `concurrency`: Pacing between requests and cancellation
 */

// Re-export main types for easier usage
pub use self::batch::{BatchOptions, BatchState, BatchTranslator, TranslatedBatch};
pub use self::concurrency::{CancellationFlag, Pacer, RecordingPacer, TokioPacer};
pub use self::core::{InstructionProfile, LogEntry, TranslationOutcome, TranslationService};
pub use self::fallback::FallbackTranslator;
pub use self::range::ChapterRange;

// Submodules
pub mod batch;
pub mod chunking;
pub mod concurrency;
pub mod core;
pub mod fallback;
pub mod range;
