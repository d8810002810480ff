/*!
 * Batch translation processing.
 *
 * This module drives a whole run: load the chapters, select the requested
 * range, translate all titles in one request, then translate each body in
 * turn with a pause between chapters, and finally assemble the output
 * document. The run is an explicit state machine advanced by `step`, so each
 * phase can be exercised on its own.
 */

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};

use crate::chapters::{ChapterSource, InputItem, OutputDocument, ResultItem};
use crate::errors::TranslationError;
use crate::providers::{FallbackProvider, PrimaryProvider};

use super::concurrency::{CancellationFlag, DEFAULT_DELAY_MS, DEFAULT_TITLE_CONCURRENCY, Pacer, TokioPacer};
use super::core::{InstructionProfile, LogCapture, LogEntry, TranslationService, new_log_capture};
pub use super::core::UNTRANSLATED_MODEL_LABEL;
use super::range::{self, ChapterRange};

/// Default model for both titles and bodies
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Run-wide settings
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Model used for chapter bodies
    pub body_model: String,
    /// Model used for the title batch
    pub title_model: String,
    /// Pause after each chapter
    pub delay: Duration,
    /// Fallback title requests in flight at once
    pub title_concurrency: usize,
    /// Keep going when a chapter cannot be translated at all
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            body_model: DEFAULT_MODEL.to_string(),
            title_model: DEFAULT_MODEL.to_string(),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            title_concurrency: DEFAULT_TITLE_CONCURRENCY,
            continue_on_error: false,
        }
    }
}

/// Chapters selected for this run and what has been produced so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchWork {
    pub range: ChapterRange,
    pub items: Vec<InputItem>,
    /// Translated titles by position; empty until titles are done
    pub titles: Vec<String>,
    pub results: Vec<ResultItem>,
}

/// Phase of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchState {
    Fetching { source: ChapterSource, range_spec: String },
    TitleTranslating(BatchWork),
    BodyTranslating { index: usize, work: BatchWork },
    Assembling(BatchWork),
    Done(OutputDocument),
}

impl BatchState {
    /// Chapters fully translated so far
    pub fn completed(&self) -> usize {
        match self {
            Self::Fetching { .. } => 0,
            Self::TitleTranslating(work) | Self::Assembling(work) => work.results.len(),
            Self::BodyTranslating { work, .. } => work.results.len(),
            Self::Done(document) => document.items.len(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fetching { .. } => "fetching",
            Self::TitleTranslating(_) => "translating titles",
            Self::BodyTranslating { .. } => "translating chapters",
            Self::Assembling(_) => "assembling",
            Self::Done(_) => "done",
        }
    }
}

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct TranslatedBatch {
    pub document: OutputDocument,
    /// Warnings and errors raised along the way
    pub issues: Vec<LogEntry>,
    pub elapsed: Duration,
}

/// Batch translator for processing a range of chapters
pub struct BatchTranslator<P, F, Z = TokioPacer> {
    /// The translation service to use
    service: TranslationService<P, F>,
    options: BatchOptions,
    /// Waits between chapters
    pacer: Z,
    cancellation: CancellationFlag,
}

impl<P: PrimaryProvider, F: FallbackProvider> BatchTranslator<P, F, TokioPacer> {
    /// Create a new batch translator pacing with the tokio timer
    pub fn new(service: TranslationService<P, F>, options: BatchOptions) -> Self {
        Self {
            service,
            options,
            pacer: TokioPacer,
            cancellation: CancellationFlag::new(),
        }
    }
}

impl<P: PrimaryProvider, F: FallbackProvider, Z: Pacer> BatchTranslator<P, F, Z> {
    /// Replace the pacer
    pub fn with_pacer<Z2: Pacer>(self, pacer: Z2) -> BatchTranslator<P, F, Z2> {
        BatchTranslator {
            service: self.service,
            options: self.options,
            pacer,
            cancellation: self.cancellation,
        }
    }

    /// Observe an externally owned cancellation flag
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Handle that cancels this translator's runs
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn service(&self) -> &TranslationService<P, F> {
        &self.service
    }

    /// Translate the selected range of `source`.
    ///
    /// `progress` is called with `(completed, total)` after each chapter.
    pub async fn run(
        &self,
        source: ChapterSource,
        range_spec: &str,
        progress: &(dyn Fn(usize, usize) + Send + Sync),
    ) -> Result<TranslatedBatch, TranslationError> {
        self.run_with_log(source, range_spec, &new_log_capture(), progress).await
    }

    /// Same as [`run`](Self::run), collecting issues into a caller-owned log.
    ///
    /// Issues recorded before a failure stay in `log_capture`.
    pub async fn run_with_log(
        &self,
        source: ChapterSource,
        range_spec: &str,
        log_capture: &LogCapture,
        progress: &(dyn Fn(usize, usize) + Send + Sync),
    ) -> Result<TranslatedBatch, TranslationError> {
        let start_time = Instant::now();
        let mut state = BatchState::Fetching {
            source,
            range_spec: range_spec.to_string(),
        };

        loop {
            state = match state {
                BatchState::Done(document) => {
                    let elapsed = start_time.elapsed();
                    info!("Batch {} finished in {:?}", document.range, elapsed);
                    let issues = log_capture.lock().clone();
                    return Ok(TranslatedBatch { document, issues, elapsed });
                }
                current => {
                    let translated_chapter = matches!(current, BatchState::BodyTranslating { .. });
                    let next = self.step(current, log_capture, progress).await?;

                    if translated_chapter {
                        self.pacer.pause(self.options.delay).await;
                        if self.cancellation.is_cancelled() {
                            return Err(self.cancelled(&next));
                        }
                    }
                    next
                }
            };
        }
    }

    /// Advance the run by one transition
    pub async fn step(
        &self,
        state: BatchState,
        log_capture: &LogCapture,
        progress: &(dyn Fn(usize, usize) + Send + Sync),
    ) -> Result<BatchState, TranslationError> {
        if self.cancellation.is_cancelled() {
            return Err(self.cancelled(&state));
        }
        debug!("Batch step: {}", state.name());

        match state {
            BatchState::Fetching { source, range_spec } => {
                let all_items = source.load().await?;
                let range = range::select(&range_spec, all_items.len());
                let items = all_items[range.as_index_range()].to_vec();
                info!("Selected chapters {} ({} of {})", range, items.len(), all_items.len());

                let work = BatchWork { range, items, titles: Vec::new(), results: Vec::new() };
                if work.items.is_empty() {
                    Ok(BatchState::Assembling(work))
                } else {
                    Ok(BatchState::TitleTranslating(work))
                }
            }
            BatchState::TitleTranslating(mut work) => {
                let titles: Vec<&str> = work.items.iter().map(|item| item.title.as_str()).collect();
                work.titles = self.translate_titles(&titles, log_capture).await?;
                Ok(BatchState::BodyTranslating { index: 0, work })
            }
            BatchState::BodyTranslating { index, mut work } => {
                let result = self.translate_chapter(&work, index, log_capture).await?;
                work.results.push(result);

                let total = work.items.len();
                progress(index + 1, total);

                if index + 1 < total {
                    Ok(BatchState::BodyTranslating { index: index + 1, work })
                } else {
                    Ok(BatchState::Assembling(work))
                }
            }
            BatchState::Assembling(work) => Ok(BatchState::Done(OutputDocument::new(work.range, work.results))),
            done @ BatchState::Done(_) => Ok(done),
        }
    }

    /// Translate all titles, one primary request for the whole batch.
    ///
    /// Positions the model leaves missing or blank keep the original title.
    pub async fn translate_titles(
        &self,
        titles: &[&str],
        log_capture: &LogCapture,
    ) -> Result<Vec<String>, TranslationError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let model = &self.options.title_model;
        let joined = titles.join("\n");

        let translated: Vec<Option<String>> = match self.service
            .translate_primary(&joined, model, InstructionProfile::Titles)
            .await
        {
            Ok(text) => {
                let lines: Vec<&str> = text.split('\n').collect();
                if lines.len() != titles.len() {
                    let notice = format!(
                        "Title batch returned {} line(s) for {} title(s); missing positions keep the original title",
                        lines.len(), titles.len()
                    );
                    warn!("{}", notice);
                    log_capture.lock().push(LogEntry::warn(notice));
                }
                (0..titles.len()).map(|i| lines.get(i).map(|line| line.to_string())).collect()
            }
            Err(e) => {
                let notice = format!("{} failed on titles ({}). Falling back to Google Translate…", model, e);
                warn!("{}", notice);
                log_capture.lock().push(LogEntry::warn(notice));
                self.translate_titles_with_fallback(titles, log_capture).await?
            }
        };

        Ok(titles.iter()
            .zip(translated)
            .map(|(original, translated)| match translated {
                Some(title) if !title.trim().is_empty() => title.trim().to_string(),
                _ => original.to_string(),
            })
            .collect())
    }

    async fn translate_titles_with_fallback(
        &self,
        titles: &[&str],
        log_capture: &LogCapture,
    ) -> Result<Vec<Option<String>>, TranslationError> {
        let fallback = self.service.fallback();
        let results: Vec<Result<String, TranslationError>> = stream::iter(titles.iter())
            .map(|title| fallback.translate_segment(title))
            .buffered(self.options.title_concurrency.max(1))
            .collect()
            .await;

        results.into_iter()
            .enumerate()
            .map(|(index, result)| match result {
                Ok(title) => Ok(Some(title)),
                Err(e) if self.options.continue_on_error => {
                    let notice = format!("Title {} left untranslated: {}", index + 1, e);
                    error!("{}", notice);
                    log_capture.lock().push(LogEntry::error(notice));
                    Ok(None)
                }
                Err(e) => Err(e),
            })
            .collect()
    }

    async fn translate_chapter(
        &self,
        work: &BatchWork,
        index: usize,
        log_capture: &LogCapture,
    ) -> Result<ResultItem, TranslationError> {
        let item = &work.items[index];
        let chapter_number = work.range.start + index;
        let title = work.titles.get(index).cloned().unwrap_or_else(|| item.title.clone());

        match self.service
            .translate(&item.content, &self.options.body_model, InstructionProfile::Chapter, Some(log_capture))
            .await
        {
            Ok(outcome) => {
                info!("Chapter {} translated with {}", chapter_number, outcome.model_used);
                Ok(ResultItem { title, content: outcome.text, model: outcome.model_used })
            }
            Err(e) if self.options.continue_on_error => {
                let notice = format!("Chapter {} left untranslated: {}", chapter_number, e);
                error!("{}", notice);
                log_capture.lock().push(LogEntry::error(notice));
                Ok(ResultItem {
                    title,
                    content: item.content.clone(),
                    model: UNTRANSLATED_MODEL_LABEL.to_string(),
                })
            }
            Err(e) => {
                error!("Chapter {} failed: {}", chapter_number, e);
                Err(e)
            }
        }
    }

    fn cancelled(&self, state: &BatchState) -> TranslationError {
        let completed = state.completed();
        warn!("Batch cancelled after {} chapter(s)", completed);
        TranslationError::Cancelled { completed }
    }
}
