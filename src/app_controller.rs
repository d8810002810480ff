use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::chapters::ChapterSource;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::providers::gemini::Gemini;
use crate::providers::google_translate::GoogleTranslate;
use crate::providers::{FallbackProvider, PrimaryProvider};
use crate::translation::batch::UNTRANSLATED_MODEL_LABEL;
use crate::translation::concurrency::{CancellationFlag, Pacer};
use crate::translation::core::{LogEntry, new_log_capture};
use crate::translation::fallback::FALLBACK_MODEL_LABEL;
use crate::translation::range;
use crate::translation::{BatchTranslator, FallbackTranslator, TranslatedBatch, TranslationService};

// @module: Application controller for chapter batch translation

/// Issues log written next to the output document
pub const ISSUES_LOG_FILENAME: &str = "novelwai.issues.log";

/// One batch run requested by the user
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Where the chapters come from
    pub source: ChapterSource,
    /// Range such as `"3-7"`; empty selects everything
    pub range_spec: String,
    /// Directory receiving the output document
    pub output_dir: PathBuf,
    /// Replace an existing output document
    pub force_overwrite: bool,
}

/// What a finished run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Output document written to this path
    Written(PathBuf),
    /// Output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Main application controller for chapter translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Cancels the running batch
    cancellation: CancellationFlag,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config.validate().map_err(|e| AppError::Config(format!("{:#}", e)))?;
        Ok(Self {
            config,
            cancellation: CancellationFlag::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle that cancels the running batch at its next checkpoint
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Build the batch translator backed by the real HTTP clients
    pub fn build_translator(&self) -> BatchTranslator<Gemini, GoogleTranslate> {
        let primary = Gemini::new_with_config(
            self.config.primary.api_key.clone(),
            self.config.primary.endpoint.clone(),
            self.config.primary.timeout_secs,
        );
        let fallback = FallbackTranslator::new(GoogleTranslate::new_with_config(
            self.config.fallback.endpoint.clone(),
            self.config.fallback.timeout_secs,
        ))
        .with_languages(&self.config.fallback.source_language, &self.config.fallback.target_language)
        .with_max_chunk_chars(self.config.fallback.max_chunk_chars);

        BatchTranslator::new(TranslationService::new(primary, fallback), self.config.batch_options())
            .with_cancellation(self.cancellation.clone())
    }

    /// Run the main workflow against the configured backends
    pub async fn run(&self, request: RunRequest) -> Result<RunOutcome, AppError> {
        let translator = self.build_translator();
        self.run_with_translator(&translator, request).await
    }

    /// Run the main workflow with an explicit translator
    pub async fn run_with_translator<P, F, Z>(
        &self,
        translator: &BatchTranslator<P, F, Z>,
        request: RunRequest,
    ) -> Result<RunOutcome, AppError>
    where
        P: PrimaryProvider,
        F: FallbackProvider,
        Z: Pacer,
    {
        let items = request.source.load().await?;
        let chapter_range = range::select(&request.range_spec, items.len());

        // Check if translation already exists
        let output_path = FileManager::generate_output_path(&request.output_dir, &chapter_range);
        if FileManager::file_exists(&output_path) && !request.force_overwrite {
            warn!("Skipping, {} already exists (use -f to force overwrite)", output_path.display());
            return Ok(RunOutcome::Skipped(output_path));
        }

        info!("🚀 novelwai: {} (titles: {})", self.config.primary.model, self.config.primary.title_model);
        info!("Translating chapters {} from {}, please wait…", chapter_range, request.source);

        let progress_bar = ProgressBar::new(chapter_range.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chapters ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let log_capture = new_log_capture();
        let result = translator
            .run_with_log(ChapterSource::Items(items), &request.range_spec, &log_capture, &move |completed: usize, _total: usize| {
                pb.set_position(completed as u64);
            })
            .await;

        // Finish and clear the progress bar before printing anything else
        progress_bar.finish_and_clear();
        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                // Keep the notices gathered before the abort
                let issues = log_capture.lock().clone();
                self.report_issues(&issues, &request.output_dir, &chapter_range.to_string());
                return Err(e.into());
            }
        };

        self.report_issues(&batch.issues, &request.output_dir, &chapter_range.to_string());

        let json = batch.document.to_json_pretty()
            .map_err(|e| AppError::File(format!("Failed to serialize output: {}", e)))?;
        FileManager::write_to_file(&output_path, &json)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;

        info!("Success: {}", output_path.display());
        info!("{}", Self::summary(&batch, &self.config.primary.model));

        Ok(RunOutcome::Written(output_path))
    }

    /// Log captured issues and write them to the issues log
    fn report_issues(&self, issues: &[LogEntry], output_dir: &Path, context: &str) {
        if issues.is_empty() {
            return;
        }

        let error_logs = issues.iter().filter(|log| log.level == "ERROR").count();
        let warning_logs = issues.iter().filter(|log| log.level == "WARN").count();
        info!("Translation completed with {} errors and {} warnings.", error_logs, warning_logs);

        if log::max_level() >= log::LevelFilter::Debug {
            for log in issues {
                match log.level.as_str() {
                    "ERROR" => error!("{}", log.message),
                    "WARN" => warn!("{}", log.message),
                    _ => debug!("{}", log.message),
                }
            }
        }

        let log_file_path = output_dir.join(ISSUES_LOG_FILENAME);
        let context = format!("{} - chapters {} ({})",
            self.config.primary.model,
            context,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

        if let Err(e) = Self::write_logs_to_file(issues, &log_file_path, &context) {
            warn!("Failed to write logs to file: {}", e);
        } else {
            info!("Logs written to {}", log_file_path.display());
        }
    }

    /// One-line account of which backend produced each chapter
    pub fn summary(batch: &TranslatedBatch, model: &str) -> String {
        let document = &batch.document;
        let mut summary = format!(
            "{} chapter(s) in {}: {} via {}, {} via {}",
            document.items.len(),
            Self::format_duration(batch.elapsed),
            document.count_by_model(model),
            model,
            document.count_by_model(FALLBACK_MODEL_LABEL),
            FALLBACK_MODEL_LABEL,
        );
        let untranslated = document.count_by_model(UNTRANSLATED_MODEL_LABEL);
        if untranslated > 0 {
            summary.push_str(&format!(", {} untranslated", untranslated));
        }
        summary
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Write translation logs to a log file
    fn write_logs_to_file(logs: &[LogEntry], file_path: &Path, translation_context: &str) -> anyhow::Result<()> {
        let mut log_content = String::new();

        log_content.push_str(&format!("Translation Log - {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        log_content.push_str(&format!("Context: {}\n\n", translation_context));

        for entry in logs {
            log_content.push_str(&format!("[{}] {}\n", entry.level, entry.message));
        }

        FileManager::write_to_file(file_path, &log_content)
    }
}
