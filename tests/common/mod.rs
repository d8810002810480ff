/*!
 * Common test utilities for the novelwai test suite
 */

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use novelwai::app_config::Config;
use novelwai::chapters::InputItem;
use novelwai::providers::mock::{MockFallback, MockPrimary};
use novelwai::translation::{BatchOptions, BatchTranslator, FallbackTranslator, RecordingPacer, TranslationService};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// `count` chapters titled `第N章` with a two-sentence body each
pub fn sample_chapters(count: usize) -> Vec<InputItem> {
    (1..=count)
        .map(|n| InputItem::new(format!("第{}章", n), format!("这是第{}章。他笑了。", n)))
        .collect()
}

/// The same chapters as a JSON document
pub fn sample_chapters_json(count: usize) -> String {
    let items: Vec<_> = sample_chapters(count)
        .into_iter()
        .map(|item| json!({ "title": item.title, "content": item.content }))
        .collect();
    serde_json::to_string(&items).unwrap_or_default()
}

/// Writes the sample chapters to `chapters.json` in `dir`
pub fn create_test_chapters(dir: &Path, count: usize) -> Result<PathBuf> {
    create_test_file(dir, "chapters.json", &sample_chapters_json(count))
}

/// Batch options with no pause between chapters
pub fn fast_options() -> BatchOptions {
    BatchOptions {
        delay: Duration::ZERO,
        ..BatchOptions::default()
    }
}

/// Batch translator over mocks, pacing through a recording pacer
///
/// The returned pacer shares its record with the one inside the translator.
pub fn mock_translator(
    primary: MockPrimary,
    fallback: MockFallback,
    options: BatchOptions,
) -> (BatchTranslator<MockPrimary, MockFallback, RecordingPacer>, RecordingPacer) {
    let pacer = RecordingPacer::new();
    let service = TranslationService::new(primary, FallbackTranslator::new(fallback));
    (BatchTranslator::new(service, options).with_pacer(pacer.clone()), pacer)
}

/// A configuration that passes validation
pub fn valid_config() -> Config {
    let mut config = Config::default();
    config.primary.api_key = "test-key".to_string();
    config
}
