/*!
 * End-to-end tests for batch translation over mock backends
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use novelwai::chapters::{ChapterSource, InputItem};
use novelwai::errors::TranslationError;
use novelwai::providers::mock::{MockFallback, MockPrimary, fallback_translation, primary_translation};
use novelwai::translation::batch::{DEFAULT_MODEL, UNTRANSLATED_MODEL_LABEL};
use novelwai::translation::fallback::FALLBACK_MODEL_LABEL;
use novelwai::translation::{BatchOptions, BatchTranslator, FallbackTranslator, TranslationService};

use crate::common;

fn ignore_progress(_completed: usize, _total: usize) {}

/// Five chapters, no range, default options: titles in one request, every
/// body by the primary model, one default pause per chapter
#[tokio::test]
async fn test_run_withWorkingPrimary_shouldTranslateEverything() {
    let (translator, pacer) = common::mock_translator(MockPrimary::working(), MockFallback::working(), BatchOptions::default());
    let source = ChapterSource::Items(common::sample_chapters(5));

    let batch = translator.run(source, "", &ignore_progress).await.unwrap();
    let document = batch.document;

    assert_eq!((document.range.start, document.range.end), (1, 5));
    assert_eq!(document.items.len(), 5);
    for (n, item) in (1..=5).zip(&document.items) {
        assert_eq!(item.model, DEFAULT_MODEL);
        assert_eq!(item.title, primary_translation(DEFAULT_MODEL, &format!("第{}章", n)));
        assert_eq!(item.content, primary_translation(DEFAULT_MODEL, &format!("这是第{}章。他笑了。", n)));
    }

    assert_eq!(translator.service().primary().request_count(), 6);
    assert_eq!(translator.service().fallback().provider().request_count(), 0);
    assert_eq!(pacer.pauses(), vec![Duration::from_millis(4000); 5]);
    assert!(batch.issues.is_empty());
}

/// A primary that always fails leaves every chapter to the fallback
#[tokio::test]
async fn test_run_withFailingPrimary_shouldUseFallbackEverywhere() {
    let (translator, _pacer) = common::mock_translator(MockPrimary::failing(), MockFallback::working(), common::fast_options());
    let source = ChapterSource::Items(vec![InputItem::new("标题", "他来了。")]);

    let batch = translator.run(source, "", &ignore_progress).await.unwrap();
    let item = &batch.document.items[0];

    assert_eq!(item.model, FALLBACK_MODEL_LABEL);
    assert_eq!(item.content, fallback_translation("他来了"));
    assert_eq!(item.title, fallback_translation("标题"));
    // One notice for the title batch, one for the body
    assert_eq!(batch.issues.len(), 2);
}

/// Titles reach the fallback untouched: decimals and punctuation survive
#[tokio::test]
async fn test_run_withFailingPrimary_shouldSendTitlesToFallbackVerbatim() {
    let (translator, _pacer) = common::mock_translator(MockPrimary::failing(), MockFallback::working(), common::fast_options());
    let source = ChapterSource::Items(vec![
        InputItem::new("第1.5章 谁？", "正文"),
        InputItem::new("第二章！来了。", "正文"),
    ]);

    let batch = translator.run(source, "", &ignore_progress).await.unwrap();
    let titles: Vec<&str> = batch.document.items.iter().map(|item| item.title.as_str()).collect();

    assert_eq!(titles, vec![
        fallback_translation("第1.5章 谁？").as_str(),
        fallback_translation("第二章！来了。").as_str(),
    ]);
    let segments = translator.service().fallback().provider().received_segments();
    assert!(segments.contains(&"第1.5章 谁？".to_string()));
    assert!(segments.contains(&"第二章！来了。".to_string()));
}

/// Chapters with blank bodies are never sent anywhere and say so
#[tokio::test]
async fn test_run_withBlankContent_shouldLabelChapterUntranslated() {
    let (translator, _pacer) = common::mock_translator(MockPrimary::working(), MockFallback::working(), common::fast_options());
    let source = ChapterSource::Items(vec![InputItem::new("标题", "   ")]);

    let batch = translator.run(source, "", &ignore_progress).await.unwrap();
    let item = &batch.document.items[0];

    assert_eq!(item.model, UNTRANSLATED_MODEL_LABEL);
    assert_eq!(item.content, "");
    // Only the title batch hit the primary
    assert_eq!(translator.service().primary().request_count(), 1);
    assert_eq!(translator.service().fallback().provider().request_count(), 0);
}

/// A title batch that loses its last line keeps the original last title
#[tokio::test]
async fn test_run_withDroppedTitleLine_shouldKeepOriginalTitle() {
    let (translator, _pacer) = common::mock_translator(MockPrimary::dropping_last_line(), MockFallback::working(), common::fast_options());
    let source = ChapterSource::Items(vec![
        InputItem::new("A", ""),
        InputItem::new("B", ""),
        InputItem::new("C", ""),
    ]);

    let batch = translator.run(source, "", &ignore_progress).await.unwrap();
    let titles: Vec<&str> = batch.document.items.iter().map(|item| item.title.as_str()).collect();

    assert_eq!(titles, vec![
        primary_translation(DEFAULT_MODEL, "A").as_str(),
        primary_translation(DEFAULT_MODEL, "B").as_str(),
        "C",
    ]);
    assert_eq!(batch.issues.len(), 1);
    assert_eq!(batch.issues[0].level, "WARN");
}

#[tokio::test]
async fn test_run_withRange_shouldTranslateOnlySelection() {
    let (translator, pacer) = common::mock_translator(MockPrimary::working(), MockFallback::working(), common::fast_options());
    let source = ChapterSource::Inline(common::sample_chapters_json(10));

    let batch = translator.run(source, "7-3", &ignore_progress).await.unwrap();

    assert_eq!(batch.document.suggested_filename(), "translated_3_7.json");
    assert_eq!(batch.document.items.len(), 5);
    assert_eq!(batch.document.items[0].title, primary_translation(DEFAULT_MODEL, "第3章"));
    assert_eq!(pacer.pause_count(), 5);
}

#[tokio::test]
async fn test_run_shouldReportProgressForEachChapter() {
    let (translator, _pacer) = common::mock_translator(MockPrimary::working(), MockFallback::working(), common::fast_options());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    translator
        .run(ChapterSource::Items(common::sample_chapters(3)), "", &move |completed: usize, total: usize| {
            sink.lock().push((completed, total));
        })
        .await
        .unwrap();

    assert_eq!(*seen.lock(), vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn test_run_withEmptyInput_shouldProduceEmptyDocument() {
    let (translator, pacer) = common::mock_translator(MockPrimary::working(), MockFallback::working(), common::fast_options());

    let batch = translator.run(ChapterSource::Inline("[]".to_string()), "1-5", &ignore_progress).await.unwrap();

    assert!(batch.document.items.is_empty());
    assert_eq!(batch.document.suggested_filename(), "translated_1_0.json");
    assert_eq!(translator.service().primary().request_count(), 0);
    assert_eq!(pacer.pause_count(), 0);
}

#[tokio::test]
async fn test_run_withNonArrayInput_shouldFailBeforeTranslating() {
    let (translator, _pacer) = common::mock_translator(MockPrimary::working(), MockFallback::working(), common::fast_options());

    let result = translator.run(ChapterSource::Inline(r#"{"chapters": []}"#.to_string()), "", &ignore_progress).await;

    assert!(matches!(result, Err(TranslationError::InputFormat(_))));
    assert_eq!(translator.service().primary().request_count(), 0);
}

/// With both backends down the batch aborts on the title batch
#[tokio::test]
async fn test_run_withBothBackendsFailing_shouldAbort() {
    let (translator, pacer) = common::mock_translator(MockPrimary::failing(), MockFallback::failing(), common::fast_options());

    let result = translator.run(ChapterSource::Items(common::sample_chapters(2)), "", &ignore_progress).await;

    assert!(matches!(result, Err(TranslationError::FallbackUnavailable(_))));
    assert_eq!(pacer.pause_count(), 0);
}

#[tokio::test]
async fn test_run_withContinueOnError_shouldKeepOriginalContent() {
    let options = BatchOptions { continue_on_error: true, ..common::fast_options() };
    let (translator, _pacer) = common::mock_translator(MockPrimary::failing(), MockFallback::failing(), options);
    let chapters = common::sample_chapters(2);

    let batch = translator.run(ChapterSource::Items(chapters.clone()), "", &ignore_progress).await.unwrap();

    assert_eq!(batch.document.items.len(), 2);
    for (item, original) in batch.document.items.iter().zip(&chapters) {
        assert_eq!(item.model, UNTRANSLATED_MODEL_LABEL);
        assert_eq!(item.title, original.title);
        assert_eq!(item.content, original.content);
    }
    assert!(batch.issues.iter().any(|issue| issue.level == "ERROR"));
}

/// Cancelling from the progress callback stops after the current chapter
#[tokio::test]
async fn test_run_whenCancelledMidway_shouldReturnCompletedCount() {
    let (translator, pacer) = common::mock_translator(MockPrimary::working(), MockFallback::working(), common::fast_options());
    let cancellation = translator.cancellation();

    let result = translator
        .run(ChapterSource::Items(common::sample_chapters(5)), "", &move |completed: usize, _total: usize| {
            if completed == 2 {
                cancellation.cancel();
            }
        })
        .await;

    assert!(matches!(result, Err(TranslationError::Cancelled { completed: 2 })));
    assert_eq!(pacer.pause_count(), 2);
    assert_eq!(translator.service().primary().request_count(), 3);
}

/// Fallback title requests run concurrently but never above the limit, in order
#[tokio::test]
async fn test_run_withFailingPrimary_shouldBoundTitleConcurrency() {
    let options = BatchOptions { title_concurrency: 2, ..common::fast_options() };
    let (translator, _pacer) = common::mock_translator(MockPrimary::failing(), MockFallback::slow(20), options);
    let chapters: Vec<InputItem> = (1..=6).map(|n| InputItem::new(format!("标题{}", n), "")).collect();

    let batch = translator.run(ChapterSource::Items(chapters), "", &ignore_progress).await.unwrap();

    let fallback = translator.service().fallback().provider();
    assert_eq!(fallback.max_in_flight(), 2);
    for (n, item) in (1..=6).zip(&batch.document.items) {
        assert_eq!(item.title, fallback_translation(&format!("标题{}", n)));
    }
}

/// Real sleeps: total time is at least the pause times the chapter count
#[tokio::test]
async fn test_run_withTokioPacer_shouldWaitBetweenChapters() {
    let delay = Duration::from_millis(30);
    let service = TranslationService::new(MockPrimary::working(), FallbackTranslator::new(MockFallback::working()));
    let translator = BatchTranslator::new(service, BatchOptions { delay, ..BatchOptions::default() });
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let start = Instant::now();
    translator
        .run(ChapterSource::Items(common::sample_chapters(3)), "", &move |_: usize, _: usize| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert!(start.elapsed() >= delay * 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
