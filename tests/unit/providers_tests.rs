/*!
 * Tests for provider implementations
 */

use serde_json::json;

use novelwai::errors::ProviderError;
use novelwai::providers::Provider;
use novelwai::providers::gemini::{Gemini, GenerateContentRequest, GenerateContentResponse, PERMISSIVE_SAFETY_SETTINGS};
use novelwai::providers::google_translate::{GoogleTranslate, TranslateRequest, TranslateResponse};
use novelwai::providers::mock::{MockFallback, MockPrimary};

#[test]
fn test_gemini_prepare_shouldAttachFrozenSafetySettings() {
    let client = Gemini::new("key", "");
    let request = client.prepare(GenerateContentRequest::new("m", "text"));
    assert_eq!(request.safety_settings, *PERMISSIVE_SAFETY_SETTINGS);
}

#[test]
fn test_gemini_extractText_withNoCandidates_shouldBeParseError() {
    let response = GenerateContentResponse::default();
    assert!(matches!(Gemini::extract_text(&response), Err(ProviderError::ParseError(_))));
}

#[test]
fn test_gemini_extractText_withFromText_shouldRoundTrip() {
    let response = GenerateContentResponse::from_text("Chapter One");
    assert_eq!(Gemini::extract_text(&response).unwrap(), "Chapter One");
}

#[test]
fn test_googleTranslate_requestUrl_withCustomEndpoint_shouldKeepIt() {
    let client = GoogleTranslate::new("http://localhost:9000/translate");
    let url = client.request_url(&TranslateRequest::new("一", "zh-TW", "fr")).unwrap();

    assert_eq!(url.host_str(), Some("localhost"));
    assert_eq!(url.path(), "/translate");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("sl".to_string(), "zh-TW".to_string())));
    assert!(pairs.contains(&("tl".to_string(), "fr".to_string())));
    assert!(pairs.contains(&("dt".to_string(), "t".to_string())));
}

#[test]
fn test_googleTranslate_requestUrl_withInvalidEndpoint_shouldFail() {
    let client = GoogleTranslate::new("not a url");
    let result = client.request_url(&TranslateRequest::new("一", "zh-CN", "en"));
    assert!(matches!(result, Err(ProviderError::RequestFailed(_))));
}

#[test]
fn test_translateResponse_withMalformedSegment_shouldBeParseError() {
    let result = TranslateResponse::from_json(&json!([["not a pair"]]));
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[test]
fn test_translateResponse_withTrailingMetadata_shouldIgnoreIt() {
    let value = json!([[["Hello", "你好", null, null, 3, null, null, [[]], [[["x", "y"]]]]], null, "zh-CN", null, null, null, 1.0]);
    assert_eq!(TranslateResponse::from_json(&value).unwrap().text(), "Hello");
}

#[tokio::test]
async fn test_mockPrimary_shouldRecordRequestsInOrder() {
    let provider = MockPrimary::working();
    provider.complete(GenerateContentRequest::new("a", "first")).await.unwrap();
    provider.complete(GenerateContentRequest::new("b", "second")).await.unwrap();

    let received = provider.received_requests();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].user_text(), "first");
    assert_eq!(received[1].model, "b");
}

#[tokio::test]
async fn test_mockFallback_whenSlow_shouldStillTranslate() {
    let provider = MockFallback::slow(5);
    let response = provider.complete(TranslateRequest::new("一", "zh-CN", "en")).await.unwrap();
    assert_eq!(MockFallback::extract_text(&response).unwrap(), "<en>一</en>");
    assert_eq!(provider.max_in_flight(), 1);
}
