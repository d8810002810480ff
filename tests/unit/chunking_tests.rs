/*!
 * Tests for sentence-bounded chunking
 */

use novelwai::translation::chunking::{DEFAULT_MAX_CHUNK_CHARS, chunk};

#[test]
fn test_chunk_withEmptyText_shouldReturnNothing() {
    assert!(chunk("", 10).is_empty());
    assert!(chunk("。。。", 10).is_empty());
}

#[test]
fn test_chunk_withShortText_shouldReturnSingleChunk() {
    assert_eq!(chunk("他来了。她也来了。", DEFAULT_MAX_CHUNK_CHARS), vec!["他来了她也来了"]);
}

#[test]
fn test_chunk_withSentenceLongerThanBound_shouldKeepItWhole() {
    let long = "长".repeat(25);
    let text = format!("短。{}。短", long);
    assert_eq!(chunk(&text, 10), vec!["短".to_string(), long, "短".to_string()]);
}

#[test]
fn test_chunk_withTrailingWhitespace_shouldTrimLastChunk() {
    assert_eq!(chunk("abc.  def!  ", 100), vec!["abc  def"]);
}

/// Chunks respect the bound whenever no single sentence exceeds it
#[test]
fn test_chunk_withBoundedSentences_shouldRespectMaxLength() {
    let sentences: Vec<String> = (1..=40).map(|n| "字".repeat(n % 9 + 1)).collect();
    let text = sentences.join("。");

    for max_len in [9, 10, 17, 50] {
        for piece in chunk(&text, max_len) {
            assert!(piece.chars().count() <= max_len, "{} chars > {}", piece.chars().count(), max_len);
        }
    }
}

/// Concatenated chunks equal the text with terminators removed
#[test]
fn test_chunk_shouldPreserveContentInOrder() {
    let text = "alpha.beta!gamma?delta。epsilon！zeta？eta";
    let expected: String = text
        .chars()
        .filter(|c| !".!?！？。".contains(*c))
        .collect();

    for max_len in [1, 5, 12, 1000] {
        assert_eq!(chunk(text, max_len).concat(), expected);
    }
}
