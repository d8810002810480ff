/*!
 * Sentence-bounded text chunking for the fallback translator.
 *
 * The fallback endpoint rejects long query strings, so chapter bodies are cut
 * at sentence terminators into pieces of bounded length. Terminators are
 * dropped; a single sentence longer than the bound is kept whole.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Default maximum chunk length in characters
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1000;

static SENTENCE_TERMINATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?！？。]+").expect("sentence terminator pattern is valid"));

/// Split `text` into sentence-bounded chunks of at most `max_len` characters
pub fn chunk(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0;

    for fragment in SENTENCE_TERMINATORS.split(text) {
        let fragment_len = fragment.chars().count();
        if buffer_len + fragment_len > max_len && !buffer.is_empty() {
            chunks.push(std::mem::take(&mut buffer));
            buffer_len = 0;
        }
        buffer.push_str(fragment);
        buffer_len += fragment_len;
    }

    let tail = buffer.trim();
    if !tail.is_empty() {
        chunks.push(tail.to_string());
    }

    chunks
}
