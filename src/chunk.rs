use log::debug;

use crate::error::SummarizeError;
use crate::tokens::estimate_tokens;

/// Split text into word-aligned chunks, each bounded by `max_chunk_tokens`.
///
/// Words are accumulated with a +1 separator cost each; when the next word
/// would push the running estimate past the budget the current chunk is
/// closed and a new one starts with that word. The trailing chunk is always
/// closed, so an input at or under the budget yields exactly one chunk and
/// an empty input yields exactly one empty chunk (the reducer tolerates an
/// empty chunk summary). A single word that alone exceeds the budget becomes
/// a chunk of its own rather than producing a leading empty chunk.
pub fn chunk_text(text: &str, max_chunk_tokens: usize) -> Result<Vec<String>, SummarizeError> {
    if max_chunk_tokens == 0 {
        return Err(SummarizeError::InvalidChunkBudget(max_chunk_tokens));
    }

    let mut chunks = Vec::new();
    let mut current_chunk: Vec<&str> = Vec::new();
    let mut current_tokens = 0usize;

    for word in text.split_whitespace() {
        let word_tokens = estimate_tokens(word);
        if current_tokens + word_tokens + 1 <= max_chunk_tokens || current_chunk.is_empty() {
            current_chunk.push(word);
            current_tokens += word_tokens + 1;
        } else {
            chunks.push(current_chunk.join(" "));
            current_chunk = vec![word];
            current_tokens = word_tokens + 1;
        }
    }
    chunks.push(current_chunk.join(" "));

    debug!(
        "📄 Partitioned {} characters into {} chunk(s) under a {}-token budget",
        text.len(),
        chunks.len(),
        max_chunk_tokens
    );
    Ok(chunks)
}
