use once_cell::sync::Lazy;
use tiktoken_rs::{cl100k_base, CoreBPE};

// Compile the BPE once for the whole process - encoding setup is expensive
// and every chunk-size decision goes through it
static BPE: Lazy<CoreBPE> = Lazy::new(|| {
    cl100k_base().expect("Failed to initialize cl100k_base tokenizer")
});

// Per-message overhead of the chat completions wire format: 3 tokens per
// message plus 3 tokens priming the reply
const TOKENS_PER_MESSAGE: usize = 3;
const REPLY_PRIMING_TOKENS: usize = 3;

/// Count the tokens in a text string using the gpt-4 family encoding.
/// Deterministic: the same input always produces the same count, so chunk
/// boundaries are reproducible across runs.
pub fn estimate_tokens(text: &str) -> usize {
    BPE.encode_with_special_tokens(text).len()
}

/// Rough token estimate from a character count (~4 chars per token).
/// Only good enough for upfront reporting - never used for chunk boundaries.
pub fn estimate_tokens_from_chars(char_count: usize) -> usize {
    char_count / 4
}

/// Token count of a system + user message pair as the completions API sees
/// it, including the per-message overhead.
pub fn estimate_message_tokens(system_instruction: &str, payload: &str) -> usize {
    estimate_tokens(system_instruction)
        + estimate_tokens(payload)
        + 2 * TOKENS_PER_MESSAGE
        + REPLY_PRIMING_TOKENS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_is_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(estimate_tokens(text), estimate_tokens(text));
    }

    #[test]
    fn test_estimate_nonzero_for_text() {
        let tokens = estimate_tokens("Hello, world! This is a test.");
        assert!(tokens > 0);
        assert!(tokens < 20);
    }

    #[test]
    fn test_estimate_empty_string() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_chars_estimate() {
        assert_eq!(estimate_tokens_from_chars(400), 100);
        assert_eq!(estimate_tokens_from_chars(3), 0);
        assert_eq!(estimate_tokens_from_chars(0), 0);
    }

    #[test]
    fn test_message_tokens_include_overhead() {
        let bare = estimate_tokens("You are a summarizer.") + estimate_tokens("some text");
        let with_overhead = estimate_message_tokens("You are a summarizer.", "some text");
        assert_eq!(with_overhead, bare + 9);
    }
}
