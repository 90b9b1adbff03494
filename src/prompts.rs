use log::debug;
use std::fs;

/// Instruction for the per-chunk "map" pass.
pub const INITIAL_SUMMARIZATION_PROMPT: &str = "Summarize all the key points of this document into bullet points of the top takeaways, using up to 20 bullet points of key things to consider.";

/// Instruction for the final reduce pass over substantial combined text.
pub const FINAL_SUMMARIZATION_PROMPT: &str = "Provide a verbose summary of the text given, citing key topics if possible and highlighting the most important points with up to 20 bullet points capturing the key takeaways. Even if some context is missing or statements say incomplete, make your most informed analysis based on the available data.";

/// Instruction for the final reduce pass when the combined text is short -
/// a heavier prompt on a handful of sentences just produces filler.
pub const BRIEF_SUMMARIZATION_PROMPT: &str = "This text is relatively brief, but attempt to extract as much relevant and valuable information as you can.";

/// In-band summary used when every chunk failed and reduce was never attempted.
pub const NO_CONTENT_SUMMARY: &str = "No content could be summarized from the provided document.";

/// User-facing message surfaced when the final reduce call is rejected by
/// the provider's content filter. Not retried.
pub const CONTENT_FILTER_MESSAGE: &str = "Your document triggered the content filter. Please modify the content and try again.";

/// Load a summarization prompt from a file with multi-path fallback,
/// returning the built-in default when no file is found.
fn load_prompt_with_fallback(file_name: &str, fallback: &str) -> String {
    let prompt_paths = [
        file_name.to_string(),
        format!("../{}", file_name),
        format!("../../{}", file_name),
        format!("src/{}", file_name),
        format!("example_{}", file_name),
        format!("../example_{}", file_name),
        format!("../../example_{}", file_name),
        format!("src/example_{}", file_name),
    ];

    for path in &prompt_paths {
        match fs::read_to_string(path) {
            Ok(content) => {
                // Remove BOM if present
                let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
                debug!("📄 Summarization prompt loaded from: {}", path);
                return content.trim().to_string();
            }
            Err(_) => continue,
        }
    }

    debug!("📄 Using built-in prompt (no {} found)", file_name);
    fallback.to_string()
}

/// Initial per-chunk analysis instruction, file-overridable.
pub fn load_initial_prompt() -> String {
    load_prompt_with_fallback("initial_summarization_prompt.txt", INITIAL_SUMMARIZATION_PROMPT)
}

/// Verbose final-summary instruction, file-overridable.
pub fn load_final_prompt() -> String {
    load_prompt_with_fallback("final_summarization_prompt.txt", FINAL_SUMMARIZATION_PROMPT)
}

/// Brief-extraction instruction, file-overridable.
pub fn load_brief_prompt() -> String {
    load_prompt_with_fallback("brief_summarization_prompt.txt", BRIEF_SUMMARIZATION_PROMPT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_fall_back_to_builtins() {
        // No prompt files exist in the test environment, so the loaders
        // must return the non-empty built-in instructions.
        assert!(!load_initial_prompt().is_empty());
        assert!(!load_final_prompt().is_empty());
        assert!(!load_brief_prompt().is_empty());
    }

    #[test]
    fn test_reduce_prompts_differ() {
        assert_ne!(FINAL_SUMMARIZATION_PROMPT, BRIEF_SUMMARIZATION_PROMPT);
    }
}
