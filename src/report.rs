use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::prompts::NO_CONTENT_SUMMARY;

/// End-to-end result of one summarization run. Always produced, even when
/// every provider call failed - absence of a summary is communicated
/// in-band, never as an error.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub source: String,
    pub char_count: usize,
    pub token_estimate: usize,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    pub total_tokens: u64,
    pub estimated_cost: f64,
    pub elapsed: Duration,
    pub generated_at: DateTime<Utc>,
    pub summary: Option<String>,
}

impl RunReport {
    /// Render the final output the caller receives: the summary (or the
    /// no-content sentinel) followed by the processing summary block.
    pub fn render(&self) -> String {
        let summary_text = self.summary.as_deref().unwrap_or(NO_CONTENT_SUMMARY);
        format!("{}\n\n{}", summary_text, self.processing_summary())
    }

    /// The accounting block appended to every summary.
    pub fn processing_summary(&self) -> String {
        format!(
            "**====PROCESSING SUMMARY====**\n\
             **Source:** {}\n | \
             **Size of input text:** {} characters\n | \
             **Initial token estimate:** {} tokens\n | \
             **Total completion tokens:** {}\n | \
             **Total prompt tokens:** {}\n | \
             **Total tokens:** {}\n | \
             **Actual cost based on total tokens:** ${:.4}\n | \
             **Total execution time:** {}\n | \
             **Generated:** {}\n | ",
            self.source,
            self.char_count,
            self.token_estimate,
            self.total_completion_tokens,
            self.total_prompt_tokens,
            self.total_tokens,
            self.estimated_cost,
            format_elapsed(self.elapsed),
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }
}

/// Format a wall-clock duration as H:MM:SS.mmm
fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = elapsed.subsec_millis();
    format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(summary: Option<String>) -> RunReport {
        RunReport {
            source: "PDF file".to_string(),
            char_count: 12_345,
            token_estimate: 3_086,
            total_prompt_tokens: 4_200,
            total_completion_tokens: 800,
            total_tokens: 5_000,
            estimated_cost: 0.033,
            elapsed: Duration::from_millis(12_345),
            generated_at: Utc::now(),
            summary,
        }
    }

    #[test]
    fn test_render_includes_summary_and_accounting() {
        let report = sample_report(Some("- key point one\n- key point two".to_string()));
        let rendered = report.render();
        assert!(rendered.starts_with("- key point one"));
        assert!(rendered.contains("====PROCESSING SUMMARY===="));
        assert!(rendered.contains("**Source:** PDF file"));
        assert!(rendered.contains("**Size of input text:** 12345 characters"));
        assert!(rendered.contains("**Total tokens:** 5000"));
        assert!(rendered.contains("$0.0330"));
    }

    #[test]
    fn test_render_without_summary_uses_sentinel() {
        let report = sample_report(None);
        let rendered = report.render();
        assert!(rendered.starts_with(NO_CONTENT_SUMMARY));
        assert!(rendered.contains("====PROCESSING SUMMARY===="));
    }

    #[test]
    fn test_elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::from_millis(12_345)), "0:00:12.345");
        assert_eq!(format_elapsed(Duration::from_secs(3_661)), "1:01:01.000");
        assert_eq!(format_elapsed(Duration::ZERO), "0:00:00.000");
    }
}
