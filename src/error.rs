use thiserror::Error;

/// Hard failures of the summarization pipeline. Provider-side failures are
/// recovered inside the run and never surface here - only invalid static
/// configuration is allowed to abort a run.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("invalid chunk token budget: {0} (must be greater than zero)")]
    InvalidChunkBudget(usize),

    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = SummarizeError::InvalidChunkBudget(0);
        assert!(e.to_string().contains("chunk token budget"));

        let e = SummarizeError::Config("MODEL_CONTEXT_WINDOW missing".to_string());
        assert!(e.to_string().contains("configuration error"));
    }
}
