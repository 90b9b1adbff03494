pub mod chunk;
pub mod config;
pub mod cost;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod report;
pub mod tokens;

pub use config::{load_summarizer_config, SummarizerConfig};
pub use error::SummarizeError;
pub use pipeline::{Document, Summarizer};
pub use provider::{Completion, CompletionProvider, OpenAiCompatProvider, ProviderError, Usage};
pub use report::RunReport;
