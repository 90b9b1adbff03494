use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;

use crate::chunk::chunk_text;
use crate::config::SummarizerConfig;
use crate::cost::calculate_cost;
use crate::error::SummarizeError;
use crate::prompts;
use crate::provider::{CompletionProvider, ProviderError, Usage};
use crate::report::RunReport;
use crate::tokens::{estimate_message_tokens, estimate_tokens_from_chars};

/// Reduce-stage instruction branch: combined chunk-summary text longer than
/// this many characters gets the verbose instruction, anything shorter the
/// brief one.
const VERBOSE_REDUCE_THRESHOLD_CHARS: usize = 100;

/// Raw input text plus a free-form label identifying where it came from
/// (e.g. "PDF file"). Created by the caller, never mutated.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub source: String,
}

impl Document {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// Map-stage output for one chunk. A failed chunk produces no ChunkSummary
/// and simply contributes nothing to the reduce input.
struct ChunkSummary {
    text: String,
    usage: Usage,
    model: String,
}

/// The token-bounded map-reduce summarization pipeline. Owns its
/// configuration and a single injected completion provider; all intermediate
/// state lives only for the duration of one `summarize` call.
pub struct Summarizer {
    config: SummarizerConfig,
    provider: Arc<dyn CompletionProvider>,
}

impl Summarizer {
    pub fn new(
        config: SummarizerConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self, SummarizeError> {
        config.validate()?;
        Ok(Self { config, provider })
    }

    /// Summarize a document of any length into one bounded summary.
    ///
    /// Always yields a RunReport once the chunk budget is accepted: chunk
    /// failures drop out of the reduce input, a failed reduce leaves the
    /// summary absent, and a run where every chunk failed reports the
    /// no-content sentinel. Only an invalid budget is a hard error.
    pub async fn summarize(
        &self,
        document: &Document,
        max_chunk_tokens: usize,
    ) -> Result<RunReport, SummarizeError> {
        let start_time = Instant::now();
        let char_count = document.text.chars().count();
        let token_estimate = estimate_tokens_from_chars(char_count);
        info!(
            "📄 Summarizing {} ({} characters, ~{} tokens)",
            document.source, char_count, token_estimate
        );

        let chunks = chunk_text(&document.text, max_chunk_tokens)?;
        let total_chunks = chunks.len();
        let initial_prompt = prompts::load_initial_prompt();

        // Map stage: fan out per-chunk calls up to the configured limit.
        // Results are index-tagged and re-sorted so the reduce input always
        // follows original chunk order no matter which call finishes first.
        let mut results: Vec<(usize, Option<ChunkSummary>)> =
            stream::iter(chunks.iter().enumerate())
                .map(|(index, chunk)| {
                    let instruction = initial_prompt.as_str();
                    async move {
                        let summary = self
                            .summarize_chunk(index, total_chunks, instruction, chunk)
                            .await;
                        (index, summary)
                    }
                })
                .buffer_unordered(self.config.chunk_concurrency)
                .collect()
                .await;
        results.sort_by_key(|(index, _)| *index);

        // Single merge pass over usage once every chunk call has settled
        let mut totals = Usage::default();
        let mut model_id = self.config.default_model.clone();
        let mut chunk_summaries: Vec<String> = Vec::new();
        for (_, result) in results {
            if let Some(chunk_summary) = result {
                totals.add(chunk_summary.usage);
                model_id = chunk_summary.model;
                chunk_summaries.push(chunk_summary.text);
            }
        }
        info!(
            "📊 Map stage complete: {}/{} chunks summarized",
            chunk_summaries.len(),
            total_chunks
        );

        // Reduce stage: one call over the combined chunk summaries, with the
        // instruction chosen by how much intermediate text survived
        let summary = if chunk_summaries.is_empty() {
            warn!("⚠️ Every chunk failed, skipping reduce stage");
            Some(prompts::NO_CONTENT_SUMMARY.to_string())
        } else {
            let combined = chunk_summaries.join(" ");
            let instruction = if combined.len() > VERBOSE_REDUCE_THRESHOLD_CHARS {
                prompts::load_final_prompt()
            } else {
                prompts::load_brief_prompt()
            };
            debug!(
                "🤖 Reduce stage: {} combined characters, {} instruction",
                combined.len(),
                if combined.len() > VERBOSE_REDUCE_THRESHOLD_CHARS {
                    "verbose"
                } else {
                    "brief"
                }
            );

            let max_response = self.max_response_tokens(&instruction, &combined);
            match self.provider.complete(&instruction, &combined, max_response).await {
                Ok(completion) => {
                    totals.add(completion.usage);
                    model_id = completion.model;
                    Some(completion.text)
                }
                Err(ProviderError::ContentRejected(reason)) => {
                    warn!("🚫 Reduce call rejected by content filter: {}", reason);
                    Some(prompts::CONTENT_FILTER_MESSAGE.to_string())
                }
                Err(e) => {
                    error!("❌ Reduce call failed: {}", e);
                    None
                }
            }
        };

        let estimated_cost =
            calculate_cost(&model_id, totals.prompt_tokens, totals.completion_tokens);
        let elapsed = start_time.elapsed();
        info!(
            "⏱️ Run complete in {:.2}s: {} total tokens, ${:.4}",
            elapsed.as_secs_f64(),
            totals.total(),
            estimated_cost
        );

        Ok(RunReport {
            source: document.source.clone(),
            char_count,
            token_estimate,
            total_prompt_tokens: totals.prompt_tokens,
            total_completion_tokens: totals.completion_tokens,
            total_tokens: totals.total(),
            estimated_cost,
            elapsed,
            generated_at: Utc::now(),
            summary,
        })
    }

    /// One map-stage call. Any provider failure is logged and recovered as
    /// an absent summary for that chunk.
    async fn summarize_chunk(
        &self,
        index: usize,
        total_chunks: usize,
        instruction: &str,
        chunk: &str,
    ) -> Option<ChunkSummary> {
        debug!("🤖 Processing chunk {}/{}", index + 1, total_chunks);
        let max_response = self.max_response_tokens(instruction, chunk);
        match self.provider.complete(instruction, chunk, max_response).await {
            Ok(completion) => {
                debug!(
                    "✅ Chunk {}/{} summarized: {} completion tokens, {} prompt tokens",
                    index + 1,
                    total_chunks,
                    completion.usage.completion_tokens,
                    completion.usage.prompt_tokens
                );
                Some(ChunkSummary {
                    text: completion.text,
                    usage: completion.usage,
                    model: completion.model,
                })
            }
            Err(e) => {
                warn!("⚠️ Chunk {}/{} failed: {}", index + 1, total_chunks, e);
                None
            }
        }
    }

    /// Response-token headroom for one call: whatever the context window has
    /// left after the request itself, capped at the configured maximum.
    fn max_response_tokens(&self, instruction: &str, payload: &str) -> u32 {
        let input_tokens = estimate_message_tokens(instruction, payload);
        let headroom = self.config.model_context_window.saturating_sub(input_tokens);
        u32::try_from(headroom)
            .unwrap_or(u32::MAX)
            .min(self.config.max_response_tokens)
    }
}
