//! Repository summarization services

mod demo;
mod fallback;
mod llm;
mod pipeline;

pub use demo::{DemoSummary, DemoSummaryService};
pub use fallback::FallbackSummarizer;
pub use llm::{LlmRepositorySummarizer, DEFAULT_SUMMARY_MODEL};
pub use pipeline::{
    MeteredSummary, RepositoryReport, SummaryPipeline, DEFAULT_SUMMARY_TIMEOUT,
    SUMMARIZER_NOT_CONFIGURED,
};
