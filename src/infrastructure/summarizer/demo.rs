//! Unauthenticated preview summaries

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::fallback::FallbackSummarizer;
use super::pipeline::DEFAULT_SUMMARY_TIMEOUT;
use crate::domain::summary::GitHubRepoInfo;
use crate::domain::{
    DomainError, RepositoryAnalysis, RepositoryCoordinates, RepositoryDigest, RepositorySource,
    RepositorySummarizer,
};

#[derive(Debug, Clone)]
pub struct DemoSummary {
    pub info: GitHubRepoInfo,
    pub analysis: RepositoryAnalysis,
    pub ai_powered: bool,
}

/// Summaries for the demo endpoint.
///
/// Uses the model when one is configured and quietly falls back to the
/// metadata-only summary when it is absent or fails.
pub struct DemoSummaryService {
    source: Arc<dyn RepositorySource>,
    summarizer: Option<Arc<dyn RepositorySummarizer>>,
    fallback: FallbackSummarizer,
    timeout: Duration,
}

impl std::fmt::Debug for DemoSummaryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoSummaryService")
            .field("source", &self.source)
            .field("summarizer_configured", &self.summarizer.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DemoSummaryService {
    pub fn new(
        source: Arc<dyn RepositorySource>,
        summarizer: Option<Arc<dyn RepositorySummarizer>>,
    ) -> Self {
        Self {
            source,
            summarizer,
            fallback: FallbackSummarizer::new(),
            timeout: DEFAULT_SUMMARY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn summarize(
        &self,
        coordinates: &RepositoryCoordinates,
    ) -> Result<DemoSummary, DomainError> {
        let (info, readme) = tokio::join!(
            self.source.repo_info(coordinates),
            self.source.readme(coordinates)
        );
        let info =
            info.ok_or_else(|| DomainError::not_found("Repository not found or not accessible"))?;

        let digest = RepositoryDigest::new(&info, readme);

        if let Some(summarizer) = &self.summarizer {
            match tokio::time::timeout(self.timeout, summarizer.summarize(&digest)).await {
                Ok(Ok(analysis)) => {
                    return Ok(DemoSummary {
                        info,
                        analysis,
                        ai_powered: summarizer.is_ai_powered(),
                    });
                }
                Ok(Err(e)) => {
                    warn!(repository = %digest.full_name, error = %e, "AI summarization failed, using fallback");
                }
                Err(_) => {
                    warn!(repository = %digest.full_name, "AI summarization timed out, using fallback");
                }
            }
        }

        Ok(DemoSummary {
            info,
            analysis: self.fallback.analyze(&digest),
            ai_powered: false,
        })
    }
}
