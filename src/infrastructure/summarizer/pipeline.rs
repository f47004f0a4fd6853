//! Fetch, summarize, then meter: the protected summarization flow

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::summary::{
    language_breakdown, GitHubRelease, GitHubRepoInfo, LanguageShare,
};
use crate::domain::{
    AdmittedKey, DomainError, RepositoryAnalysis, RepositoryCoordinates, RepositoryDigest,
    RepositorySource, RepositorySummarizer,
};
use crate::infrastructure::api_key::UsageMeter;

pub const DEFAULT_SUMMARY_TIMEOUT: Duration = Duration::from_secs(60);

pub const SUMMARIZER_NOT_CONFIGURED: &str =
    "OpenAI API key not configured. Please set OPENAI_API_KEY in your environment variables.";

/// Repository facts plus the generated analysis
#[derive(Debug, Clone)]
pub struct RepositoryReport {
    pub info: GitHubRepoInfo,
    pub latest_release: Option<GitHubRelease>,
    pub contributors_count: Option<u64>,
    pub languages: Option<Vec<LanguageShare>>,
    pub analysis: RepositoryAnalysis,
}

/// A report together with the key's quota after metering
#[derive(Debug, Clone)]
pub struct MeteredSummary {
    pub report: RepositoryReport,
    pub remaining: u64,
    pub limit: u64,
}

/// Runs one admitted summarization request.
///
/// Usage is recorded only once the summarizer has returned successfully.
/// Dropping the future before that point leaves the counter untouched.
pub struct SummaryPipeline {
    source: Arc<dyn RepositorySource>,
    summarizer: Option<Arc<dyn RepositorySummarizer>>,
    meter: Arc<UsageMeter>,
    timeout: Duration,
}

impl std::fmt::Debug for SummaryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryPipeline")
            .field("source", &self.source)
            .field("summarizer_configured", &self.summarizer.is_some())
            .field("meter", &self.meter)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SummaryPipeline {
    pub fn new(
        source: Arc<dyn RepositorySource>,
        summarizer: Option<Arc<dyn RepositorySummarizer>>,
        meter: Arc<UsageMeter>,
    ) -> Self {
        Self {
            source,
            summarizer,
            meter,
            timeout: DEFAULT_SUMMARY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run(
        &self,
        key: &AdmittedKey,
        remaining: u64,
        limit: u64,
        coordinates: &RepositoryCoordinates,
    ) -> Result<MeteredSummary, DomainError> {
        let snapshot = self.source.snapshot(coordinates).await;

        let info = snapshot.info.ok_or_else(|| {
            DomainError::not_found(
                "Failed to fetch repository information. Repository may not exist or is private.",
            )
        })?;

        let summarizer = self
            .summarizer
            .as_ref()
            .ok_or_else(|| DomainError::not_configured(SUMMARIZER_NOT_CONFIGURED))?;

        let digest = RepositoryDigest::new(&info, snapshot.readme);
        let analysis = tokio::time::timeout(self.timeout, summarizer.summarize(&digest))
            .await
            .map_err(|_| {
                warn!(repository = %digest.full_name, timeout = ?self.timeout, "Summarizer timed out");
                DomainError::timeout("Summarization timed out")
            })??;

        let remaining = match self.meter.record_usage(&key.id).await {
            Some(usage) => limit.saturating_sub(usage),
            None => remaining,
        };

        info!(
            key_id = %key.id,
            repository = %digest.full_name,
            remaining,
            "Repository summarized"
        );

        Ok(MeteredSummary {
            report: RepositoryReport {
                info,
                latest_release: snapshot.latest_release,
                contributors_count: snapshot.contributors_count,
                languages: snapshot.languages.as_ref().map(language_breakdown),
                analysis,
            },
            remaining,
            limit,
        })
    }
}
