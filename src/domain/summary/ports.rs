//! Collaborators the summarization pipeline depends on

use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::{
    GitHubRepoInfo, RepositoryAnalysis, RepositoryCoordinates, RepositoryDigest,
    RepositorySnapshot,
};
use crate::domain::DomainError;

/// Read access to public repository metadata.
///
/// Lookups that fail for any reason yield `None`; callers only care whether
/// the data is there.
#[async_trait]
pub trait RepositorySource: Send + Sync + Debug {
    async fn repo_info(&self, coordinates: &RepositoryCoordinates) -> Option<GitHubRepoInfo>;

    async fn readme(&self, coordinates: &RepositoryCoordinates) -> Option<String>;

    /// Fetch every piece of metadata, concurrently where the backend allows it
    async fn snapshot(&self, coordinates: &RepositoryCoordinates) -> RepositorySnapshot;
}

/// Produces a structured summary from repository facts
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RepositorySummarizer: Send + Sync {
    async fn summarize(&self, digest: &RepositoryDigest) -> Result<RepositoryAnalysis, DomainError>;

    /// Whether summaries come from a language model
    fn is_ai_powered(&self) -> bool;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;

    /// Repository source answering from fixed in-memory data
    #[derive(Debug, Default)]
    pub struct StaticRepositorySource {
        repos: HashMap<String, RepositorySnapshot>,
    }

    impl StaticRepositorySource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_repo(mut self, snapshot: RepositorySnapshot) -> Self {
            if let Some(info) = &snapshot.info {
                self.repos.insert(info.full_name.to_lowercase(), snapshot);
            }
            self
        }

        fn lookup(&self, coordinates: &RepositoryCoordinates) -> Option<&RepositorySnapshot> {
            self.repos.get(&coordinates.full_name().to_lowercase())
        }
    }

    #[async_trait]
    impl RepositorySource for StaticRepositorySource {
        async fn repo_info(&self, coordinates: &RepositoryCoordinates) -> Option<GitHubRepoInfo> {
            self.lookup(coordinates).and_then(|s| s.info.clone())
        }

        async fn readme(&self, coordinates: &RepositoryCoordinates) -> Option<String> {
            self.lookup(coordinates).and_then(|s| s.readme.clone())
        }

        async fn snapshot(&self, coordinates: &RepositoryCoordinates) -> RepositorySnapshot {
            self.lookup(coordinates).cloned().unwrap_or_default()
        }
    }
}
