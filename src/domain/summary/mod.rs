//! Repository summarization domain

mod analysis;
mod github;
mod ports;
mod url;

pub use analysis::{RepositoryAnalysis, RepositoryDigest};
pub use github::{
    language_breakdown, GitHubLicense, GitHubRelease, GitHubRepoInfo, LanguageShare,
    RepositorySnapshot,
};
pub use ports::{RepositorySource, RepositorySummarizer};
pub use url::{parse_github_url, RepositoryCoordinates};

#[cfg(test)]
pub use ports::mock::StaticRepositorySource;
#[cfg(test)]
pub use ports::MockRepositorySummarizer;
