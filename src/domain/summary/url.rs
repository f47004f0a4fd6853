//! GitHub repository URL parsing

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static GITHUB_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"github\.com/([^/]+)/([^/]+)").unwrap());

/// Owner and repository name of a GitHub project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryCoordinates {
    pub owner: String,
    pub repo: String,
}

impl RepositoryCoordinates {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Extract owner and repository from anything that contains `github.com/<owner>/<repo>`.
///
/// A trailing `.git` is dropped. Anything after the repository segment is ignored.
pub fn parse_github_url(url: &str) -> Option<RepositoryCoordinates> {
    let captures = GITHUB_URL_PATTERN.captures(url)?;
    let owner = captures.get(1)?.as_str();
    let repo = captures.get(2)?.as_str();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if repo.is_empty() {
        return None;
    }

    Some(RepositoryCoordinates::new(owner, repo))
}
