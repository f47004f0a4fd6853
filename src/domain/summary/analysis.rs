use serde::{Deserialize, Serialize};

use super::GitHubRepoInfo;

/// Structured summary of a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryAnalysis {
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub summary: String,
}

/// The facts a summarizer works from
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryDigest {
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub stars: u64,
    pub forks: u64,
    pub readme: Option<String>,
}

impl RepositoryDigest {
    pub fn new(info: &GitHubRepoInfo, readme: Option<String>) -> Self {
        Self {
            full_name: info.full_name.clone(),
            description: info.description.clone().filter(|d| !d.trim().is_empty()),
            language: info.language.clone(),
            topics: info.topics.clone(),
            stars: info.stargazers_count,
            forks: info.forks_count,
            readme,
        }
    }
}
