//! Repository metadata as reported by the GitHub REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubLicense {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub spdx_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubRepoInfo {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub license: Option<GitHubLicense>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Latest published release, or the newest tag when nothing was released
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub html_url: String,
    #[serde(default)]
    pub prerelease: bool,
}

/// Everything fetched about one repository for a full summary
#[derive(Debug, Clone, Default)]
pub struct RepositorySnapshot {
    pub info: Option<GitHubRepoInfo>,
    pub readme: Option<String>,
    pub latest_release: Option<GitHubRelease>,
    pub contributors_count: Option<u64>,
    pub languages: Option<HashMap<String, u64>>,
}

/// Share of the code base written in one language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    pub bytes: u64,
    /// Percent of total bytes, one decimal place
    pub percentage: f64,
}

/// Convert GitHub's byte counts into percentages, largest first
pub fn language_breakdown(languages: &HashMap<String, u64>) -> Vec<LanguageShare> {
    let total: u64 = languages.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = languages
        .iter()
        .map(|(name, &bytes)| LanguageShare {
            name: name.clone(),
            bytes,
            percentage: (bytes as f64 / total as f64 * 1000.0).round() / 10.0,
        })
        .collect();

    shares.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_breakdown() {
        let languages = HashMap::from([
            ("Rust".to_string(), 7000),
            ("Shell".to_string(), 1000),
            ("TOML".to_string(), 2000),
        ]);

        let shares = language_breakdown(&languages);

        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].name, "Rust");
        assert_eq!(shares[0].percentage, 70.0);
        assert_eq!(shares[1].name, "TOML");
        assert_eq!(shares[2].percentage, 10.0);
    }

    #[test]
    fn test_language_breakdown_rounds_to_one_decimal() {
        let languages = HashMap::from([("A".to_string(), 1), ("B".to_string(), 2)]);
        let shares = language_breakdown(&languages);

        assert_eq!(shares[0].percentage, 66.7);
        assert_eq!(shares[1].percentage, 33.3);
    }

    #[test]
    fn test_language_breakdown_empty() {
        assert!(language_breakdown(&HashMap::new()).is_empty());
        assert!(language_breakdown(&HashMap::from([("A".to_string(), 0)])).is_empty());
    }

    #[test]
    fn test_repo_info_tolerates_missing_fields() {
        let info: GitHubRepoInfo = serde_json::from_value(serde_json::json!({
            "name": "axum",
            "full_name": "tokio-rs/axum",
            "html_url": "https://github.com/tokio-rs/axum",
            "description": null,
            "created_at": "2021-05-30T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(info.stargazers_count, 0);
        assert!(info.topics.is_empty());
        assert!(info.created_at.is_some());
    }
}
