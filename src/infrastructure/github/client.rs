use async_trait::async_trait;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::summary::{GitHubRelease, GitHubRepoInfo, RepositorySnapshot};
use crate::domain::{RepositoryCoordinates, RepositorySource};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "GitHub-Summarizer-API";
const DEFAULT_README_MAX_CHARS: usize = 10_000;

static LAST_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"page=(\d+)>; rel="last""#).unwrap());

/// GitHub client configuration
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub readme_max_chars: usize,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            readme_max_chars: DEFAULT_README_MAX_CHARS,
        }
    }
}

impl GitHubConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_readme_max_chars(mut self, max: usize) -> Self {
        self.readme_max_chars = max;
        self
    }
}

/// Read-only client for public repository metadata
#[derive(Debug, Clone)]
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct ReadmeResponse {
    content: String,
}

#[derive(Deserialize)]
struct TagResponse {
    name: String,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn repo_url(&self, coordinates: &RepositoryCoordinates, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.config.base_url, coordinates.owner, coordinates.repo, suffix
        )
    }

    async fn send(&self, url: &str) -> Option<reqwest::Response> {
        let mut request = self
            .http_client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", &self.config.user_agent);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => Some(response),
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "GitHub request unsuccessful");
                None
            }
            Err(e) => {
                debug!(url = %url, error = %e, "GitHub request failed");
                None
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let response = self.send(url).await?;

        match response.json::<T>().await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(url = %url, error = %e, "Failed to parse GitHub response");
                None
            }
        }
    }

    fn decode_readme(&self, encoded: &str) -> Option<String> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .ok()?;
        let text = String::from_utf8_lossy(&bytes);

        if text.chars().count() > self.config.readme_max_chars {
            let truncated: String = text.chars().take(self.config.readme_max_chars).collect();
            Some(format!("{}...", truncated))
        } else {
            Some(text.into_owned())
        }
    }

    async fn latest_release(&self, coordinates: &RepositoryCoordinates) -> Option<GitHubRelease> {
        if let Some(release) = self
            .get_json::<GitHubRelease>(&self.repo_url(coordinates, "/releases/latest"))
            .await
        {
            return Some(release);
        }

        let tags: Vec<TagResponse> = self
            .get_json(&self.repo_url(coordinates, "/tags?per_page=1"))
            .await?;
        let tag = tags.into_iter().next()?;

        Some(GitHubRelease {
            html_url: format!(
                "https://github.com/{}/{}/releases/tag/{}",
                coordinates.owner, coordinates.repo, tag.name
            ),
            name: Some(tag.name.clone()),
            tag_name: tag.name,
            published_at: None,
            prerelease: false,
        })
    }

    async fn contributors_count(&self, coordinates: &RepositoryCoordinates) -> Option<u64> {
        let response = self
            .send(&self.repo_url(coordinates, "/contributors?per_page=1&anon=true"))
            .await?;

        let last_page = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(|link| LAST_PAGE.captures(link))
            .and_then(|caps| caps[1].parse::<u64>().ok());

        if last_page.is_some() {
            return last_page;
        }

        response
            .json::<Vec<serde_json::Value>>()
            .await
            .ok()
            .map(|contributors| contributors.len() as u64)
    }

    async fn languages(&self, coordinates: &RepositoryCoordinates) -> Option<HashMap<String, u64>> {
        self.get_json(&self.repo_url(coordinates, "/languages"))
            .await
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn repo_info(&self, coordinates: &RepositoryCoordinates) -> Option<GitHubRepoInfo> {
        self.get_json(&self.repo_url(coordinates, "")).await
    }

    async fn readme(&self, coordinates: &RepositoryCoordinates) -> Option<String> {
        let readme: ReadmeResponse = self
            .get_json(&self.repo_url(coordinates, "/readme"))
            .await?;
        self.decode_readme(&readme.content)
    }

    async fn snapshot(&self, coordinates: &RepositoryCoordinates) -> RepositorySnapshot {
        let (info, readme, latest_release, contributors_count, languages) = tokio::join!(
            self.repo_info(coordinates),
            self.readme(coordinates),
            self.latest_release(coordinates),
            self.contributors_count(coordinates),
            self.languages(coordinates),
        );

        RepositorySnapshot {
            info,
            readme,
            latest_release,
            contributors_count,
            languages,
        }
    }
}
