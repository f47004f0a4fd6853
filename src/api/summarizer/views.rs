//! Wire shapes of the summarization endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::summary::{GitHubLicense, GitHubRelease, GitHubRepoInfo, LanguageShare};
use crate::domain::RepositoryAnalysis;
use crate::infrastructure::summarizer::RepositoryReport;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    #[serde(default)]
    pub github_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeResponse {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuotaView {
    pub remaining: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseView {
    pub key: String,
    pub name: String,
    pub spdx_id: Option<String>,
    pub url: Option<String>,
}

impl From<&GitHubLicense> for LicenseView {
    fn from(license: &GitHubLicense) -> Self {
        Self {
            key: license.key.clone(),
            name: license.name.clone(),
            spdx_id: license.spdx_id.clone(),
            url: license.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseView {
    pub version: String,
    pub name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
    pub is_prerelease: bool,
}

impl From<&GitHubRelease> for ReleaseView {
    fn from(release: &GitHubRelease) -> Self {
        Self {
            version: release.tag_name.clone(),
            name: release.name.clone(),
            published_at: release.published_at,
            url: release.html_url.clone(),
            is_prerelease: release.prerelease,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryView {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub website_url: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub contributors: Option<u64>,
    pub primary_language: Option<String>,
    pub languages: Option<Vec<LanguageShare>>,
    pub topics: Vec<String>,
    pub license: Option<LicenseView>,
    pub default_branch: Option<String>,
    pub size: u64,
    pub archived: bool,
    pub visibility: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub latest_version: Option<String>,
    pub latest_release: Option<ReleaseView>,
}

impl From<RepositoryReport> for RepositoryView {
    fn from(report: RepositoryReport) -> Self {
        let info = report.info;

        Self {
            name: info.name,
            full_name: info.full_name,
            description: info.description,
            url: info.html_url,
            website_url: info.homepage.filter(|h| !h.is_empty()),
            stars: info.stargazers_count,
            forks: info.forks_count,
            watchers: info.watchers_count,
            open_issues: info.open_issues_count,
            contributors: report.contributors_count,
            primary_language: info.language,
            languages: report.languages,
            topics: info.topics,
            license: info.license.as_ref().map(LicenseView::from),
            default_branch: info.default_branch,
            size: info.size,
            archived: info.archived,
            visibility: info.visibility,
            created_at: info.created_at,
            updated_at: info.updated_at,
            pushed_at: info.pushed_at,
            latest_version: report.latest_release.as_ref().map(|r| r.tag_name.clone()),
            latest_release: report.latest_release.as_ref().map(ReleaseView::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub repository: RepositoryView,
    pub analysis: RepositoryAnalysis,
    pub status: &'static str,
    pub rate_limit: QuotaView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoRepositoryView {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<GitHubRepoInfo> for DemoRepositoryView {
    fn from(info: GitHubRepoInfo) -> Self {
        Self {
            name: info.name,
            full_name: info.full_name,
            description: info.description,
            url: info.html_url,
            stars: info.stargazers_count,
            forks: info.forks_count,
            language: info.language,
            topics: info.topics,
            created_at: info.created_at,
            updated_at: info.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSummaryResponse {
    pub repository: DemoRepositoryView,
    pub analysis: RepositoryAnalysis,
    pub status: &'static str,
    pub demo: bool,
    pub ai_powered: bool,
    pub rate_limit: DemoQuotaView,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DemoQuotaView {
    pub remaining: u32,
    pub limit: u32,
}
