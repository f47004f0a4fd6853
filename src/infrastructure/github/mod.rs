//! GitHub REST API access

mod client;

pub use client::{GitHubClient, GitHubConfig, DEFAULT_GITHUB_API_URL, DEFAULT_USER_AGENT};
