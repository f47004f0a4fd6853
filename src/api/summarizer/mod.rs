//! Repository summarization endpoints

mod demo;
mod protected;
mod views;

pub use demo::summarize_demo;
pub use protected::{probe, summarize};
pub use views::{
    DemoRepositoryView, DemoSummaryResponse, LicenseView, ProbeResponse, QuotaView, ReleaseView,
    RepositoryView, SummarizeRequest, SummarizeResponse,
};

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

pub const MISSING_GITHUB_URL: &str = "Missing required field: githubUrl";

/// Routes mounted under `/api/github-summarizer`
pub fn create_summarizer_router() -> Router<AppState> {
    Router::new()
        .route("/", get(probe).post(summarize))
        .route("/demo", post(summarize_demo))
}
