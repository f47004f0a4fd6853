use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
};
use tracing::debug;

use super::views::{DemoQuotaView, DemoRepositoryView, DemoSummaryResponse, SummarizeRequest};
use super::MISSING_GITHUB_URL;
use crate::api::middleware::caller_address;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, JsonRejection};
use crate::domain::{parse_github_url, RateLimitDecision};

const DEMO_RATE_LIMITED: &str =
    "Rate limit exceeded. Please try again tomorrow or sign up for an API key.";
const INVALID_DEMO_URL: &str =
    "Invalid GitHub URL format. Expected: https://github.com/owner/repository";

fn rate_limit_headers(decision: &RateLimitDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers
}

/// POST /api/github-summarizer/demo
///
/// Unauthenticated and throttled per caller address.
pub async fn summarize_demo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<DemoSummaryResponse>), ApiError> {
    let caller = caller_address(&headers);
    let decision = state.demo_limiter.check_and_record(&caller).await;
    let limit_headers = rate_limit_headers(&decision);

    if !decision.allowed {
        debug!(caller = %caller, reset_in_seconds = decision.reset_in_seconds, "Demo rate limit hit");
        return Err(ApiError::rate_limited(DEMO_RATE_LIMITED).with_headers(limit_headers));
    }

    let result = async {
        let Json(request) = body?;
        let github_url = request
            .github_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request(MISSING_GITHUB_URL))?;
        let coordinates =
            parse_github_url(&github_url).ok_or_else(|| ApiError::bad_request(INVALID_DEMO_URL))?;

        let summary = state.demo.summarize(&coordinates).await?;

        Ok::<_, ApiError>(DemoSummaryResponse {
            repository: DemoRepositoryView::from(summary.info),
            analysis: summary.analysis,
            status: "completed",
            demo: true,
            ai_powered: summary.ai_powered,
            rate_limit: DemoQuotaView {
                remaining: decision.remaining,
                limit: decision.limit,
            },
        })
    }
    .await;

    match result {
        Ok(response) => Ok((limit_headers, Json(response))),
        Err(e) => Err(e.with_headers(limit_headers)),
    }
}
