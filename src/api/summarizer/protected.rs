use axum::{extract::State, http::HeaderMap};
use tracing::debug;

use super::views::{ProbeResponse, QuotaView, RepositoryView, SummarizeRequest, SummarizeResponse};
use super::MISSING_GITHUB_URL;
use crate::api::middleware::presented_api_key;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, JsonRejection};
use crate::domain::{parse_github_url, AdmissionResult, AdmittedKey};

const INVALID_REPOSITORY_URL: &str =
    "Invalid GitHub repository URL. Format: https://github.com/owner/repo";

/// Admitted key with the quota it had at admission time
struct Admission {
    key: AdmittedKey,
    remaining: u64,
    limit: u64,
}

async fn admit(state: &AppState, headers: &HeaderMap) -> Result<Admission, ApiError> {
    let result = state.gate.admit(&presented_api_key(headers), None).await;
    let message = result.message().unwrap_or_default();

    match result {
        AdmissionResult::Admitted {
            key,
            remaining,
            limit,
        } => Ok(Admission {
            key,
            remaining,
            limit,
        }),
        AdmissionResult::QuotaExceeded { .. } => Err(ApiError::rate_limited(message)),
        AdmissionResult::Unauthorized(_) => Err(ApiError::unauthorized(message)),
        AdmissionResult::ServiceUnavailable { .. } => Err(ApiError::unavailable(message)),
    }
}

/// GET /api/github-summarizer
///
/// Confirms the key would be admitted. Nothing is metered.
pub async fn probe(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProbeResponse>, ApiError> {
    let admission = admit(&state, &headers).await?;
    debug!(key_id = %admission.key.id, "API key probe");

    Ok(Json(ProbeResponse {
        message: "GitHub Summarizer API",
        status: "authenticated",
    }))
}

/// POST /api/github-summarizer
pub async fn summarize(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let admission = admit(&state, &headers).await?;

    let Json(request) = body?;
    let github_url = request
        .github_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(MISSING_GITHUB_URL))?;
    let coordinates =
        parse_github_url(&github_url).ok_or_else(|| ApiError::bad_request(INVALID_REPOSITORY_URL))?;

    let mut summary = state
        .pipeline
        .run(
            &admission.key,
            admission.remaining,
            admission.limit,
            &coordinates,
        )
        .await?;

    let analysis = std::mem::take(&mut summary.report.analysis);

    Ok(Json(SummarizeResponse {
        repository: RepositoryView::from(summary.report),
        analysis,
        status: "completed",
        rate_limit: QuotaView {
            remaining: summary.remaining,
            limit: summary.limit,
        },
    }))
}
