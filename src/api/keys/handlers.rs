use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::api_key::{mask_secret, ApiKey, ApiKeyId, ApiKeyKind, ApiKeyPatch};
use crate::domain::{AdmissionResult, AdmittedKey};

const KEY_NOT_FOUND: &str = "API key not found";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateKeyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateKeyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaskQuery {
    #[serde(default)]
    pub masked: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub id: String,
    pub name: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: ApiKeyKind,
    pub usage: u64,
    pub limit: u64,
    pub owner_id: Option<String>,
    pub created_at: String,
}

impl ApiKeyResponse {
    fn from_key(key: &ApiKey, masked: bool) -> Self {
        Self {
            id: key.id().to_string(),
            name: key.name().to_string(),
            key: if masked {
                mask_secret(key.secret())
            } else {
                key.secret().to_string()
            },
            kind: key.kind(),
            usage: key.usage(),
            limit: key.limit(),
            owner_id: key.owner_id().map(|o| o.as_str().to_string()),
            created_at: key.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<AdmittedKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateKeyResponse {
    fn valid(key: AdmittedKey) -> Self {
        Self {
            valid: true,
            key_info: Some(key),
            error: None,
        }
    }

    fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            key_info: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteKeyResponse {
    pub success: bool,
}

/// Malformed ids cannot name an owned key, so they read as missing
fn parse_key_id(raw: &str) -> Result<ApiKeyId, ApiError> {
    ApiKeyId::parse(raw).map_err(|_| ApiError::not_found(KEY_NOT_FOUND))
}

fn parse_kind(raw: &str) -> Result<ApiKeyKind, ApiError> {
    ApiKeyKind::parse(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /api/keys
pub async fn list_keys(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<MaskQuery>,
) -> Result<Json<Vec<ApiKeyResponse>>, ApiError> {
    let keys = state.key_manager.list(user.id()).await?;

    Ok(Json(
        keys.iter()
            .map(|k| ApiKeyResponse::from_key(k, query.masked))
            .collect(),
    ))
}

/// POST /api/keys
pub async fn create_key(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateKeyRequest>,
) -> Result<(StatusCode, Json<ApiKeyResponse>), ApiError> {
    let (Some(name), Some(kind)) = (present(request.name), present(request.kind)) else {
        return Err(ApiError::bad_request("Missing required fields: name, type"));
    };
    let kind = parse_kind(&kind)?;

    let key = state
        .key_manager
        .create(user.id(), &name, kind, request.limit)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiKeyResponse::from_key(&key, false))))
}

/// GET /api/keys/{key_id}
pub async fn get_key(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(key_id): Path<String>,
    Query(query): Query<MaskQuery>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let id = parse_key_id(&key_id)?;
    let key = state.key_manager.get_one(user.id(), &id).await?;

    Ok(Json(ApiKeyResponse::from_key(&key, query.masked)))
}

/// PATCH /api/keys/{key_id}
pub async fn update_key(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(key_id): Path<String>,
    Json(request): Json<UpdateKeyRequest>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let id = parse_key_id(&key_id)?;

    let patch = ApiKeyPatch {
        name: request.name,
        kind: request.kind.as_deref().map(parse_kind).transpose()?,
        limit: request.limit,
    };

    let key = state.key_manager.update(user.id(), &id, patch).await?;

    Ok(Json(ApiKeyResponse::from_key(&key, false)))
}

/// DELETE /api/keys/{key_id}
pub async fn delete_key(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(key_id): Path<String>,
) -> Result<Json<DeleteKeyResponse>, ApiError> {
    let id = parse_key_id(&key_id)?;
    state.key_manager.delete(user.id(), &id).await?;

    Ok(Json(DeleteKeyResponse { success: true }))
}

/// POST /api/keys/validate
///
/// A valid key is reported as such even when its quota is used up.
pub async fn validate_key(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<ValidateKeyRequest>,
) -> Response {
    let Some(secret) = present(request.api_key) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ValidateKeyResponse::invalid("API key is required")),
        )
            .into_response();
    };

    match state.gate.admit(&secret, Some(user.id())).await {
        AdmissionResult::Admitted { key, .. } | AdmissionResult::QuotaExceeded { key, .. } => {
            debug!(key_id = %key.id, "API key validated");
            Json(ValidateKeyResponse::valid(key)).into_response()
        }
        AdmissionResult::Unauthorized(_) => {
            Json(ValidateKeyResponse::invalid("Invalid API key")).into_response()
        }
        AdmissionResult::ServiceUnavailable { reason } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ValidateKeyResponse::invalid(reason)),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;

    fn key() -> ApiKey {
        ApiKey::new(
            ApiKeyId::generate(),
            Some(UserId::new("owner-1").unwrap()),
            "Production",
            "dk_dev_abcdefghijklmnopqrstuvwxyz12",
            ApiKeyKind::Development,
            1000,
        )
    }

    #[test]
    fn test_response_shows_secret_unless_masked() {
        let key = key();

        let plain = ApiKeyResponse::from_key(&key, false);
        assert_eq!(plain.key, key.secret());

        let masked = ApiKeyResponse::from_key(&key, true);
        assert_eq!(masked.key, format!("dk_dev_{}", "*".repeat(28)));
    }

    #[test]
    fn test_response_wire_names() {
        let json = serde_json::to_value(ApiKeyResponse::from_key(&key(), false)).unwrap();

        assert_eq!(json["type"], "dev");
        assert_eq!(json["usage"], 0);
        assert_eq!(json["limit"], 1000);
        assert_eq!(json["owner_id"], "owner-1");
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn test_malformed_id_reads_as_not_found() {
        let err = parse_key_id("../etc").unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.response.error, KEY_NOT_FOUND);
    }

    #[test]
    fn test_validate_response_shapes() {
        let invalid = serde_json::to_value(ValidateKeyResponse::invalid("Invalid API key")).unwrap();
        assert_eq!(invalid, serde_json::json!({"valid": false, "error": "Invalid API key"}));

        let key = AdmittedKey::from(&key());
        let valid = serde_json::to_value(ValidateKeyResponse::valid(key.clone())).unwrap();
        assert_eq!(valid["keyInfo"]["type"], "dev");
        assert_eq!(valid["keyInfo"]["id"], key.id.to_string());
        assert!(valid.get("error").is_none());
    }
}
