//! Owner-scoped API key management endpoints

mod handlers;

pub use handlers::{
    create_key, delete_key, get_key, list_keys, update_key, validate_key, ApiKeyResponse,
    CreateKeyRequest, UpdateKeyRequest, ValidateKeyRequest, ValidateKeyResponse,
};

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Routes mounted under `/api/keys`
pub fn create_keys_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_keys).post(create_key))
        .route("/validate", post(validate_key))
        .route("/{key_id}", get(get_key).patch(update_key).delete(delete_key))
}
