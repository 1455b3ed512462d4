use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::{
    auth::jwt::JwtKeys,
    error::{AppError, AppResult},
    state::AppState,
    validate::is_valid_email,
};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/jwt", post(issue_token))
}

#[instrument(skip(state, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    if !is_valid_email(&payload.email) {
        return Err(AppError::bad_request("invalid email"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&payload.email).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AppError::Internal(e)
    })?;

    info!(email = %payload.email, "token issued");
    Ok(Json(TokenResponse { token }))
}
