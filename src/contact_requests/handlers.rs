use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo_types::{ContactRequest, ContactRequestKey};
use crate::{auth::privileged, error::AppResult, state::AppState, store::UpdateResult};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub email: String,
}

pub fn contact_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/contact-requests", get(list_requests))
        .route(
            "/contact-request",
            get(list_user_requests).patch(request_contact),
        )
        .route(
            "/contact-requests/:id",
            privileged(state, patch(approve_request)),
        )
}

#[instrument(skip(state))]
pub async fn list_requests(State(state): State<AppState>) -> AppResult<Json<Vec<ContactRequest>>> {
    Ok(Json(state.store.list_contact_requests().await?))
}

#[instrument(skip(state))]
pub async fn list_user_requests(
    State(state): State<AppState>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<Vec<ContactRequest>>> {
    Ok(Json(
        state.store.list_contact_requests_by_user(&user.email).await?,
    ))
}

/// Creates a pending request, or resets a matching one to pending.
#[instrument(skip(state, key))]
pub async fn request_contact(
    State(state): State<AppState>,
    Json(key): Json<ContactRequestKey>,
) -> AppResult<Json<UpdateResult>> {
    let res = state.store.upsert_pending_request(&key).await?;
    info!(
        biodata_id = key.biodata_id,
        user_email = %key.user_email,
        created = res.upserted_count,
        "contact request pending"
    );
    Ok(Json(res))
}

#[instrument(skip(state))]
pub async fn approve_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UpdateResult>> {
    Ok(Json(state.store.approve_contact_request(id).await?))
}
