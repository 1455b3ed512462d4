use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{AdminStatus, NewUser},
    repo_types::{Membership, Role, User},
};
use crate::{
    auth::{privileged, AuthUser},
    error::{AppError, AppResult},
    state::AppState,
    store::{InsertResult, Outcome, Sentinel, UpdateResult},
    validate::is_valid_email,
};

const USER_EXISTS: Sentinel = Sentinel::new("user already exists");

pub fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/admin/:target",
            get(check_admin).merge(privileged(state, patch(make_admin))),
        )
        .route("/users/premium/:id", privileged(state, patch(make_premium)))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.store.list_users().await?))
}

/// Only the token's owner may ask whether they are an admin.
#[instrument(skip(state))]
pub async fn check_admin(
    State(state): State<AppState>,
    AuthUser(token_email): AuthUser,
    Path(email): Path<String>,
) -> AppResult<Json<AdminStatus>> {
    if email != token_email {
        warn!(%email, %token_email, "admin probe for another identity");
        return Err(AppError::Forbidden);
    }
    let admin = state
        .store
        .find_user_by_email(&email)
        .await?
        .is_some_and(|u| u.is_admin());
    Ok(Json(AdminStatus { admin }))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> AppResult<Json<Outcome<InsertResult>>> {
    if !is_valid_email(&payload.email) {
        return Err(AppError::bad_request("invalid email"));
    }
    let inserted = state.store.insert_user(&payload).await?;
    match &inserted {
        Some(res) => info!(user_id = %res.inserted_id, email = %payload.email, "user created"),
        None => info!(email = %payload.email, "user already exists"),
    }
    Ok(Json(Outcome::from_option(inserted, USER_EXISTS)))
}

#[instrument(skip(state))]
pub async fn make_admin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UpdateResult>> {
    let res = state.store.set_user_role(id, Role::Admin).await?;
    info!(%id, matched = res.matched_count, "role set to admin");
    Ok(Json(res))
}

#[instrument(skip(state))]
pub async fn make_premium(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UpdateResult>> {
    let res = state.store.set_user_membership(id, Membership::Premium).await?;
    info!(%id, matched = res.matched_count, "membership set to premium");
    Ok(Json(res))
}
