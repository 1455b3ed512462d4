use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo_types::{Favorite, NewFavorite};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    store::{DeleteResult, InsertResult, Outcome, Sentinel},
    validate::is_valid_email,
};

const ALREADY_FAVORITED: Sentinel = Sentinel::new("Biodata already added to the favorite list");

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub email: String,
}

pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/favorite", get(list_favorites).post(add_favorite))
        .route("/favorite/:id", delete(remove_favorite))
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    Query(owner): Query<OwnerQuery>,
) -> AppResult<Json<Vec<Favorite>>> {
    Ok(Json(state.store.list_favorites_by_email(&owner.email).await?))
}

/// The duplicate check is global: one favorite per biodata across all owners.
#[instrument(skip(state, payload))]
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(payload): Json<NewFavorite>,
) -> AppResult<Json<Outcome<InsertResult>>> {
    if !is_valid_email(&payload.email) {
        return Err(AppError::bad_request("invalid email"));
    }
    let inserted = state.store.insert_favorite(&payload).await?;
    if inserted.is_none() {
        info!(biodata_id = payload.biodata_id, "biodata already favorited");
    }
    Ok(Json(Outcome::from_option(inserted, ALREADY_FAVORITED)))
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResult>> {
    Ok(Json(state.store.delete_favorite(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favorite(biodata_id: i64, email: &str) -> NewFavorite {
        NewFavorite {
            biodata_id,
            email: email.into(),
            name: Some("Someone".into()),
            permanent_division: Some("Dhaka".into()),
            occupation: None,
        }
    }

    fn owner(email: &str) -> Query<OwnerQuery> {
        Query(OwnerQuery { email: email.into() })
    }

    #[tokio::test]
    async fn same_biodata_cannot_be_favorited_by_another_owner() {
        let state = AppState::fake();
        let Json(first) = add_favorite(State(state.clone()), Json(favorite(4, "a@x.com")))
            .await
            .unwrap();
        assert!(matches!(first, Outcome::Done(_)));

        let Json(second) = add_favorite(State(state.clone()), Json(favorite(4, "b@x.com")))
            .await
            .unwrap();
        assert_eq!(second, Outcome::Rejected(ALREADY_FAVORITED));

        let Json(mine) = list_favorites(State(state.clone()), owner("b@x.com")).await.unwrap();
        assert!(mine.is_empty());
        let Json(theirs) = list_favorites(State(state), owner("a@x.com")).await.unwrap();
        assert_eq!(theirs.len(), 1);
    }

    #[tokio::test]
    async fn list_matches_owner_exactly() {
        let state = AppState::fake();
        let _ = add_favorite(State(state.clone()), Json(favorite(1, "a@x.com"))).await.unwrap();
        let _ = add_favorite(State(state.clone()), Json(favorite(2, "a@x.com"))).await.unwrap();
        let _ = add_favorite(State(state.clone()), Json(favorite(3, "A@x.com"))).await.unwrap();
        let Json(mine) = list_favorites(State(state), owner("a@x.com")).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|f| f.email == "a@x.com"));
    }

    #[tokio::test]
    async fn delete_reports_affected_count() {
        let state = AppState::fake();
        let Json(Outcome::Done(created)) =
            add_favorite(State(state.clone()), Json(favorite(9, "a@x.com"))).await.unwrap()
        else {
            panic!("favorite not created");
        };

        let Json(gone) = remove_favorite(State(state.clone()), Path(created.inserted_id))
            .await
            .unwrap();
        assert_eq!(gone, DeleteResult::new(1));

        let Json(again) = remove_favorite(State(state.clone()), Path(created.inserted_id))
            .await
            .unwrap();
        assert_eq!(again, DeleteResult::new(0));

        // the biodata is free to be favorited again
        let Json(readd) = add_favorite(State(state), Json(favorite(9, "b@x.com")))
            .await
            .unwrap();
        assert!(matches!(readd, Outcome::Done(_)));
    }
}
