use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CountResponse, NewBiodata, SearchParams, SortParams},
    repo_types::{Biodata, BiodataFilter, BiodataProfile, BiodataStatus, Page, SortOrder},
};
use crate::{
    auth::privileged,
    error::{AppError, AppResult},
    state::AppState,
    store::{InsertResult, Outcome, Sentinel, UpdateResult},
    validate::{checked_pattern, is_valid_email},
};

const BIODATA_EXISTS: Sentinel = Sentinel::new("your Biodata already exists ");
const PREMIUM_TAKEN: Sentinel = Sentinel::new("Biodata already made premium");

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/biodataCount", get(count_biodata))
        .route("/searched-biodata", get(search_biodata))
        .route("/premium-biodata", get(premium_biodata))
        .route("/similar", get(list_biodata))
        .route("/biodatas/:email", get(get_biodata_by_email))
}

pub fn write_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/biodata", get(list_biodata).post(create_biodata))
        .route("/biodata/:id", get(get_biodata).put(update_biodata))
        .route("/biodata/premium/:id", patch(request_premium))
        .route(
            "/biodata/appPremium/:id",
            privileged(state, patch(approve_premium)),
        )
}

#[instrument(skip(state))]
pub async fn list_biodata(State(state): State<AppState>) -> AppResult<Json<Vec<Biodata>>> {
    Ok(Json(state.store.list_biodata().await?))
}

#[instrument(skip(state))]
pub async fn count_biodata(State(state): State<AppState>) -> AppResult<Json<CountResponse>> {
    let count = state.store.estimated_biodata_count().await?;
    Ok(Json(CountResponse { count }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_age(field: &str, value: Option<String>) -> AppResult<Option<i32>> {
    non_empty(value)
        .map(|v| {
            v.trim()
                .parse::<i32>()
                .map_err(|_| AppError::bad_request(format!("{field} must be an integer")))
        })
        .transpose()
}

impl SearchParams {
    fn into_query(self) -> AppResult<(BiodataFilter, Page)> {
        let gender = non_empty(self.gender);
        if let Some(p) = &gender {
            checked_pattern("gender", p)?;
        }
        let permanent_division = non_empty(self.perma_division);
        if let Some(p) = &permanent_division {
            checked_pattern("permaDivision", p)?;
        }
        let filter = BiodataFilter {
            gender,
            min_age: parse_age("minAge", self.min_age)?,
            max_age: parse_age("maxAge", self.max_age)?,
            permanent_division,
        };
        let page = Page::new(self.page, self.size)
            .ok_or_else(|| AppError::bad_request("page * size is out of range"))?;
        Ok((filter, page))
    }
}

#[instrument(skip(state))]
pub async fn search_biodata(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Biodata>>> {
    let (filter, page) = params.into_query()?;
    let found = state.store.search_biodata(&filter, page).await?;
    Ok(Json(found))
}

#[instrument(skip(state))]
pub async fn premium_biodata(
    State(state): State<AppState>,
    Query(params): Query<SortParams>,
) -> AppResult<Json<Vec<Biodata>>> {
    let order = SortOrder::from_flag(params.sort.as_deref());
    Ok(Json(state.store.list_biodata_by_age(order).await?))
}

#[instrument(skip(state))]
pub async fn get_biodata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Option<Biodata>>> {
    Ok(Json(state.store.find_biodata(id).await?))
}

#[instrument(skip(state))]
pub async fn get_biodata_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Option<Biodata>>> {
    Ok(Json(state.store.find_biodata_by_email(&email).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_biodata(
    State(state): State<AppState>,
    Json(payload): Json<NewBiodata>,
) -> AppResult<Json<Outcome<InsertResult>>> {
    let (email, profile) = payload.into_parts();
    if !is_valid_email(&email) {
        return Err(AppError::bad_request("invalid email"));
    }
    let inserted = state.store.insert_biodata(&email, &profile).await?;
    match &inserted {
        Some(res) => info!(id = %res.inserted_id, %email, "biodata created"),
        None => info!(%email, "biodata already exists"),
    }
    Ok(Json(Outcome::from_option(inserted, BIODATA_EXISTS)))
}

#[instrument(skip(state))]
pub async fn request_premium(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Outcome<UpdateResult>>> {
    let res = state.store.request_premium(id).await?;
    if res.is_none() {
        warn!(%id, "premium requested while another biodata is premium");
    }
    Ok(Json(Outcome::from_option(res, PREMIUM_TAKEN)))
}

/// Does not re-check that no other biodata is premium.
#[instrument(skip(state))]
pub async fn approve_premium(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UpdateResult>> {
    let res = state
        .store
        .set_biodata_status(id, BiodataStatus::Premium)
        .await?;
    info!(%id, upserted = res.upserted_count, "premium approved");
    Ok(Json(res))
}

#[instrument(skip(state, profile))]
pub async fn update_biodata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(profile): Json<BiodataProfile>,
) -> AppResult<Json<UpdateResult>> {
    let res = state.store.replace_biodata_profile(id, &profile).await?;
    Ok(Json(res))
}
