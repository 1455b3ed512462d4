use axum::{extract::State, routing::{get, post}, Json, Router};
use tracing::{info, instrument};

use super::{
    dto::{IntentRequest, IntentResponse},
    repo_types::{NewPayment, Payment},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    store::InsertResult,
};

const CARD: &str = "card";

/// Largest charge the card gateway accepts, in minor units.
const MAX_AMOUNT: i64 = 99_999_999;

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/payments", get(list_payments).post(record_payment))
}

/// Converts a major-unit price to minor units, rounding to the nearest cent.
pub fn minor_units(price: f64) -> AppResult<i64> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::bad_request("price must be a non-negative number"));
    }
    let amount = (price * 100.0).round();
    if amount > MAX_AMOUNT as f64 {
        return Err(AppError::bad_request(format!(
            "price exceeds the maximum of {} minor units",
            MAX_AMOUNT
        )));
    }
    Ok(amount as i64)
}

#[instrument(skip(state))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(req): Json<IntentRequest>,
) -> AppResult<Json<IntentResponse>> {
    let amount = minor_units(req.price)?;
    let currency = &state.config.payment.currency;
    let client_secret = state
        .payments
        .create_intent(amount, currency, &[CARD])
        .await
        .map_err(AppError::Gateway)?;
    info!(amount, %currency, "payment intent issued");
    Ok(Json(IntentResponse { client_secret }))
}

#[instrument(skip(state))]
pub async fn list_payments(State(state): State<AppState>) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(state.store.list_payments().await?))
}

#[instrument(skip(state, payload))]
pub async fn record_payment(
    State(state): State<AppState>,
    Json(payload): Json<NewPayment>,
) -> AppResult<Json<InsertResult>> {
    let res = state.store.insert_payment(&payload).await?;
    info!(
        id = %res.inserted_id,
        transaction_id = %payload.transaction_id,
        "payment recorded"
    );
    Ok(Json(res))
}
