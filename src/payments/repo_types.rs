use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Body of `POST /payments`, sent after the client confirms an intent.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPayment {
    pub email: String,
    pub price: f64,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(rename = "biodataId", default)]
    pub biodata_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub price: f64,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(rename = "biodataId", skip_serializing_if = "Option::is_none")]
    pub biodata_id: Option<i64>,
    #[serde(
        rename = "date",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub paid_at: Option<OffsetDateTime>,
}
