use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Body of `POST /favorite`: the owner's email plus a summary of the biodata.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewFavorite {
    #[serde(rename = "biodataId")]
    pub biodata_id: i64,
    pub email: String,
    pub name: Option<String>,
    #[serde(rename = "permanentDivision")]
    pub permanent_division: Option<String>,
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Favorite {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "biodataId")]
    pub biodata_id: i64,
    pub email: String,
    pub name: Option<String>,
    #[serde(rename = "permanentDivision")]
    pub permanent_division: Option<String>,
    pub occupation: Option<String>,
}
