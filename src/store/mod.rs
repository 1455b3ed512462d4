//! Persistence seam. Each collection has its own async trait, implemented by
//! [`PgStore`] in the collection's `repo` module; handlers only see `dyn Store`.

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    biodata::repo::BiodataStore, contact_requests::repo::ContactRequestStore,
    favorites::repo::FavoriteStore, payments::repo::PaymentStore, users::repo::UserStore,
};

#[cfg(test)]
pub mod memory;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Every collection the service touches, behind one object.
pub trait Store:
    UserStore + BiodataStore + FavoriteStore + ContactRequestStore + PaymentStore + Lifecycle
{
}

impl<T> Store for T where
    T: UserStore + BiodataStore + FavoriteStore + ContactRequestStore + PaymentStore + Lifecycle
{
}

#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Release the underlying connections. Called once on shutdown.
    async fn close(&self);
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl InsertResult {
    pub fn new(inserted_id: Uuid) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<Uuid>,
}

impl UpdateResult {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn upserted(id: Uuid) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// 200 payload for a business-rule no-op, e.g. a duplicate email.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sentinel {
    pub message: &'static str,
    pub inserted_id: Option<Uuid>,
}

impl Sentinel {
    pub const fn new(message: &'static str) -> Self {
        Self {
            message,
            inserted_id: None,
        }
    }
}

/// Either the raw store result or the sentinel explaining why nothing happened.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Outcome<T> {
    Done(T),
    Rejected(Sentinel),
}

impl<T> Outcome<T> {
    pub fn from_option(value: Option<T>, sentinel: Sentinel) -> Self {
        match value {
            Some(v) => Self::Done(v),
            None => Self::Rejected(sentinel),
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pub(crate) db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

/// Sets one text column on the row with `id`; `modifiedCount` is 0 when the
/// column already held `value`. Never inserts.
pub(crate) async fn set_column_by_id(
    db: &PgPool,
    table: &'static str,
    column: &'static str,
    id: Uuid,
    value: &str,
) -> StoreResult<UpdateResult> {
    let sql = format!(
        r#"
        UPDATE {table} t
           SET {column} = $2
          FROM (SELECT id, {column} AS prev FROM {table} WHERE id = $1 FOR UPDATE) old
         WHERE t.id = old.id
        RETURNING old.prev
        "#
    );
    let prev = sqlx::query_as::<_, (Option<String>,)>(&sql)
        .bind(id)
        .bind(value)
        .fetch_optional(db)
        .await?;
    Ok(match prev {
        Some((prev,)) => UpdateResult::matched(prev.as_deref() != Some(value)),
        None => UpdateResult::unmatched(),
    })
}

#[async_trait]
impl Lifecycle for PgStore {
    async fn close(&self) {
        self.db.close().await;
        tracing::info!("database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_serializes_with_null_inserted_id() {
        let outcome: Outcome<InsertResult> = Outcome::Rejected(Sentinel::new("user already exists"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "user already exists", "insertedId": null })
        );
    }

    #[test]
    fn update_result_uses_driver_field_names() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(UpdateResult::upserted(id)).unwrap();
        assert_eq!(json["matchedCount"], 0);
        assert_eq!(json["upsertedCount"], 1);
        assert_eq!(json["upsertedId"], id.to_string());
        let json = serde_json::to_value(UpdateResult::matched(false)).unwrap();
        assert_eq!(json["modifiedCount"], 0);
        assert!(json["upsertedId"].is_null());
    }
}
