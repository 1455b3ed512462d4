use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{Favorite, NewFavorite};
use crate::store::{DeleteResult, InsertResult, PgStore, StoreResult};

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn list_favorites_by_email(&self, email: &str) -> StoreResult<Vec<Favorite>>;

    /// `None` when any owner already favorited the same `biodataId`.
    async fn insert_favorite(&self, favorite: &NewFavorite) -> StoreResult<Option<InsertResult>>;

    async fn delete_favorite(&self, id: Uuid) -> StoreResult<DeleteResult>;
}

#[async_trait]
impl FavoriteStore for PgStore {
    async fn list_favorites_by_email(&self, email: &str) -> StoreResult<Vec<Favorite>> {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, biodata_id, email, name, permanent_division, occupation
            FROM favorites
            WHERE email = $1
            ORDER BY created_at
            "#,
        )
        .bind(email)
        .fetch_all(&self.db)
        .await
    }

    async fn insert_favorite(&self, favorite: &NewFavorite) -> StoreResult<Option<InsertResult>> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO favorites (id, biodata_id, email, name, permanent_division, occupation)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (biodata_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(favorite.biodata_id)
        .bind(&favorite.email)
        .bind(&favorite.name)
        .bind(&favorite.permanent_division)
        .bind(&favorite.occupation)
        .fetch_optional(&self.db)
        .await?;
        Ok(id.map(InsertResult::new))
    }

    async fn delete_favorite(&self, id: Uuid) -> StoreResult<DeleteResult> {
        let done = sqlx::query("DELETE FROM favorites WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(DeleteResult::new(done.rows_affected()))
    }
}
