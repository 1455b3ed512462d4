use async_trait::async_trait;
use uuid::Uuid;

use super::{
    dto::NewUser,
    repo_types::{Membership, Role, User, UserRow},
};
use crate::store::{set_column_by_id, InsertResult, PgStore, StoreResult, UpdateResult};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Exact, case-sensitive email match.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Inserts unless the email is taken; `None` means nothing was written.
    async fn insert_user(&self, user: &NewUser) -> StoreResult<Option<InsertResult>>;

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<UpdateResult>;

    async fn set_user_membership(
        &self,
        id: Uuid,
        membership: Membership,
    ) -> StoreResult<UpdateResult>;
}

#[async_trait]
impl UserStore for PgStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, photo, role, membership
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, photo, role, membership
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<Option<InsertResult>> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (id, email, name, photo)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.photo)
        .fetch_optional(&self.db)
        .await?;
        Ok(id.map(InsertResult::new))
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<UpdateResult> {
        set_column_by_id(&self.db, "users", "role", id, role.as_str()).await
    }

    async fn set_user_membership(
        &self,
        id: Uuid,
        membership: Membership,
    ) -> StoreResult<UpdateResult> {
        set_column_by_id(&self.db, "users", "membership", id, membership.as_str()).await
    }
}
