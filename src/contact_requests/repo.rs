use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{ContactRequest, ContactRequestKey, ContactRequestRow, ContactStatus};
use crate::store::{set_column_by_id, PgStore, StoreResult, UpdateResult};

#[async_trait]
pub trait ContactRequestStore: Send + Sync {
    async fn list_contact_requests(&self) -> StoreResult<Vec<ContactRequest>>;

    async fn list_contact_requests_by_user(&self, email: &str)
        -> StoreResult<Vec<ContactRequest>>;

    /// Sets the first request matching `key` back to pending, or inserts one.
    async fn upsert_pending_request(&self, key: &ContactRequestKey) -> StoreResult<UpdateResult>;

    /// Never inserts.
    async fn approve_contact_request(&self, id: Uuid) -> StoreResult<UpdateResult>;
}

#[async_trait]
impl ContactRequestStore for PgStore {
    async fn list_contact_requests(&self) -> StoreResult<Vec<ContactRequest>> {
        let rows = sqlx::query_as::<_, ContactRequestRow>(
            r#"
            SELECT id, biodata_id, user_email, name, email, phone, status
            FROM contact_requests
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(ContactRequest::from).collect())
    }

    async fn list_contact_requests_by_user(
        &self,
        email: &str,
    ) -> StoreResult<Vec<ContactRequest>> {
        let rows = sqlx::query_as::<_, ContactRequestRow>(
            r#"
            SELECT id, biodata_id, user_email, name, email, phone, status
            FROM contact_requests
            WHERE user_email = $1
            ORDER BY created_at
            "#,
        )
        .bind(email)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(ContactRequest::from).collect())
    }

    async fn upsert_pending_request(&self, key: &ContactRequestKey) -> StoreResult<UpdateResult> {
        let pending = ContactStatus::Pending.as_str();
        let mut tx = self.db.begin().await?;
        // Nothing to row-lock when no request exists yet.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($2, $1))")
            .bind(key.biodata_id)
            .bind(&key.user_email)
            .execute(&mut *tx)
            .await?;

        let hit = sqlx::query_as::<_, (Uuid, Option<String>)>(
            r#"
            SELECT id, status
              FROM contact_requests
             WHERE biodata_id = $1
               AND user_email = $2
               AND ($3::TEXT IS NULL OR name = $3)
               AND ($4::TEXT IS NULL OR email = $4)
               AND ($5::TEXT IS NULL OR phone = $5)
             ORDER BY created_at
             LIMIT 1
               FOR UPDATE
            "#,
        )
        .bind(key.biodata_id)
        .bind(&key.user_email)
        .bind(&key.name)
        .bind(&key.email)
        .bind(&key.phone)
        .fetch_optional(&mut *tx)
        .await?;

        let res = match hit {
            Some((id, prev)) => {
                sqlx::query("UPDATE contact_requests SET status = $2 WHERE id = $1")
                    .bind(id)
                    .bind(pending)
                    .execute(&mut *tx)
                    .await?;
                UpdateResult::matched(prev.as_deref() != Some(pending))
            }
            None => {
                let id = Uuid::new_v4();
                sqlx::query(
                    r#"
                    INSERT INTO contact_requests (id, biodata_id, user_email, name, email, phone, status)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(id)
                .bind(key.biodata_id)
                .bind(&key.user_email)
                .bind(&key.name)
                .bind(&key.email)
                .bind(&key.phone)
                .bind(pending)
                .execute(&mut *tx)
                .await?;
                UpdateResult::upserted(id)
            }
        };

        tx.commit().await?;
        Ok(res)
    }

    async fn approve_contact_request(&self, id: Uuid) -> StoreResult<UpdateResult> {
        set_column_by_id(
            &self.db,
            "contact_requests",
            "status",
            id,
            ContactStatus::Approved.as_str(),
        )
        .await
    }
}
