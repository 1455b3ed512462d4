use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{NewPayment, Payment};
use crate::store::{InsertResult, PgStore, StoreResult};

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn list_payments(&self) -> StoreResult<Vec<Payment>>;

    async fn insert_payment(&self, payment: &NewPayment) -> StoreResult<InsertResult>;
}

#[async_trait]
impl PaymentStore for PgStore {
    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, email, price, transaction_id, biodata_id, paid_at
            FROM payments
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.db)
        .await
    }

    async fn insert_payment(&self, payment: &NewPayment) -> StoreResult<InsertResult> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO payments (id, email, price, transaction_id, biodata_id, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&payment.email)
        .bind(payment.price)
        .bind(&payment.transaction_id)
        .bind(payment.biodata_id)
        .bind(payment.date)
        .fetch_one(&self.db)
        .await?;
        Ok(InsertResult::new(id))
    }
}
