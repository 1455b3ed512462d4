use async_trait::async_trait;
use sqlx::{postgres::PgArguments, query::Query, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use super::repo_types::{
    Biodata, BiodataFilter, BiodataProfile, BiodataRow, BiodataStatus, Page, SortOrder,
};
use crate::store::{InsertResult, PgStore, StoreResult, UpdateResult};

const BIODATA_COLUMNS: &str = "id, biodata_id, email, status, name, photo, gender, birth_date, \
    height, weight, partner_height, partner_weight, age, partner_age, occupation, race, \
    father_name, mother_name, permanent_division, present_division, phone";

const PROFILE_COLUMNS: &str = "name, photo, gender, birth_date, height, weight, partner_height, \
    partner_weight, age, partner_age, occupation, race, father_name, mother_name, \
    permanent_division, present_division, phone";

/// Serializes every write to `biodata.status`.
const PREMIUM_LOCK_KEY: i64 = 0x6273_7461_7475_73;

#[async_trait]
pub trait BiodataStore: Send + Sync {
    async fn list_biodata(&self) -> StoreResult<Vec<Biodata>>;

    /// Fast, possibly stale document count.
    async fn estimated_biodata_count(&self) -> StoreResult<i64>;

    async fn search_biodata(&self, filter: &BiodataFilter, page: Page) -> StoreResult<Vec<Biodata>>;

    async fn list_biodata_by_age(&self, order: SortOrder) -> StoreResult<Vec<Biodata>>;

    async fn find_biodata(&self, id: Uuid) -> StoreResult<Option<Biodata>>;

    async fn find_biodata_by_email(&self, email: &str) -> StoreResult<Option<Biodata>>;

    /// Inserts with the next sequential `biodataId` unless the email is taken.
    /// A refused insert does not consume a number.
    async fn insert_biodata(
        &self,
        email: &str,
        profile: &BiodataProfile,
    ) -> StoreResult<Option<InsertResult>>;

    /// Upserts status `premium-request` unless some record already holds
    /// `premium`, in which case `None` is returned and nothing is written.
    async fn request_premium(&self, id: Uuid) -> StoreResult<Option<UpdateResult>>;

    /// Unconditional status upsert.
    async fn set_biodata_status(&self, id: Uuid, status: BiodataStatus)
        -> StoreResult<UpdateResult>;

    /// Upsert replacing every profile field.
    async fn replace_biodata_profile(
        &self,
        id: Uuid,
        profile: &BiodataProfile,
    ) -> StoreResult<UpdateResult>;
}

fn bind_profile<'q>(
    query: Query<'q, Postgres, PgArguments>,
    p: &'q BiodataProfile,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(&p.name)
        .bind(&p.photo)
        .bind(&p.gender)
        .bind(&p.birth_date)
        .bind(&p.height)
        .bind(&p.weight)
        .bind(&p.partner_height)
        .bind(&p.partner_weight)
        .bind(p.age)
        .bind(p.partner_age)
        .bind(&p.occupation)
        .bind(&p.race)
        .bind(&p.father_name)
        .bind(&p.mother_name)
        .bind(&p.permanent_division)
        .bind(&p.present_division)
        .bind(&p.phone)
}

async fn lock_status_writes(conn: &mut PgConnection) -> StoreResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(PREMIUM_LOCK_KEY)
        .execute(conn)
        .await?;
    Ok(())
}

async fn upsert_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: BiodataStatus,
) -> StoreResult<UpdateResult> {
    let prev = sqlx::query_as::<_, (Option<String>,)>(
        "SELECT status FROM biodata WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match prev {
        Some((prev,)) => {
            sqlx::query("UPDATE biodata SET status = $2 WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(&mut *conn)
                .await?;
            Ok(UpdateResult::matched(prev.as_deref() != Some(status.as_str())))
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO biodata (id, status) VALUES ($1, $2)
                ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status
                "#,
            )
            .bind(id)
            .bind(status.as_str())
            .execute(&mut *conn)
            .await?;
            Ok(UpdateResult::upserted(id))
        }
    }
}

#[async_trait]
impl BiodataStore for PgStore {
    async fn list_biodata(&self) -> StoreResult<Vec<Biodata>> {
        let rows = sqlx::query_as::<_, BiodataRow>(&format!(
            "SELECT {BIODATA_COLUMNS} FROM biodata ORDER BY biodata_id"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Biodata::from).collect())
    }

    async fn estimated_biodata_count(&self) -> StoreResult<i64> {
        // reltuples is -1 (0 before PG 14) until the table has been analyzed.
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT CASE
                     WHEN c.reltuples <= 0 THEN (SELECT count(*) FROM biodata)
                     ELSE c.reltuples::BIGINT
                   END
              FROM pg_class c
             WHERE c.oid = 'biodata'::regclass
            "#,
        )
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn search_biodata(&self, filter: &BiodataFilter, page: Page) -> StoreResult<Vec<Biodata>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {BIODATA_COLUMNS} FROM biodata WHERE TRUE"
        ));
        if let Some(gender) = &filter.gender {
            qb.push(" AND gender ~ ").push_bind(gender);
        }
        if let Some(min_age) = filter.min_age {
            qb.push(" AND age >= ").push_bind(min_age);
        }
        if let Some(max_age) = filter.max_age {
            qb.push(" AND age <= ").push_bind(max_age);
        }
        if let Some(division) = &filter.permanent_division {
            qb.push(" AND permanent_division ~ ").push_bind(division);
        }
        qb.push(" ORDER BY biodata_id LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip);

        let rows = qb.build_query_as::<BiodataRow>().fetch_all(&self.db).await?;
        Ok(rows.into_iter().map(Biodata::from).collect())
    }

    async fn list_biodata_by_age(&self, order: SortOrder) -> StoreResult<Vec<Biodata>> {
        let order_by = match order {
            SortOrder::Asc => "age ASC NULLS FIRST",
            SortOrder::Desc => "age DESC NULLS LAST",
        };
        let rows = sqlx::query_as::<_, BiodataRow>(&format!(
            "SELECT {BIODATA_COLUMNS} FROM biodata ORDER BY {order_by}, biodata_id"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Biodata::from).collect())
    }

    async fn find_biodata(&self, id: Uuid) -> StoreResult<Option<Biodata>> {
        let row = sqlx::query_as::<_, BiodataRow>(&format!(
            "SELECT {BIODATA_COLUMNS} FROM biodata WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Biodata::from))
    }

    async fn find_biodata_by_email(&self, email: &str) -> StoreResult<Option<Biodata>> {
        let row = sqlx::query_as::<_, BiodataRow>(&format!(
            "SELECT {BIODATA_COLUMNS} FROM biodata WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Biodata::from))
    }

    async fn insert_biodata(
        &self,
        email: &str,
        profile: &BiodataProfile,
    ) -> StoreResult<Option<InsertResult>> {
        let mut tx = self.db.begin().await?;
        // Same-email inserts queue here so a loser never reaches nextval.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            INSERT INTO biodata (id, {PROFILE_COLUMNS}, email, biodata_id)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19,
                   nextval('biodata_number_seq')
             WHERE NOT EXISTS (SELECT 1 FROM biodata WHERE email = $19)
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            "#
        );
        let id = Uuid::new_v4();
        let inserted = bind_profile(sqlx::query(&sql).bind(id), profile)
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(inserted.map(|_| InsertResult::new(id)))
    }

    async fn request_premium(&self, id: Uuid) -> StoreResult<Option<UpdateResult>> {
        let mut tx = self.db.begin().await?;
        lock_status_writes(&mut tx).await?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM biodata WHERE status = $1)",
        )
        .bind(BiodataStatus::Premium.as_str())
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            tx.rollback().await?;
            return Ok(None);
        }

        let res = upsert_status(&mut tx, id, BiodataStatus::PremiumRequest).await?;
        tx.commit().await?;
        Ok(Some(res))
    }

    async fn set_biodata_status(
        &self,
        id: Uuid,
        status: BiodataStatus,
    ) -> StoreResult<UpdateResult> {
        let mut tx = self.db.begin().await?;
        lock_status_writes(&mut tx).await?;
        let res = upsert_status(&mut tx, id, status).await?;
        tx.commit().await?;
        Ok(res)
    }

    async fn replace_biodata_profile(
        &self,
        id: Uuid,
        profile: &BiodataProfile,
    ) -> StoreResult<UpdateResult> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, BiodataProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM biodata WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let res = match current {
            Some(current) if current == *profile => UpdateResult::matched(false),
            Some(_) => {
                let sql = r#"
                    UPDATE biodata
                       SET name = $2, photo = $3, gender = $4, birth_date = $5,
                           height = $6, weight = $7, partner_height = $8, partner_weight = $9,
                           age = $10, partner_age = $11, occupation = $12, race = $13,
                           father_name = $14, mother_name = $15, permanent_division = $16,
                           present_division = $17, phone = $18
                     WHERE id = $1
                    "#;
                bind_profile(sqlx::query(sql).bind(id), profile)
                    .execute(&mut *tx)
                    .await?;
                UpdateResult::matched(true)
            }
            None => {
                let sql = format!(
                    r#"
                    INSERT INTO biodata (id, {PROFILE_COLUMNS})
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
                    "#
                );
                bind_profile(sqlx::query(&sql).bind(id), profile)
                    .execute(&mut *tx)
                    .await?;
                UpdateResult::upserted(id)
            }
        };

        tx.commit().await?;
        Ok(res)
    }
}
