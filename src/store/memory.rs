//! In-process [`Store`](super::Store) backing `AppState::fake()`. Mirrors the
//! Postgres semantics the handlers rely on: unique keys, the biodata number
//! sequence, upsert counts and search ordering.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use regex::Regex;
use uuid::Uuid;

use super::{DeleteResult, InsertResult, Lifecycle, StoreResult, UpdateResult};
use crate::{
    biodata::{
        repo::BiodataStore,
        repo_types::{Biodata, BiodataFilter, BiodataProfile, BiodataStatus, Page, SortOrder},
    },
    contact_requests::{
        repo::ContactRequestStore,
        repo_types::{ContactRequest, ContactRequestKey, ContactStatus},
    },
    favorites::{
        repo::FavoriteStore,
        repo_types::{Favorite, NewFavorite},
    },
    payments::{
        repo::PaymentStore,
        repo_types::{NewPayment, Payment},
    },
    users::{
        dto::NewUser,
        repo::UserStore,
        repo_types::{Membership, Role, User},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    biodata: Vec<Biodata>,
    last_biodata_id: i64,
    favorites: Vec<Favorite>,
    contact_requests: Vec<ContactRequest>,
    payments: Vec<Payment>,
}

impl Tables {
    fn next_biodata_id(&mut self) -> i64 {
        self.last_biodata_id += 1;
        self.last_biodata_id
    }

    fn upsert_status(&mut self, id: Uuid, status: BiodataStatus) -> UpdateResult {
        if let Some(b) = self.biodata.iter_mut().find(|b| b.id == id) {
            let modified = b.status != Some(status);
            b.status = Some(status);
            return UpdateResult::matched(modified);
        }
        let biodata_id = self.next_biodata_id();
        self.biodata.push(Biodata {
            id,
            biodata_id,
            email: None,
            profile: BiodataProfile::default(),
            status: Some(status),
        });
        UpdateResult::upserted(id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

fn pattern(p: &Option<String>) -> StoreResult<Option<Regex>> {
    p.as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))
}

fn is_match(re: &Option<Regex>, value: &Option<String>) -> bool {
    match re {
        None => true,
        Some(re) => value.as_deref().is_some_and(|v| re.is_match(v)),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables().users.clone())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<Option<InsertResult>> {
        let mut t = self.tables();
        if t.users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let id = Uuid::new_v4();
        t.users.push(User {
            id,
            email: user.email.clone(),
            name: user.name.clone(),
            photo: user.photo.clone(),
            role: None,
            membership: None,
        });
        Ok(Some(InsertResult::new(id)))
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<UpdateResult> {
        let mut t = self.tables();
        Ok(match t.users.iter_mut().find(|u| u.id == id) {
            Some(u) => {
                let modified = u.role != Some(role);
                u.role = Some(role);
                UpdateResult::matched(modified)
            }
            None => UpdateResult::unmatched(),
        })
    }

    async fn set_user_membership(
        &self,
        id: Uuid,
        membership: Membership,
    ) -> StoreResult<UpdateResult> {
        let mut t = self.tables();
        Ok(match t.users.iter_mut().find(|u| u.id == id) {
            Some(u) => {
                let modified = u.membership != Some(membership);
                u.membership = Some(membership);
                UpdateResult::matched(modified)
            }
            None => UpdateResult::unmatched(),
        })
    }
}

#[async_trait]
impl BiodataStore for MemoryStore {
    async fn list_biodata(&self) -> StoreResult<Vec<Biodata>> {
        Ok(self.tables().biodata.clone())
    }

    async fn estimated_biodata_count(&self) -> StoreResult<i64> {
        Ok(self.tables().biodata.len() as i64)
    }

    async fn search_biodata(&self, filter: &BiodataFilter, page: Page) -> StoreResult<Vec<Biodata>> {
        let gender = pattern(&filter.gender)?;
        let division = pattern(&filter.permanent_division)?;
        let mut found: Vec<Biodata> = self
            .tables()
            .biodata
            .iter()
            .filter(|b| is_match(&gender, &b.profile.gender))
            .filter(|b| is_match(&division, &b.profile.permanent_division))
            .filter(|b| filter.min_age.map_or(true, |min| b.profile.age.is_some_and(|a| a >= min)))
            .filter(|b| filter.max_age.map_or(true, |max| b.profile.age.is_some_and(|a| a <= max)))
            .cloned()
            .collect();
        found.sort_by_key(|b| b.biodata_id);
        Ok(found
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn list_biodata_by_age(&self, order: SortOrder) -> StoreResult<Vec<Biodata>> {
        let mut all = self.tables().biodata.clone();
        match order {
            SortOrder::Asc => all.sort_by(|a, b| {
                a.profile
                    .age
                    .cmp(&b.profile.age)
                    .then(a.biodata_id.cmp(&b.biodata_id))
            }),
            SortOrder::Desc => all.sort_by(|a, b| {
                b.profile
                    .age
                    .cmp(&a.profile.age)
                    .then(a.biodata_id.cmp(&b.biodata_id))
            }),
        }
        Ok(all)
    }

    async fn find_biodata(&self, id: Uuid) -> StoreResult<Option<Biodata>> {
        Ok(self.tables().biodata.iter().find(|b| b.id == id).cloned())
    }

    async fn find_biodata_by_email(&self, email: &str) -> StoreResult<Option<Biodata>> {
        Ok(self
            .tables()
            .biodata
            .iter()
            .find(|b| b.email.as_deref() == Some(email))
            .cloned())
    }

    async fn insert_biodata(
        &self,
        email: &str,
        profile: &BiodataProfile,
    ) -> StoreResult<Option<InsertResult>> {
        let mut t = self.tables();
        if t.biodata.iter().any(|b| b.email.as_deref() == Some(email)) {
            return Ok(None);
        }
        let id = Uuid::new_v4();
        let biodata_id = t.next_biodata_id();
        t.biodata.push(Biodata {
            id,
            biodata_id,
            email: Some(email.to_string()),
            profile: profile.clone(),
            status: None,
        });
        Ok(Some(InsertResult::new(id)))
    }

    async fn request_premium(&self, id: Uuid) -> StoreResult<Option<UpdateResult>> {
        let mut t = self.tables();
        if t
            .biodata
            .iter()
            .any(|b| b.status == Some(BiodataStatus::Premium))
        {
            return Ok(None);
        }
        Ok(Some(t.upsert_status(id, BiodataStatus::PremiumRequest)))
    }

    async fn set_biodata_status(
        &self,
        id: Uuid,
        status: BiodataStatus,
    ) -> StoreResult<UpdateResult> {
        Ok(self.tables().upsert_status(id, status))
    }

    async fn replace_biodata_profile(
        &self,
        id: Uuid,
        profile: &BiodataProfile,
    ) -> StoreResult<UpdateResult> {
        let mut t = self.tables();
        if let Some(b) = t.biodata.iter_mut().find(|b| b.id == id) {
            let modified = b.profile != *profile;
            b.profile = profile.clone();
            return Ok(UpdateResult::matched(modified));
        }
        let biodata_id = t.next_biodata_id();
        t.biodata.push(Biodata {
            id,
            biodata_id,
            email: None,
            profile: profile.clone(),
            status: None,
        });
        Ok(UpdateResult::upserted(id))
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn list_favorites_by_email(&self, email: &str) -> StoreResult<Vec<Favorite>> {
        Ok(self
            .tables()
            .favorites
            .iter()
            .filter(|f| f.email == email)
            .cloned()
            .collect())
    }

    async fn insert_favorite(&self, favorite: &NewFavorite) -> StoreResult<Option<InsertResult>> {
        let mut t = self.tables();
        if t.favorites.iter().any(|f| f.biodata_id == favorite.biodata_id) {
            return Ok(None);
        }
        let id = Uuid::new_v4();
        t.favorites.push(Favorite {
            id,
            biodata_id: favorite.biodata_id,
            email: favorite.email.clone(),
            name: favorite.name.clone(),
            permanent_division: favorite.permanent_division.clone(),
            occupation: favorite.occupation.clone(),
        });
        Ok(Some(InsertResult::new(id)))
    }

    async fn delete_favorite(&self, id: Uuid) -> StoreResult<DeleteResult> {
        let mut t = self.tables();
        let before = t.favorites.len();
        t.favorites.retain(|f| f.id != id);
        Ok(DeleteResult::new((before - t.favorites.len()) as u64))
    }
}

#[async_trait]
impl ContactRequestStore for MemoryStore {
    async fn list_contact_requests(&self) -> StoreResult<Vec<ContactRequest>> {
        Ok(self.tables().contact_requests.clone())
    }

    async fn list_contact_requests_by_user(
        &self,
        email: &str,
    ) -> StoreResult<Vec<ContactRequest>> {
        Ok(self
            .tables()
            .contact_requests
            .iter()
            .filter(|r| r.user_email == email)
            .cloned()
            .collect())
    }

    async fn upsert_pending_request(&self, key: &ContactRequestKey) -> StoreResult<UpdateResult> {
        let mut t = self.tables();
        if let Some(r) = t.contact_requests.iter_mut().find(|r| r.matches(key)) {
            let modified = r.status != Some(ContactStatus::Pending);
            r.status = Some(ContactStatus::Pending);
            return Ok(UpdateResult::matched(modified));
        }
        let id = Uuid::new_v4();
        t.contact_requests.push(ContactRequest {
            id,
            biodata_id: key.biodata_id,
            user_email: key.user_email.clone(),
            name: key.name.clone(),
            email: key.email.clone(),
            phone: key.phone.clone(),
            status: Some(ContactStatus::Pending),
        });
        Ok(UpdateResult::upserted(id))
    }

    async fn approve_contact_request(&self, id: Uuid) -> StoreResult<UpdateResult> {
        let mut t = self.tables();
        Ok(match t.contact_requests.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                let modified = r.status != Some(ContactStatus::Approved);
                r.status = Some(ContactStatus::Approved);
                UpdateResult::matched(modified)
            }
            None => UpdateResult::unmatched(),
        })
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        Ok(self.tables().payments.clone())
    }

    async fn insert_payment(&self, payment: &NewPayment) -> StoreResult<InsertResult> {
        let id = Uuid::new_v4();
        self.tables().payments.push(Payment {
            id,
            email: payment.email.clone(),
            price: payment.price,
            transaction_id: payment.transaction_id.clone(),
            biodata_id: payment.biodata_id,
            paid_at: payment.date,
        });
        Ok(InsertResult::new(id))
    }
}

#[async_trait]
impl Lifecycle for MemoryStore {
    async fn close(&self) {}
}
