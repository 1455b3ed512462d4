use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Pending,
    Approved,
}

impl ContactStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }
}

/// Body of `PATCH /contact-request`. Every field that is present must match
/// an existing request for it to be reset; otherwise a new one is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactRequestKey {
    #[serde(rename = "biodataId")]
    pub biodata_id: i64,
    #[serde(rename = "userEmail")]
    pub user_email: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct ContactRequestRow {
    pub id: Uuid,
    pub biodata_id: i64,
    pub user_email: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "biodataId")]
    pub biodata_id: i64,
    #[serde(rename = "userEmail")]
    pub user_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
}

impl ContactRequest {
    /// Mirrors the SQL filter: absent key fields match anything.
    pub fn matches(&self, key: &ContactRequestKey) -> bool {
        fn field(want: &Option<String>, have: &Option<String>) -> bool {
            want.is_none() || want == have
        }
        self.biodata_id == key.biodata_id
            && self.user_email == key.user_email
            && field(&key.name, &self.name)
            && field(&key.email, &self.email)
            && field(&key.phone, &self.phone)
    }
}

impl From<ContactRequestRow> for ContactRequest {
    fn from(r: ContactRequestRow) -> Self {
        Self {
            id: r.id,
            biodata_id: r.biodata_id,
            user_email: r.user_email,
            name: r.name,
            email: r.email,
            phone: r.phone,
            status: r.status.as_deref().and_then(ContactStatus::parse),
        }
    }
}
