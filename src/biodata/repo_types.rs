use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BiodataStatus {
    PremiumRequest,
    Premium,
}

impl BiodataStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PremiumRequest => "premium-request",
            Self::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "premium-request" => Some(Self::PremiumRequest),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }
}

/// The fields `PUT /biodata/:id` replaces. Anything else in the body is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BiodataProfile {
    pub name: Option<String>,
    pub photo: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub partner_height: Option<String>,
    pub partner_weight: Option<String>,
    pub age: Option<i32>,
    pub partner_age: Option<i32>,
    pub occupation: Option<String>,
    pub race: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    #[serde(rename = "permanentDivision")]
    pub permanent_division: Option<String>,
    #[serde(rename = "presentDivision")]
    pub present_division: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct BiodataRow {
    pub id: Uuid,
    pub biodata_id: i64,
    pub email: Option<String>,
    pub status: Option<String>,
    #[sqlx(flatten)]
    pub profile: BiodataProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Biodata {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "biodataId")]
    pub biodata_id: i64,
    pub email: Option<String>,
    #[serde(flatten)]
    pub profile: BiodataProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BiodataStatus>,
}

impl From<BiodataRow> for Biodata {
    fn from(r: BiodataRow) -> Self {
        Self {
            id: r.id,
            biodata_id: r.biodata_id,
            email: r.email,
            profile: r.profile,
            status: r.status.as_deref().and_then(BiodataStatus::parse),
        }
    }
}

/// Search constraints; `None` leaves that side unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiodataFilter {
    /// Unanchored, case-sensitive pattern.
    pub gender: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    /// Unanchored, case-sensitive pattern on `permanentDivision`.
    pub permanent_division: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    /// `None` when the offset does not fit a SQL `BIGINT`.
    pub fn new(page: u32, size: u32) -> Option<Self> {
        let skip = i64::from(page).checked_mul(i64::from(size))?;
        Some(Self {
            skip,
            limit: i64::from(size),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `"asc"` sorts ascending; any other value, or none, sorts descending.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offsets() {
        assert_eq!(Page::new(0, 10), Some(Page { skip: 0, limit: 10 }));
        assert_eq!(Page::new(3, 4), Some(Page { skip: 12, limit: 4 }));
    }

    #[test]
    fn page_offset_overflow_is_refused() {
        assert_eq!(Page::new(u32::MAX, u32::MAX), None);
        assert_eq!(
            Page::new(u32::MAX, 1),
            Some(Page { skip: i64::from(u32::MAX), limit: 1 })
        );
    }

    #[test]
    fn sort_flag_defaults_to_descending() {
        assert_eq!(SortOrder::from_flag(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::from_flag(Some("ASC")), SortOrder::Desc);
        assert_eq!(SortOrder::from_flag(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::from_flag(None), SortOrder::Desc);
    }

    #[test]
    fn biodata_serializes_with_client_field_names() {
        let b = Biodata {
            id: Uuid::nil(),
            biodata_id: 7,
            email: Some("a@x.com".into()),
            profile: BiodataProfile {
                permanent_division: Some("Dhaka".into()),
                age: Some(27),
                ..Default::default()
            },
            status: Some(BiodataStatus::PremiumRequest),
        };
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["_id"], Uuid::nil().to_string());
        assert_eq!(json["biodataId"], 7);
        assert_eq!(json["permanentDivision"], "Dhaka");
        assert_eq!(json["age"], 27);
        assert_eq!(json["status"], "premium-request");
        assert!(json["presentDivision"].is_null());
    }
}
