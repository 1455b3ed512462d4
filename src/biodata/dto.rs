use serde::{Deserialize, Serialize};

use super::repo_types::BiodataProfile;

/// Body of `POST /biodata`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBiodata {
    pub email: String,
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

impl NewBiodata {
    pub fn into_parts(self) -> (String, BiodataProfile) {
        let profile = BiodataProfile {
            name: self.name,
            photo: self.photo,
            gender: self.gender,
            birth_date: self.birth_date,
            height: self.height,
            weight: self.weight,
            partner_height: self.partner_height,
            partner_weight: self.partner_weight,
            age: self.age,
            partner_age: self.partner_age,
            occupation: self.occupation,
            race: self.race,
            father_name: self.father_name,
            mother_name: self.mother_name,
            permanent_division: self.permanent_division,
            present_division: self.present_division,
            phone: self.phone,
        };
        (self.email, profile)
    }
}

/// Query of `GET /searched-biodata`. Ages arrive as raw strings so an empty
/// value means "no bound", the way the web client sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub gender: Option<String>,
    pub min_age: Option<String>,
    pub max_age: Option<String>,
    pub perma_division: Option<String>,
    pub page: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SortParams {
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}
