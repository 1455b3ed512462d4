use serde::{Deserialize, Serialize};

/// Body of `POST /users`, sent by the client on first login.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AdminStatus {
    pub admin: bool,
}
