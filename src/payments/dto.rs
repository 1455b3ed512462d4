use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct IntentRequest {
    pub price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
}
