use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateLinkRequest {
    pub url: String,
}

/// Final form payload carrying the links that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLinksRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_member_id: Option<String>,
    pub bookmark_urls: Vec<String>,
    pub store_urls: Vec<String>,
}

/// First-time registration: the participant's name, a numeric PIN and any
/// links validated so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePingsRequest {
    /// Event the participant joins.
    pub uuid: String,
    pub name: String,
    pub password: String,
    pub bookmark_urls: Vec<String>,
    pub store_urls: Vec<String>,
}
