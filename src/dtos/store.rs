use serde::{Deserialize, Serialize};
use crate::models::store::Store;

#[derive(Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    pub location: Option<String>,
    // Logo path as stored by the upload collaborator; the file itself is
    // handled outside this API.
    pub image: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StoreListParams {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct OwnerSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct StoreResponse {
    #[serde(flatten)]
    pub store: Store,
    pub owner: Option<OwnerSummary>,
    pub users_count: i64,
}
