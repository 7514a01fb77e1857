use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{error::ApiError, extractors::tenant::TenantId, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct SaveLinkRequest {
    #[validate(length(min = 1, max = 2048))]
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct SavedLinkResponse {
    pub month: String,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteLinkResponse {
    pub removed: bool,
}

pub async fn list(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    Ok(Json(state.source_links.list(tenant_id).await?))
}

pub async fn save(
    State(state): State<AppState>,
    Path((tenant_id, month)): Path<(Uuid, String)>,
    Json(body): Json<SaveLinkRequest>,
) -> Result<Json<SavedLinkResponse>, ApiError> {
    body.validate()?;
    let month = state.source_links.set(tenant_id, &month, &body.link).await?;
    Ok(Json(SavedLinkResponse {
        month,
        link: body.link.trim().to_string(),
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((tenant_id, month)): Path<(Uuid, String)>,
) -> Result<Json<DeleteLinkResponse>, ApiError> {
    let removed = state.source_links.delete(tenant_id, &month).await?;
    Ok(Json(DeleteLinkResponse { removed }))
}
