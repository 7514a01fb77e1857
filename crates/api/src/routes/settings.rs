use axum::{Json, extract::State};
use serde::Deserialize;
use shiftboard_db::models::TenantFlags;

use crate::{error::ApiError, extractors::tenant::TenantId, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AutoSyncRequest {
    pub enabled: bool,
}

pub async fn get(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<TenantFlags>, ApiError> {
    Ok(Json(state.flags.get(tenant_id).await?))
}

pub async fn set_auto_sync(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<AutoSyncRequest>,
) -> Result<Json<TenantFlags>, ApiError> {
    Ok(Json(state.flags.set_auto_sync(tenant_id, body.enabled).await?))
}
