use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{error::ApiError, extractors::tenant::TenantId, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertShiftRequest {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ShiftLabelResponse {
    pub code: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub removed: bool,
}

pub async fn list(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    Ok(Json(state.shifts.list_all(tenant_id).await?))
}

pub async fn upsert(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<UpsertShiftRequest>,
) -> Result<Json<ShiftLabelResponse>, ApiError> {
    body.validate()?;
    let code = state.shifts.upsert(tenant_id, &body.code, &body.label).await?;
    let label = state.shifts.lookup(tenant_id, &code).await?;
    Ok(Json(ShiftLabelResponse { code, label }))
}

pub async fn replace_all(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<BTreeMap<String, String>>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    Ok(Json(state.shifts.replace_all(tenant_id, body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((tenant_id, code)): Path<(Uuid, String)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = state.shifts.delete(tenant_id, &code).await?;
    Ok(Json(DeleteResponse { removed }))
}

pub async fn lookup(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Query(query): Query<LookupQuery>,
) -> Result<Json<ShiftLabelResponse>, ApiError> {
    let label = state.shifts.lookup(tenant_id, &query.code).await?;
    Ok(Json(ShiftLabelResponse {
        code: query.code,
        label,
    }))
}
