use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shiftboard_db::models::{Plan, Tenant, TenantPatch, TenantSettings};
use uuid::Uuid;
use validator::Validate;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    pub settings: Option<TenantSettings>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    pub plan: Plan,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TenantResponse {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub days_remaining: Option<i64>,
}

fn to_response(state: &AppState, tenant: Tenant) -> TenantResponse {
    let days_remaining = tenant.days_remaining(state.clock.now());
    TenantResponse {
        tenant,
        days_remaining,
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<TenantResponse>>, ApiError> {
    let tenants = state.tenants.list().await?;
    Ok(Json(
        tenants
            .into_iter()
            .map(|t| to_response(&state, t))
            .collect(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateTenantRequest>,
) -> Result<Json<TenantResponse>, ApiError> {
    body.validate()?;
    let tenant = state
        .tenants
        .create(body.name, body.slug, body.settings)
        .await?;
    Ok(Json(to_response(&state, tenant)))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<TenantResponse>, ApiError> {
    body.validate()?;
    let tenant = state
        .tenants
        .create_pending(
            body.name,
            body.slug,
            body.plan,
            body.contact_email,
            body.contact_phone,
        )
        .await?;
    Ok(Json(to_response(&state, tenant)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<TenantResponse>, ApiError> {
    let tenant = state.tenants.get(tenant_id).await?;
    Ok(Json(to_response(&state, tenant)))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TenantResponse>, ApiError> {
    let tenant = state.tenants.find_by_slug(&slug).await?;
    Ok(Json(to_response(&state, tenant)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(patch): Json<TenantPatch>,
) -> Result<Json<TenantResponse>, ApiError> {
    let tenant = state.tenants.update(tenant_id, patch).await?;
    Ok(Json(to_response(&state, tenant)))
}

pub async fn deactivate(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<TenantResponse>, ApiError> {
    let tenant = state.tenants.deactivate(tenant_id).await?;
    Ok(Json(to_response(&state, tenant)))
}
