use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{error::ApiError, extractors::tenant::TenantId, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(length(min = 1))]
    pub employee_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordRequest {
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct IssueResetRequest {
    #[validate(length(min = 1))]
    pub employee_id: String,
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct IssueResetResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConsumeResetRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ConsumeResetResponse {
    pub consumed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ValidateResetRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResetResponse {
    pub employee_id: String,
}

pub async fn verify(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    body.validate()?;
    let valid = state
        .credentials
        .verify(tenant_id, &body.employee_id, &body.password)
        .await?;
    Ok(Json(VerifyResponse { valid }))
}

pub async fn login(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<VerifyRequest>,
) -> Result<StatusCode, ApiError> {
    body.validate()?;
    state
        .credentials
        .authenticate(tenant_id, &body.employee_id, &body.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_password(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(Uuid, String)>,
    Json(body): Json<PasswordRequest>,
) -> Result<StatusCode, ApiError> {
    body.validate()?;
    state
        .credentials
        .set_password(tenant_id, &employee_id, &body.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_email(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(Uuid, String)>,
    Json(body): Json<EmailRequest>,
) -> Result<StatusCode, ApiError> {
    body.validate()?;
    state
        .credentials
        .set_email(tenant_id, &employee_id, &body.email)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn issue_reset_token(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<IssueResetRequest>,
) -> Result<Json<IssueResetResponse>, ApiError> {
    body.validate()?;
    let token = state
        .credentials
        .issue_reset_token(tenant_id, &body.employee_id, &body.email)
        .await?;
    Ok(Json(IssueResetResponse { token }))
}

pub async fn validate_reset_token(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<ValidateResetRequest>,
) -> Result<Json<ValidateResetResponse>, ApiError> {
    let employee_id = state
        .credentials
        .validate_reset_token(tenant_id, &body.token)
        .await?;
    Ok(Json(ValidateResetResponse { employee_id }))
}

pub async fn consume_reset_token(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<ConsumeResetRequest>,
) -> Result<Json<ConsumeResetResponse>, ApiError> {
    body.validate()?;
    let consumed = state
        .credentials
        .consume_reset_token(tenant_id, &body.token, &body.password)
        .await?;
    Ok(Json(ConsumeResetResponse { consumed }))
}

pub async fn deactivate(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .credentials
        .deactivate(tenant_id, &employee_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reactivate(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .credentials
        .reactivate(tenant_id, &employee_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
