use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

pub const ACTOR_HEADER: &str = "x-actor";

/// Identity of the caller as asserted by the upstream gateway. Used for
/// audit fields only.
#[derive(Debug, Clone)]
pub struct Actor(pub String);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {ACTOR_HEADER} header")))?;
        Ok(Actor(actor.to_string()))
    }
}
