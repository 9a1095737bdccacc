//! Actor identity extraction.
//!
//! Authentication itself happens upstream; by the time a request reaches
//! this service the gateway has resolved the caller and stamped
//! `x-actor-id` / `x-actor-role` headers. This extractor only reads them.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::enums::UserRole;
use crate::shared::errors::ApiError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The caller of the current request, as resolved upstream.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub actor_id: Uuid,
    pub role: UserRole,
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", name)))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized(format!("invalid {} header", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = Uuid::parse_str(header_value(parts, ACTOR_ID_HEADER)?)
            .map_err(|_| ApiError::Unauthorized("malformed actor id".to_string()))?;
        let role = UserRole::from_str(header_value(parts, ACTOR_ROLE_HEADER)?)
            .map_err(ApiError::Unauthorized)?;
        Ok(Self { actor_id, role })
    }
}
