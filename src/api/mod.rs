//! API handlers for GeoVisits REST endpoints

pub mod auth;
pub mod health;
pub mod openapi;
pub mod visits;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Message for every rejected bearer credential, whatever the cause
pub const UNAUTHENTICATED: &str = "Unauthenticated.";

/// Extractor for authenticated user from bearer token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    tracing::debug!("Rejected request: {}", e);
                    AppError::Authentication(UNAUTHENTICATED.to_string())
                })?;

        match state.services.auth.authenticate(bearer.token()).await {
            Ok(claims) => Ok(AuthenticatedUser(claims)),
            Err(AppError::Authentication(reason)) => {
                tracing::debug!("Rejected bearer token: {}", reason);
                Err(AppError::Authentication(UNAUTHENTICATED.to_string()))
            }
            Err(other) => Err(other),
        }
    }
}
