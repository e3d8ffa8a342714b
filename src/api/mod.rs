//! API handlers for Biblion REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    error::AppError,
    models::user::{User, UserClaims},
    AppState,
};

/// Extractor for validated JWT claims from the Authorization header
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication("Invalid authorization header format".to_string()));
        }

        let token = &auth_header[7..];

        // Signature, algorithm and expiry checks; all failures collapse
        // into the same generic 401
        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Extractor for the fully resolved current user.
///
/// Runs the whole authorization chain: token validity, then account
/// existence, then the active flag. Role checks stay with the handler.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        let user = state.services.auth.resolve_current_user(&claims).await?;
        Ok(CurrentUser(user))
    }
}
