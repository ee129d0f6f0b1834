//! Bearer-token extractors
//!
//! - `AuthUser` for any authenticated caller
//! - `BrokerUser` for callers whose role is `Broker`

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::{StringUuid, UserRole};
use crate::error::AppError;
use crate::jwt::SessionClaims;
use crate::state::HasServices;

/// Authenticated user information extracted from the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// User ID from the token's `sub` claim
    pub user_id: StringUuid,
    pub email: String,
    /// Full name from the `name` claim
    pub name: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn from_session_claims(claims: SessionClaims) -> Result<Self, AuthError> {
        let user_id = claims
            .sub
            .parse::<StringUuid>()
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }

    pub fn is_broker(&self) -> bool {
        self.role == UserRole::Broker
    }
}

/// Authentication errors
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No Authorization header present
    MissingToken,
    /// Invalid Authorization header format
    InvalidHeader(String),
    /// Token validation failed
    InvalidToken(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = match err {
            AuthError::MissingToken => "Missing authorization token",
            AuthError::InvalidHeader(_) => "Invalid authorization header",
            AuthError::InvalidToken(_) => "Invalid token",
        };
        AppError::Unauthorized(message.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Extract the Bearer token from the Authorization header
fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Invalid header encoding".to_string()))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AuthError::InvalidHeader("Authorization header must use Bearer scheme".to_string())
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: HasServices + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = state
            .jwt_manager()
            .verify_session_token(token)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        AuthUser::from_session_claims(claims)
    }
}

/// Authenticated caller holding the `Broker` role
#[derive(Debug, Clone)]
pub struct BrokerUser(pub AuthUser);

impl<S> FromRequestParts<S> for BrokerUser
where
    S: HasServices + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_broker() {
            return Err(AppError::Forbidden(
                "Only brokers can perform this action".to_string(),
            ));
        }
        Ok(BrokerUser(user))
    }
}
