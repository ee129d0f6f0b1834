//! Session token handling

use crate::config::JwtConfig;
use crate::domain::{StringUuid, User, UserRole};
use crate::error::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const SESSION_TOKEN_TYPE: &str = "session";

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Full name
    pub name: String,
    pub role: UserRole,
    pub iss: String,
    pub aud: String,
    /// Token type discriminator
    #[serde(default)]
    pub token_type: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<StringUuid> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}

/// Issues and verifies HS256 session tokens
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// No clock-skew tolerance; issuer and audience must match exactly.
    fn strict_validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.leeway = 0;
        v.set_issuer(&[&self.config.issuer]);
        v.set_audience(&[&self.config.audience]);
        v
    }

    /// Create a session token for `user`, returning the token and its expiry.
    pub fn create_session_token(&self, user: &User) -> Result<(String, DateTime<Utc>)> {
        self.create_session_token_at(user, Utc::now())
    }

    fn create_session_token_at(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>)> {
        let expires_at = issued_at + Duration::seconds(self.config.token_ttl_secs);

        let claims = SessionClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.full_name(),
            role: user.role,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            token_type: SESSION_TOKEN_TYPE.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok((token, expires_at))
    }

    /// Verify signature, expiry, issuer and audience, then decode the claims.
    pub fn verify_session_token(&self, token: &str) -> Result<SessionClaims> {
        let validation = self.strict_validation();
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        if token_data.claims.token_type != SESSION_TOKEN_TYPE {
            return Err(AppError::Unauthorized("Invalid token type".to_string()));
        }
        Ok(token_data.claims)
    }

    pub fn validate_token(&self, token: &str) -> bool {
        self.verify_session_token(token).is_ok()
    }

    pub fn token_ttl(&self) -> i64 {
        self.config.token_ttl_secs
    }
}
