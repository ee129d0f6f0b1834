//! Registration, login and current-user lookup

use crate::domain::{
    AuthResponse, LoginInput, NewUser, RegisterUserInput, StringUuid, UserDto, UserRole,
};
use crate::error::{AppError, Result};
use crate::jwt::JwtManager;
use crate::repository::UserRepository;
use crate::telemetry::metrics::{record_login, record_registration};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthService<R: UserRepository> {
    repo: Arc<R>,
    jwt_manager: JwtManager,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, jwt_manager: JwtManager) -> Self {
        Self { repo, jwt_manager }
    }

    pub fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    pub async fn register(&self, input: RegisterUserInput) -> Result<AuthResponse> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.repo.find_by_email(&email).await?.is_some() {
            record_registration("conflict");
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let role: UserRole = input
            .role
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid role specified".to_string()))?;

        let new_user = NewUser {
            id: StringUuid::new_v4(),
            email,
            password_hash: hash_password(&input.password)?,
            first_name: input.first_name,
            last_name: input.last_name,
            role,
            created_at: Utc::now(),
        };
        let user = self.repo.create(&new_user).await?;
        info!(user_id = %user.id, role = %user.role, "User registered");
        record_registration("success");

        let (token, expires_at) = self.jwt_manager.create_session_token(&user)?;
        Ok(AuthResponse {
            token,
            user: UserDto::from(&user),
            expires_at,
        })
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            ));
        }

        let email = input.email.trim().to_lowercase();
        let user = match self.repo.find_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => {
                warn!("Login rejected: unknown or inactive account");
                record_login(false);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(&input.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            record_login(false);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let (token, expires_at) = self.jwt_manager.create_session_token(&user)?;
        record_login(true);
        Ok(AuthResponse {
            token,
            user: UserDto::from(&user),
            expires_at,
        })
    }

    /// Public view of a user; absence is not an error.
    pub async fn get_user_by_id(&self, user_id: StringUuid) -> Result<Option<UserDto>> {
        Ok(self.repo.find_by_id(user_id).await?.map(UserDto::from))
    }

    pub fn validate_token(&self, token: &str) -> bool {
        self.jwt_manager.validate_token(token)
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    use argon2::{PasswordHash, PasswordVerifier};

    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
