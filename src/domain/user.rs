//! User domain model

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Platform role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    HouseSeeker,
    Broker,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::HouseSeeker => "HouseSeeker",
            UserRole::Broker => "Broker",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: "broker", "BROKER" and "Broker" all parse.
impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("houseseeker") {
            Ok(UserRole::HouseSeeker)
        } else if s.eq_ignore_ascii_case("broker") {
            Ok(UserRole::Broker)
        } else {
            Err(format!("Unknown role: {}", s))
        }
    }
}

// Stored as VARCHAR holding the variant name.
impl sqlx::Type<sqlx::MySql> for UserRole {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for UserRole {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        s.parse::<UserRole>().map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for UserRole {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.as_str().to_string(), buf)
    }
}

/// User entity
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: StringUuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: StringUuid::new_v4(),
            email: String::new(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::HouseSeeker,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// Row to insert into the identity store
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: StringUuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[schema(value_type = String, format = Uuid)]
    pub id: StringUuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            role: user.role.to_string(),
            created_at: user.created_at,
            is_active: user.is_active,
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto::from(&user)
    }
}

/// Input for registering a new user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserInput {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email must be a valid email address")
    )]
    pub email: String,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        custom(function = "validate_password_complexity")
    )]
    pub password: String,
    #[validate(length(min = 1, max = 50, message = "First name is required and cannot exceed 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required and cannot exceed 50 characters"))]
    pub last_name: String,
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

/// Input for logging in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Token plus public view returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
    pub expires_at: DateTime<Utc>,
}

const PASSWORD_SPECIALS: &str = "@$!%*?&";

fn validate_password_complexity(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(ValidationError::new("password_complexity").with_message(
            "Password must contain at least one uppercase letter, one lowercase letter, one digit, and one special character".into(),
        ))
    }
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if role.trim().is_empty() {
        return Err(ValidationError::new("role_required").with_message("Role is required".into()));
    }
    role.parse::<UserRole>().map(|_| ()).map_err(|_| {
        ValidationError::new("role_invalid")
            .with_message("Role must be either 'HouseSeeker' or 'Broker'".into())
    })
}
