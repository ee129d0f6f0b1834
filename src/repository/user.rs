//! User repository

use crate::domain::{NewUser, StringUuid, User};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, is_active, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> Result<User>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<User>>;
    /// `email` must already be lowercased
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_ids(&self, ids: &[StringUuid]) -> Result<Vec<User>>;
}

pub struct UserRepositoryImpl {
    pool: MySqlPool,
}

impl UserRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, user: &NewUser) -> Result<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, role, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, true, ?)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("User with this email already exists".to_string())
            }
            other => AppError::Database(other),
        })?;

        self.find_by_id(user.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create user")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[StringUuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<MySql> =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE id IN (", USER_COLUMNS));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let users = qb.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }
}
