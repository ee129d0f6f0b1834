//! API integration tests infrastructure
//!
//! In-memory repository implementations used in place of MySQL.

pub mod http;

use async_trait::async_trait;
use house_broker::config::JwtConfig;
use house_broker::domain::{NewUser, PropertyAggregate, PropertyFilter, StringUuid, User};
use house_broker::error::{AppError, Result};
use house_broker::jwt::JwtManager;
use house_broker::repository::{PropertyRepository, UserRepository};
use tokio::sync::RwLock;

// ============================================================================
// Test Configuration
// ============================================================================

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-for-api-testing-purposes".to_string(),
        issuer: "house-broker-test".to_string(),
        audience: "house-broker-test-clients".to_string(),
        token_ttl_secs: 3600,
    }
}

pub fn create_test_jwt_manager() -> JwtManager {
    JwtManager::new(test_jwt_config())
}

// ============================================================================
// Test User Repository
// ============================================================================

pub struct TestUserRepository {
    users: RwLock<Vec<User>>,
}

impl TestUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(vec![]),
        }
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn deactivate(&self, email: &str) {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            user.is_active = false;
        }
    }
}

impl Default for TestUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for TestUserRepository {
    async fn create(&self, input: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == input.email) {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        let user = User {
            id: input.id,
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            role: input.role,
            is_active: true,
            created_at: input.created_at,
            updated_at: None,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[StringUuid]) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }
}

// ============================================================================
// Test Property Repository
// ============================================================================

pub struct TestPropertyRepository {
    properties: RwLock<Vec<PropertyAggregate>>,
}

impl TestPropertyRepository {
    pub fn new() -> Self {
        Self {
            properties: RwLock::new(vec![]),
        }
    }

    pub async fn get(&self, id: StringUuid) -> Option<PropertyAggregate> {
        let properties = self.properties.read().await;
        properties.iter().find(|p| p.property.id == id).cloned()
    }

    async fn matching(&self, filter: &PropertyFilter) -> Vec<PropertyAggregate> {
        let properties = self.properties.read().await;
        let mut matched: Vec<PropertyAggregate> = properties
            .iter()
            .filter(|a| filter.matches(&a.property))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.property
                .created_at
                .cmp(&a.property.created_at)
                .then_with(|| a.property.id.to_string().cmp(&b.property.id.to_string()))
        });
        matched
    }
}

impl Default for TestPropertyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PropertyRepository for TestPropertyRepository {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<PropertyAggregate>> {
        Ok(self.get(id).await)
    }

    async fn list(
        &self,
        filter: &PropertyFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PropertyAggregate>> {
        Ok(self
            .matching(filter)
            .await
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, filter: &PropertyFilter) -> Result<i64> {
        Ok(self.matching(filter).await.len() as i64)
    }

    async fn create(&self, aggregate: &PropertyAggregate) -> Result<()> {
        self.properties.write().await.push(aggregate.clone());
        Ok(())
    }

    async fn update(&self, aggregate: &PropertyAggregate) -> Result<()> {
        let mut properties = self.properties.write().await;
        match properties
            .iter_mut()
            .find(|p| p.property.id == aggregate.property.id)
        {
            Some(existing) => {
                *existing = aggregate.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Property not found".to_string())),
        }
    }

    async fn delete(&self, id: StringUuid) -> Result<()> {
        self.properties
            .write()
            .await
            .retain(|p| p.property.id != id);
        Ok(())
    }
}
