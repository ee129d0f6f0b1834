//! Application state traits for dependency injection
//!
//! Handlers are generic over `HasServices`, so the production `AppState`
//! and in-memory test states share the same router.

use crate::config::Config;
use crate::jwt::JwtManager;
use crate::repository::{PropertyRepository, UserRepository};
use crate::service::{AuthService, PropertyService};

pub trait HasServices: Clone + Send + Sync + 'static {
    /// The user repository type
    type UserRepo: UserRepository;
    /// The property repository type
    type PropertyRepo: PropertyRepository;

    fn config(&self) -> &Config;

    fn auth_service(&self) -> &AuthService<Self::UserRepo>;

    fn property_service(&self) -> &PropertyService<Self::PropertyRepo, Self::UserRepo>;

    /// Get the JWT manager for token verification
    fn jwt_manager(&self) -> &JwtManager;

    /// Whether the backing store answers queries
    fn check_ready(&self) -> impl std::future::Future<Output = bool> + Send;
}
