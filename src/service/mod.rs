//! Business logic layer

pub mod auth;
pub mod property;

pub use auth::AuthService;
pub use property::PropertyService;
