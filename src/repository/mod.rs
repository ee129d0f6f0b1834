//! Data access layer (Repository pattern)

pub mod property;
pub mod user;

pub use property::PropertyRepository;
pub use user::UserRepository;
