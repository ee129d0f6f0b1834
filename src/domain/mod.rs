//! Domain models for House Broker

pub mod common;
pub mod property;
pub mod user;

pub use common::*;
pub use property::*;
pub use user::*;
