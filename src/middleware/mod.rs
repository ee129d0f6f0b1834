//! HTTP middleware for House Broker
//!
//! - Bearer-token extractors (`AuthUser`, `BrokerUser`)
//! - Request ID propagation and HTTP metrics
//! - Log-safe request spans
//! - JSON bodies for framework-level rejections

pub mod auth;
pub mod error_response;
pub mod metrics;
pub mod trace;

pub use auth::{AuthUser, BrokerUser};
pub use error_response::normalize_error_response;
pub use metrics::ObservabilityLayer;
pub use trace::SanitizedMakeSpan;
