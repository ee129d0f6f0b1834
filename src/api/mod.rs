//! REST API handlers and shared request types

pub mod auth;
pub mod health;
pub mod metrics;
pub mod property;

use crate::domain::{default_page_number, default_page_size};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Paging query parameters; out-of-range values are clamped by the service
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PaginationQuery {
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page_number: default_page_number(),
            page_size: default_page_size(),
        }
    }
}
