//! OpenAPI 3 document assembled from handler annotations and domain schemas.
//!
//! Served as JSON at `/api-docs/openapi.json`.

use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "House Broker API",
        version = "0.1.0",
        description = "Property listing service: accounts, listings and search"
    ),
    tags(
        (name = "System", description = "Health checks"),
        (name = "Auth", description = "Registration, login and current user"),
        (name = "Properties", description = "Listings, search and broker management"),
    ),
    paths(
        crate::api::health::health,
        crate::api::health::ready,
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::me,
        crate::api::property::list,
        crate::api::property::get,
        crate::api::property::search,
        crate::api::property::list_by_broker,
        crate::api::property::create,
        crate::api::property::update,
        crate::api::property::delete,
    ),
    components(
        schemas(
            crate::api::PaginationQuery,
            crate::api::health::HealthResponse,
            crate::domain::UserRole,
            crate::domain::UserDto,
            crate::domain::RegisterUserInput,
            crate::domain::LoginInput,
            crate::domain::AuthResponse,
            crate::domain::PropertyType,
            crate::domain::PropertyDto,
            crate::domain::PropertyImageDto,
            crate::domain::PropertyFeatureDto,
            crate::domain::PropertyListItem,
            crate::domain::CreatePropertyInput,
            crate::domain::UpdatePropertyInput,
            crate::domain::PropertySearchCriteria,
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
