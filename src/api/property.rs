//! Property listing handlers

use crate::api::PaginationQuery;
use crate::domain::{
    CreatePropertyInput, PagedResult, PropertyDto, PropertyListItem, PropertySearchCriteria,
    StringUuid, UpdatePropertyInput,
};
use crate::error::{AppError, Result};
use crate::middleware::auth::BrokerUser;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Available listings, newest first", body = PagedResult<PropertyListItem>)
    )
)]
pub async fn list<S: HasServices>(
    State(state): State<S>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .property_service()
        .get_all(pagination.page_number, pagination.page_size)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = String, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property", body = PropertyDto),
        (status = 404, description = "Property not found")
    )
)]
pub async fn get<S: HasServices>(
    State(state): State<S>,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let property = state
        .property_service()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;
    Ok(Json(property))
}

#[utoipa::path(
    post,
    path = "/api/properties/search",
    tag = "Properties",
    request_body = PropertySearchCriteria,
    responses(
        (status = 200, description = "Matching listings, newest first", body = PagedResult<PropertyListItem>)
    )
)]
pub async fn search<S: HasServices>(
    State(state): State<S>,
    Json(criteria): Json<PropertySearchCriteria>,
) -> Result<impl IntoResponse> {
    let page = state.property_service().search(&criteria).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/properties/broker/{broker_id}",
    tag = "Properties",
    params(
        ("broker_id" = String, Path, description = "Broker user ID"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "The broker's listings", body = PagedResult<PropertyListItem>)
    )
)]
pub async fn list_by_broker<S: HasServices>(
    State(state): State<S>,
    Path(broker_id): Path<StringUuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .property_service()
        .get_by_broker(broker_id, pagination.page_number, pagination.page_size)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    security(("bearer_jwt" = [])),
    request_body = CreatePropertyInput,
    responses(
        (status = 201, description = "Listing created", body = PropertyDto),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a broker")
    )
)]
pub async fn create<S: HasServices>(
    State(state): State<S>,
    BrokerUser(auth): BrokerUser,
    Json(input): Json<CreatePropertyInput>,
) -> Result<impl IntoResponse> {
    let property = state.property_service().create(input, auth.user_id).await?;
    let location = format!("/api/properties/{}", property.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(property)))
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    security(("bearer_jwt" = [])),
    params(("id" = String, Path, description = "Property ID")),
    request_body = UpdatePropertyInput,
    responses(
        (status = 200, description = "Listing replaced", body = PropertyDto),
        (status = 400, description = "Validation failure or ID mismatch"),
        (status = 403, description = "Caller does not own the listing"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn update<S: HasServices>(
    State(state): State<S>,
    BrokerUser(auth): BrokerUser,
    Path(id): Path<StringUuid>,
    Json(input): Json<UpdatePropertyInput>,
) -> Result<impl IntoResponse> {
    if input.id != id {
        return Err(AppError::BadRequest("Property ID mismatch".to_string()));
    }
    let property = state.property_service().update(input, auth.user_id).await?;
    Ok(Json(property))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    tag = "Properties",
    security(("bearer_jwt" = [])),
    params(("id" = String, Path, description = "Property ID")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 403, description = "Caller does not own the listing"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    BrokerUser(auth): BrokerUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    state.property_service().delete(id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
