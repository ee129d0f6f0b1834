//! Property API HTTP tests

use super::{
    build_test_router, create_property, delete, get, post, property_body, put, register,
    TestAppState,
};
use axum::http::{header, StatusCode};
use house_broker::domain::{PagedResult, PropertyDto, PropertyListItem, StringUuid};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const IMG_A: &str = "https://img.example.com/a.jpg";
const IMG_B: &str = "https://img.example.com/b.jpg";

fn paged(body: Value) -> PagedResult<PropertyListItem> {
    serde_json::from_value(body).unwrap()
}

/// The update body for a listing: same shape as create plus id and availability.
fn update_body(id: &str, city: &str, is_available: bool, image_urls: &[&str]) -> Value {
    let mut body = property_body(city, 3, image_urls);
    body["id"] = json!(id);
    body["isAvailable"] = json!(is_available);
    body
}

#[tokio::test]
async fn test_create_with_two_images_orders_and_flags_primary() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;

    let response = post(
        &app,
        "/api/properties",
        Some(&broker.token),
        &property_body("Kathmandu", 3, &[IMG_A, IMG_B]),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let dto: PropertyDto = serde_json::from_value(response.body).unwrap();
    assert_eq!(
        response.headers.get(header::LOCATION).unwrap(),
        format!("/api/properties/{}", dto.id).as_str()
    );
    assert_eq!(dto.images.len(), 2);
    assert_eq!(dto.images[0].image_url, IMG_A);
    assert!(dto.images[0].is_primary);
    assert_eq!(dto.images[0].display_order, 1);
    assert_eq!(dto.images[1].image_url, IMG_B);
    assert!(!dto.images[1].is_primary);
    assert_eq!(dto.images[1].display_order, 2);
    assert!(dto.is_available);
    assert_eq!(dto.features.len(), 1);
    assert_eq!(dto.broker.unwrap().id, broker.user.id);
}

#[tokio::test]
async fn test_get_by_id_and_missing() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;
    let id = create_property(&app, &broker.token, &property_body("Pokhara", 2, &[IMG_A])).await;

    let found = get(&app, &format!("/api/properties/{}", id), None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["city"], json!("Pokhara"));
    assert_eq!(found.body["propertyType"], json!("House"));

    let missing = get(
        &app,
        &format!("/api/properties/{}", StringUuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_broker_role() {
    let app = build_test_router(TestAppState::new());
    let seeker = register(&app, "seeker@example.com", "HouseSeeker").await;
    let body = property_body("Kathmandu", 3, &[IMG_A]);

    let anonymous = post(&app, "/api/properties", None, &body).await;
    let forbidden = post(&app, "/api/properties", Some(&seeker.token), &body).await;

    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_validation_failures() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;

    let mut body = property_body("Kathmandu", 3, &[]);
    body["price"] = json!(0.0);
    let response = post(&app, "/api/properties", Some(&broker.token), &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors: Vec<String> = serde_json::from_value(response.body["errors"].clone()).unwrap();
    assert!(errors.contains(&"At least one image is required".to_string()));
    assert!(errors.contains(&"Price must be greater than 0".to_string()));
}

#[tokio::test]
async fn test_non_owner_update_is_forbidden_and_unknown_id_not_found() {
    let state = TestAppState::new();
    let property_repo = state.property_repo.clone();
    let app = build_test_router(state);
    let b1 = register(&app, "b1@example.com", "Broker").await;
    let b2 = register(&app, "b2@example.com", "Broker").await;
    let id = create_property(&app, &b1.token, &property_body("Kathmandu", 3, &[IMG_A])).await;

    let forbidden = put(
        &app,
        &format!("/api/properties/{}", id),
        Some(&b2.token),
        &update_body(&id, "Lalitpur", true, &[IMG_B]),
    )
    .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let random = StringUuid::new_v4().to_string();
    let not_found = put(
        &app,
        &format!("/api/properties/{}", random),
        Some(&b2.token),
        &update_body(&random, "Lalitpur", true, &[IMG_B]),
    )
    .await;
    assert_eq!(not_found.status, StatusCode::NOT_FOUND);

    let unchanged = property_repo.get(id.parse().unwrap()).await.unwrap();
    assert_eq!(unchanged.property.city, "Kathmandu");
}

#[tokio::test]
async fn test_owner_update_replaces_children() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;
    let id = create_property(
        &app,
        &broker.token,
        &property_body("Kathmandu", 3, &[IMG_A, IMG_B]),
    )
    .await;

    let response = put(
        &app,
        &format!("/api/properties/{}", id),
        Some(&broker.token),
        &update_body(&id, "Lalitpur", false, &[IMG_B]),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let dto: PropertyDto = serde_json::from_value(response.body).unwrap();
    assert_eq!(dto.city, "Lalitpur");
    assert!(!dto.is_available);
    assert!(dto.updated_at.is_some());
    assert_eq!(dto.images.len(), 1);
    assert_eq!(dto.images[0].image_url, IMG_B);
    assert!(dto.images[0].is_primary);
}

#[tokio::test]
async fn test_update_id_mismatch_is_bad_request() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;
    let id = create_property(&app, &broker.token, &property_body("Kathmandu", 3, &[IMG_A])).await;

    let other = StringUuid::new_v4().to_string();
    let response = put(
        &app,
        &format!("/api/properties/{}", id),
        Some(&broker.token),
        &update_body(&other, "Kathmandu", true, &[IMG_A]),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], json!("Property ID mismatch"));
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = build_test_router(TestAppState::new());
    let b1 = register(&app, "b1@example.com", "Broker").await;
    let b2 = register(&app, "b2@example.com", "Broker").await;
    let id = create_property(&app, &b1.token, &property_body("Kathmandu", 3, &[IMG_A])).await;
    let path = format!("/api/properties/{}", id);

    assert_eq!(
        delete(&app, &path, Some(&b2.token)).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        delete(&app, &path, Some(&b1.token)).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(get(&app, &path, None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        delete(&app, &path, Some(&b1.token)).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_list_paginates_and_hides_unavailable() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;
    let mut ids = vec![];
    for city in ["Kathmandu", "Pokhara", "Lalitpur"] {
        ids.push(create_property(&app, &broker.token, &property_body(city, 3, &[IMG_A])).await);
    }
    let hidden = create_property(&app, &broker.token, &property_body("Bhaktapur", 3, &[IMG_A])).await;
    put(
        &app,
        &format!("/api/properties/{}", hidden),
        Some(&broker.token),
        &update_body(&hidden, "Bhaktapur", false, &[IMG_A]),
    )
    .await;

    let first = paged(get(&app, "/api/properties?pageNumber=1&pageSize=2", None).await.body);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.total_count, 3);
    assert_eq!(first.total_pages, 2);

    let second = paged(get(&app, "/api/properties?pageNumber=2&pageSize=2", None).await.body);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.page_number, 2);

    let by_broker = paged(
        get(
            &app,
            &format!("/api/properties/broker/{}", broker.user.id),
            None,
        )
        .await
        .body,
    );
    assert_eq!(by_broker.total_count, 4);
}

#[tokio::test]
async fn test_list_out_of_range_paging_falls_back() {
    let app = build_test_router(TestAppState::new());

    let result = paged(get(&app, "/api/properties?pageNumber=0&pageSize=500", None).await.body);

    assert_eq!(result.page_number, 1);
    assert_eq!(result.page_size, 10);
    assert_eq!(result.total_pages, 0);
    assert!(result.items.is_empty());
}

#[tokio::test]
async fn test_search_filters_are_conjunctive() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;
    create_property(&app, &broker.token, &property_body("Kathmandu", 2, &[IMG_A])).await;
    let wanted =
        create_property(&app, &broker.token, &property_body("Kathmandu", 4, &[IMG_A])).await;
    create_property(&app, &broker.token, &property_body("Pokhara", 4, &[IMG_A])).await;

    let response = post(
        &app,
        "/api/properties/search",
        None,
        &json!({ "city": "kathmandu", "minBedrooms": 3, "propertyType": "house" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let result = paged(response.body);
    assert_eq!(result.total_count, 1);
    assert_eq!(result.items[0].id.to_string(), wanted);
}

#[tokio::test]
async fn test_unfiltered_search_matches_list_plus_unavailable() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;
    for city in ["Kathmandu", "Pokhara", "Lalitpur"] {
        create_property(&app, &broker.token, &property_body(city, 3, &[IMG_A])).await;
    }
    let hidden = create_property(&app, &broker.token, &property_body("Bhaktapur", 3, &[IMG_A])).await;
    let hidden_update = put(
        &app,
        &format!("/api/properties/{}", hidden),
        Some(&broker.token),
        &update_body(&hidden, "Bhaktapur", false, &[IMG_A]),
    )
    .await;
    assert_eq!(hidden_update.status, StatusCode::OK);

    let everything = paged(post(&app, "/api/properties/search", None, &json!({})).await.body);
    let listed = paged(get(&app, "/api/properties", None).await.body);

    assert_eq!(everything.total_count, 4);
    assert_eq!(listed.total_count, 3);
    let search_ids: Vec<String> = everything.items.iter().map(|i| i.id.to_string()).collect();
    let list_ids: Vec<String> = listed.items.iter().map(|i| i.id.to_string()).collect();
    assert!(search_ids.contains(&hidden));
    assert!(!list_ids.contains(&hidden));
    let search_without_hidden: Vec<String> =
        search_ids.into_iter().filter(|id| *id != hidden).collect();
    assert_eq!(search_without_hidden, list_ids);

    let unavailable_only = paged(
        post(
            &app,
            "/api/properties/search",
            None,
            &json!({ "isAvailable": false }),
        )
        .await
        .body,
    );
    assert_eq!(unavailable_only.total_count, 1);
    assert_eq!(unavailable_only.items[0].id.to_string(), hidden);
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;
    create_property(&app, &broker.token, &property_body("Kathmandu", 3, &[IMG_A])).await;

    let response = get(
        &app,
        "/api/properties?pageNumber=9223372036854775807&pageSize=100",
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let result = paged(response.body);
    assert!(result.items.is_empty());
    assert_eq!(result.total_count, 1);
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.page_number, i64::MAX);
}

#[tokio::test]
async fn test_unknown_property_type_is_json_bad_request() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;
    let mut body = property_body("Kathmandu", 3, &[IMG_A]);
    body["propertyType"] = json!("Castle");

    let response = post(&app, "/api/properties", Some(&broker.token), &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], json!("bad_request"));
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_missing_field_is_json_bad_request() {
    let app = build_test_router(TestAppState::new());
    let broker = register(&app, "broker@example.com", "Broker").await;
    let mut body = property_body("Kathmandu", 3, &[IMG_A]);
    body.as_object_mut().unwrap().remove("title");

    let response = post(&app, "/api/properties", Some(&broker.token), &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_json_bad_request() {
    let app = build_test_router(TestAppState::new());

    let request = axum::http::Request::builder()
        .method(axum::http::Method::POST)
        .uri("/api/properties/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"city\": "))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], json!("bad_request"));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_bad_path_id_and_query_are_json_bad_request() {
    let app = build_test_router(TestAppState::new());

    let bad_id = get(&app, "/api/properties/not-a-uuid", None).await;
    let bad_query = get(&app, "/api/properties?pageNumber=abc", None).await;

    for response in [bad_id, bad_query] {
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"], json!("bad_request"));
        assert!(response.body["message"].is_string());
    }
}
