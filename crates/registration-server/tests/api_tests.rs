//! Integration tests for the registration API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Local};
use registration_server::api::{
    create_router_with_rate_limit, AppState, RateLimitState, RegistrationWindow,
};
use registration_store::{RegistrationStore, Store};
use tower::ServiceExt;

/// Create a test app state with memory-only storage and an open window.
fn create_test_state() -> AppState {
    AppState::new(RegistrationStore::in_memory(), RegistrationWindow::always_open())
}

fn test_app() -> Router {
    create_router_with_rate_limit(create_test_state(), RateLimitState::permissive())
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_app().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["registrations"], 0);
    assert!(json.get("storage").is_none());
}

#[tokio::test]
async fn test_submit_json_registration() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({
                "cpf": "123.456.789-09",
                "name": "Ana Souza",
                "marital_status": "solteiro",
                "sex": "F",
                "birth_date": "1995-08-20",
                "phone": "(81) 98888-7777",
                "age": "30",
                "team_leader": "sim"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["registration"]["id"], 1);
    assert_eq!(json["registration"]["cpf"], "12345678909");
    assert_eq!(json["registration"]["cpf_formatted"], "123.456.789-09");
    assert_eq!(json["registration"]["marital_status"], "solteiro");
    assert_eq!(json["registration"]["team_leader"], true);

    let response = app
        .oneshot(get("/v1/registrations/12345678909"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Ana Souza");
    assert_eq!(json["birth_date"], "1995-08-20");
}

#[tokio::test]
async fn test_submit_urlencoded_form() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/registrations/form")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "cpf=529.982.247-25&name=Jo%C3%A3o+Lima&marital_status=&sex=M&age=&team_leader=nao",
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["registration"]["name"], "João Lima");
    assert_eq!(json["registration"]["sex"], "M");
    assert!(json["registration"].get("marital_status").is_none());
    assert_eq!(json["registration"]["team_leader"], false);

    let response = app.oneshot(get("/v1/registrations")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
}

#[tokio::test]
async fn test_duplicate_cpf_rejected() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": "12345678909", "name": "Ana"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": "123.456.789-09", "name": "Outra Pessoa"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "DUPLICATE_CPF");

    let response = app.oneshot(get("/v1/registrations")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["registrations"][0]["name"], "Ana");
}

#[tokio::test]
async fn test_invalid_cpf_rejected() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": "123.456.789-00", "name": "Ana"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "CHECKSUM_MISMATCH");

    let response = app
        .clone()
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": "00000000000", "name": "Ana"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_FORMAT");

    let response = app.oneshot(get("/v1/registrations")).await.unwrap();
    assert_eq!(body_json(response).await["total"], 0);
}

#[tokio::test]
async fn test_invalid_field_rejected() {
    let response = test_app()
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": "12345678909", "name": "Ana", "age": "200"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "INVALID_FIELD");
}

#[tokio::test]
async fn test_unknown_field_rejected() {
    let response = test_app()
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": "12345678909", "name": "Ana", "is_admin": true}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "MALFORMED_BODY");
    assert!(json["error"].as_str().unwrap().contains("is_admin"));
}

#[tokio::test]
async fn test_non_string_value_rejected() {
    let response = test_app()
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": 12345678909u64, "name": "Ana"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "MALFORMED_BODY");
}

#[tokio::test]
async fn test_missing_cpf_rejected() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"name": "Ana"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_FORMAT");
    assert!(json["error"].as_str().unwrap().contains("CPF is required"));

    let request = Request::builder()
        .method("POST")
        .uri("/v1/registrations/form")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=Ana"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_FORMAT");

    let response = app
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": "12345678909"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "INVALID_FIELD");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/registrations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "MALFORMED_BODY");
}

#[tokio::test]
async fn test_registration_not_open() {
    let tomorrow = Local::now().date_naive() + Duration::days(1);
    let state = AppState::new(
        RegistrationStore::in_memory(),
        RegistrationWindow::opening_on(tomorrow),
    );
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let response = app
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": "12345678909", "name": "Ana"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "REGISTRATION_NOT_OPEN");
}

#[tokio::test]
async fn test_lookup_not_found_and_malformed() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(get("/v1/registrations/52998224725"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/v1/registrations/invalid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_cpf_endpoint() {
    let app = test_app();

    let response = app.clone().oneshot(get("/v1/cpf/123.456.789-09")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["cpf"], "12345678909");
    assert_eq!(json["valid"], true);
    assert!(json.get("reason").is_none());

    let response = app.oneshot(get("/v1/cpf/11111111111")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["valid"], false);
    assert!(json["reason"].as_str().unwrap().contains("identical"));
}

#[tokio::test]
async fn test_file_backed_submission_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inscricoes.json");
    RegistrationStore::initialize(&Store::file(&path)).await.unwrap();

    let registrations = RegistrationStore::open(Store::file(&path)).await.unwrap();
    let app = create_router_with_rate_limit(
        AppState::new(registrations, RegistrationWindow::always_open()),
        RateLimitState::permissive(),
    );

    let response = app
        .oneshot(json_post(
            "/v1/registrations",
            serde_json::json!({"cpf": "10000008346", "name": "Carlos"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let reopened = RegistrationStore::open(Store::file(&path)).await.unwrap();
    assert!(reopened.contains("100.000.083-46").await);
}

#[tokio::test]
async fn test_rate_limiting() {
    let rate_limit = RateLimitState::new(1);
    let app = create_router_with_rate_limit(create_test_state(), rate_limit);

    let response = app.clone().oneshot(get("/v1/registrations")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/v1/registrations")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Health is not rate limited
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
