//! API integration tests
//!
//! These talk to a running server with a migrated database.
//! Run with: cargo test --test api_tests -- --ignored

use reqwest::{multipart, Client};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api";

/// Register a throwaway account and return its bearer token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "name": "Integration Tester",
            "email": format!("tester-{}@example.com", Uuid::new_v4()),
            "password": "integration-secret"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse register response");
    body["access_token"].as_str().expect("No token in response").to_string()
}

async fn create_visit(client: &Client, token: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/visits", BASE_URL))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_and_current_user() {
    let client = Client::new();
    let email = format!("login-{}@example.com", Uuid::new_v4());

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({"name": "Login Tester", "email": email, "password": "integration-secret"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({"email": email, "password": "integration-secret"}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_type"], "Bearer");
    let token = body["access_token"].as_str().expect("No token").to_string();

    let response = client
        .get(format!("{}/user", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], email.as_str());
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({"email": "nobody@example.com", "password": "wrong-password"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_logout_revokes_token() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/logout", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/visits", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/visits", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let response = client
        .get(format!("{}/visits", BASE_URL))
        .bearer_auth("not-a-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Unauthenticated.");
}

#[tokio::test]
#[ignore]
async fn test_visit_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = create_visit(
        &client,
        &token,
        json!({"name": "Alice", "email": "alice@example.com", "latitude": 10, "longitude": 20}),
    )
    .await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["id"].as_i64().expect("No visit ID");

    let response = client
        .get(format!("{}/visits/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["latitude"], 10.0);
    assert_eq!(body["longitude"], 20.0);

    let response = client
        .put(format!("{}/visits/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({"name": "Alice B", "email": "alice@example.com", "latitude": -33.9, "longitude": 151.2}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .put(format!("{}/visits/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({"name": "Partial only"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    for expected in [204, 404] {
        let response = client
            .delete(format!("{}/visits/{}", BASE_URL, id))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
#[ignore]
async fn test_create_visit_validation_errors() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let cases = [
        (json!({"name": "Al", "email": "a@b.com", "latitude": 10, "longitude": 20}), "name"),
        (json!({"name": "Alice", "email": "bad-email", "latitude": 10, "longitude": 20}), "email"),
        (json!({"name": "Alice", "email": "a@b.com", "latitude": 95, "longitude": 20}), "latitude"),
    ];

    for (body, field) in cases {
        let response = create_visit(&client, &token, body).await;
        assert_eq!(response.status(), 422);

        let body: Value = response.json().await.expect("Failed to parse response");
        assert!(body["errors"][field].is_array(), "expected error on {}", field);
    }
}

#[tokio::test]
#[ignore]
async fn test_update_unknown_visit() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .put(format!("{}/visits/{}", BASE_URL, i64::MAX))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_import_csv() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let csv = "nombre,email,latitud,longitud\n\
               Ana Lopez,ana@example.com,40.4168,-3.7038\n\
               No,bad,100,0\n";
    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(csv.as_bytes().to_vec())
            .file_name("visitas.csv")
            .mime_str("text/csv")
            .expect("valid mime"),
    );

    let response = client
        .post(format!("{}/visits/import", BASE_URL))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"].is_array());
    assert_eq!(body["report"]["inserted_count"], 1);
    assert_eq!(body["report"]["skipped_rows"][0]["row"], 3);
}

#[tokio::test]
#[ignore]
async fn test_import_rejects_unsupported_file() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(b"name,email\n".to_vec()).file_name("visits.txt"),
    );

    let response = client
        .post(format!("{}/visits/import", BASE_URL))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["errors"]["file"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_non_numeric_visit_id_is_not_found() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/visits/abc", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Visit not found");
}
