//! API integration tests
//!
//! These run against a live server (`cargo run`) whose configuration
//! seeds the bootstrap administrator admin@biblion.test / admin123.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

const ADMIN_EMAIL: &str = "admin@biblion.test";
const ADMIN_PASSWORD: &str = "admin123";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique suffix so repeated runs don't collide on unique columns
fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .subsec_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", nanos, n)
}

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "login failed for {}", email);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"]
        .as_str()
        .expect("No access_token in response")
        .to_string()
}

async fn admin_token(client: &Client) -> String {
    login(client, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Register a fresh regular user and return (email, password)
async fn register_user(client: &Client) -> (String, String) {
    let email = format!("user-{}@biblion.test", unique_suffix());
    let password = "testpass".to_string();

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "fullname": "Test User",
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert!(response.status().is_success());
    (email, password)
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    // Wrong password for an existing account
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let wrong_password: Value = response.json().await.expect("Failed to parse response");

    // Unknown email must be indistinguishable from a wrong password
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "email": "nobody@biblion.test", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let unknown_email: Value = response.json().await.expect("Failed to parse response");

    assert_eq!(wrong_password["message"], unknown_email["message"]);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_register_login_me() {
    let client = Client::new();
    let email = format!("ana-{}@biblion.test", unique_suffix());

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "fullname": "Ana",
            "email": email,
            "password": "pw123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], email.as_str());
    assert_eq!(body["role"], "user");
    assert_eq!(body["active"], true);
    // The password hash must never be serialized
    assert!(body.get("password_hash").is_none());

    let token = login(&client, &email, "pw123").await;
    assert!(!token.is_empty());

    let response = client
        .get(format!("{}/users/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], email.as_str());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_registration_conflict() {
    let client = Client::new();
    let (email, _) = register_user(&client).await;

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "fullname": "Impostor",
            "email": email,
            "password": "other"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_registration_race() {
    let client = Client::new();
    let email = format!("race-{}@biblion.test", unique_suffix());

    let send = |c: Client, email: String| async move {
        c.post(format!("{}/register", BASE_URL))
            .json(&json!({
                "fullname": "Racer",
                "email": email,
                "password": "pw123"
            }))
            .send()
            .await
            .expect("Failed to send request")
            .status()
            .as_u16()
    };

    let (a, b) = tokio::join!(
        send(client.clone(), email.clone()),
        send(client.clone(), email.clone())
    );

    // Exactly one registration wins; the loser observes the unique
    // constraint violation
    let statuses = [a, b];
    assert!(statuses.contains(&200), "statuses: {:?}", statuses);
    assert!(statuses.contains(&409), "statuses: {:?}", statuses);
}

#[tokio::test]
#[ignore]
async fn test_book_crud_as_admin() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let isbn = format!("isbn-{}", unique_suffix());

    // Create
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "The Rust Programming Language",
            "author": "Klabnik & Nichols",
            "description": "An introduction to Rust",
            "year": 2019,
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_i64().expect("No book ID");
    assert_eq!(body["available"], true);

    // Duplicate ISBN
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Duplicate",
            "author": "Someone",
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    // Get by id
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // Exact ISBN lookup
    let response = client
        .get(format!("{}/books?isbn={}", BASE_URL, isbn))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().expect("expected array").len(), 1);

    // Update
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "available": false, "year": 2021 }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available"], false);
    assert_eq!(body["year"], 2021);

    // Delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    // Gone
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_book_writes_forbidden_for_regular_user() {
    let client = Client::new();
    let (email, password) = register_user(&client).await;
    let token = login(&client, &email, &password).await;

    // Reads are allowed
    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // Writes are not
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Forbidden",
            "author": "Someone",
            "isbn": format!("isbn-{}", unique_suffix())
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);

    let response = client
        .delete(format!("{}/books/1", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_tampered_token_rejected() {
    let client = Client::new();
    let (email, password) = register_user(&client).await;
    let token = login(&client, &email, &password).await;

    // Flip the first character of the signature segment
    let (head, sig) = token.rsplit_once('.').expect("token has no signature");
    let first = sig.chars().next().expect("empty signature");
    let flipped = if first == 'A' { 'B' } else { 'A' };
    let tampered = format!("{}.{}{}", head, flipped, &sig[1..]);

    let response = client
        .get(format!("{}/users/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", tampered))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

/// Requires an EMPTY database and a server started WITHOUT the
/// bootstrap admin configured: the first-ever registration must be
/// promoted to admin, the next one must not.
#[tokio::test]
#[ignore]
async fn test_first_user_is_admin() {
    let client = Client::new();

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "fullname": "Ana",
            "email": "ana@x.com",
            "password": "pw123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "admin");

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "fullname": "Ben",
            "email": "ben@x.com",
            "password": "pw123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "user");
}
