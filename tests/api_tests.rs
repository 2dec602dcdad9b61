//! API integration tests
//!
//! These run against a live server with seeded accounts:
//!   admin@example.com / password123  (role admin)
//!   alice@example.com / password123
//!   bob@example.com   / password123
//! All three must be verified and active.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in and get a session token
async fn get_auth_token(client: &Client, email: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to list a book owned by the given token's user
async fn create_test_book(client: &Client, token: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "The Test Book",
            "author": "Ann Author",
            "genre": "Fiction",
            "isbn": "978-0-00-000000-0",
            "condition": "good",
            "image": "https://example.com/cover.jpg",
            "address": "12 Library Lane"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

fn future_due_date() -> String {
    (Utc::now() + Duration::days(14)).to_rfc3339()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], "alice@example.com");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "alice@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_signup_rejects_invalid_email() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "name": "New Member",
            "email": "not-an-email",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client, "alice@example.com").await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "alice@example.com");
    // Password material must never leak through the API
    assert!(body.get("password").is_none());
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
async fn test_list_books() {
    let client = Client::new();
    let token = get_auth_token(&client, "alice@example.com").await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_new_book_starts_available() {
    let client = Client::new();
    let token = get_auth_token(&client, "alice@example.com").await;

    let book_id = create_test_book(&client, &token).await;

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "available");
    assert!(body["owner"]["name"].is_string());

    // Cleanup
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_lifecycle() {
    let client = Client::new();
    let owner_token = get_auth_token(&client, "alice@example.com").await;
    let borrower_token = get_auth_token(&client, "bob@example.com").await;

    let book_id = create_test_book(&client, &owner_token).await;

    // Borrow
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .json(&json!({
            "book_id": book_id,
            "due_date": future_due_date()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let transaction_id = body["id"].as_i64().expect("No transaction ID");
    assert_eq!(body["status"], "borrowed");
    assert!(body["returned_date"].is_null());

    // Book is now unavailable
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "borrowed");

    // A second borrow attempt conflicts
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .json(&json!({
            "book_id": book_id,
            "due_date": future_due_date()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book is not available for borrowing");

    // Return
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, transaction_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "returned");
    assert!(body["transaction"]["returned_date"].is_string());

    // Book is available again
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "available");

    // Returning twice conflicts
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, transaction_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book already returned");

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_cannot_delete_borrowed_book() {
    let client = Client::new();
    let owner_token = get_auth_token(&client, "alice@example.com").await;
    let borrower_token = get_auth_token(&client, "bob@example.com").await;

    let book_id = create_test_book(&client, &owner_token).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .json(&json!({
            "book_id": book_id,
            "due_date": future_due_date()
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let transaction_id = body["id"].as_i64().expect("No transaction ID");

    // Deleting while borrowed conflicts and the listing survives
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book is currently borrowed and cannot be deleted");

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // After the return, deletion goes through
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, transaction_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_only_one_wins() {
    let client = Client::new();
    let owner_token = get_auth_token(&client, "alice@example.com").await;
    let borrower_token = get_auth_token(&client, "bob@example.com").await;

    let book_id = create_test_book(&client, &owner_token).await;

    let borrow_request = || {
        client
            .post(format!("{}/borrows", BASE_URL))
            .header("Authorization", format!("Bearer {}", borrower_token))
            .json(&json!({
                "book_id": book_id,
                "due_date": future_due_date()
            }))
            .send()
    };

    // Two simultaneous borrow attempts: exactly one may win
    let (first, second) = tokio::join!(borrow_request(), borrow_request());
    let first = first.expect("Failed to send request");
    let second = second.expect("Failed to send request");

    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [201, 409]);

    let (winner, loser) = if first.status() == 201 {
        (first, second)
    } else {
        (second, first)
    };

    let body: Value = winner.json().await.expect("Failed to parse response");
    let transaction_id = body["id"].as_i64().expect("No transaction ID");

    let body: Value = loser.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book is not available for borrowing");

    // Cleanup
    let _ = client
        .post(format!("{}/borrows/{}/return", BASE_URL, transaction_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await;
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_concurrent_returns_only_one_wins() {
    let client = Client::new();
    let owner_token = get_auth_token(&client, "alice@example.com").await;
    let borrower_token = get_auth_token(&client, "bob@example.com").await;

    let book_id = create_test_book(&client, &owner_token).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .json(&json!({
            "book_id": book_id,
            "due_date": future_due_date()
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let transaction_id = body["id"].as_i64().expect("No transaction ID");

    let return_request = || {
        client
            .post(format!("{}/borrows/{}/return", BASE_URL, transaction_id))
            .header("Authorization", format!("Bearer {}", borrower_token))
            .send()
    };

    // Two simultaneous returns: one closes the transaction, the other conflicts
    let (first, second) = tokio::join!(return_request(), return_request());
    let first = first.expect("Failed to send request");
    let second = second.expect("Failed to send request");

    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 409]);

    let loser = if first.status() == 409 { first } else { second };
    let body: Value = loser.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book already returned");

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_cannot_borrow_own_book() {
    let client = Client::new();
    let token = get_auth_token(&client, "alice@example.com").await;

    let book_id = create_test_book(&client, &token).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "due_date": future_due_date()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_borrow_rejects_past_due_date() {
    let client = Client::new();
    let owner_token = get_auth_token(&client, "alice@example.com").await;
    let borrower_token = get_auth_token(&client, "bob@example.com").await;

    let book_id = create_test_book(&client, &owner_token).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .json(&json!({
            "book_id": book_id,
            "due_date": (Utc::now() - Duration::days(1)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_non_owner_cannot_update_book() {
    let client = Client::new();
    let owner_token = get_auth_token(&client, "alice@example.com").await;
    let other_token = get_auth_token(&client, "bob@example.com").await;

    let book_id = create_test_book(&client, &owner_token).await;

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .json(&json!({ "title": "Hijacked Title" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_non_owner_cannot_delete_book() {
    let client = Client::new();
    let owner_token = get_auth_token(&client, "alice@example.com").await;
    let other_token = get_auth_token(&client, "bob@example.com").await;

    let book_id = create_test_book(&client, &owner_token).await;

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_my_borrows() {
    let client = Client::new();
    let token = get_auth_token(&client, "bob@example.com").await;

    let response = client
        .get(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_admin_list_users() {
    let client = Client::new();
    let token = get_auth_token(&client, "admin@example.com").await;

    let response = client
        .get(format!("{}/admin/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_admin_endpoints_forbidden_for_members() {
    let client = Client::new();
    let token = get_auth_token(&client, "alice@example.com").await;

    let response = client
        .get(format!("{}/admin/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_admin_stats() {
    let client = Client::new();
    let token = get_auth_token(&client, "admin@example.com").await;

    let response = client
        .get(format!("{}/admin/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_books"].is_number());
    assert!(body["active_loans"].is_number());
    assert!(body["popular_genres"].is_array());
}
