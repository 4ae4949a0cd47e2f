use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::json;
use tally_core::auth::Role;
use tally_core::notify::{Notifier, NotifyError, Welcome};

use crate::test_support::{PASSWORD, TestApp};

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn welcome(&self, _message: &Welcome) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("smtp down".into()))
    }
}

fn expense(text: &str, amount: f64) -> serde_json::Value {
    json!({ "text": text, "amount": amount, "type": "expense" })
}

// ============================================================================
// Health and auth
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_ignores_role_when_selection_disabled() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "mallory",
                "email": "mallory@example.com",
                "password": "pw",
                "role": "admin"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "user");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_honors_role_when_selection_enabled() {
    let app = TestApp::with_state(|s| s.with_role_selection(true)).await;
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "paula",
                "email": "paula@example.com",
                "password": "pw",
                "role": "premium"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "premium");

    let token = body["token"].as_str().unwrap();
    let (status, _) = app.get("/api/premium/content", token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new().await;
    app.user("alice", Role::User).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "pw"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[rstest]
#[case(json!({"username": "ab", "email": "ab@example.com", "password": "pw"}))]
#[case(json!({"username": "carol", "email": "not-an-email", "password": "pw"}))]
#[case(json!({"username": "carol", "email": "carol@example.com", "password": ""}))]
#[case(json!({"username": "carol", "email": "carol@example.com", "password": "pw", "role": "root"}))]
#[case(json!({"email": "carol@example.com", "password": "pw"}))]
#[tokio::test]
async fn test_register_rejects_invalid_input(#[case] payload: serde_json::Value) {
    let app = TestApp::new().await;
    let (status, body) = app
        .send("POST", "/api/auth/register", None, Some(payload))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_failing_notifier_does_not_fail_registration() {
    let app = TestApp::with_state(|s| s.with_notifier(Arc::new(FailingNotifier))).await;
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "dave",
                "email": "dave@example.com",
                "password": "pw"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "dave");
}

#[tokio::test]
async fn test_login() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::Premium).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], alice.id.to_string());
    assert_eq!(body["role"], "premium");

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

// ============================================================================
// Authentication gate
// ============================================================================

#[tokio::test]
async fn test_protected_routes_need_token() {
    let app = TestApp::new().await;

    for uri in ["/api/transactions", "/api/premium/content", "/api/users/profile"] {
        let (status, body) = app.send("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["message"], "Not authorized, no token");
    }
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/transactions", "not.a.jwt").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, token failed");
}

#[tokio::test]
async fn test_deleted_account_token_rejected() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;
    app.send("POST", "/api/transactions", Some(&alice.token), Some(expense("Coffee", 4.5)))
        .await;

    let (status, body) = app
        .send("DELETE", "/api/users/profile", Some(&alice.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({}));

    let (status, body) = app.get("/api/transactions", &alice.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, user not found");
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn test_transaction_round_trip() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/transactions",
            Some(&alice.token),
            Some(json!({
                "text": "  Groceries ",
                "amount": 42.5,
                "type": "expense",
                "category": "food"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["text"], "Groceries");
    assert_eq!(body["data"]["amount"], json!(42.5));
    assert_eq!(body["data"]["type"], "expense");
    assert_eq!(body["data"]["ownerId"], alice.id.to_string());

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let created_at = body["data"]["createdAt"].clone();

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/transactions/{id}"),
            Some(&alice.token),
            Some(json!({ "amount": 40 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], json!(40.0));

    let (status, body) = app.get(&format!("/api/transactions/{id}"), &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Groceries");
    assert_eq!(body["data"]["amount"], json!(40.0));
    assert_eq!(body["data"]["type"], "expense");
    assert_eq!(body["data"]["category"], "food");
    assert_eq!(body["data"]["createdAt"], created_at);
}

#[tokio::test]
async fn test_update_can_clear_category() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;

    let (_, body) = app
        .send(
            "POST",
            "/api/transactions",
            Some(&alice.token),
            Some(json!({ "text": "Bus", "amount": 2.5, "type": "expense", "category": "travel" })),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/transactions/{id}"),
            Some(&alice.token),
            Some(json!({ "category": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("category").is_none());
}

#[rstest]
#[case(json!({ "amount": 10, "type": "expense" }), "Please add some text")]
#[case(json!({ "text": "x", "amount": 0, "type": "expense" }), "Please add a positive amount")]
#[case(json!({ "text": "x", "amount": -5, "type": "income" }), "Please add a positive amount")]
#[case(json!({ "text": "x", "amount": 5, "type": "gift" }), "Type must be either income or expense")]
#[case(json!({ "text": "x", "amount": 1.005, "type": "expense" }), "Amount can have at most 2 decimal places")]
#[case(
    json!({ "text": "x", "amount": "1000000000000", "type": "income" }),
    "Amount cannot exceed 999999999999.99"
)]
#[tokio::test]
async fn test_create_rejects_invalid_input(#[case] payload: serde_json::Value, #[case] message: &str) {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;

    let (status, body) = app
        .send("POST", "/api/transactions", Some(&alice.token), Some(payload))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], message);
}

#[tokio::test]
async fn test_oversized_amounts_never_reach_the_summary() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;
    let huge = json!({ "text": "x", "amount": "70000000000000000000000000000", "type": "income" });

    for _ in 0..2 {
        let (status, body) = app
            .send("POST", "/api/transactions", Some(&alice.token), Some(huge.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Amount cannot exceed 999999999999.99");
    }

    let (status, body) = app
        .send(
            "POST",
            "/api/transactions",
            Some(&alice.token),
            Some(json!({ "text": "x", "amount": "999999999999.99", "type": "income" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/transactions/{id}"),
            Some(&alice.token),
            Some(json!({ "amount": "70000000000000000000000000000" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Amount cannot exceed 999999999999.99");

    let (status, body) = app.get("/api/transactions/summary", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    let income = body["data"]["totalIncome"].as_f64().unwrap();
    assert!((income - 999_999_999_999.99).abs() < 0.01);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;

    let (status, body) = app
        .send_raw("POST", "/api/transactions", &alice.token, "{\"text\": ")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_update_rejects_immutable_fields() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;
    let bob = app.user("bob", Role::User).await;
    let tx = app
        .record_at(alice.id, dec!(10), "expense", Utc::now())
        .await;

    for payload in [
        json!({ "ownerId": bob.id.to_string() }),
        json!({ "createdAt": "2020-01-01T00:00:00Z" }),
        json!({ "id": bob.id.to_string() }),
    ] {
        let (status, _) = app
            .send(
                "PUT",
                &format!("/api/transactions/{}", tx.id),
                Some(&alice.token),
                Some(payload),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, body) = app.get(&format!("/api/transactions/{}", tx.id), &alice.token).await;
    assert_eq!(body["data"]["ownerId"], alice.id.to_string());
}

#[tokio::test]
async fn test_non_owner_is_unauthorized() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;
    let bob = app.user("bob", Role::Premium).await;
    let tx = app
        .record_at(alice.id, dec!(10), "expense", Utc::now())
        .await;
    let uri = format!("/api/transactions/{}", tx.id);

    let (status, body) = app.get(&uri, &bob.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized");

    let (status, _) = app
        .send("PUT", &uri, Some(&bob.token), Some(json!({ "text": "mine" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("DELETE", &uri, Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get(&uri, &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "expense 10");
}

#[tokio::test]
async fn test_admin_may_act_on_any_record() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;
    let root = app.user("root", Role::Admin).await;
    let tx = app
        .record_at(alice.id, dec!(10), "expense", Utc::now())
        .await;
    let uri = format!("/api/transactions/{}", tx.id);

    let (status, _) = app.get(&uri, &root.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send("PUT", &uri, Some(&root.token), Some(json!({ "text": "audited" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ownerId"], alice.id.to_string());

    let (status, body) = app.send("DELETE", &uri, Some(&root.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": {} }));

    let (status, _) = app.get(&uri, &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case("not-a-uuid")]
#[case("0190f3c4-0000-7000-8000-000000000000")]
#[tokio::test]
async fn test_unknown_id_is_not_found(#[case] id: &str) {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;
    let uri = format!("/api/transactions/{id}");

    let (status, body) = app.get(&uri, &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Transaction not found");

    let (status, _) = app.send("DELETE", &uri, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_and_summary_are_scoped_to_caller() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;
    let bob = app.user("bob", Role::User).await;
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    app.record_at(alice.id, dec!(100), "income", t0).await;
    app.record_at(alice.id, dec!(50.5), "income", t0 + chrono::Duration::hours(1))
        .await;
    app.record_at(alice.id, dec!(20.25), "expense", t0 + chrono::Duration::hours(2))
        .await;
    app.record_at(bob.id, dec!(999), "expense", t0).await;

    let (status, body) = app.get("/api/transactions", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"][0]["amount"], json!(20.25));

    let (status, body) = app.get("/api/transactions/summary", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({ "balance": 130.25, "totalIncome": 150.5, "totalExpense": 20.25 })
    );

    let (_, body) = app.get("/api/transactions/summary", &bob.token).await;
    assert_eq!(body["data"]["balance"], json!(-999.0));
}

// ============================================================================
// Report
// ============================================================================

#[tokio::test]
async fn test_report_includes_last_millisecond_of_end_day() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;

    let last_ms = Utc
        .with_ymd_and_hms(2024, 1, 31, 23, 59, 59)
        .unwrap()
        .checked_add_signed(chrono::Duration::milliseconds(999))
        .unwrap();
    app.record_at(alice.id, dec!(100), "income", last_ms).await;
    app.record_at(
        alice.id,
        dec!(25.5),
        "expense",
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )
    .await;
    app.record_at(
        alice.id,
        dec!(40),
        "expense",
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    )
    .await;

    let (status, body) = app
        .get(
            "/api/transactions/report?startDate=2024-01-01&endDate=2024-01-31",
            &alice.token,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["amount"], json!(100.0));
    assert_eq!(
        body["summary"],
        json!({ "totalIncome": 100.0, "totalExpense": 25.5, "net": 74.5 })
    );
}

#[tokio::test]
async fn test_empty_report() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;

    let (status, body) = app
        .get(
            "/api/transactions/report?startDate=2030-01-01&endDate=2030-01-01",
            &alice.token,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(
        body["summary"],
        json!({ "totalIncome": 0.0, "totalExpense": 0.0, "net": 0.0 })
    );
}

#[rstest]
#[case("/api/transactions/report")]
#[case("/api/transactions/report?startDate=2024-01-01")]
#[case("/api/transactions/report?startDate=2024-02-01&endDate=2024-01-01")]
#[case("/api/transactions/report?startDate=yesterday&endDate=2024-01-01")]
#[tokio::test]
async fn test_report_rejects_bad_dates(#[case] uri: &str) {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;

    let (status, body) = app.get(uri, &alice.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

// ============================================================================
// Premium and admin
// ============================================================================

#[tokio::test]
async fn test_premium_content_denied_for_plain_user() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;
    app.record_at(alice.id, dec!(30), "expense", Utc::now()).await;

    let (status, body) = app.get("/api/premium/content", &alice.token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "User role 'user' is not authorized to access this route"
    );
    assert!(body.get("chartLabels").is_none());
    assert!(body.get("description").is_none());
}

#[rstest]
#[case(Role::Premium)]
#[case(Role::Admin)]
#[tokio::test]
async fn test_premium_content(#[case] role: Role) {
    let app = TestApp::new().await;
    let paula = app.user("paula", role).await;
    app.record_at(paula.id, dec!(100), "income", Utc::now()).await;
    app.record_at(paula.id, dec!(30), "expense", Utc::now()).await;

    let (status, body) = app.get("/api/premium/content", &paula.token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Premium Financial Analysis");
    assert_eq!(body["chartLabels"].as_array().unwrap().len(), 6);
    assert_eq!(
        body["chartDataExpense"],
        json!([0.0, 0.0, 0.0, 0.0, 0.0, 30.0])
    );
    assert_eq!(
        body["chartDataIncome"],
        json!([0.0, 0.0, 0.0, 0.0, 0.0, 100.0])
    );
    assert!(body["description"].as_str().unwrap().contains("$10.00"));
}

#[rstest]
#[case("/api/admin/users")]
#[case("/api/users")]
#[tokio::test]
async fn test_user_listing_is_admin_only(#[case] uri: &str) {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::Premium).await;
    let root = app.user("root", Role::Admin).await;

    let (status, _) = app.get(uri, &alice.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get(uri, &root.token).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile() {
    let app = TestApp::new().await;
    let alice = app.user("alice", Role::User).await;
    app.user("bob", Role::User).await;

    let (status, body) = app.get("/api/users/profile", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "user");

    let (status, body) = app
        .send(
            "PUT",
            "/api/users/profile",
            Some(&alice.token),
            Some(json!({ "username": "alicia" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alicia");
    assert_eq!(body["email"], "alice@example.com");

    let (status, body) = app
        .send(
            "PUT",
            "/api/users/profile",
            Some(&alice.token),
            Some(json!({ "email": "bob@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let (status, _) = app
        .send(
            "PUT",
            "/api/users/profile",
            Some(&alice.token),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
