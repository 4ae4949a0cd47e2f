//! In-memory application harness for route tests.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tally_core::auth::{Role, hash_password};
use tally_core::ledger::{Transaction, TransactionDraft};
use tally_db::TransactionRepository;
use tally_db::repositories::{CreateUserInput, UserRepository};
use tally_shared::types::UserId;
use tally_shared::{JwtConfig, JwtService};
use tower::ServiceExt;

use crate::{AppState, create_router};

pub(crate) const PASSWORD: &str = "s3cret-pass";

pub(crate) struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// A seeded account and a valid token for it.
pub(crate) struct TestUser {
    pub id: UserId,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_state(|state| state).await
    }

    pub async fn with_state(configure: impl FnOnce(AppState) -> AppState) -> Self {
        let db = tally_db::connect_in_memory().await.unwrap();
        let state = configure(AppState::new(db, JwtService::new(JwtConfig::default())));
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    pub async fn user(&self, name: &str, role: Role) -> TestUser {
        let user = UserRepository::new((*self.state.db).clone())
            .create(CreateUserInput {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: hash_password(PASSWORD).unwrap(),
                role: role.into(),
            })
            .await
            .unwrap();

        let id = UserId::from_uuid(user.id);
        let token = self
            .state
            .jwt_service
            .generate_access_token(id, role.as_str())
            .unwrap();

        TestUser { id, token }
    }

    /// Stores a record with an explicit timestamp, bypassing the API.
    pub async fn record_at(
        &self,
        owner: UserId,
        amount: Decimal,
        kind: &str,
        at: DateTime<Utc>,
    ) -> Transaction {
        let record = TransactionDraft {
            text: Some(format!("{kind} {amount}")),
            amount: Some(amount),
            kind: Some(kind.to_string()),
            category: None,
        }
        .validate()
        .unwrap();

        TransactionRepository::new((*self.state.db).clone())
            .insert_at(owner, record, at)
            .await
            .unwrap()
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.dispatch(request).await
    }

    pub async fn send_raw(&self, method: &str, uri: &str, token: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.dispatch(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}
