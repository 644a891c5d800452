//! In-process test harness: in-memory database, full middleware stack

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use club_server::auth::TokenSubject;
use club_server::db::DbService;
use club_server::routes::build_app;
use club_server::{Config, ServerState};
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "admin-pass";

pub struct TestApp {
    pub state: ServerState,
    app: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = DbService::in_memory().await.expect("in-memory database");
        db.bootstrap_admin("admin", ADMIN_PASSWORD)
            .await
            .expect("bootstrap admin");
        let state = ServerState::new(Config::for_tests(), db.pool);
        let app = build_app(&state).with_state(state.clone());
        Self { state, app }
    }

    /// Token for a synthetic user with the given role name and permissions
    pub fn token(&self, role: &str, permissions: &[&str]) -> String {
        let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
        self.state
            .jwt_service
            .generate_token(&TokenSubject {
                profile_id: 1,
                store_id: 1,
                username: "tester",
                display_name: "Tester",
                role,
                permissions: &permissions,
            })
            .expect("token")
    }

    pub fn admin_token(&self) -> String {
        self.token("admin", &["all"])
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    /// POST and return the `id` of the created row
    pub async fn create(&self, uri: &str, token: &str, body: Value) -> i64 {
        let (status, value) = self.post(uri, token, body).await;
        assert_eq!(status, StatusCode::OK, "POST {uri} failed: {value}");
        value["id"].as_i64().expect("id")
    }
}
