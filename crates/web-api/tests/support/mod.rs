use std::sync::Arc;

use application::{LocalMessageBroadcaster, ManualClock, MemoryStore};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use config::AuthConfig;
use domain::UserId;
use serde_json::Value;
use tower::ServiceExt;
use web_api::{router, AppState, JwtService, Repositories};

pub const VERIFIER_KEY: &str = "test-verifier-key-0001";

pub struct TestApp {
    pub router: Router,
    pub jwt: Arc<JwtService>,
}

pub fn build_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let jwt = Arc::new(JwtService::new(&AuthConfig {
        jwt_secret: "web-api-test-secret-with-32-characters".to_string(),
        issuer: None,
    }));

    let state = AppState::new(
        Repositories {
            user_repository: store.clone(),
            skill_repository: store.clone(),
            match_repository: store.clone(),
            message_repository: store,
        },
        Arc::new(ManualClock::new(
            chrono::Utc::now(),
            chrono::Duration::seconds(1),
        )),
        Arc::new(LocalMessageBroadcaster::new(64)),
        jwt.clone(),
        VERIFIER_KEY,
    );

    TestApp {
        router: router(state),
        jwt,
    }
}

impl TestApp {
    pub fn token(&self, user_id: &str) -> String {
        self.jwt
            .generate_token(
                &UserId::new(user_id),
                Some(&format!("{user_id}@example.com")),
                chrono::Duration::hours(1),
            )
            .expect("token")
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// 同步用户并返回其令牌。
    pub async fn sign_up(&self, user_id: &str, name: &str) -> String {
        let token = self.token(user_id);
        let (status, _) = self
            .request(
                "POST",
                "/api/users/sync",
                Some(&token),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        token
    }

    pub async fn declare(&self, token: &str, relation: &str, skill: &str) {
        let (status, _) = self
            .request(
                "POST",
                &format!("/api/users/me/{relation}"),
                Some(token),
                Some(serde_json::json!({ "skillName": skill })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    pub async fn verify(&self, user_id: &str, skill: &str) {
        let request = Request::builder()
            .method("PUT")
            .uri("/internal/verifications")
            .header("content-type", "application/json")
            .header("x-verifier-key", VERIFIER_KEY)
            .body(Body::from(
                serde_json::json!({
                    "userId": user_id,
                    "skillName": skill,
                    "verified": true,
                    "score": 91.0
                })
                .to_string(),
            ))
            .expect("request");
        let (status, _) = self.send(request).await;
        assert_eq!(status, StatusCode::OK);
    }
}
