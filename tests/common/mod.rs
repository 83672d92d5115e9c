#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use artistry::modules::payments::gateway::{PaymentError, PaymentGateway, PaymentIntent};
use artistry::router::init_router;
use artistry::state::AppState;
use artistry_auth::create_token;
use artistry_config::{CorsConfig, JwtConfig, PaymentConfig};
use artistry_db::{MemoryStore, Store};
use artistry_models::{
    Course, CourseStatus, Identity, IdentityUpsert, NewCourse, SelectionEntry, UserRole,
};

/// Gateway that records requested amounts and hands out fixed intents.
#[derive(Default)]
pub struct FakeGateway {
    pub calls: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((amount_minor, currency.to_string()));
        let n = calls.len();

        Ok(PaymentIntent {
            id: format!("pi_fake_{}", n),
            client_secret: format!("pi_fake_{}_secret", n),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub gateway: Arc<FakeGateway>,
    pub jwt_config: JwtConfig,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        expiry_seconds: 3600,
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@artistry.test", Uuid::new_v4())
}

pub fn test_app() -> TestApp {
    let store = MemoryStore::new();
    let gateway = Arc::new(FakeGateway::default());
    let jwt_config = test_jwt_config();

    let state = AppState {
        store: Arc::new(store.clone()),
        payments: gateway.clone(),
        jwt_config: jwt_config.clone(),
        cors_config: CorsConfig::parse("*"),
        payment_config: PaymentConfig {
            secret_key: String::new(),
            api_base: "http://127.0.0.1:9".to_string(),
            currency: "usd".to_string(),
        },
    };

    TestApp {
        router: init_router(state),
        store,
        gateway,
        jwt_config,
    }
}

impl TestApp {
    pub fn token(&self, email: &str) -> String {
        create_token(email, &self.jwt_config).unwrap()
    }

    pub async fn create_identity(&self, email: &str, role: UserRole) -> Identity {
        self.store
            .upsert_identity(
                email,
                &IdentityUpsert {
                    name: Some("Test User".to_string()),
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap()
    }

    /// Identity plus a credential for it.
    pub async fn login_as(&self, role: UserRole) -> (Identity, String) {
        let identity = self.create_identity(&generate_unique_email(), role).await;
        let token = self.token(&identity.email);
        (identity, token)
    }

    pub async fn create_course(
        &self,
        instructor_email: &str,
        price_cents: i64,
        seats: i32,
        status: CourseStatus,
    ) -> Course {
        let course = self
            .store
            .insert_course(&NewCourse {
                title: "Figure Drawing".to_string(),
                description: Some("Gesture, proportion and anatomy".to_string()),
                image_url: None,
                instructor_email: instructor_email.to_string(),
                instructor_name: Some("Test User".to_string()),
                price_cents,
                seats,
            })
            .await
            .unwrap();

        if status == CourseStatus::Pending {
            return course;
        }

        self.store
            .transition_course_status(course.id, CourseStatus::Pending, status)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn create_selection(&self, student_email: &str, course: &Course) -> SelectionEntry {
        self.store
            .insert_selection(student_email, course.id)
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
        let authorization = token.map(|t| format!("Bearer {}", t));
        self.send_raw(method, uri, authorization.as_deref(), body).await
    }

    pub async fn get_with_authorization(
        &self,
        uri: &str,
        authorization: &str,
    ) -> (StatusCode, Value) {
        self.send_raw("GET", uri, Some(authorization), None).await
    }

    async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, token, Some(body)).await
    }

    pub async fn patch(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send("PATCH", uri, token, body).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("DELETE", uri, token, None).await
    }
}
