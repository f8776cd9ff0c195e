//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the application through [`build_app_router`] so tests exercise the
//! same middleware stack (CORS, request ID, timeout, tracing, panic recovery)
//! that production uses, with the payment gateway swapped for an in-memory
//! recording stub.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use mentorbook_api::config::ServerConfig;
use mentorbook_api::payments::{ChargeOutcome, ChargeStatus, GatewayError, PaymentGateway};
use mentorbook_api::router::build_app_router;
use mentorbook_api::state::AppState;
use mentorbook_core::slot::{TimeSlot, Weekday};
use mentorbook_core::types::DbId;
use mentorbook_db::models::mentor_request::CreateMentorRequest;
use mentorbook_db::models::participant::{CreateMentor, CreateUser};
use mentorbook_db::repositories::{MentorRepo, MentorRequestRepo, UserRepo};

// ---------------------------------------------------------------------------
// Recording payment gateway stub
// ---------------------------------------------------------------------------

/// One scripted gateway response.
#[derive(Debug, Clone, Copy)]
pub enum StubCharge {
    Succeed,
    Declined,
    RequiresAction,
    TransportError,
}

/// In-memory [`PaymentGateway`] that records every call.
///
/// Responses are popped from a script; when the script runs dry the gateway
/// keeps succeeding. `calls()` is the charge-count assertion hook for
/// idempotency tests.
pub struct RecordingGateway {
    calls: AtomicUsize,
    script: Mutex<VecDeque<StubCharge>>,
}

impl RecordingGateway {
    /// A gateway that succeeds on every charge.
    pub fn succeeding() -> Arc<Self> {
        Self::scripted([])
    }

    /// A gateway that plays back the given responses in order.
    pub fn scripted(outcomes: impl IntoIterator<Item = StubCharge>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(outcomes.into_iter().collect()),
        })
    }

    /// Number of charge calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn charge(
        &self,
        _amount_cents: i64,
        _payer_email: &str,
        _idempotency_key: &str,
    ) -> Result<ChargeOutcome, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StubCharge::Succeed);

        let status = match next {
            StubCharge::Succeed => ChargeStatus::Succeeded,
            StubCharge::Declined => ChargeStatus::Failed,
            StubCharge::RequiresAction => ChargeStatus::RequiresAction,
            StubCharge::TransportError => {
                return Err(GatewayError::Transport("connection refused".to_string()))
            }
        };

        Ok(ChargeOutcome {
            status,
            id: format!("ch_test_{n}"),
        })
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        engagement_period_days: 30,
        payment_gateway_url: "http://localhost:9090".to_string(),
    }
}

/// Build the application router with an always-succeeding gateway.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_gateway(pool, RecordingGateway::succeeding())
}

/// Build the application router around a specific gateway stub.
pub fn build_test_app_with_gateway(pool: PgPool, gateway: Arc<RecordingGateway>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(mentorbook_events::EventBus::default()),
        payment_gateway: gateway,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the response carries the engine's error envelope with this code.
pub async fn assert_error_code(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code);
    assert!(json["error"].is_string());
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

pub fn slot(day: Weekday, labels: &[&str]) -> TimeSlot {
    TimeSlot::new(day, labels.iter().map(|s| s.to_string()).collect())
}

static SEED_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Distinct per call; mentor and user emails are unique columns.
fn unique_suffix() -> usize {
    SEED_COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub async fn seed_mentor(pool: &PgPool) -> DbId {
    let n = unique_suffix();
    MentorRepo::create(
        pool,
        &CreateMentor {
            name: "Asha Mentor".to_string(),
            email: format!("asha+{n}@example.com"),
            available_slots: vec![
                slot(Weekday::Monday, &["09:00-10:00", "10:00-11:00"]),
                slot(Weekday::Wednesday, &["14:00-15:00"]),
            ],
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_user(pool: &PgPool) -> DbId {
    let n = unique_suffix();
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Sam Learner".to_string(),
            email: format!("sam+{n}@example.com"),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_user_named(pool: &PgPool, name: &str, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: email.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

/// Submit a pending request directly through the repository.
pub async fn seed_request(
    pool: &PgPool,
    mentor_id: DbId,
    user_id: DbId,
    request_slot: TimeSlot,
) -> DbId {
    MentorRequestRepo::create(
        pool,
        &CreateMentorRequest {
            mentor_id,
            user_id,
            slot: request_slot,
            price_cents: 5_000,
        },
    )
    .await
    .unwrap()
    .id
}

/// Submit a request and mark it accepted by the mentor.
pub async fn seed_accepted_request(
    pool: &PgPool,
    mentor_id: DbId,
    user_id: DbId,
    request_slot: TimeSlot,
) -> DbId {
    let id = seed_request(pool, mentor_id, user_id, request_slot).await;
    MentorRequestRepo::set_acceptance(pool, id, "accepted")
        .await
        .unwrap()
        .unwrap();
    id
}
