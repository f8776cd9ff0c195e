//! HTTP-level integration tests for booking finalization: the payment step,
//! idempotency-key replay, and the conditional engagement insert.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error_code, body_json, get, post_json, seed_accepted_request, seed_mentor,
    seed_request, seed_user, seed_user_named, RecordingGateway, StubCharge,
};
use mentorbook_core::slot::Weekday;
use mentorbook_db::repositories::MentorRequestRepo;
use sqlx::PgPool;

fn finalize_body(key: &str) -> serde_json::Value {
    serde_json::json!({
        "idempotency_key": key,
        "amount_cents": 5000,
        "payer_email": "sam@example.com",
    })
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn finalize_accepted_request_creates_engagement(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let user_id = seed_user(&pool).await;
    let request_id = seed_accepted_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;

    let gateway = RecordingGateway::succeeding();
    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());
    let response = post_json(
        app,
        &format!("/api/v1/requests/{request_id}/finalize"),
        finalize_body("key-1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["mentor_id"], mentor_id);
    assert_eq!(json["data"]["user_id"], user_id);
    assert_eq!(json["data"]["payment_confirmed"], true);
    assert_eq!(json["data"]["is_active"], true);
    assert!(json["data"]["end_date"].is_string());
    assert_eq!(gateway.calls(), 1);

    // Conversion hard-deletes the request.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/requests/{request_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn finalize_requires_mentor_acceptance(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let user_id = seed_user(&pool).await;
    let request_id = seed_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;

    let gateway = RecordingGateway::succeeding();
    let app = common::build_test_app_with_gateway(pool, gateway.clone());
    let response = post_json(
        app,
        &format!("/api/v1/requests/{request_id}/finalize"),
        finalize_body("key-1"),
    )
    .await;

    assert_error_code(response, StatusCode::CONFLICT, "CONFLICT").await;
    // A request still awaiting the mentor is never charged.
    assert_eq!(gateway.calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn finalize_missing_request_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/requests/999999/finalize",
        finalize_body("key-1"),
    )
    .await;
    assert_error_code(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn finalize_validates_input(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let user_id = seed_user(&pool).await;
    let request_id = seed_accepted_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;
    let uri = format!("/api/v1/requests/{request_id}/finalize");

    let app = common::build_test_app(pool.clone());
    let mut body = finalize_body("  ");
    let response = post_json(app, &uri, body.clone()).await;
    assert_error_code(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let app = common::build_test_app(pool.clone());
    body = finalize_body("key-1");
    body["amount_cents"] = serde_json::json!(-1);
    let response = post_json(app, &uri, body).await;
    assert_error_code(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let app = common::build_test_app(pool);
    body = finalize_body("key-1");
    body["payer_email"] = serde_json::json!("");
    let response = post_json(app, &uri, body).await;
    assert_error_code(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

// ---------------------------------------------------------------------------
// Idempotency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn replaying_a_finalized_key_returns_the_engagement_without_recharging(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let user_id = seed_user(&pool).await;
    let request_id = seed_accepted_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;
    let uri = format!("/api/v1/requests/{request_id}/finalize");

    let gateway = RecordingGateway::succeeding();
    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());
    let first = post_json(app, &uri, finalize_body("key-1")).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let engagement_id = body_json(first).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app_with_gateway(pool, gateway.clone());
    let replay = post_json(app, &uri, finalize_body("key-1")).await;
    assert_eq!(replay.status(), StatusCode::OK);
    let json = body_json(replay).await;
    assert_eq!(json["data"]["id"], engagement_id);

    // Exactly one charge across both calls.
    assert_eq!(gateway.calls(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn key_reuse_across_requests_conflicts(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let user_id = seed_user(&pool).await;
    let first_id = seed_accepted_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;
    let second_id = seed_accepted_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Tuesday, &["10:00-11:00"]),
    )
    .await;

    // Start (but do not complete) an attempt on the first request: the
    // gateway declines, the key stays bound to that request.
    let gateway = RecordingGateway::scripted([StubCharge::Declined]);
    let app = common::build_test_app_with_gateway(pool.clone(), gateway);
    let response = post_json(
        app,
        &format!("/api/v1/requests/{first_id}/finalize"),
        finalize_body("shared-key"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/requests/{second_id}/finalize"),
        finalize_body("shared-key"),
    )
    .await;
    assert_error_code(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn finalized_key_does_not_replay_against_another_request(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let user_id = seed_user(&pool).await;
    let first_id = seed_accepted_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;
    let second_id = seed_accepted_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Tuesday, &["10:00-11:00"]),
    )
    .await;

    let gateway = RecordingGateway::succeeding();
    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());
    let response = post_json(
        app,
        &format!("/api/v1/requests/{first_id}/finalize"),
        finalize_body("shared-key"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // A finalized key only replays against the request it booked; aimed at
    // any other request it conflicts instead of leaking that engagement.
    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());
    let response = post_json(
        app,
        &format!("/api/v1/requests/{second_id}/finalize"),
        finalize_body("shared-key"),
    )
    .await;
    assert_error_code(response, StatusCode::CONFLICT, "CONFLICT").await;
    assert_eq!(gateway.calls(), 1);

    // The second request is untouched and bookable under its own key.
    let app = common::build_test_app_with_gateway(pool, gateway.clone());
    let response = post_json(
        app,
        &format!("/api/v1/requests/{second_id}/finalize"),
        finalize_body("fresh-key"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_preconditions_leave_the_key_reusable(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let user_id = seed_user(&pool).await;
    let request_id = seed_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;
    let uri = format!("/api/v1/requests/{request_id}/finalize");

    // Finalizing before the mentor decides is refused without touching the
    // ledger or the gateway.
    let gateway = RecordingGateway::succeeding();
    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());
    let response = post_json(app, &uri, finalize_body("key-1")).await;
    assert_error_code(response, StatusCode::CONFLICT, "CONFLICT").await;
    assert_eq!(gateway.calls(), 0);

    // Once accepted, the same key goes through.
    MentorRequestRepo::set_acceptance(&pool, request_id, "accepted")
        .await
        .unwrap();
    let app = common::build_test_app_with_gateway(pool, gateway.clone());
    let response = post_json(app, &uri, finalize_body("key-1")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(gateway.calls(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn declined_charge_leaves_the_request_retryable(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let user_id = seed_user(&pool).await;
    let request_id = seed_accepted_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;
    let uri = format!("/api/v1/requests/{request_id}/finalize");

    let gateway = RecordingGateway::scripted([StubCharge::Declined]);
    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());
    let response = post_json(app, &uri, finalize_body("key-1")).await;
    assert_error_code(response, StatusCode::PAYMENT_REQUIRED, "PAYMENT_FAILED").await;

    // The request survives a failed payment, still accepted.
    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/requests/{request_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["acceptance_status"], "accepted");

    // Retrying with the same key charges again and succeeds.
    let app = common::build_test_app_with_gateway(pool, gateway.clone());
    let response = post_json(app, &uri, finalize_body("key-1")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(gateway.calls(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn gateway_transport_failure_maps_to_payment_error(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let user_id = seed_user(&pool).await;
    let request_id = seed_accepted_request(
        &pool,
        mentor_id,
        user_id,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;

    let gateway = RecordingGateway::scripted([StubCharge::TransportError]);
    let app = common::build_test_app_with_gateway(pool, gateway);
    let response = post_json(
        app,
        &format!("/api/v1/requests/{request_id}/finalize"),
        finalize_body("key-1"),
    )
    .await;
    assert_error_code(response, StatusCode::PAYMENT_REQUIRED, "PAYMENT_FAILED").await;
}

// ---------------------------------------------------------------------------
// Slot conflicts at finalize time
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn finalizing_a_slot_already_engaged_conflicts(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let first_user = seed_user(&pool).await;
    let second_user = seed_user_named(&pool, "Riley Learner", "riley@example.com").await;

    // Both users got the same slot accepted (intake does not gate).
    let first_request = seed_accepted_request(
        &pool,
        mentor_id,
        first_user,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;
    let second_request = seed_accepted_request(
        &pool,
        mentor_id,
        second_user,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/requests/{first_request}/finalize"),
        finalize_body("key-first"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The loser is refused at the atomic insert, not by the stale read.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/requests/{second_request}/finalize"),
        finalize_body("key-second"),
    )
    .await;
    assert_error_code(response, StatusCode::CONFLICT, "CONFLICT").await;

    // The losing request is preserved for re-negotiation.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/requests/{second_request}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_overlapping_slots_both_finalize(pool: PgPool) {
    let mentor_id = seed_mentor(&pool).await;
    let first_user = seed_user(&pool).await;
    let second_user = seed_user_named(&pool, "Riley Learner", "riley@example.com").await;

    let first_request = seed_accepted_request(
        &pool,
        mentor_id,
        first_user,
        common::slot(Weekday::Monday, &["09:00-10:00"]),
    )
    .await;
    let second_request = seed_accepted_request(
        &pool,
        mentor_id,
        second_user,
        common::slot(Weekday::Monday, &["14:00-15:00"]),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/requests/{first_request}/finalize"),
        finalize_body("key-first"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/requests/{second_request}/finalize"),
        finalize_body("key-second"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
