use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use signalscope_api::token::TokenService;
use signalscope_api::{AppState, AppStateInner, routes};
use signalscope_db::Database;
use signalscope_db::models::{ReportRow, TowerRow};

const SECRET: &str = "test-secret";

fn test_state() -> AppState {
    Arc::new(AppStateInner {
        db: Some(Arc::new(Database::open_in_memory().unwrap())),
        tokens: TokenService::new(SECRET, Duration::minutes(60)),
        carriers: vec!["Verizon".into(), "AT&T".into(), "T-Mobile".into()],
    })
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn tower(id: &str, operator: &str, tech: &str) -> TowerRow {
    TowerRow {
        id: id.to_string(),
        lat: 40.7,
        lng: -74.0,
        operator: operator.to_string(),
        height: 30,
        tech: tech.to_string(),
    }
}

fn report(carrier: &str, created_at: &str) -> ReportRow {
    ReportRow {
        id: Uuid::new_v4().to_string(),
        user_id: Uuid::new_v4().to_string(),
        lat: 40.7,
        lng: -74.0,
        carrier: carrier.to_string(),
        signal_strength: -85,
        device: "Pixel 8".to_string(),
        created_at: created_at.to_string(),
    }
}

#[tokio::test]
async fn health_root() {
    let app = routes::router(test_state());
    let (status, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_login_resolves_same_user() {
    let state = test_state();
    let app = routes::router(state.clone());

    let (status, registered) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({"email": "alice@example.com", "password": "hunter22", "name": "Alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["token_type"], "bearer");
    assert_eq!(registered["user"]["email"], "alice@example.com");
    assert!(!registered["access_token"].as_str().unwrap().is_empty());

    let (status, logged_in) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({"email": "alice@example.com", "password": "hunter22"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["user"]["id"], registered["user"]["id"]);

    // The issued token resolves back to the same user.
    let user_id: Uuid = registered["user"]["id"].as_str().unwrap().parse().unwrap();
    let token = logged_in["access_token"].as_str().unwrap();
    assert_eq!(state.tokens.verify(token).unwrap(), user_id);
}

#[tokio::test]
async fn duplicate_email_rejected_even_with_different_case() {
    let app = routes::router(test_state());

    let body = json!({"email": "alice@example.com", "password": "hunter22", "name": "Alice"});
    let (status, _) = send(&app, json_request("POST", "/auth/register", body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let again = json!({"email": "Alice@Example.COM", "password": "other-pass", "name": "Mallory"});
    let (status, body) = send(&app, json_request("POST", "/auth/register", again)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email already registered");
}

#[tokio::test]
async fn login_failure_is_indistinguishable() {
    let app = routes::router(test_state());

    let body = json!({"email": "alice@example.com", "password": "hunter22", "name": "Alice"});
    send(&app, json_request("POST", "/auth/register", body)).await;

    let unknown = json!({"email": "nobody@example.com", "password": "hunter22"});
    let (status, unknown_body) = send(&app, json_request("POST", "/auth/login", unknown)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = json!({"email": "alice@example.com", "password": "wrong-password"});
    let (status, wrong_body) = send(&app, json_request("POST", "/auth/login", wrong)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn submit_report_requires_token() {
    let state = test_state();
    let app = routes::router(state.clone());

    let payload = json!({
        "lat": 40.7, "lng": -74.0, "carrier": "Verizon",
        "signal_strength": -90, "device": "Pixel 8"
    });

    // Missing token.
    let (status, _) = send(&app, json_request("POST", "/reports", payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Garbage token.
    let req = Request::post("/reports")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Expired token (same secret, negative TTL).
    let expired = TokenService::new(SECRET, Duration::minutes(-5))
        .issue(Uuid::new_v4())
        .unwrap();
    let req = Request::post("/reports")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {expired}"))
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing was persisted by any of the rejected attempts.
    let db = state.db.as_ref().unwrap();
    assert_eq!(db.count_reports().unwrap(), 0);
}

#[tokio::test]
async fn submit_report_with_valid_token_persists() {
    let state = test_state();
    let app = routes::router(state.clone());

    let user_id = Uuid::new_v4();
    let token = state.tokens.issue(user_id).unwrap();

    let payload = json!({
        "lat": 40.7128, "lng": -74.0060, "carrier": "Verizon",
        "signal_strength": -90, "device": "Pixel 8"
    });
    let req = Request::post("/reports")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(payload.to_string()))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], user_id.to_string());
    assert_eq!(body["signal_strength"], -90);
    // Server-assigned fields.
    assert!(body["id"].as_str().unwrap().parse::<Uuid>().is_ok());
    assert!(!body["created_at"].as_str().unwrap().is_empty());

    let (status, listed) = send(
        &app,
        Request::get("/reports").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], body["id"]);
}

#[tokio::test]
async fn report_listing_is_newest_first_and_capped() {
    let state = test_state();
    let app = routes::router(state.clone());
    let db = state.db.as_ref().unwrap();

    db.insert_report(&report("first", "2025-01-01T00:00:01.000000Z")).unwrap();
    db.insert_report(&report("third", "2025-01-01T00:00:03.000000Z")).unwrap();
    db.insert_report(&report("second", "2025-01-01T00:00:02.000000Z")).unwrap();

    let (status, body) = send(&app, Request::get("/reports").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let carriers: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["carrier"].as_str().unwrap())
        .collect();
    assert_eq!(carriers, ["third", "second", "first"]);

    for i in 0..105 {
        db.insert_report(&report("bulk", &format!("2025-02-01T00:{:02}:{:02}.000000Z", i / 60, i % 60)))
            .unwrap();
    }
    let (_, body) = send(&app, Request::get("/reports").body(Body::empty()).unwrap()).await;
    assert_eq!(body.as_array().unwrap().len(), 100);

    let (_, body) = send(
        &app,
        Request::get("/reports?carrier=first").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn tower_filters_over_http() {
    let state = test_state();
    let app = routes::router(state.clone());
    let db = state.db.as_ref().unwrap();

    db.upsert_tower(&tower("t1", "T-Mobile", r#"["4G","5G"]"#)).unwrap();
    db.upsert_tower(&tower("t2", "T-Mobile", r#"["4G"]"#)).unwrap();
    db.upsert_tower(&tower("t3", "Verizon", r#"["5G"]"#)).unwrap();

    let (status, unfiltered) =
        send(&app, Request::get("/towers").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unfiltered.as_array().unwrap().len(), 3);

    // "All" is a sentinel for no operator filter.
    let (_, all) = send(
        &app,
        Request::get("/towers?operator=All").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(all, unfiltered);

    let (_, tmobile) = send(
        &app,
        Request::get("/towers?operator=T-Mobile").body(Body::empty()).unwrap(),
    )
    .await;
    let towers = tmobile.as_array().unwrap();
    assert_eq!(towers.len(), 2);
    assert!(towers.iter().all(|t| t["operator"] == "T-Mobile"));

    // Tech filter is a membership test against the tag set.
    let (_, five_g) = send(
        &app,
        Request::get("/towers?tech=5G").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(five_g.as_array().unwrap().len(), 2);

    let (_, combined) = send(
        &app,
        Request::get("/towers?operator=T-Mobile&tech=5G").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(combined.as_array().unwrap().len(), 1);
    assert_eq!(combined[0]["id"], "t1");
}

#[tokio::test]
async fn analytics_summary_counts() {
    let state = test_state();
    let app = routes::router(state.clone());
    let db = state.db.as_ref().unwrap();

    for i in 0..3 {
        db.upsert_tower(&tower(&format!("v{i}"), "Verizon", r#"["4G"]"#)).unwrap();
    }
    // An operator outside the configured carrier list: counted in the
    // total, invisible in the breakdown.
    db.upsert_tower(&tower("x1", "Umbrella Corp", r#"["5G"]"#)).unwrap();
    for _ in 0..5 {
        db.insert_report(&report("Verizon", "2025-01-01T00:00:00.000000Z"))
            .unwrap();
    }

    let (status, body) = send(
        &app,
        Request::get("/analytics/summary").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["towers_by_carrier"]["Verizon"], 3);
    assert_eq!(body["towers_by_carrier"]["AT&T"], 0);
    assert_eq!(body["towers_by_carrier"]["T-Mobile"], 0);
    assert!(body["towers_by_carrier"].get("Umbrella Corp").is_none());
    assert_eq!(body["total_towers"], 4);
    assert_eq!(body["total_reports"], 5);
}

#[tokio::test]
async fn degraded_store_returns_503() {
    let state: AppState = Arc::new(AppStateInner {
        db: None,
        tokens: TokenService::new(SECRET, Duration::minutes(60)),
        carriers: vec!["Verizon".into()],
    });
    let app = routes::router(state);

    let (status, body) = send(&app, Request::get("/towers").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "persistence unavailable");

    let register = json!({"email": "a@b.c", "password": "p", "name": "A"});
    let (status, _) = send(&app, json_request("POST", "/auth/register", register)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Token verification is pure, so auth still rejects bad tokens before
    // hitting the missing store.
    let req = Request::post("/reports")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer junk")
        .body(Body::from("{}"))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
