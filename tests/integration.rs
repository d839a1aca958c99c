//! Integration tests for the attendance engine HTTP API.
//!
//! This test suite covers:
//! - Punch classification
//! - Daily summaries of ad hoc punch lists
//! - Manual and recognized registration against the store
//! - Daily and monthly reports read from the store
//! - Workbook export
//! - Error cases
//!
//! The default configuration uses a fixed -03:00 calendar, so naive
//! timestamps below are local wall-clock times.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use attendance_engine::api::{AppState, create_router};
use attendance_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

fn punch(kind: &str, timestamp: &str) -> Value {
    json!({ "kind": kind, "timestamp": timestamp })
}

fn canonical_day(date: &str) -> Vec<Value> {
    vec![
        punch("ENTRADA", &format!("{}T08:00:00", date)),
        punch("ENTRADA_ALMOCO", &format!("{}T12:00:00", date)),
        punch("VOLTA_ALMOCO", &format!("{}T13:00:00", date)),
        punch("SAIDA", &format!("{}T17:00:00", date)),
    ]
}

async fn register_manual(router: &Router, employee_id: &str, kind: &str, timestamp: &str) {
    let (status, body) = post(
        router,
        "/punches",
        json!({ "employee_id": employee_id, "kind": kind, "timestamp": timestamp }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
}

// =============================================================================
// Classification
// =============================================================================

#[tokio::test]
async fn test_classify_without_entrada_returns_entrada() {
    let router = create_router_for_test();
    for punches in [
        vec![],
        vec![punch("SAIDA", "2024-03-04T17:00:00")],
        vec![
            punch("ENTRADA_ALMOCO", "2024-03-04T12:00:00"),
            punch("VOLTA_ALMOCO", "2024-03-04T13:00:00"),
        ],
    ] {
        let (status, body) = post(&router, "/classify", json!({ "punches": punches })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "ENTRADA");
    }
}

#[tokio::test]
async fn test_classify_entrada_without_lunch_returns_entrada_almoco() {
    let router = create_router_for_test();
    let (_, body) = post(
        &router,
        "/classify",
        json!({ "punches": [
            punch("SAIDA", "2024-03-04T17:00:00"),
            punch("ENTRADA", "2024-03-04T08:00:00"),
        ] }),
    )
    .await;
    assert_eq!(body["kind"], "ENTRADA_ALMOCO");
    assert_eq!(body["label"], "Saída almoço");
}

#[tokio::test]
async fn test_classify_full_day_falls_back() {
    let router = create_router_for_test();
    let (_, body) = post(&router, "/classify", json!({ "punches": canonical_day("2024-03-04") })).await;
    assert_eq!(body["kind"], "ENTRADA");
    assert_eq!(body["rule"], "fallback");
}

// =============================================================================
// Daily Summaries
// =============================================================================

#[tokio::test]
async fn test_summarize_empty_list() {
    let router = create_router_for_test();
    let (status, body) = post(&router, "/summarize", json!({ "punches": [] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["worked_minutes"], 0);
    assert_eq!(body["summary"]["lateness_count"], 0);
    assert_eq!(body["summary"]["balance_label"], "0h 00min");
}

#[tokio::test]
async fn test_summarize_canonical_day() {
    let router = create_router_for_test();
    let (_, body) = post(&router, "/summarize", json!({ "punches": canonical_day("2024-03-04") })).await;
    assert_eq!(body["summary"]["worked_minutes"], 480);
    assert_eq!(body["summary"]["worked_label"], "8h 00min");
    assert_eq!(body["summary"]["lateness_count"], 0);
    assert_eq!(body["summary"]["balance_label"], "0h 00min");
    assert!(body["warnings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_summarize_is_order_invariant() {
    let router = create_router_for_test();
    let mut reversed = canonical_day("2024-03-04");
    reversed.reverse();
    let (_, body) = post(&router, "/summarize", json!({ "punches": reversed })).await;
    assert_eq!(body["summary"]["worked_minutes"], 480);
    assert_eq!(body["punches"][0]["kind"], "ENTRADA");
    assert_eq!(body["punches"][3]["kind"], "SAIDA");
}

#[tokio::test]
async fn test_summarize_late_entrada() {
    let router = create_router_for_test();
    let (_, body) = post(
        &router,
        "/summarize",
        json!({ "punches": [punch("ENTRADA", "2024-03-04T08:15:00")] }),
    )
    .await;
    assert_eq!(body["summary"]["lateness_count"], 1);
}

#[tokio::test]
async fn test_summarize_entrada_only_contributes_nothing() {
    let router = create_router_for_test();
    let (_, body) = post(
        &router,
        "/summarize",
        json!({ "punches": [punch("ENTRADA", "2024-03-04T08:30:00")] }),
    )
    .await;
    assert_eq!(body["summary"]["worked_minutes"], 0);
    assert_eq!(body["summary"]["lateness_count"], 1);
    assert_eq!(body["summary"]["balance_label"], "-8h 00min");
    let codes: Vec<&str> = body["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"MISSING_SAIDA"));
}

#[tokio::test]
async fn test_summarize_duplicate_saida_uses_latest() {
    let router = create_router_for_test();
    let mut punches = canonical_day("2024-03-04");
    punches.push(punch("SAIDA", "2024-03-04T16:00:00"));
    let (_, body) = post(&router, "/summarize", json!({ "punches": punches })).await;
    assert_eq!(body["summary"]["worked_minutes"], 480);
}

#[tokio::test]
async fn test_summarize_accepts_offset_timestamps() {
    let router = create_router_for_test();
    let (_, body) = post(
        &router,
        "/summarize",
        json!({ "punches": [
            punch("ENTRADA", "2024-03-04T11:00:00Z"),
            punch("SAIDA", "2024-03-04T19:00:00Z"),
        ] }),
    )
    .await;
    assert_eq!(body["summary"]["worked_minutes"], 480);
    assert_eq!(body["summary"]["lateness_count"], 0);
}

// =============================================================================
// Registration and Stored Reports
// =============================================================================

#[tokio::test]
async fn test_recognized_registration_round_trip() {
    let router = create_router_for_test();
    let times = [
        "2024-03-04T08:00:00",
        "2024-03-04T12:00:00",
        "2024-03-04T13:00:00",
        "2024-03-04T17:00:00",
    ];
    let mut kinds = Vec::new();
    for time in times {
        let (status, body) = post(
            &router,
            "/punches/recognized",
            json!({ "employee_id": "emp_001", "timestamp": time }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        kinds.push(body["kind"].as_str().unwrap().to_string());
    }
    assert_eq!(kinds, vec!["ENTRADA", "ENTRADA_ALMOCO", "VOLTA_ALMOCO", "SAIDA"]);

    let (status, body) = get(&router, "/employees/emp_001/day?date=2024-03-04").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["worked_minutes"], 480);
    assert_eq!(body["summary"]["balance_label"], "0h 00min");
    assert!(
        body["punches"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["terminal"] == "FACIAL")
    );
}

#[tokio::test]
async fn test_manual_registration_in_any_order_reproduces_full_day() {
    let router = create_router_for_test();
    let day = [
        ("SAIDA", "2024-03-05T17:00:00"),
        ("ENTRADA", "2024-03-05T08:00:00"),
        ("VOLTA_ALMOCO", "2024-03-05T13:00:00"),
        ("ENTRADA_ALMOCO", "2024-03-05T12:00:00"),
    ];
    for (kind, timestamp) in day {
        register_manual(&router, "emp_002", kind, timestamp).await;
    }

    let (_, body) = get(&router, "/employees/emp_002/day?date=2024-03-05").await;
    assert_eq!(body["summary"]["worked_minutes"], 480);
    assert_eq!(body["punches"][0]["kind"], "ENTRADA");
}

#[tokio::test]
async fn test_day_report_only_reads_local_day() {
    let router = create_router_for_test();
    register_manual(&router, "emp_001", "ENTRADA", "2024-03-04T08:00:00").await;
    register_manual(&router, "emp_001", "SAIDA", "2024-03-04T23:59:00").await;
    register_manual(&router, "emp_001", "SAIDA", "2024-03-05T00:00:00").await;

    let (_, body) = get(&router, "/employees/emp_001/day?date=2024-03-04").await;
    assert_eq!(body["punches"].as_array().unwrap().len(), 2);
    assert_eq!(body["date"], "2024-03-04");
}

#[tokio::test]
async fn test_monthly_report_window() {
    let router = create_router_for_test();
    register_manual(&router, "emp_001", "SAIDA", "2024-02-29T23:59:00").await;
    register_manual(&router, "emp_001", "ENTRADA", "2024-03-01T08:00:00").await;
    register_manual(&router, "emp_001", "SAIDA", "2024-03-01T16:00:00").await;
    register_manual(&router, "emp_001", "ENTRADA", "2024-03-20T08:30:00").await;
    register_manual(&router, "emp_001", "SAIDA", "2024-03-20T16:30:00").await;
    register_manual(&router, "emp_001", "ENTRADA", "2024-04-01T00:00:00").await;

    let (status, body) = get(&router, "/employees/emp_001/month?reference=2024-03-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month_start"], "2024-03-01");
    assert_eq!(body["next_month_start"], "2024-04-01");

    let days = body["days"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["display_date"], "01/03/2024");
    assert_eq!(days[1]["display_date"], "20/03/2024");
    assert_eq!(body["totals"]["worked_minutes"], 960);
    assert_eq!(body["totals"]["lateness_count"], 1);
    assert_eq!(body["totals"]["balance_label"], "0h 00min");
}

#[tokio::test]
async fn test_roster_endpoint() {
    let router = create_router_for_test();
    let (status, body) = get(&router, "/recognition/roster").await;
    assert_eq!(status, StatusCode::OK);
    let employees = body["employees"].as_array().unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0]["photo_url"], "https://photos.example.com/emp_001.jpg");
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_employee_without_punches_gets_placeholder_row() {
    let router = create_router_for_test();
    let (status, body) = post(&router, "/export", json!({ "date": "2024-03-15" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "frequencia_15-03-2024");

    let sheets = body["sheets"].as_array().unwrap();
    // Resumo plus the two active employees
    assert_eq!(sheets.len(), 3);
    assert_eq!(sheets[0]["name"], "Resumo");
    assert_eq!(sheets[0]["rows"][0][6], "Sem marcações");

    let rows = sheets[1]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0],
        json!([
            "Ana Beatriz Souza",
            "15/03/2024",
            "",
            "",
            "",
            "",
            "08:00",
            "02:30",
            "00:15",
            "00:00"
        ])
    );
}

#[tokio::test]
async fn test_export_truncates_tab_names() {
    let router = create_router_for_test();
    let (_, body) = post(&router, "/export", json!({ "date": "2024-03-15" })).await;
    let tab = body["sheets"][2]["name"].as_str().unwrap();
    assert_eq!(tab, "Bruno Henrique de Oliveira Albu");
    assert_eq!(tab.chars().count(), 31);
}

#[tokio::test]
async fn test_export_day_with_punches_and_csv() {
    let router = create_router_for_test();
    for (kind, timestamp) in [
        ("ENTRADA", "2024-03-15T08:10:00"),
        ("ENTRADA_ALMOCO", "2024-03-15T12:00:00"),
        ("VOLTA_ALMOCO", "2024-03-15T13:00:00"),
        ("SAIDA", "2024-03-15T17:10:00"),
    ] {
        register_manual(&router, "emp_001", kind, timestamp).await;
    }

    let (_, body) = post(
        &router,
        "/export",
        json!({ "date": "2024-03-15", "employee_ids": ["emp_001"], "include_csv": true }),
    )
    .await;
    let sheets = body["sheets"].as_array().unwrap();
    assert_eq!(sheets.len(), 2);

    let summary = &sheets[0]["rows"][0];
    assert_eq!(summary[3], "8h 00min");
    assert_eq!(summary[4], "1");
    assert_eq!(summary[5], "0h 00min");
    assert_eq!(
        summary[6],
        "Entrada: 08:10; Saída almoço: 12:00; Retorno almoço: 13:00; Saída: 17:10"
    );

    let csv = sheets[1]["csv"].as_str().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[1],
        "Ana Beatriz Souza,15/03/2024,08:10,12:00,13:00,17:10,08:00,02:30,00:15,00:00"
    );
}

#[tokio::test]
async fn test_export_reports_adjustments_as_decimal_hours() {
    let router = create_router_for_test();
    let (status, body) = post(
        &router,
        "/export",
        json!({ "date": "2024-03-15", "employee_ids": ["emp_002", "emp_001"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let hours = body["adjustment_hours"].as_array().unwrap();
    assert_eq!(hours.len(), 2);
    let decimal = |value: &Value| value.as_str().unwrap().parse::<Decimal>().unwrap();

    assert_eq!(hours[0]["employee_id"], "emp_002");
    assert_eq!(decimal(&hours[0]["daily_hours"]), Decimal::new(733, 2));
    assert_eq!(decimal(&hours[0]["night_premium_hours"]), Decimal::new(117, 2));
    assert_eq!(hours[0]["overtime_distribution"], "100");

    assert_eq!(hours[1]["employee_id"], "emp_001");
    assert_eq!(decimal(&hours[1]["overtime_hours"]), Decimal::new(25, 1));
    assert_eq!(decimal(&hours[1]["delay_hours"]), Decimal::new(25, 2));
    assert_eq!(hours[1]["overtime_distribution"], "50");

    // The sheets keep the typed text.
    assert_eq!(body["sheets"][1]["rows"][0][6], "07:20");
}

#[tokio::test]
async fn test_export_month_period() {
    let router = create_router_for_test();
    register_manual(&router, "emp_002", "ENTRADA", "2024-03-02T08:00:00").await;
    register_manual(&router, "emp_002", "ENTRADA", "2024-03-28T08:00:00").await;

    let (_, body) = post(
        &router,
        "/export",
        json!({ "date": "2024-03-15", "period": "month", "employee_ids": ["emp_002"] }),
    )
    .await;
    let rows = body["sheets"][1]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][1], "02/03/2024");
    assert_eq!(rows[1][1], "28/03/2024");
    assert_eq!(rows[0][9], "01:10:00");
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_unknown_employee_returns_404() {
    let router = create_router_for_test();
    let (status, body) = get(&router, "/employees/emp_404/month?reference=2024-03-15").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "EMPLOYEE_NOT_FOUND");

    let (status, _) = post(
        &router,
        "/punches/recognized",
        json!({ "employee_id": "emp_404", "timestamp": "2024-03-04T08:00:00" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(&router, "/export", json!({ "employee_ids": ["emp_404"] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_timestamp_returns_400() {
    let router = create_router_for_test();
    let (status, body) = post(
        &router,
        "/punches",
        json!({ "employee_id": "emp_001", "kind": "ENTRADA", "timestamp": "yesterday" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PUNCH");
}

#[tokio::test]
async fn test_unknown_kind_returns_400() {
    let router = create_router_for_test();
    let (status, body) = post(
        &router,
        "/summarize",
        json!({ "punches": [punch("PAUSA", "2024-03-04T10:00:00")] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PUNCH");
}
