//! HTTP request handlers for the attendance engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    ExportProjector, KindPresence, aggregate_month, calculate_daily_summary, classify_presence,
    sort_punches,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{AdjustmentFields, Employee, Punch, parse_punches};
use crate::registration::{
    Registration, recognition_roster, register_manual, register_recognized,
};

use super::request::{
    DayQuery, ExportPeriod, ExportRequest, ManualPunchRequest, MonthQuery, PunchListRequest,
    RecognizedPunchRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, ClassifyResponse, DailySummaryResponse, ExportResponse,
    MonthlyResponse, RegistrationResponse, RosterResponse, SheetResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/punches", post(register_manual_handler))
        .route("/punches/recognized", post(register_recognized_handler))
        .route("/classify", post(classify_handler))
        .route("/summarize", post(summarize_handler))
        .route("/employees/:id/day", get(employee_day_handler))
        .route("/employees/:id/month", get(employee_month_handler))
        .route("/recognition/roster", get(roster_handler))
        .route("/export", post(export_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

fn query_rejection_response(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %rejection.body_text(),
        "Query string rejected"
    );
    json_response(
        StatusCode::BAD_REQUEST,
        ApiError::validation_error(rejection.body_text()),
    )
}

fn registration_response(registration: Registration) -> RegistrationResponse {
    RegistrationResponse {
        punch_id: registration.punch_id,
        employee_id: registration.employee_id,
        label: registration.kind.label().to_string(),
        kind: registration.kind,
        timestamp: registration.timestamp,
        rule: registration.rule,
    }
}

/// Handler for POST /punches.
///
/// Stores a punch whose kind was chosen by the caller.
async fn register_manual_handler(
    State(state): State<AppState>,
    payload: Result<Json<ManualPunchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing manual punch");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let result = request
        .into_new_punch(state.config().calendar())
        .and_then(|punch| {
            state.directory().get(&punch.employee_id)?;
            register_manual(state.punches(), punch)
        });

    match result {
        Ok(registration) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %registration.employee_id,
                kind = %registration.kind,
                "Manual punch stored"
            );
            json_response(StatusCode::CREATED, registration_response(registration))
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /punches/recognized.
///
/// Classifies and stores a punch for an employee resolved by face recognition.
async fn register_recognized_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecognizedPunchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing recognized punch");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match record_recognized(&state, request) {
        Ok(registration) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %registration.employee_id,
                kind = %registration.kind,
                "Recognized punch stored"
            );
            json_response(StatusCode::CREATED, registration_response(registration))
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn record_recognized(state: &AppState, request: RecognizedPunchRequest) -> EngineResult<Registration> {
    request.validate()?;
    state.directory().get(&request.employee_id)?;
    let calendar = state.config().calendar();
    let timestamp = match request.timestamp.as_deref() {
        Some(text) => calendar.parse_timestamp(text)?,
        None => Utc::now(),
    };
    register_recognized(
        state.punches(),
        calendar,
        &request.employee_id,
        timestamp,
        request.location_label,
    )
}

/// Reads an employee's stored punches between two local bounds.
fn load_punches(
    state: &AppState,
    employee_id: &str,
    bounds: EngineResult<(DateTime<Utc>, DateTime<Utc>)>,
) -> EngineResult<Vec<Punch>> {
    state.directory().get(employee_id)?;
    let (start, end) = bounds?;
    state.punches().query_range(employee_id, start, end)
}

/// Handler for POST /classify.
///
/// Returns the kind a new punch would get after the given punches.
async fn classify_handler(
    State(state): State<AppState>,
    payload: Result<Json<PunchListRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing classification request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match parse_punches(request.punches, state.config().calendar()) {
        Ok(punches) => {
            let (kind, rule) = classify_presence(KindPresence::from_punches(&punches));
            info!(
                correlation_id = %correlation_id,
                punch_count = punches.len(),
                kind = %kind,
                "Classification completed"
            );
            json_response(
                StatusCode::OK,
                ClassifyResponse {
                    kind,
                    label: kind.label().to_string(),
                    rule,
                },
            )
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /summarize.
///
/// Summarizes a punch list without touching the store.
async fn summarize_handler(
    State(state): State<AppState>,
    payload: Result<Json<PunchListRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing summary request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let config = state.config();
    let start_time = Instant::now();
    match parse_punches(request.punches, config.calendar()) {
        Ok(punches) => {
            let body = daily_summary_response(None, None, &punches, &state);
            info!(
                correlation_id = %correlation_id,
                punch_count = punches.len(),
                worked_minutes = body.summary.worked_minutes,
                duration_us = start_time.elapsed().as_micros(),
                "Summary completed"
            );
            json_response(StatusCode::OK, body)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn daily_summary_response(
    employee_id: Option<String>,
    date: Option<NaiveDate>,
    punches: &[Punch],
    state: &AppState,
) -> DailySummaryResponse {
    let config = state.config();
    let result = calculate_daily_summary(punches, config.policy(), config.calendar(), 1);
    DailySummaryResponse {
        employee_id,
        date,
        punches: sort_punches(punches),
        summary: result.summary.into(),
        audit_steps: result.audit_steps,
        warnings: result.warnings,
    }
}

/// Handler for GET /employees/{id}/day.
///
/// Summarizes the stored punches of one local day, today by default.
async fn employee_day_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        "Processing daily summary request"
    );

    let query = match query {
        Ok(Query(q)) => q,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    let calendar = state.config().calendar();
    let date = query.date.unwrap_or_else(|| calendar.today());
    match load_punches(&state, &employee_id, calendar.day_bounds(date)) {
        Ok(punches) => {
            let body =
                daily_summary_response(Some(employee_id.clone()), Some(date), &punches, &state);
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                date = %date,
                punch_count = punches.len(),
                "Daily summary completed"
            );
            json_response(StatusCode::OK, body)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /employees/{id}/month.
///
/// Groups the stored punches of a calendar month by day.
async fn employee_month_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        "Processing monthly report request"
    );

    let query = match query {
        Ok(Query(q)) => q,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    let config = state.config();
    let calendar = config.calendar();
    let reference = query.reference.unwrap_or_else(|| calendar.today());
    let start_time = Instant::now();
    let result = load_punches(&state, &employee_id, calendar.month_bounds(reference))
        .and_then(|punches| aggregate_month(&punches, Some(reference), calendar));

    match result {
        Ok(report) => {
            let body = MonthlyResponse {
                employee_id: employee_id.clone(),
                reference: report.reference,
                month_start: report.month_start,
                next_month_start: report.next_month_start,
                days: report
                    .day_summaries(config.policy(), calendar)
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                totals: report.totals(config.policy(), calendar).into(),
            };
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                days = body.days.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Monthly report completed"
            );
            json_response(StatusCode::OK, body)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /recognition/roster.
async fn roster_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    match recognition_roster(state.directory()) {
        Ok(employees) => {
            info!(
                correlation_id = %correlation_id,
                candidates = employees.len(),
                "Recognition roster built"
            );
            json_response(StatusCode::OK, RosterResponse { employees })
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /export.
///
/// Projects the selected employees' punches onto a workbook.
async fn export_handler(
    State(state): State<AppState>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing export request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match perform_export(&state, &request) {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                workbook = %body.name,
                sheets = body.sheets.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Export completed"
            );
            json_response(StatusCode::OK, body)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Gathers punches and adjustments and projects them onto a workbook.
fn perform_export(state: &AppState, request: &ExportRequest) -> EngineResult<ExportResponse> {
    let config = state.config();
    let calendar = config.calendar();
    let reference_date = request.date.unwrap_or_else(|| calendar.today());

    let employees: Vec<Employee> = match &request.employee_ids {
        Some(ids) => ids
            .iter()
            .map(|id| state.directory().get(id))
            .collect::<EngineResult<_>>()?,
        None => state.directory().list_active()?,
    };

    let (start, end) = match request.period {
        ExportPeriod::Day => calendar.day_bounds(reference_date)?,
        ExportPeriod::Month => calendar.month_bounds(reference_date)?,
    };

    let mut punches: HashMap<String, Vec<Punch>> = HashMap::with_capacity(employees.len());
    for employee in &employees {
        let found = state.punches().query_range(&employee.id, start, end)?;
        punches.insert(employee.id.clone(), found);
    }

    let ids: Vec<String> = employees.iter().map(|e| e.id.clone()).collect();
    let adjustments = state.adjustments().get_by_employee_ids(&ids)?;

    let workbook = ExportProjector::new(config.policy(), calendar, config.export()).project(
        &employees,
        &punches,
        &adjustments,
        reference_date,
    );

    let sheets = workbook
        .sheets()
        .into_iter()
        .map(|sheet| {
            let csv = if request.include_csv {
                let mut buffer = Vec::new();
                sheet.write_csv(&mut buffer)?;
                Some(String::from_utf8(buffer).map_err(|e| EngineError::ExportFailed {
                    message: e.to_string(),
                })?)
            } else {
                None
            };
            let mut response = SheetResponse::from(sheet);
            response.csv = csv;
            Ok(response)
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let adjustment_hours = employees
        .iter()
        .filter_map(|e| adjustments.get(&e.id))
        .map(AdjustmentFields::hours)
        .collect();

    Ok(ExportResponse {
        name: workbook.name,
        reference_date: workbook.reference_date,
        sheets,
        adjustment_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        AppState::new(config)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_classify_empty_list_returns_entrada() {
        let router = create_router(create_test_state());
        let (status, body) = send(router, post_json("/classify", json!({ "punches": [] }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "ENTRADA");
        assert_eq!(body["label"], "Entrada");
        assert_eq!(body["rule"], "missing_entrada");
    }

    #[tokio::test]
    async fn test_classify_rejects_unknown_kind() {
        let router = create_router(create_test_state());
        let (status, body) = send(
            router,
            post_json(
                "/classify",
                json!({ "punches": [{ "kind": "PAUSA", "timestamp": "2024-03-04T08:00:00" }] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PUNCH");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/summarize")
            .header("Content-Type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let router = create_router(create_test_state());
        let (status, body) = send(
            router,
            post_json("/punches", json!({ "employee_id": "emp_001", "kind": "ENTRADA" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_manual_punch_for_unknown_employee_returns_404() {
        let router = create_router(create_test_state());
        let (status, body) = send(
            router,
            post_json(
                "/punches",
                json!({
                    "employee_id": "emp_404",
                    "kind": "ENTRADA",
                    "timestamp": "2024-03-04T08:00:00"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "EMPLOYEE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_day_query_rejects_bad_date() {
        let router = create_router(create_test_state());
        let request = Request::builder()
            .uri("/employees/emp_001/day?date=04-03-2024")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_roster_lists_active_employees_with_photo() {
        let router = create_router(create_test_state());
        let request = Request::builder()
            .uri("/recognition/roster")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        let employees = body["employees"].as_array().unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0]["id"], "emp_001");
        assert_eq!(employees[0]["name"], "Ana Beatriz Souza");
    }
}
