//! Performance benchmarks for the attendance engine.
//!
//! Covers the pure calculators directly and the summary endpoint through the
//! router:
//! - Daily summary of a canonical four-punch day
//! - Monthly aggregation of a month of punches
//! - Export projection for a batch of employees
//! - `/summarize` round trip through axum
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use attendance_engine::api::{AppState, create_router};
use attendance_engine::calculation::{ExportProjector, aggregate_month, summarize};
use attendance_engine::calendar::LocalCalendar;
use attendance_engine::config::{AttendancePolicy, ConfigLoader, ExportSettings};
use attendance_engine::models::{AdjustmentFields, Employee, Punch, PunchKind};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

/// Creates a test state with loaded configuration.
fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    AppState::new(config)
}

/// Four punches per day for `days` consecutive days starting 2024-03-01.
fn create_punches(employee_id: &str, days: i64, calendar: &LocalCalendar) -> Vec<Punch> {
    let first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    (0..days)
        .flat_map(|offset| {
            let date = first + Duration::days(offset);
            [
                (PunchKind::Saida, "17:00:00"),
                (PunchKind::Entrada, "08:05:00"),
                (PunchKind::VoltaAlmoco, "13:00:00"),
                (PunchKind::EntradaAlmoco, "12:00:00"),
            ]
            .map(|(kind, time)| {
                let timestamp = calendar
                    .parse_timestamp(&format!("{}T{}", date, time))
                    .unwrap();
                Punch::new(employee_id, kind, timestamp)
            })
        })
        .collect()
}

/// Benchmark: Daily summary of one unordered day.
fn bench_daily_summary(c: &mut Criterion) {
    let calendar = LocalCalendar::utc();
    let policy = AttendancePolicy::default();
    let punches = create_punches("emp_bench_001", 1, &calendar);

    c.bench_function("daily_summary", |b| {
        b.iter(|| black_box(summarize(black_box(&punches), &policy, &calendar)))
    });
}

/// Benchmark: Monthly aggregation plus totals.
fn bench_monthly(c: &mut Criterion) {
    let calendar = LocalCalendar::utc();
    let policy = AttendancePolicy::default();
    let punches = create_punches("emp_bench_001", 31, &calendar);
    let reference = NaiveDate::from_ymd_opt(2024, 3, 15);

    c.bench_function("monthly_aggregate_31_days", |b| {
        b.iter(|| {
            let report = aggregate_month(black_box(&punches), reference, &calendar).unwrap();
            black_box(report.totals(&policy, &calendar))
        })
    });
}

/// Benchmark: Export projection scaling with employee count.
fn bench_export_scaling(c: &mut Criterion) {
    let calendar = LocalCalendar::utc();
    let policy = AttendancePolicy::default();
    let settings = ExportSettings::default();
    let reference = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    let mut group = c.benchmark_group("export");

    for employee_count in [1usize, 10, 100].iter() {
        let employees: Vec<Employee> = (0..*employee_count)
            .map(|i| Employee::new(format!("emp_{:04}", i), format!("Colaborador Número {:04}", i)))
            .collect();
        let punches: HashMap<String, Vec<Punch>> = employees
            .iter()
            .map(|e| (e.id.clone(), create_punches(&e.id, 22, &calendar)))
            .collect();
        let adjustments: HashMap<String, AdjustmentFields> = employees
            .iter()
            .map(|e| {
                (e.id.clone(), AdjustmentFields {
                    employee_id: e.id.clone(),
                    daily_hours: "08:00".to_string(),
                    ..Default::default()
                })
            })
            .collect();

        group.throughput(Throughput::Elements(*employee_count as u64));
        group.bench_with_input(
            BenchmarkId::new("employees", employee_count),
            employee_count,
            |b, _| {
                b.iter(|| {
                    let projector = ExportProjector::new(&policy, &calendar, &settings);
                    black_box(projector.project(&employees, &punches, &adjustments, reference))
                })
            },
        );
    }

    group.finish();
}

/// Benchmark: `/summarize` through the router.
fn bench_summarize_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(create_test_state());
    let body = serde_json::json!({
        "punches": [
            { "kind": "SAIDA", "timestamp": "2024-03-04T17:00:00" },
            { "kind": "ENTRADA", "timestamp": "2024-03-04T08:00:00" },
            { "kind": "VOLTA_ALMOCO", "timestamp": "2024-03-04T13:00:00" },
            { "kind": "ENTRADA_ALMOCO", "timestamp": "2024-03-04T12:00:00" }
        ]
    })
    .to_string();

    c.bench_function("summarize_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/summarize")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_daily_summary,
    bench_monthly,
    bench_export_scaling,
    bench_summarize_endpoint,
);
criterion_main!(benches);
