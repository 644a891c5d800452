//! Salary systems, assignment to profiles and payroll calculation

mod common;

use common::TestApp;
use http::StatusCode;
use serde_json::{Value, json};

/// 2026-01-01T00:00:00Z
const PERIOD_START: i64 = 1_767_225_600_000;
const HOUR: i64 = 3_600_000;

fn cast_system() -> Value {
    json!({
        "name": "Cast standard",
        "target": "cast",
        "hourly": {
            "pay_type": "hourly",
            "amount": 1200,
            "time_unit_minutes": 15,
            "time_rounding": "down"
        },
        "backs": {
            "shimei": {
                "calculation_type": "fixed",
                "fixed_amount": 1000,
                "rounding_unit": 1,
                "variable": null
            }
        },
        "deductions": [
            {"id": "", "name": "Uniform", "deduction_type": "fixed", "amount": 500, "order": 0}
        ]
    })
}

fn period_input() -> Value {
    json!({
        "period_start": PERIOD_START,
        "period_end": PERIOD_START + 31 * 24 * HOUR,
        "attendances": [
            {"clock_in": PERIOD_START + 20 * HOUR, "clock_out": PERIOD_START + 25 * HOUR, "break_minutes": 60}
        ],
        "events": [
            {"category": "shimei", "occurred_at": PERIOD_START + 21 * HOUR, "total": 20000},
            {"category": "shimei", "occurred_at": PERIOD_START + 22 * HOUR, "total": 30000}
        ]
    })
}

#[tokio::test]
async fn test_assigned_system_drives_payroll() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let (status, system) = app.post("/api/salary-systems", &token, cast_system()).await;
    assert_eq!(status, StatusCode::OK);
    let system_id = system["id"].as_i64().unwrap();
    // blank deduction ids are filled in
    assert!(!system["deductions"][0]["id"].as_str().unwrap().is_empty());

    let mio = app
        .create("/api/profiles", &token, json!({"display_name": "Mio", "role": "cast"}))
        .await;

    // no system yet
    let mut request = period_input();
    request["profile_id"] = json!(mio);
    let (status, body) = app.post("/api/payroll/calculate", &token, request.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6005);

    let (status, _) = app
        .put(
            &format!("/api/profiles/{mio}/salary-systems"),
            &token,
            json!({"salary_system_ids": [system_id]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, pay) = app.post("/api/payroll/calculate", &token, request).await;
    assert_eq!(status, StatusCode::OK);
    // 5h worked, 1h break -> 240 paid minutes at 1200/h
    assert_eq!(pay["worked_minutes"], 300);
    assert_eq!(pay["paid_minutes"], 240);
    assert_eq!(pay["hourly_pay"], 4800);
    assert_eq!(pay["back_total"], 2000);
    assert_eq!(pay["gross"], 6800);
    assert_eq!(pay["deduction_total"], 500);
    assert_eq!(pay["net"], 6300);

    // assigned systems cannot be deleted
    let (status, body) = app
        .request(
            http::Method::DELETE,
            &format!("/api/salary-systems/{system_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 6002);
}

#[tokio::test]
async fn test_simulate_matches_calculate_without_assignment() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let system_id = app.create("/api/salary-systems", &token, cast_system()).await;

    let (status, pay) = app
        .post(&format!("/api/salary-systems/{system_id}/simulate"), &token, period_input())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pay["net"], 6300);

    let mut bad_period = period_input();
    bad_period["period_end"] = json!(PERIOD_START);
    let (status, _) = app
        .post(&format!("/api/salary-systems/{system_id}/simulate"), &token, bad_period)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_staff_system_cannot_be_assigned_to_cast() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let mut staff_system = cast_system();
    staff_system["name"] = json!("Staff hourly");
    staff_system["target"] = json!("staff");
    let system_id = app.create("/api/salary-systems", &token, staff_system).await;
    let mio = app
        .create("/api/profiles", &token, json!({"display_name": "Mio", "role": "cast"}))
        .await;

    let (status, body) = app
        .put(
            &format!("/api/profiles/{mio}/salary-systems"),
            &token,
            json!({"salary_system_ids": [system_id]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6004);
}

#[tokio::test]
async fn test_invalid_system_is_rejected() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let mut system = cast_system();
    system["hourly"]["time_unit_minutes"] = json!(0);
    let (status, _) = app.post("/api/salary-systems", &token, system).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let mut huge_rate = cast_system();
    huge_rate["hourly"]["amount"] = json!(i64::MAX);
    let (status, _) = app.post("/api/salary-systems", &token, huge_rate).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let system_id = app.create("/api/salary-systems", &token, cast_system()).await;
    let uri = format!("/api/salary-systems/{system_id}/simulate");

    let mut huge_sale = period_input();
    huge_sale["events"][0]["total"] = json!(i64::MAX);
    let (status, _) = app.post(&uri, &token, huge_sale).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut endless_shift = period_input();
    endless_shift["attendances"][0]["clock_out"] = json!(i64::MAX);
    let (status, _) = app.post(&uri, &token, endless_shift).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
