//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use spendly_core::db::Database;
use tempfile::TempDir;
use tower::ServiceExt;

fn setup_test_app() -> (Router, TempDir) {
    let db = Database::in_memory().unwrap();
    let reports_dir = TempDir::new().unwrap();
    let config = ServerConfig {
        require_auth: false,
        allowed_origins: vec![],
        ..Default::default()
    };
    let app = create_router_with_options(
        db,
        None,
        config,
        Some(reports_dir.path().to_path_buf()),
    );
    (app, reports_dir)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn json_request_as(
    method: &str,
    uri: &str,
    user: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-spendly-user", user)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

// ========== Auth ==========

#[tokio::test]
async fn test_auth_required_rejects_anonymous() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        require_auth: true,
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router(db, None, config);

    // No identity, no key: rejected
    let response = app
        .clone()
        .oneshot(get_request("/api/dashboard"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Identity header passes
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/dashboard")
                .header("x-spendly-user", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Valid API key passes
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/dashboard")
                .header("authorization", "Bearer secret-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong key does not
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard")
                .header("authorization", "Bearer wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_reflects_identity() {
    let (app, _dir) = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("x-spendly-user", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["username"], "alice");
}

// ========== Expenses ==========

#[tokio::test]
async fn test_expense_crud_roundtrip() {
    let (app, _dir) = setup_test_app();

    let body = serde_json::json!({
        "category": "Food",
        "amount": "12.50",
        "description": "lunch",
        "occurred_at": "2024-03-05T12:00:00Z"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/expenses", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = get_body_json(response).await;
    assert_eq!(created["category"], "Food");
    assert_eq!(created["amount"], "12.50");
    assert_eq!(created["month_key"], "2024-03");
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/expenses/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/expenses/{}", id),
            serde_json::json!({
                "category": "Transport",
                "amount": "9.00",
                "description": "bus",
                "occurred_at": "2024-03-06T08:00:00Z"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = get_body_json(response).await;
    assert_eq!(updated["category"], "Transport");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/expenses/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request(&format!("/api/expenses/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expense_validation_returns_fields() {
    let (app, _dir) = setup_test_app();

    let body = serde_json::json!({
        "category": "Food",
        "amount": "-5",
        "description": "  ",
        "occurred_at": null
    });
    let response = app
        .oneshot(json_request("POST", "/api/expenses", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = get_body_json(response).await;
    let fields = json["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["field"], "amount");
    assert_eq!(fields[1]["field"], "description");
}

#[tokio::test]
async fn test_expenses_are_isolated_per_user() {
    let (app, _dir) = setup_test_app();

    let body = serde_json::json!({
        "category": "Food",
        "amount": "10",
        "description": "alice's lunch",
        "occurred_at": null
    });
    let response = app
        .clone()
        .oneshot(json_request_as("POST", "/api/expenses", "alice", body))
        .await
        .unwrap();
    let created = get_body_json(response).await;
    let id = created["id"].as_i64().unwrap();

    // Bob cannot see Alice's expense
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/expenses/{}", id))
                .header("x-spendly-user", "bob")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/expenses")
                .header("x-spendly-user", "bob")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["expenses"].as_array().unwrap().len(), 0);
}

// ========== Dashboard ==========

#[tokio::test]
async fn test_dashboard_savings_identity() {
    let (app, _dir) = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/profile",
            serde_json::json!({ "monthly_salary": "5000" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Current-month records so the dashboard picks them up
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            serde_json::json!({
                "category": "Bills",
                "amount": "1200",
                "description": "rent",
                "occurred_at": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/investments",
            serde_json::json!({
                "investment_type": "Stocks",
                "amount": "800",
                "description": "brokerage",
                "occurred_at": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/api/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;

    assert_eq!(json["summary"]["total_income"], "5000");
    assert_eq!(json["summary"]["total_expenses"], "1200");
    assert_eq!(json["summary"]["total_investments"], "800");
    assert_eq!(json["summary"]["total_savings"], "3000");
    assert_eq!(json["trend"].as_array().unwrap().len(), 6);
    assert_eq!(json["recent_expenses"].as_array().unwrap().len(), 1);
}

// ========== Budgets ==========

#[tokio::test]
async fn test_budget_overspend() {
    let (app, _dir) = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/budgets",
            serde_json::json!({
                "category": "Food",
                "allocated_amount": "1000",
                "month": "2024-03"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            serde_json::json!({
                "category": "Food",
                "amount": "1200",
                "description": "groceries",
                "occurred_at": "2024-03-10T12:00:00Z"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/budgets?month=2024-03"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;

    let budgets = json["budgets"].as_array().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0]["spent"], "1200");
    assert_eq!(budgets[0]["remaining"], "-200");
    assert_eq!(budgets[0]["percent_used"], "120.00");
}

// ========== Analytics ==========

#[tokio::test]
async fn test_analytics_fresh_user_has_twelve_zero_points() {
    let (app, _dir) = setup_test_app();

    let response = app
        .oneshot(get_request("/api/analytics?month=2024-03"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;

    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 12);
    assert_eq!(series[0]["month"], "2023-04");
    assert_eq!(series[11]["month"], "2024-03");
    assert!(series.iter().all(|p| p["expenses"] == "0"));
    assert_eq!(json["savings_rate"], "0");
}

#[tokio::test]
async fn test_analytics_rejects_bad_month() {
    let (app, _dir) = setup_test_app();

    let response = app
        .oneshot(get_request("/api/analytics?month=notamonth"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Reports ==========

#[tokio::test]
async fn test_report_generation_is_idempotent() {
    let (app, _dir) = setup_test_app();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            serde_json::json!({
                "category": "Food",
                "amount": "100",
                "description": "food",
                "occurred_at": "2024-03-10T12:00:00Z"
            }),
        ))
        .await
        .unwrap();

    let gen_body = serde_json::json!({ "month": "2024-03" });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/reports", gen_body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = get_body_json(response).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/reports", gen_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = get_body_json(response).await;
    assert_eq!(first["id"], second["id"]);

    // Exactly one report row
    let response = app.clone().oneshot(get_request("/api/reports")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    // Artifact is downloadable
    let response = app
        .oneshot(get_request("/api/reports/2024-03/artifact"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("Month: 2024-03"));
    assert!(text.contains("Total Expenses:    100"));
}

#[tokio::test]
async fn test_missing_report_is_404() {
    let (app, _dir) = setup_test_app();

    let response = app
        .oneshot(get_request("/api/reports/2019-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Export ==========

#[tokio::test]
async fn test_expense_export_csv() {
    let (app, _dir) = setup_test_app();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            serde_json::json!({
                "category": "Food",
                "amount": "12.50",
                "description": "lunch",
                "occurred_at": "2024-03-05T12:00:00Z"
            }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get_request("/api/export/expenses"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap(),
        "text/csv; charset=utf-8"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("date,category,amount,description"));
    assert!(text.contains("2024-03-05,Food,12.50,lunch"));
}

// ========== Summary ==========

#[tokio::test]
async fn test_monthly_summary_endpoint() {
    let (app, _dir) = setup_test_app();

    app.clone()
        .oneshot(json_request(
            "PUT",
            "/api/profile",
            serde_json::json!({ "monthly_salary": "4000" }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get_request("/api/summary/2024-07"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["month"], "2024-07");
    assert_eq!(json["total_income"], "4000");
    assert_eq!(json["total_savings"], "4000");
}

#[test]
fn test_validate_api_key_constant_time() {
    let keys = vec!["alpha".to_string(), "beta-key".to_string()];
    assert!(validate_api_key("alpha", &keys));
    assert!(validate_api_key("beta-key", &keys));
    assert!(!validate_api_key("alph", &keys));
    assert!(!validate_api_key("", &keys));
    assert!(!validate_api_key("gamma", &keys));
}

#[test]
fn test_decimal_budget_sums() {
    // Decimal sums used in BudgetsResponse stay exact
    let values = [dec!(0.1), dec!(0.2)];
    let sum: rust_decimal::Decimal = values.iter().copied().sum();
    assert_eq!(sum, dec!(0.3));
}
