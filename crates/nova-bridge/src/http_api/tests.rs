use super::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use nova_core::catalog::Catalog;
use nova_core::mock_data::{DatasetCounts, MockDataGenerator};
use nova_core::settings::ClientStateStore;
use nova_core::types::InvoiceStage;
use state::ApiState;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn temp_store() -> ClientStateStore {
    ClientStateStore::new(
        std::env::temp_dir()
            .join(format!("nova-bridge-test-{}", Uuid::new_v4()))
            .join("client-state.toml"),
    )
}

fn test_state() -> ApiState {
    let dataset = MockDataGenerator::new(7).dataset(&DatasetCounts {
        customers: 20,
        invoices: 150,
        metrics: 80,
    });
    ApiState::new(dataset, Catalog::embedded().unwrap()).with_state_store(temp_store())
}

/// Build a test router with fresh state.
fn test_app() -> (axum::Router, Arc<ApiState>) {
    let state = Arc::new(test_state());
    let app = router::api_router(state.clone());
    (app, state)
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

async fn send_json(app: axum::Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

/// Id of the first invoice in `stage`.
async fn invoice_in_stage(state: &ApiState, stage: InvoiceStage) -> String {
    state
        .invoices
        .read()
        .await
        .iter()
        .find(|inv| inv.stage == stage)
        .map(|inv| inv.id.clone())
        .unwrap_or_else(|| panic!("no invoice in stage {stage}"))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_status_reports_dataset_sizes() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["customers"], 20);
    assert_eq!(body["invoices"], 150);
    assert_eq!(body["metrics"], 80);
    assert!(body["catalog_agents"].as_u64().unwrap() > 0);
    assert_eq!(body["auth_required"], false);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _state) = test_app();
    let req = Request::builder()
        .uri("/api/status")
        .header("x-request-id", "abc123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc123");
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_invoices_filters_by_stage() {
    let (app, state) = test_app();
    let expected = state
        .invoices
        .read()
        .await
        .iter()
        .filter(|inv| inv.stage == InvoiceStage::Approved)
        .count();

    let (status, body) = get_json(app, "/api/invoices?stage=approved").await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), expected);
    assert!(items.iter().all(|inv| inv["stage"] == "approved"));
}

#[tokio::test]
async fn test_list_invoices_all_means_unfiltered() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/invoices?status=all&stage=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 150);
}

#[tokio::test]
async fn test_list_invoices_rejects_unknown_stage() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/invoices?stage=shipped").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("shipped"));
}

#[tokio::test]
async fn test_list_invoices_rejects_bad_date() {
    let (app, _state) = test_app();
    let (status, _) = get_json(app, "/api/invoices?from=last-week").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_invoice_includes_derived_fields() {
    let (app, state) = test_app();
    let id = invoice_in_stage(&state, InvoiceStage::Validated).await;

    let (status, body) = get_json(app, &format!("/api/invoices/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["status"], "open");
    assert_eq!(body["nextStage"], "sent_for_approval");
    assert!(body["riskLevel"].is_string());
    assert!(body["extractedFields"]["items"].is_array());
}

#[tokio::test]
async fn test_get_invoice_not_found() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/invoices/INV-999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "invoice not found");
}

#[tokio::test]
async fn test_patch_stage_to_next_advances() {
    let (app, state) = test_app();
    let id = invoice_in_stage(&state, InvoiceStage::Received).await;
    let before = state
        .invoices
        .read()
        .await
        .iter()
        .find(|inv| inv.id == id)
        .map(|inv| inv.activity_timeline.len())
        .unwrap();

    let (status, body) = send_json(
        app,
        "PATCH",
        &format!("/api/invoices/{id}/stage"),
        json!({"stage": "extracted", "user": "clerk"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["invoice"]["stage"], "extracted");

    let invoices = state.invoices.read().await;
    let invoice = invoices.iter().find(|inv| inv.id == id).unwrap();
    assert_eq!(invoice.stage, InvoiceStage::Extracted);
    assert_eq!(invoice.activity_timeline.len(), before + 1);
    assert_eq!(invoice.activity_timeline.last().unwrap().user, "clerk");
}

#[tokio::test]
async fn test_patch_stage_to_same_is_noop() {
    let (app, state) = test_app();
    let id = invoice_in_stage(&state, InvoiceStage::Approved).await;

    let (status, body) = send_json(
        app,
        "PATCH",
        &format!("/api/invoices/{id}/stage"),
        json!({"stage": "approved"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], false);
}

#[tokio::test]
async fn test_patch_stage_skip_is_conflict() {
    let (app, state) = test_app();
    let id = invoice_in_stage(&state, InvoiceStage::Received).await;

    let (status, body) = send_json(
        app,
        "PATCH",
        &format!("/api/invoices/{id}/stage"),
        json!({"stage": "paid"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("received"));

    let invoices = state.invoices.read().await;
    let invoice = invoices.iter().find(|inv| inv.id == id).unwrap();
    assert_eq!(invoice.stage, InvoiceStage::Received);
}

#[tokio::test]
async fn test_patch_stage_backwards_is_conflict() {
    let (app, state) = test_app();
    let id = invoice_in_stage(&state, InvoiceStage::Approved).await;

    let (status, _) = send_json(
        app,
        "PATCH",
        &format!("/api/invoices/{id}/stage"),
        json!({"stage": "validated"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_patch_stage_unknown_value_is_bad_request() {
    let (app, state) = test_app();
    let id = invoice_in_stage(&state, InvoiceStage::Approved).await;

    let (status, _) = send_json(
        app,
        "PATCH",
        &format!("/api/invoices/{id}/stage"),
        json!({"stage": "archived"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_advance_without_body() {
    let (app, state) = test_app();
    let id = invoice_in_stage(&state, InvoiceStage::AssignedToPayments).await;
    let metrics = nova_telemetry::metrics::global_metrics();
    let paid_before = metrics.get_counter(invoices::STAGE_TRANSITIONS_TOTAL, &[("to", "paid")]);

    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/invoices/{id}/advance"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["invoice"]["stage"], "paid");
    assert_eq!(body["invoice"]["status"], "paid");
    assert!(body["invoice"]["nextStage"].is_null());
    assert!(metrics.get_counter(invoices::STAGE_TRANSITIONS_TOTAL, &[("to", "paid")]) > paid_before);
}

#[tokio::test]
async fn test_advance_paid_is_noop() {
    let (app, state) = test_app();
    let id = invoice_in_stage(&state, InvoiceStage::Paid).await;

    let (status, body) = send_json(
        app,
        "POST",
        &format!("/api/invoices/{id}/advance"),
        json!({"user": "clerk"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], false);
    assert_eq!(body["invoice"]["stage"], "paid");
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_customer_includes_its_invoices() {
    let (app, state) = test_app();
    let (customer_id, invoice_count) = {
        let invoices = state.invoices.read().await;
        let id = invoices[0].customer_id.clone();
        let count = invoices.iter().filter(|inv| inv.customer_id == id).count();
        (id, count)
    };

    let (status, body) = get_json(app, &format!("/api/customers/{customer_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], customer_id.as_str());
    assert_eq!(body["invoices"].as_array().unwrap().len(), invoice_count);
    let score = body["creditScore"].as_u64().unwrap();
    assert_eq!(body["lowCreditWarning"], score < 600);
    assert!(body["creditBand"].is_string());
}

#[tokio::test]
async fn test_list_customers_score_bounds() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/customers?minScore=600&maxScore=700").await;
    assert_eq!(status, StatusCode::OK);
    for customer in body.as_array().unwrap() {
        let score = customer["creditScore"].as_u64().unwrap();
        assert!((600..=700).contains(&score));
    }
}

#[tokio::test]
async fn test_customer_action_close_order_clears_pending() {
    let (app, state) = test_app();
    let id = state.customers.read().await[0].id.clone();

    let (status, body) = send_json(
        app,
        "POST",
        &format!("/api/customers/{id}/action"),
        json!({"action": "Trigger Close Order", "notes": "agreed by phone"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"]["action"], "Trigger Close Order");
    assert_eq!(body["action"]["user"], "admin");
    assert_eq!(body["customer"]["pendingOrders"], 0);

    let customers = state.customers.read().await;
    assert_eq!(customers[0].action_history.len(), 1);
}

#[tokio::test]
async fn test_customer_action_unknown_is_bad_request() {
    let (app, state) = test_app();
    let id = state.customers.read().await[0].id.clone();

    let (status, _) = send_json(
        app,
        "POST",
        &format!("/api/customers/{id}/action"),
        json!({"action": "Delete Customer"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Agent metrics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_alias_matches() {
    let (app, _state) = test_app();
    let (_, primary) = get_json(app.clone(), "/api/metrics?agent=Invoice%20Processor").await;
    let (_, alias) = get_json(app, "/api/agent-metrics?agent=Invoice%20Processor").await;
    assert_eq!(primary, alias);
    assert!(primary
        .as_array()
        .unwrap()
        .iter()
        .all(|m| m["agent"] == "Invoice Processor"));
}

#[tokio::test]
async fn test_metrics_summary_counts_add_up() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/metrics/summary").await;
    assert_eq!(status, StatusCode::OK);
    let total: u64 = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 80);
}

#[tokio::test]
async fn test_metrics_export_is_csv() {
    let (app, _state) = test_app();
    let req = Request::builder()
        .uri("/api/metrics/export?country=all")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("agent-metrics.csv"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("Date,Agent,Country"));
    assert_eq!(lines.count(), 80);
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_agents() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/agents").await;
    assert_eq!(status, StatusCode::OK);
    let agents = body.as_array().unwrap();
    assert_eq!(agents.len(), 3);
    assert_eq!(agents[0]["name"], "Invoice Processor AI");
    assert_eq!(agents[2]["status"], "coming_soon");
    assert_eq!(agents[1]["documentsProcessed"], 8930);
}

#[tokio::test]
async fn test_agent_detail_is_stable() {
    let (app, _state) = test_app();
    let (status, first) = get_json(app.clone(), "/api/agents/AGENT001").await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = get_json(app, "/api/agents/AGENT001").await;
    assert_eq!(first, second);
    assert_eq!(first["monthlyMetrics"].as_array().unwrap().len(), 12);
    assert_eq!(first["monthlyMetrics"][0]["month"], "Jan 23");
    assert!(first["performanceHistory"][0]["processingTime"].is_number());
}

#[tokio::test]
async fn test_agent_detail_not_found() {
    let (app, _state) = test_app();
    let (status, _) = get_json(app, "/api/agents/AGENT404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_financials_route_wins_over_agent_id() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/agents/financials").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roiData"].as_array().unwrap().len(), 12);
    assert_eq!(body["costBreakdown"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_invoice_workflow_covers_every_stage() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/agents/invoice-processor/workflow").await;
    assert_eq!(status, StatusCode::OK);
    let stages = body["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 7);
    let total: u64 = stages.iter().map(|s| s["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 150);
    assert_eq!(body["recentDocuments"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_customer_insights_analysis() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/agents/customer-insights/analysis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topCustomers"].as_array().unwrap().len(), 5);
    assert_eq!(body["riskAnalysis"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_overview_defaults_to_all() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent"], "all");
    assert_eq!(body["hourlyTraffic"].as_array().unwrap().len(), 24);
}

// ---------------------------------------------------------------------------
// Analytics and countries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_analytics_totals() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/analytics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalInvoices"], 150);
    assert!(body["monthlyTrend"].is_array());
}

#[tokio::test]
async fn test_analytics_date_range() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/analytics?from=2024-01-01&to=2024-12-31").await;
    assert_eq!(status, StatusCode::OK);
    for month in body["monthlyTrend"].as_array().unwrap() {
        assert!(month["month"].as_str().unwrap().starts_with("2024-"));
    }
}

#[tokio::test]
async fn test_countries() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/countries").await;
    assert_eq!(status, StatusCode::OK);
    let countries = body.as_array().unwrap();
    assert_eq!(countries.len(), 15);
    assert!(countries
        .iter()
        .any(|c| c["code"] == "CH" && c["currency"] == "CHF"));
}

// ---------------------------------------------------------------------------
// Catalog and roadmap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_catalog_unfiltered_returns_everything() {
    let (app, state) = test_app();
    let (status, body) = get_json(app, "/api/catalog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], state.catalog.len());
    assert_eq!(body["agents"].as_array().unwrap().len(), state.catalog.len());
}

#[tokio::test]
async fn test_catalog_country_facet() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/catalog?countries=DE,FR").await;
    assert_eq!(status, StatusCode::OK);
    for agent in body["agents"].as_array().unwrap() {
        let countries = agent["countries"].as_array().unwrap();
        assert!(countries.iter().any(|c| c == "DE" || c == "FR"));
    }
    assert_eq!(body["filter"]["countries"], json!(["DE", "FR"]));
}

#[tokio::test]
async fn test_catalog_function_facet() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/catalog?functions=Finance").await;
    assert_eq!(status, StatusCode::OK);
    let agents = body["agents"].as_array().unwrap();
    assert!(!agents.is_empty());
    assert!(agents
        .iter()
        .all(|a| a["businessFunction"].as_str().unwrap().contains("Finance")));
}

#[tokio::test]
async fn test_catalog_functions_and_lookup() {
    let (app, _state) = test_app();
    let (_, functions) = get_json(app.clone(), "/api/catalog/functions").await;
    assert_eq!(functions.as_array().unwrap().len(), 5);

    let (status, body) = get_json(app.clone(), "/api/catalog/invoice-processor").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "invoice-processor");

    let (status, _) = get_json(app, "/api/catalog/no-such-agent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_roadmap_sorted_by_roi() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/roadmap").await;
    assert_eq!(status, StatusCode::OK);
    let ratios: Vec<f64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["roiRatio"].as_f64().unwrap())
        .collect();
    assert!(!ratios.is_empty());
    assert!(ratios.windows(2).all(|w| w[0] >= w[1]));
    assert!(body["summary"]["overallRoi"].is_number());
}

#[tokio::test]
async fn test_roadmap_search_narrows() {
    let (app, _state) = test_app();
    let (_, all) = get_json(app.clone(), "/api/roadmap").await;
    let (_, searched) = get_json(app, "/api/roadmap?search=zzzz-no-match").await;
    assert!(!all["items"].as_array().unwrap().is_empty());
    assert!(searched["items"].as_array().unwrap().is_empty());
    assert_eq!(searched["summary"]["totalInvestment"], 0.0);
}

// ---------------------------------------------------------------------------
// Settings and session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_settings_defaults() {
    let (app, _state) = test_app();
    let (status, body) = get_json(app, "/api/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loggedIn"], false);
    assert_eq!(body["userProfile"]["name"], "John Doe");
    assert_eq!(body["settings"]["currency"], "GBP");
}

#[tokio::test]
async fn test_fresh_settings_follow_configured_locale() {
    let mut config = nova_core::config::Config::default();
    config.locale.default_country = "SE".into();
    config.locale.default_language = Some("en".into());
    let dataset = MockDataGenerator::new(7).dataset(&DatasetCounts {
        customers: 2,
        invoices: 2,
        metrics: 2,
    });
    let state = Arc::new(ApiState::from_config(
        &config,
        dataset,
        Catalog::embedded().unwrap(),
        temp_store(),
    ));

    let (status, body) = get_json(router::api_router(state), "/api/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["country"], "SE");
    assert_eq!(body["settings"]["currency"], "SEK");
    assert_eq!(body["settings"]["language"], "en");
}

#[tokio::test]
async fn test_patch_settings_country_derives_currency() {
    let (app, state) = test_app();
    let (status, body) = send_json(
        app,
        "PATCH",
        "/api/settings",
        json!({"settings": {"country": "DE"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["country"], "DE");
    assert_eq!(body["settings"]["currency"], "EUR");
    assert_eq!(body["settings"]["language"], "de");

    let saved = state.state_store.load().unwrap();
    assert_eq!(saved.settings.currency, "EUR");
}

#[tokio::test]
async fn test_patch_settings_invalid_language_is_atomic() {
    let (app, state) = test_app();
    let (status, _) = send_json(
        app,
        "PATCH",
        "/api/settings",
        json!({"loggedIn": true, "settings": {"language": "xx"}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!state.client_state.read().await.logged_in);
}

#[tokio::test]
async fn test_put_settings_replaces_state() {
    let (app, state) = test_app();
    let (status, body) = send_json(
        app,
        "PUT",
        "/api/settings",
        json!({
            "loggedIn": true,
            "userProfile": {"name": "Jane Roe", "email": "jane@example.com"},
            "settings": {"country": "SE", "language": "sv", "currency": "SEK"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userProfile"]["name"], "Jane Roe");
    assert_eq!(state.client_state.read().await.settings.country, "SE");
}

#[tokio::test]
async fn test_put_settings_rejects_unknown_country() {
    let (app, _state) = test_app();
    let (status, _) = send_json(
        app,
        "PUT",
        "/api/settings",
        json!({"settings": {"country": "ZZ", "language": "en", "currency": "USD"}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (app, state) = test_app();
    let (status, body) = send_json(
        app,
        "POST",
        "/api/session/login",
        json!({"username": "admin", "password": "guess"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");
    assert!(!state.client_state.read().await.logged_in);
}

#[tokio::test]
async fn test_login_and_logout() {
    let state = Arc::new(test_state().with_credentials("demo", "s3cret"));
    let app = router::api_router(state.clone());

    let (status, body) = send_json(
        app.clone(),
        "POST",
        "/api/session/login",
        json!({"username": "demo", "password": "s3cret"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loggedIn"], true);
    assert!(state.client_state.read().await.logged_in);

    let req = Request::builder()
        .method("POST")
        .uri("/api/session/logout")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loggedIn"], false);
    assert!(!state.client_state.read().await.logged_in);
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let state = Arc::new(test_state());
    let app = router::api_router_with_auth(state, Some("k3y".into()), vec![]);

    let (status, _) = get_json(app.clone(), "/api/status").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/status")
        .header("x-api-key", "k3y")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_mock_latency_delays_api_routes() {
    let state = Arc::new(test_state().with_latency(Duration::from_millis(40)));
    let app = router::api_router(state);

    let started = std::time::Instant::now();
    let (status, _) = get_json(app, "/api/countries").await;
    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn test_internal_metrics_export() {
    let (app, _state) = test_app();
    // Generate at least one recorded request first.
    let _ = get_json(app.clone(), "/api/status").await;

    let req = Request::builder()
        .uri("/internal/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("api_requests_total"));
}

#[tokio::test]
async fn test_cors_allows_localhost_origin() {
    let (app, _state) = test_app();
    let req = Request::builder()
        .uri("/api/status")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_cors_ignores_lookalike_origin() {
    let (app, _state) = test_app();
    let req = Request::builder()
        .uri("/api/status")
        .header("origin", "http://localhost.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
