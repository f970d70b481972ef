use nova_api_types::{AdvanceRequest, ApiInvoice};
use nova_core::locale::{format_currency, format_date, format_date_time};
use serde::Deserialize;

use super::{api_client, check_response, friendly_error, get_json, print_json, query_pairs};

/// Filters for `nova invoices`; every field maps to a query parameter.
#[derive(Debug, Clone, Default)]
pub struct InvoiceQuery {
    pub stage: Option<String>,
    pub customer: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl InvoiceQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        query_pairs(&[
            ("stage", self.stage.as_deref()),
            ("customer", self.customer.as_deref()),
            ("from", self.from.as_deref()),
            ("to", self.to.as_deref()),
        ])
    }
}

pub async fn list(
    api_url: &str,
    query: &InvoiceQuery,
    lang: &str,
    json_output: bool,
) -> anyhow::Result<()> {
    let invoices: Vec<ApiInvoice> =
        get_json(api_url, "/api/invoices", &query.params(), "list invoices").await?;

    if json_output {
        return print_json(&invoices);
    }
    if invoices.is_empty() {
        println!("No invoices match.");
        return Ok(());
    }
    for invoice in &invoices {
        println!("{}", render_row(invoice, lang));
    }
    println!("{} invoice(s)", invoices.len());
    Ok(())
}

fn render_row(invoice: &ApiInvoice, lang: &str) -> String {
    format!(
        "{:<12} {:<28} {:>16} {:<18} {} {}",
        invoice.id,
        invoice.customer_name,
        format_currency(invoice.amount, &invoice.currency, lang),
        invoice.stage,
        invoice.country,
        format_date(&invoice.issue_date, lang),
    )
}

#[derive(Debug, Deserialize)]
struct StageChangeView {
    changed: bool,
    invoice: ApiInvoice,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineView {
    #[serde(default)]
    activity_timeline: Vec<TimelineEntryView>,
}

#[derive(Debug, Deserialize)]
struct TimelineEntryView {
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    user: String,
}

fn advance_message(view: &StageChangeView, timeline: &TimelineView, lang: &str) -> String {
    if !view.changed {
        return format!("{} is already {}; nothing to do", view.invoice.id, view.invoice.stage);
    }
    match timeline.activity_timeline.last() {
        Some(entry) => format!(
            "{} advanced to {} by {} ({})",
            view.invoice.id,
            view.invoice.stage,
            entry.user,
            format_date_time(&entry.timestamp, lang),
        ),
        None => format!("{} advanced to {}", view.invoice.id, view.invoice.stage),
    }
}

/// Move invoice `id` one stage forward.
pub async fn advance(
    api_url: &str,
    id: &str,
    user: Option<String>,
    lang: &str,
    json_output: bool,
) -> anyhow::Result<()> {
    let resp = api_client()
        .post(format!("{api_url}/api/invoices/{id}/advance"))
        .json(&AdvanceRequest { user })
        .send()
        .await
        .map_err(friendly_error)?;
    let resp = check_response("advance invoice", resp).await?;
    let body: serde_json::Value = resp.json().await.map_err(friendly_error)?;

    if json_output {
        return print_json(&body);
    }
    let timeline: TimelineView = serde_json::from_value(body["invoice"].clone()).unwrap_or_default();
    let view: StageChangeView = serde_json::from_value(body)?;
    println!("{}", advance_message(&view, &timeline, lang));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        extract::{Path, Query},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    use super::super::test_support::serve;
    use super::super::display_locale;
    use super::*;

    #[test]
    fn params_only_include_given_filters() {
        let query = InvoiceQuery {
            stage: Some("approved".into()),
            to: Some("2024-06-30".into()),
            ..Default::default()
        };
        assert_eq!(
            query.params(),
            vec![("stage", "approved".to_string()), ("to", "2024-06-30".to_string())]
        );
    }

    fn acme_invoice() -> ApiInvoice {
        ApiInvoice {
            id: "INV-000001".into(),
            customer_name: "Acme GmbH".into(),
            amount: 1234.56,
            currency: "EUR".into(),
            stage: "approved".into(),
            country: "DE".into(),
            issue_date: "2024-03-05T10:00:00Z".into(),
            ..Default::default()
        }
    }

    #[test]
    fn row_shows_formatted_amount_and_date() {
        let row = render_row(&acme_invoice(), "en");
        assert!(row.starts_with("INV-000001"));
        assert!(row.contains("1,234.56"));
        assert!(row.ends_with("DE Mar 5, 2024"), "{row}");
    }

    #[test]
    fn row_follows_german_locale() {
        let row = render_row(&acme_invoice(), "de");
        assert!(row.contains("1.234,56\u{a0}€"), "{row}");
        assert!(row.ends_with("DE 05.03.2024"), "{row}");
    }

    #[tokio::test]
    async fn saved_german_settings_drive_rows() {
        let app = Router::new().route(
            "/api/settings",
            get(|| async {
                Json(json!({"settings": {"country": "DE", "language": "de", "currency": "EUR"}}))
            }),
        );
        let base = serve(app).await;
        let display = display_locale(&base, None).await.unwrap();
        let row = render_row(&acme_invoice(), &display.language);
        assert!(row.contains("1.234,56\u{a0}€"), "{row}");
    }

    #[tokio::test]
    async fn list_forwards_filters_as_query() {
        let app = Router::new().route(
            "/api/invoices",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("stage").map(String::as_str), Some("paid"));
                assert!(!q.contains_key("customer"));
                Json(json!([{"id": "INV-000002", "stage": "paid", "amount": 10.0, "currency": "USD"}]))
            }),
        );
        let base = serve(app).await;
        let query = InvoiceQuery {
            stage: Some("paid".into()),
            ..Default::default()
        };
        assert!(list(&base, &query, "en", false).await.is_ok());
    }

    #[tokio::test]
    async fn advance_reports_no_op_at_paid() {
        let app = Router::new().route(
            "/api/invoices/{id}/advance",
            post(|Path(id): Path<String>| async move {
                Json(json!({"changed": false, "invoice": {"id": id, "stage": "paid"}}))
            }),
        );
        let base = serve(app).await;
        assert!(advance(&base, "INV-000003", None, "en", false).await.is_ok());
    }

    #[test]
    fn advance_message_shows_localized_time() {
        let body = json!({
            "changed": true,
            "invoice": {
                "id": "INV-000004",
                "stage": "approved",
                "activityTimeline": [
                    {"stage": "sent_for_approval", "timestamp": "2025-01-15T09:00:00Z", "user": "system"},
                    {"stage": "approved", "timestamp": "2025-01-15T14:05:00Z", "user": "ops"}
                ]
            }
        });
        let timeline: TimelineView = serde_json::from_value(body["invoice"].clone()).unwrap();
        let view: StageChangeView = serde_json::from_value(body).unwrap();
        assert_eq!(
            advance_message(&view, &timeline, "de"),
            "INV-000004 advanced to approved by ops (15.01.2025, 14:05)"
        );
    }

    #[tokio::test]
    async fn advance_unknown_invoice_fails() {
        let app = Router::new().route(
            "/api/invoices/{id}/advance",
            post(|| async {
                (
                    axum::http::StatusCode::NOT_FOUND,
                    Json(json!({"error": "invoice not found"})),
                )
            }),
        );
        let base = serve(app).await;
        let err = advance(&base, "INV-999999", Some("ops".into()), "en", false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invoice not found"));
    }
}
