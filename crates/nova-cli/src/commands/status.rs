use nova_api_types::StatusResponse;

use super::{get_json, print_json};

/// Run the `status` subcommand: call the API and pretty-print server status.
pub async fn run(api_url: &str, json_output: bool) -> anyhow::Result<()> {
    let status: StatusResponse = get_json(api_url, "/api/status", &[], "fetch status").await?;

    if json_output {
        return print_json(&status);
    }
    print!("{}", render(&status));
    Ok(())
}

fn render(status: &StatusResponse) -> String {
    let auth = if status.auth_required { "api key" } else { "open" };
    let mut out = String::new();
    out.push_str(&format!("nova status  (v{})\n", status.version));
    out.push_str(&format!("{}\n", "-".repeat(40)));
    out.push_str(&format!("Status:          {}\n", status.status));
    out.push_str(&format!("Uptime:          {}s\n", status.uptime_seconds));
    out.push_str(&format!("Auth:            {auth}\n"));
    out.push_str(&format!("Customers:       {}\n", status.customers));
    out.push_str(&format!("Invoices:        {}\n", status.invoices));
    out.push_str(&format!("Agent metrics:   {}\n", status.metrics));
    out.push_str(&format!("Catalog agents:  {}\n", status.catalog_agents));
    out
}

#[cfg(test)]
mod tests {
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    use super::super::test_support::serve;
    use super::*;

    #[test]
    fn render_lists_dataset_sizes() {
        let text = render(&StatusResponse {
            status: "ok".into(),
            version: "1.2.3".into(),
            uptime_seconds: 3600,
            customers: 100,
            invoices: 250,
            metrics: 80,
            catalog_agents: 17,
            auth_required: true,
        });
        assert!(text.starts_with("nova status  (v1.2.3)"));
        assert!(text.contains("Invoices:        250"));
        assert!(text.contains("Catalog agents:  17"));
        assert!(text.contains("Auth:            api key"));
    }

    #[tokio::test]
    async fn status_displays_server_info() {
        let app = Router::new().route(
            "/api/status",
            get(|| async {
                Json(json!({
                    "status": "ok",
                    "version": "0.1.0",
                    "uptime_seconds": 12,
                    "invoices": 3
                }))
            }),
        );
        let base = serve(app).await;
        assert!(run(&base, false).await.is_ok());
        assert!(run(&base, true).await.is_ok());
    }

    #[tokio::test]
    async fn status_fails_on_api_error() {
        let app = Router::new().route(
            "/api/status",
            get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "") }),
        );
        let base = serve(app).await;
        let err = run(&base, false).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
    }
}
