use std::path::Path;

use nova_api_types::ApiMetricSummary;
use nova_core::locale::{format_number, format_percentage};

use super::{api_client, check_response, friendly_error, get_json, print_json, query_pairs};

pub async fn summary(
    api_url: &str,
    agent: Option<&str>,
    country: Option<&str>,
    lang: &str,
    json_output: bool,
) -> anyhow::Result<()> {
    let query = query_pairs(&[("agent", agent), ("country", country)]);
    let rows: Vec<ApiMetricSummary> =
        get_json(api_url, "/api/metrics/summary", &query, "summarize metrics").await?;

    if json_output {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No metrics match.");
        return Ok(());
    }
    println!(
        "{:<28} {:>7} {:>10} {:>9} {:>6} {:>6} {:>9}",
        "Agent", "Samples", "Volume", "Accuracy", "+", "-", "Avg (s)"
    );
    for row in &rows {
        println!("{}", render_row(row, lang));
    }
    Ok(())
}

fn render_row(row: &ApiMetricSummary, lang: &str) -> String {
    format!(
        "{:<28} {:>7} {:>10} {:>9} {:>6} {:>6} {:>9}",
        row.agent,
        row.count,
        format_number(row.total_volume as f64, lang, Some(0)),
        format_percentage(row.average_accuracy, lang),
        row.positive_feedback,
        row.negative_feedback,
        format_number(row.average_processing_time, lang, Some(1)),
    )
}

/// Download the filtered metrics as CSV, to `out` or stdout.
pub async fn export_csv(
    api_url: &str,
    agent: Option<&str>,
    country: Option<&str>,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let query = query_pairs(&[("agent", agent), ("country", country)]);
    let resp = api_client()
        .get(format!("{api_url}/api/metrics/export"))
        .query(&query)
        .send()
        .await
        .map_err(friendly_error)?;
    let resp = check_response("export metrics", resp).await?;
    let csv = resp.text().await.map_err(friendly_error)?;

    match out {
        Some(path) => {
            tokio::fs::write(path, &csv).await?;
            let rows = csv.lines().count().saturating_sub(1);
            println!("wrote {rows} row(s) to {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
