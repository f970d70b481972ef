use nova_api_types::ApiCatalogAgent;
use serde::{Deserialize, Serialize};

use super::{get_json, print_json};

#[derive(Debug, Serialize, Deserialize)]
struct CatalogPage {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    agents: Vec<ApiCatalogAgent>,
}

/// Facet query: comma-joined selections, omitted when empty.
fn facet_query(functions: &[String], countries: &[String]) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if !functions.is_empty() {
        query.push(("functions", functions.join(",")));
    }
    if !countries.is_empty() {
        query.push(("countries", countries.join(",")));
    }
    query
}

pub async fn list(
    api_url: &str,
    functions: &[String],
    countries: &[String],
    json_output: bool,
) -> anyhow::Result<()> {
    let page: CatalogPage = get_json(
        api_url,
        "/api/catalog",
        &facet_query(functions, countries),
        "list catalog",
    )
    .await?;

    if json_output {
        return print_json(&page);
    }
    for agent in &page.agents {
        println!(
            "{:<32} {:<12} {:<28} {}",
            agent.id,
            agent.status,
            agent.business_function,
            agent.countries.join(","),
        );
    }
    println!("{} agent(s)", page.total);
    Ok(())
}
