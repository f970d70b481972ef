use nova_api_types::ApiCustomer;
use nova_core::locale::format_currency;

use super::{get_json, print_json, query_pairs, DisplayLocale};

pub async fn list(
    api_url: &str,
    country: Option<&str>,
    status: Option<&str>,
    display: &DisplayLocale,
    json_output: bool,
) -> anyhow::Result<()> {
    let query = query_pairs(&[("country", country), ("status", status)]);
    let customers: Vec<ApiCustomer> =
        get_json(api_url, "/api/customers", &query, "list customers").await?;

    if json_output {
        return print_json(&customers);
    }
    if customers.is_empty() {
        println!("No customers match.");
        return Ok(());
    }
    for customer in &customers {
        println!("{}", render_row(customer, display));
    }
    println!("{} customer(s)", customers.len());
    Ok(())
}

/// Balances are shown in the client's display currency.
fn render_row(customer: &ApiCustomer, display: &DisplayLocale) -> String {
    format!(
        "{:<14} {:<30} {} {:<14} score {:>3} {:>16}  {}",
        customer.id,
        customer.name,
        customer.country,
        customer.region,
        customer.credit_score,
        format_currency(customer.balance, &display.currency, &display.language),
        customer.status.as_deref().unwrap_or("-"),
    )
}
