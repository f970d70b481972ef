use nova_core::catalog::Catalog;
use nova_core::locale::{format_currency, format_number};
use nova_core::roadmap::{build_report, RoadmapFilter, RoadmapReport};

use super::print_json;

/// Compute the roadmap locally from the embedded catalog; no daemon needed.
pub fn report(function: Option<String>, search: Option<String>) -> anyhow::Result<RoadmapReport> {
    let catalog = Catalog::embedded()?;
    Ok(build_report(catalog, &RoadmapFilter { function, search }))
}

pub fn run(
    function: Option<String>,
    search: Option<String>,
    lang: &str,
    json_output: bool,
) -> anyhow::Result<()> {
    let report = report(function, search)?;
    if json_output {
        return print_json(&report);
    }

    for item in &report.items {
        println!(
            "{:<40} {:<24} ROI {:>6}  score {:>5}",
            item.name,
            item.function,
            format_number(item.roi_ratio, lang, Some(2)),
            format_number(item.score, lang, Some(1)),
        );
    }
    let summary = &report.summary;
    println!("{}", "-".repeat(40));
    println!("Items:              {}", summary.item_count);
    println!(
        "Potential savings:  {}",
        format_currency(summary.total_potential_savings, "USD", lang)
    );
    println!(
        "Investment:         {}",
        format_currency(summary.total_investment, "USD", lang)
    );
    println!("Overall ROI:        {}x", format_number(summary.overall_roi, lang, Some(1)));
    Ok(())
}
