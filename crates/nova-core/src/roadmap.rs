//! ROI derivation for the roadmap and financials views.
//!
//! Catalog ROI figures are free text ("$50,000 - $80,000", "Reduces
//! approximately 1,200 man-hours per month."). Numbers are pulled out of
//! them here; text without digits yields zero.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogAgent};
use crate::types::round_dp;

/// Blended internal hourly rate saved per automated man-hour.
pub const HOURLY_RATE: f64 = 50.0;
/// Annual infrastructure cost as a fraction of the build cost.
pub const INFRA_MULTIPLIER: f64 = 0.2;

// ---------------------------------------------------------------------------
// Text parsing
// ---------------------------------------------------------------------------

/// Every run that starts with a digit and continues with digits or commas,
/// with the commas removed.
fn digit_groups(text: &str) -> impl Iterator<Item = f64> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        let start = rest.find(|c: char| c.is_ascii_digit())?;
        let tail = &rest[start..];
        let len = tail
            .find(|c: char| !(c.is_ascii_digit() || c == ','))
            .unwrap_or(tail.len());
        let group: String = tail[..len].chars().filter(char::is_ascii_digit).collect();
        rest = &tail[len..];
        group.parse::<f64>().ok()
    })
}

/// Mean of all numbers found in `text`, or 0 when there are none.
pub fn parse_currency_range_average(text: &str) -> f64 {
    let (sum, count) = digit_groups(text).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// The first number found in `text`, or 0 when there is none.
pub fn parse_hours(text: &str) -> f64 {
    digit_groups(text).next().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Roadmap items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapItem {
    pub id: String,
    pub name: String,
    pub function: String,
    pub build_cost: f64,
    pub annual_infra_cost: f64,
    pub monthly_hours_saved: f64,
    pub annual_savings_value: f64,
    pub total_first_year_cost: f64,
    pub roi_ratio: f64,
    pub score: f64,
}

impl RoadmapItem {
    pub fn from_agent(agent: &CatalogAgent) -> Self {
        let roi = &agent.documentation.roi;
        let build_cost = parse_currency_range_average(&roi.cost_to_build);
        let monthly_hours = parse_hours(&roi.man_hours_reduced);

        let infra = build_cost * INFRA_MULTIPLIER;
        let annual_savings = monthly_hours * 12.0 * HOURLY_RATE;
        let first_year = build_cost + infra;
        let ratio = if first_year > 0.0 {
            annual_savings / first_year
        } else {
            0.0
        };

        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            function: agent.business_function.clone(),
            build_cost,
            annual_infra_cost: infra,
            monthly_hours_saved: monthly_hours,
            annual_savings_value: annual_savings,
            total_first_year_cost: first_year,
            roi_ratio: round_dp(ratio, 2),
            score: round_dp(ratio * 10.0, 1),
        }
    }
}

/// Roadmap items for every coming-soon agent, highest ROI first.
pub fn roadmap_items(catalog: &Catalog) -> Vec<RoadmapItem> {
    let mut items: Vec<RoadmapItem> = catalog.coming_soon().map(RoadmapItem::from_agent).collect();
    items.sort_by(|a, b| b.roi_ratio.total_cmp(&a.roi_ratio));
    items
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapFilter {
    /// Exact business function; empty or "All" means no constraint.
    #[serde(default)]
    pub function: Option<String>,
    /// Case-insensitive substring of the agent name.
    #[serde(default)]
    pub search: Option<String>,
}

impl RoadmapFilter {
    pub fn matches(&self, item: &RoadmapItem) -> bool {
        let function_ok = match self.function.as_deref().map(str::trim) {
            None | Some("") | Some("All") => true,
            Some(f) => item.function == f,
        };
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(s) => item.name.to_lowercase().contains(&s.to_lowercase()),
        };
        function_ok && search_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapSummary {
    pub total_potential_savings: f64,
    pub total_investment: f64,
    pub overall_roi: f64,
    pub item_count: usize,
}

impl RoadmapSummary {
    pub fn from_items(items: &[RoadmapItem]) -> Self {
        let savings: f64 = items.iter().map(|i| i.annual_savings_value).sum();
        let investment: f64 = items.iter().map(|i| i.total_first_year_cost).sum();
        let overall = if investment > 0.0 {
            round_dp(savings / investment, 1)
        } else {
            0.0
        };
        Self {
            total_potential_savings: savings,
            total_investment: investment,
            overall_roi: overall,
            item_count: items.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapReport {
    pub items: Vec<RoadmapItem>,
    pub summary: RoadmapSummary,
    /// Distinct functions across all roadmap items (before filtering),
    /// in first-seen order.
    pub functions: Vec<String>,
}

/// Build the filtered roadmap with its aggregates.
pub fn build_report(catalog: &Catalog, filter: &RoadmapFilter) -> RoadmapReport {
    let all = roadmap_items(catalog);
    let mut functions: Vec<String> = Vec::new();
    for item in &all {
        if !functions.contains(&item.function) {
            functions.push(item.function.clone());
        }
    }
    let items: Vec<RoadmapItem> = all.into_iter().filter(|i| filter.matches(i)).collect();
    let summary = RoadmapSummary::from_items(&items);
    RoadmapReport {
        items,
        summary,
        functions,
    }
}

// ---------------------------------------------------------------------------
// Agent financials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiPoint {
    pub month: String,
    pub cost: f64,
    pub savings: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostShare {
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFinancials {
    pub roi_data: Vec<RoiPoint>,
    pub cost_breakdown: Vec<CostShare>,
}

/// Twelve-month cost/savings projection with a fixed cost breakdown.
pub fn agent_financials() -> AgentFinancials {
    let roi_data = (0..12u32)
        .map(|i| {
            let i_f = f64::from(i);
            let cost = 5000.0 + i_f * 200.0;
            let savings = 1000.0 + i_f * i_f * 150.0;
            RoiPoint {
                month: format!("M{}", i + 1),
                cost,
                savings,
                net: savings - cost,
            }
        })
        .collect();

    let cost_breakdown = [
        ("LLM Tokens", 45),
        ("Compute Infra", 20),
        ("Human Oversight", 25),
        ("Maintenance", 10),
    ]
    .into_iter()
    .map(|(name, value)| CostShare {
        name: name.to_string(),
        value,
    })
    .collect();

    AgentFinancials {
        roi_data,
        cost_breakdown,
    }
}
