//! Aggregates computed from the mock dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mock_data::{CreditTrendPoint, MockDataGenerator};
use crate::types::{
    round_dp, AgentMetric, Customer, CustomerStatus, Invoice, InvoiceStage, InvoiceStatus,
};

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_dp(part as f64 / total as f64 * 100.0, 1)
    }
}

// ---------------------------------------------------------------------------
// Invoice summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub invoices: usize,
    pub amount: f64,
    pub paid: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyTotal {
    pub currency: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub total_invoices: usize,
    pub validated: usize,
    pub approved: usize,
    pub paid: usize,
    pub validated_rate: f64,
    pub approved_rate: f64,
    pub paid_rate: f64,
    pub accounts_receivable: f64,
    pub accounts_payable: f64,
    pub customer_receivables: f64,
    /// Mean days between the `sent_for_approval` and `approved` entries.
    pub average_approval_time: f64,
    pub monthly_trend: Vec<MonthlyTrend>,
    pub currency_split: Vec<CurrencyTotal>,
}

fn approval_days(invoice: &Invoice) -> Option<f64> {
    let at = |stage: InvoiceStage| {
        invoice
            .activity_timeline
            .iter()
            .find(|e| e.stage == stage)
            .map(|e| e.timestamp)
    };
    let sent = at(InvoiceStage::SentForApproval)?;
    let approved = at(InvoiceStage::Approved)?;
    Some((approved - sent).num_seconds() as f64 / 86_400.0)
}

pub fn invoice_summary<'a, I>(invoices: I, customers: &[Customer]) -> InvoiceSummary
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let mut total = 0;
    let (mut validated, mut approved, mut paid) = (0, 0, 0);
    let (mut receivable, mut payable) = (0.0, 0.0);
    let mut approval = Vec::new();
    let mut months: BTreeMap<String, MonthlyTrend> = BTreeMap::new();
    let mut currencies: BTreeMap<String, f64> = BTreeMap::new();

    for inv in invoices {
        total += 1;
        if inv.stage >= InvoiceStage::Validated {
            validated += 1;
        }
        if inv.stage >= InvoiceStage::Approved {
            approved += 1;
        }
        let is_paid = inv.status() == InvoiceStatus::Paid;
        if is_paid {
            paid += 1;
            payable += inv.amount;
        } else {
            receivable += inv.amount;
        }
        if let Some(days) = approval_days(inv) {
            approval.push(days);
        }

        let key = inv.issue_date.format("%Y-%m").to_string();
        let month = months.entry(key.clone()).or_insert_with(|| MonthlyTrend {
            month: key,
            invoices: 0,
            amount: 0.0,
            paid: 0,
        });
        month.invoices += 1;
        month.amount += inv.amount;
        if is_paid {
            month.paid += 1;
        }

        *currencies.entry(inv.currency.clone()).or_insert(0.0) += inv.amount;
    }

    let average_approval_time = if approval.is_empty() {
        0.0
    } else {
        round_dp(approval.iter().sum::<f64>() / approval.len() as f64, 1)
    };

    InvoiceSummary {
        total_invoices: total,
        validated,
        approved,
        paid,
        validated_rate: percent(validated, total),
        approved_rate: percent(approved, total),
        paid_rate: percent(paid, total),
        accounts_receivable: round_dp(receivable, 2),
        accounts_payable: round_dp(payable, 2),
        customer_receivables: round_dp(customers.iter().map(|c| c.accounts_receivable).sum(), 2),
        average_approval_time,
        monthly_trend: months
            .into_values()
            .map(|mut m| {
                m.amount = round_dp(m.amount, 2);
                m
            })
            .collect(),
        currency_split: currencies
            .into_iter()
            .map(|(currency, amount)| CurrencyTotal {
                currency,
                amount: round_dp(amount, 2),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Invoice workflow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCount {
    pub name: InvoiceStage,
    pub count: usize,
    pub percentage: f64,
}

/// One entry per workflow stage, in workflow order.
pub fn stage_breakdown(invoices: &[Invoice]) -> Vec<StageCount> {
    InvoiceStage::ALL
        .iter()
        .map(|&stage| {
            let count = invoices.iter().filter(|i| i.stage == stage).count();
            StageCount {
                name: stage,
                count,
                percentage: percent(count, invoices.len()),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentDocument {
    pub id: String,
    pub customer: String,
    pub amount: f64,
    pub currency: String,
    pub stage: InvoiceStage,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// The `limit` most recently issued invoices, newest first.
pub fn recent_documents(invoices: &[Invoice], limit: usize) -> Vec<RecentDocument> {
    let mut sorted: Vec<&Invoice> = invoices.iter().collect();
    sorted.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
    sorted
        .into_iter()
        .take(limit)
        .map(|inv| RecentDocument {
            id: inv.id.clone(),
            customer: inv.customer_name.clone(),
            amount: inv.amount,
            currency: inv.currency.clone(),
            stage: inv.stage,
            status: inv.status(),
            date: inv.issue_date.date_naive(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Customer analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub id: String,
    pub name: String,
    pub credit_score: u16,
    pub balance: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBucket {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
    pub customers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAnalysis {
    pub top_customers: Vec<TopCustomer>,
    pub risk_analysis: Vec<RiskBucket>,
    pub trends: Vec<CreditTrendPoint>,
}

const TOP_CUSTOMERS: usize = 5;

pub fn customer_analysis(customers: &[Customer], seed: u64) -> CustomerAnalysis {
    let mut ranked: Vec<&Customer> = customers.iter().collect();
    ranked.sort_by(|a, b| b.credit_score.cmp(&a.credit_score));
    let top_customers = ranked
        .iter()
        .take(TOP_CUSTOMERS)
        .map(|c| TopCustomer {
            id: c.id.clone(),
            name: c.name.clone(),
            credit_score: c.credit_score,
            balance: c.balance,
            trend: if c.balance >= 0.0 { Trend::Up } else { Trend::Down },
        })
        .collect();

    let (at_risk, active): (Vec<&Customer>, Vec<&Customer>) = customers
        .iter()
        .partition(|c| c.status() == CustomerStatus::AtRisk);
    let bucket = |name: &str, members: &[&Customer]| RiskBucket {
        name: name.to_string(),
        count: members.len(),
        percentage: percent(members.len(), customers.len()),
        customers: members.iter().map(|c| c.name.clone()).collect(),
    };
    let risk_analysis = vec![bucket("At Risk", &at_risk), bucket("Low Risk", &active)];

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    let trends = MockDataGenerator::new(seed).credit_trends(start, 12);

    CustomerAnalysis {
        top_customers,
        risk_analysis,
        trends,
    }
}

// ---------------------------------------------------------------------------
// Agent metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub agent: String,
    pub count: usize,
    pub total_volume: u64,
    pub average_accuracy: f64,
    pub positive_feedback: u64,
    pub negative_feedback: u64,
    pub average_processing_time: f64,
}

/// Per-agent aggregates, ordered by agent name.
pub fn summarize_metrics<'a, I>(metrics: I) -> Vec<MetricSummary>
where
    I: IntoIterator<Item = &'a AgentMetric>,
{
    #[derive(Default)]
    struct Acc {
        count: usize,
        volume: u64,
        accuracy: f64,
        positive: u64,
        negative: u64,
        processing: u64,
    }

    let mut by_agent: BTreeMap<&str, Acc> = BTreeMap::new();
    for m in metrics {
        let acc = by_agent.entry(m.agent.as_str()).or_default();
        acc.count += 1;
        acc.volume += u64::from(m.volume);
        acc.accuracy += m.accuracy;
        acc.positive += u64::from(m.positive_feedback);
        acc.negative += u64::from(m.negative_feedback);
        acc.processing += u64::from(m.average_processing_time);
    }

    by_agent
        .into_iter()
        .map(|(agent, acc)| {
            let n = acc.count as f64;
            MetricSummary {
                agent: agent.to_string(),
                count: acc.count,
                total_volume: acc.volume,
                average_accuracy: round_dp(acc.accuracy / n, 2),
                positive_feedback: acc.positive,
                negative_feedback: acc.negative,
                average_processing_time: round_dp(acc.processing as f64 / n, 1),
            }
        })
        .collect()
}

pub const METRICS_CSV_HEADER: &str = "Date,Agent,Country,Volume,Accuracy,Positive Feedback,Negative Feedback,Avg Processing Time (s)";

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV export with a header row and one line per metric.
pub fn metrics_csv<'a, I>(metrics: I) -> String
where
    I: IntoIterator<Item = &'a AgentMetric>,
{
    let mut out = String::from(METRICS_CSV_HEADER);
    out.push('\n');
    for m in metrics {
        let row = [
            m.date.format("%Y-%m-%d").to_string(),
            csv_field(&m.agent),
            csv_field(&m.country),
            m.volume.to_string(),
            m.accuracy.to_string(),
            m.positive_feedback.to_string(),
            m.negative_feedback.to_string(),
            m.average_processing_time.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
