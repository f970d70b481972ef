//! Query filters for the mock REST layer.
//!
//! Raw query parameters arrive as strings (`*Params`) and are parsed into
//! typed filters once. Every predicate is optional and they are AND'd
//! together; an empty filter matches every record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::types::{
    AgentMetric, Customer, CustomerStatus, Invoice, InvoiceStage, InvoiceStatus, ParseEnumError,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid date for '{field}': '{value}' (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate { field: &'static str, value: String },
    #[error("invalid value for '{field}': {source}")]
    InvalidValue {
        field: &'static str,
        source: ParseEnumError,
    },
    #[error("invalid number for '{field}': '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Treat missing or blank values as "no filter".
fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Like [`non_empty`], but the literal `all` also means "no filter".
/// Only selector-style parameters use this; text filters match `all` literally.
fn selected(raw: &Option<String>) -> Option<&str> {
    non_empty(raw).filter(|s| !s.eq_ignore_ascii_case("all"))
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn parse_enum<T>(field: &'static str, raw: &Option<String>) -> Result<Option<T>, QueryError>
where
    T: std::str::FromStr<Err = ParseEnumError>,
{
    selected(raw)
        .map(|s| s.parse::<T>())
        .transpose()
        .map_err(|source| QueryError::InvalidValue { field, source })
}

/// Inclusive lower bound. Date-only values start at midnight UTC.
pub fn parse_from_bound(field: &'static str, raw: &str) -> Result<DateTime<Utc>, QueryError> {
    parse_bound(field, raw, false)
}

/// Inclusive upper bound. Date-only values cover the whole day.
pub fn parse_to_bound(field: &'static str, raw: &str) -> Result<DateTime<Utc>, QueryError> {
    parse_bound(field, raw, true)
}

fn parse_bound(field: &'static str, raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, QueryError> {
    let text = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    let invalid = || QueryError::InvalidDate {
        field,
        value: raw.to_string(),
    };
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid())?;
    let naive = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    naive.map(|n| n.and_utc()).ok_or_else(invalid)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn parse(from: &Option<String>, to: &Option<String>) -> Result<Self, QueryError> {
        Ok(Self {
            from: non_empty(from).map(|s| parse_from_bound("from", s)).transpose()?,
            to: non_empty(to).map(|s| parse_to_bound("to", s)).transpose()?,
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|f| at >= f) && self.to.is_none_or(|t| at <= t)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceParams {
    pub status: Option<String>,
    pub stage: Option<String>,
    pub customer: Option<String>,
    pub country: Option<String>,
    #[serde(alias = "dateFrom")]
    pub from: Option<String>,
    #[serde(alias = "dateTo")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub stage: Option<InvoiceStage>,
    /// Lowercased substring of the customer name.
    pub customer: Option<String>,
    pub country: Option<String>,
    pub issued: DateRange,
}

impl InvoiceFilter {
    pub fn from_params(params: &InvoiceParams) -> Result<Self, QueryError> {
        Ok(Self {
            status: parse_enum("status", &params.status)?,
            stage: parse_enum("stage", &params.stage)?,
            customer: non_empty(&params.customer).map(str::to_lowercase),
            country: non_empty(&params.country).map(str::to_string),
            issued: DateRange::parse(&params.from, &params.to)?,
        })
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.status.is_none_or(|s| invoice.status() == s)
            && self.stage.is_none_or(|s| invoice.stage == s)
            && self
                .customer
                .as_deref()
                .is_none_or(|c| contains_ci(&invoice.customer_name, c))
            && self
                .country
                .as_deref()
                .is_none_or(|c| invoice.country.eq_ignore_ascii_case(c))
            && self.issued.contains(invoice.issue_date)
    }

    pub fn apply<'a>(&self, invoices: &'a [Invoice]) -> Vec<&'a Invoice> {
        invoices.iter().filter(|i| self.matches(i)).collect()
    }
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerParams {
    pub country: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub region: Option<String>,
    pub min_score: Option<String>,
    pub max_score: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub country: Option<String>,
    pub status: Option<CustomerStatus>,
    pub name: Option<String>,
    pub region: Option<String>,
    pub min_score: Option<u16>,
    pub max_score: Option<u16>,
}

fn parse_score(field: &'static str, raw: &Option<String>) -> Result<Option<u16>, QueryError> {
    non_empty(raw)
        .map(|s| {
            s.parse::<u16>().map_err(|_| QueryError::InvalidNumber {
                field,
                value: s.to_string(),
            })
        })
        .transpose()
}

impl CustomerFilter {
    pub fn from_params(params: &CustomerParams) -> Result<Self, QueryError> {
        Ok(Self {
            country: non_empty(&params.country).map(str::to_string),
            status: parse_enum("status", &params.status)?,
            name: non_empty(&params.name).map(str::to_lowercase),
            region: non_empty(&params.region).map(str::to_lowercase),
            min_score: parse_score("minScore", &params.min_score)?,
            max_score: parse_score("maxScore", &params.max_score)?,
        })
    }

    pub fn matches(&self, customer: &Customer) -> bool {
        self.country
            .as_deref()
            .is_none_or(|c| customer.country.eq_ignore_ascii_case(c))
            && self.status.is_none_or(|s| customer.status() == s)
            && self.name.as_deref().is_none_or(|n| contains_ci(&customer.name, n))
            && self
                .region
                .as_deref()
                .is_none_or(|r| contains_ci(&customer.region, r))
            && self.min_score.is_none_or(|m| customer.credit_score >= m)
            && self.max_score.is_none_or(|m| customer.credit_score <= m)
    }

    pub fn apply<'a>(&self, customers: &'a [Customer]) -> Vec<&'a Customer> {
        customers.iter().filter(|c| self.matches(c)).collect()
    }
}

// ---------------------------------------------------------------------------
// Agent metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricParams {
    pub agent: Option<String>,
    pub country: Option<String>,
    #[serde(alias = "dateFrom")]
    pub from: Option<String>,
    #[serde(alias = "dateTo")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricFilter {
    pub agent: Option<String>,
    pub country: Option<String>,
    pub dates: DateRange,
}

impl MetricFilter {
    pub fn from_params(params: &MetricParams) -> Result<Self, QueryError> {
        Ok(Self {
            agent: selected(&params.agent).map(str::to_string),
            country: selected(&params.country).map(str::to_string),
            dates: DateRange::parse(&params.from, &params.to)?,
        })
    }

    pub fn matches(&self, metric: &AgentMetric) -> bool {
        self.agent
            .as_deref()
            .is_none_or(|a| metric.agent.eq_ignore_ascii_case(a))
            && self
                .country
                .as_deref()
                .is_none_or(|c| metric.country.eq_ignore_ascii_case(c))
            && self.dates.contains(metric.date)
    }

    pub fn apply<'a>(&self, metrics: &'a [AgentMetric]) -> Vec<&'a AgentMetric> {
        metrics.iter().filter(|m| self.matches(m)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_data::MockDataGenerator;
    use chrono::TimeZone;

    fn invoice(id: &str, stage: InvoiceStage, day: u32) -> Invoice {
        let mut inv = MockDataGenerator::new(1)
            .invoices(1, &MockDataGenerator::new(1).customers(1))
            .remove(0);
        inv.id = id.to_string();
        inv.stage = stage;
        inv.customer_name = format!("Customer {id}");
        inv.issue_date = Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap();
        inv
    }

    #[test]
    fn empty_params_match_everything() {
        let filter = InvoiceFilter::from_params(&InvoiceParams::default()).unwrap();
        let invoices = vec![
            invoice("A", InvoiceStage::Received, 1),
            invoice("B", InvoiceStage::Paid, 2),
        ];
        assert_eq!(filter.apply(&invoices).len(), 2);
    }

    #[test]
    fn stage_filter_selects_exact_stage() {
        let invoices = vec![
            invoice("A", InvoiceStage::Approved, 1),
            invoice("B", InvoiceStage::Paid, 2),
            invoice("C", InvoiceStage::Approved, 3),
        ];
        let filter = InvoiceFilter::from_params(&InvoiceParams {
            stage: Some("approved".into()),
            ..Default::default()
        })
        .unwrap();
        let ids: Vec<&str> = filter.apply(&invoices).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[test]
    fn status_and_customer_substring() {
        let invoices = vec![
            invoice("A", InvoiceStage::Approved, 1),
            invoice("B", InvoiceStage::Paid, 2),
        ];
        let filter = InvoiceFilter::from_params(&InvoiceParams {
            status: Some("open".into()),
            customer: Some("CUSTOMER a".into()),
            ..Default::default()
        })
        .unwrap();
        let out = filter.apply(&invoices);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "A");
    }

    #[test]
    fn date_only_to_bound_includes_whole_day() {
        let invoices = vec![
            invoice("A", InvoiceStage::Received, 1),
            invoice("B", InvoiceStage::Received, 2),
            invoice("C", InvoiceStage::Received, 3),
        ];
        let filter = InvoiceFilter::from_params(&InvoiceParams {
            from: Some("2024-05-02".into()),
            to: Some("2024-05-02".into()),
            ..Default::default()
        })
        .unwrap();
        let out = filter.apply(&invoices);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "B");
    }

    #[test]
    fn bad_inputs_are_errors() {
        let bad_date = InvoiceFilter::from_params(&InvoiceParams {
            from: Some("May 1st".into()),
            ..Default::default()
        });
        assert!(matches!(bad_date, Err(QueryError::InvalidDate { field: "from", .. })));

        let bad_stage = InvoiceFilter::from_params(&InvoiceParams {
            stage: Some("shipped".into()),
            ..Default::default()
        });
        assert!(matches!(bad_stage, Err(QueryError::InvalidValue { field: "stage", .. })));

        let bad_score = CustomerFilter::from_params(&CustomerParams {
            min_score: Some("high".into()),
            ..Default::default()
        });
        assert!(matches!(bad_score, Err(QueryError::InvalidNumber { .. })));
    }

    #[test]
    fn rfc3339_bounds_are_exact() {
        let from = parse_from_bound("from", "2024-05-02T13:00:00Z").unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 5, 2, 13, 0, 0).unwrap());
        let to = parse_to_bound("to", "2024-05-02").unwrap();
        assert!(to > Utc.with_ymd_and_hms(2024, 5, 2, 23, 59, 59).unwrap());
    }

    #[test]
    fn customer_score_bounds_are_inclusive() {
        let mut customers = MockDataGenerator::new(3).customers(3);
        customers[0].credit_score = 599;
        customers[1].credit_score = 600;
        customers[2].credit_score = 700;
        let filter = CustomerFilter::from_params(&CustomerParams {
            min_score: Some("600".into()),
            max_score: Some("700".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.apply(&customers).len(), 2);

        let at_risk = CustomerFilter::from_params(&CustomerParams {
            status: Some("at_risk".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(at_risk.apply(&customers).len(), 1);
    }

    #[test]
    fn text_filters_match_all_literally() {
        let mut customers = MockDataGenerator::new(5).customers(3);
        customers[0].name = "Allied Metals".into();
        customers[1].name = "Nordic Freight".into();
        customers[2].name = "Brightwater AB".into();
        let filter = CustomerFilter::from_params(&CustomerParams {
            name: Some("all".into()),
            ..Default::default()
        })
        .unwrap();
        let names: Vec<&str> = filter.apply(&customers).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Allied Metals"]);

        let invoices = vec![
            invoice("A", InvoiceStage::Received, 1),
            invoice("B", InvoiceStage::Received, 2),
        ];
        let filter = InvoiceFilter::from_params(&InvoiceParams {
            customer: Some("all".into()),
            status: Some("all".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.customer.as_deref(), Some("all"));
        assert!(filter.apply(&invoices).is_empty());
    }

    #[test]
    fn metric_all_means_no_filter() {
        let metrics = MockDataGenerator::new(9).metrics(20);
        let filter = MetricFilter::from_params(&MetricParams {
            agent: Some("all".into()),
            country: Some("All".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.apply(&metrics).len(), 20);

        let params: MetricParams =
            serde_json::from_str(r#"{"agent":"Invoice Processor","dateFrom":"2000-01-01"}"#).unwrap();
        let filter = MetricFilter::from_params(&params).unwrap();
        assert!(filter.dates.from.is_some());
        assert!(filter
            .apply(&metrics)
            .iter()
            .all(|m| m.agent == "Invoice Processor"));
    }
}
