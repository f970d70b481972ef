//! Deterministic mock data.
//!
//! Every generator draws from one `StdRng` seeded up front, so a given seed
//! always produces the same dataset. Chart helpers that are keyed by an
//! identifier derive their seed from it with [`seed_for`].

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::locale::{Country, COUNTRIES};
use crate::types::{
    round_dp, ActivityTimelineItem, AgentMetric, Customer, ExtractedFields, Invoice, InvoiceStage,
    LineItem, METRIC_AGENTS,
};

pub const PDF_URL: &str = "https://www.w3.org/WAI/ER/tests/xhtml/testfiles/resources/pdf/dummy.pdf";

// Unix timestamps bounding the generated dates.
const TS_2023_01_01: i64 = 1_672_531_200;
const TS_2024_01_01: i64 = 1_704_067_200;
const TS_2025_12_01: i64 = 1_764_547_200;
const TS_2026_01_01: i64 = 1_767_225_600;

const COMPANY_STEMS: [&str; 20] = [
    "Acme", "Globex", "Initech", "Umbrella", "Vandelay", "Hooli", "Wonka", "Tyrell", "Soylent",
    "Cyberdyne", "Nordwind", "Alpine", "Danube", "Baltic", "Helvetia", "Maple", "Tulip", "Carpathia",
    "Vistula", "Adriatic",
];
const COMPANY_SUFFIXES: [&str; 10] = [
    "Industries", "Logistics", "Holdings", "Group", "Systems", "Trading", "Foods", "Partners",
    "Labs", "Manufacturing",
];
const FIRST_NAMES: [&str; 16] = [
    "Alice", "Bruno", "Clara", "David", "Elena", "Felix", "Greta", "Hugo", "Ines", "Jonas", "Katya",
    "Lukas", "Marta", "Niels", "Olga", "Pavel",
];
const LAST_NAMES: [&str; 16] = [
    "Andersson", "Bauer", "Costa", "Dvorak", "Eriksen", "Fischer", "Garcia", "Horvath", "Ionescu",
    "Jansen", "Kowalski", "Lambert", "Moreau", "Novak", "Olsen", "Rossi",
];
const REGIONS: [&str; 8] = [
    "North", "South", "East", "West", "Central", "Capital Region", "Coastal", "Highlands",
];
const PRODUCT_ADJECTIVES: [&str; 8] = [
    "Ergonomic", "Rustic", "Sleek", "Refined", "Durable", "Compact", "Premium", "Recycled",
];
const PRODUCT_MATERIALS: [&str; 6] = ["Steel", "Wooden", "Cotton", "Granite", "Plastic", "Bronze"];
const PRODUCT_NOUNS: [&str; 8] = [
    "Chair", "Table", "Keyboard", "Gloves", "Lamp", "Bottle", "Pallet", "Cabinet",
];

/// Stable seed derived from a string key (FNV-1a).
pub fn seed_for(key: &str) -> u64 {
    key.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetCounts {
    pub customers: usize,
    pub invoices: usize,
    pub metrics: usize,
}

impl Default for DatasetCounts {
    fn default() -> Self {
        Self {
            customers: 100,
            invoices: 100,
            metrics: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockDataset {
    pub customers: Vec<Customer>,
    pub invoices: Vec<Invoice>,
    pub metrics: Vec<AgentMetric>,
}

impl MockDataset {
    /// Read a dataset fixture written by [`MockDataset::save`].
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path)?;
        let dataset: Self = serde_json::from_str(&text)?;
        tracing::info!(
            path = %path.display(),
            customers = dataset.customers.len(),
            invoices = dataset.invoices.len(),
            metrics = dataset.metrics.len(),
            "dataset fixture loaded"
        );
        Ok(dataset)
    }

    /// Write the dataset as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub invoices: u32,
    pub validated: u32,
    pub approved: u32,
    pub paid: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTrendPoint {
    #[serde(flatten)]
    pub month: MonthlyPoint,
    pub credit_quality: u32,
    pub default_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePoint {
    #[serde(flatten)]
    pub month: MonthlyPoint,
    pub processing_time: f64,
    pub cost_per_doc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub day: u32,
    pub requests: u32,
    pub tasks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub day: u32,
    pub positive: u32,
    pub negative: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPoint {
    pub hour: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSeries {
    pub agent: String,
    pub volume: Vec<VolumePoint>,
    pub sentiment: Vec<SentimentPoint>,
    pub hourly_traffic: Vec<TrafficPoint>,
}

fn is_peak_hour(hour: u32) -> bool {
    (10..=12).contains(&hour) || (15..=16).contains(&hour)
}

fn is_night_hour(hour: u32) -> bool {
    hour < 6 || hour > 20
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

pub struct MockDataGenerator {
    rng: StdRng,
}

impl MockDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.gen_range(0..items.len())]
    }

    fn money(&mut self, min: f64, max: f64) -> f64 {
        round_dp(self.rng.gen_range(min..=max), 2)
    }

    fn date_between(&mut self, from: i64, to: i64) -> DateTime<Utc> {
        timestamp(self.rng.gen_range(from..to))
    }

    fn company_name(&mut self) -> String {
        let stem = self.pick(&COMPANY_STEMS);
        let suffix = self.pick(&COMPANY_SUFFIXES);
        format!("{stem} {suffix}")
    }

    fn person_name(&mut self) -> String {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        format!("{first} {last}")
    }

    fn product_name(&mut self) -> String {
        let adj = self.pick(&PRODUCT_ADJECTIVES);
        let material = self.pick(&PRODUCT_MATERIALS);
        let noun = self.pick(&PRODUCT_NOUNS);
        format!("{adj} {material} {noun}")
    }

    fn phone(&mut self) -> String {
        format!(
            "+{} {:03}-{:03}-{:04}",
            self.rng.gen_range(1..=99),
            self.rng.gen_range(0..1000),
            self.rng.gen_range(0..1000),
            self.rng.gen_range(0..10000)
        )
    }

    pub fn customers(&mut self, count: usize) -> Vec<Customer> {
        (0..count).map(|i| self.customer(i)).collect()
    }

    fn customer(&mut self, index: usize) -> Customer {
        let country: &Country = self.pick(&COUNTRIES);
        let name = self.company_name();
        let payable = self.money(0.0, 500_000.0);
        let receivable = self.money(0.0, 500_000.0);
        let contact = self.person_name().to_lowercase().replace(' ', ".");
        let domain = name
            .split_whitespace()
            .next()
            .unwrap_or("company")
            .to_lowercase();

        Customer {
            id: format!("CUST-{:06}", index + 1),
            email: format!("{contact}@{domain}.example.com"),
            phone: self.phone(),
            country: country.code.to_string(),
            region: self.pick(&REGIONS).to_string(),
            credit_score: self.rng.gen_range(300..=850),
            accounts_payable: payable,
            accounts_receivable: receivable,
            balance: round_dp(receivable - payable, 2),
            pending_orders: self.rng.gen_range(0..=50),
            created_at: self.date_between(TS_2023_01_01, TS_2024_01_01),
            last_activity: self.date_between(TS_2023_01_01, TS_2026_01_01),
            action_history: Vec::new(),
            name,
        }
    }

    /// Invoices billed to random entries of `customers`. Returns nothing
    /// when there are no customers to bill.
    pub fn invoices(&mut self, count: usize, customers: &[Customer]) -> Vec<Invoice> {
        if customers.is_empty() {
            return Vec::new();
        }
        (0..count).map(|i| self.invoice(i, customers)).collect()
    }

    fn invoice(&mut self, index: usize, customers: &[Customer]) -> Invoice {
        let customer = self.pick(customers);
        let currency = crate::locale::currency_for_country(&customer.country).to_string();
        let issue_date = self.date_between(TS_2023_01_01, TS_2025_12_01);
        let due_date = issue_date + Duration::days(self.rng.gen_range(15..=90));
        let stage = *self.pick(&InvoiceStage::ALL);
        let amount = self.money(100.0, 100_000.0);
        let risk_score = self.rng.gen_range(0..=100);

        let mut timeline = Vec::with_capacity(stage.index() + 1);
        let mut at = issue_date;
        for step in &InvoiceStage::ALL[..=stage.index()] {
            let user = self.person_name();
            timeline.push(ActivityTimelineItem::completed(*step, at, user));
            at += Duration::days(self.rng.gen_range(1..=5));
        }

        let item_count = self.rng.gen_range(1..=5);
        let items = (0..item_count)
            .map(|_| {
                let quantity: u32 = self.rng.gen_range(1..=100);
                let unit_price = self.money(10.0, 1000.0);
                LineItem {
                    description: self.product_name(),
                    quantity,
                    unit_price,
                    total: round_dp(f64::from(quantity) * unit_price, 2),
                }
            })
            .collect();

        let number = format!("INV-{:06}", index + 1);
        Invoice {
            id: number.clone(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            amount,
            currency: currency.clone(),
            issue_date,
            due_date,
            stage,
            risk_score,
            country: customer.country.clone(),
            pdf_url: PDF_URL.to_string(),
            extracted_fields: ExtractedFields {
                invoice_number: number,
                vendor: self.company_name(),
                customer: customer.name.clone(),
                amount,
                currency,
                issue_date: issue_date.date_naive(),
                due_date: due_date.date_naive(),
                items,
            },
            activity_timeline: timeline,
        }
    }

    pub fn metrics(&mut self, count: usize) -> Vec<AgentMetric> {
        (0..count)
            .map(|i| {
                let date = self.date_between(TS_2023_01_01, TS_2026_01_01);
                let agent = self.pick(&METRIC_AGENTS).to_string();
                let country = self.pick(&COUNTRIES).code.to_string();
                AgentMetric {
                    id: format!("METRIC-{:06}", i + 1),
                    date,
                    agent,
                    country,
                    volume: self.rng.gen_range(10..=500),
                    accuracy: self.money(85.0, 99.9),
                    positive_feedback: self.rng.gen_range(0..=50),
                    negative_feedback: self.rng.gen_range(0..=10),
                    average_processing_time: self.rng.gen_range(30..=300),
                }
            })
            .collect()
    }

    /// Customers, then invoices over those customers, then metrics.
    pub fn dataset(&mut self, counts: &DatasetCounts) -> MockDataset {
        let customers = self.customers(counts.customers);
        let invoices = self.invoices(counts.invoices, &customers);
        let metrics = self.metrics(counts.metrics);
        MockDataset {
            customers,
            invoices,
            metrics,
        }
    }

    /// `months` monthly points starting at `start`, labelled like "Jan 23".
    pub fn monthly_series(&mut self, start: NaiveDate, months: u32) -> Vec<MonthlyPoint> {
        (0..months)
            .map(|i| {
                let month = start
                    .checked_add_months(Months::new(i))
                    .unwrap_or(start)
                    .format("%b %y")
                    .to_string();
                MonthlyPoint {
                    month,
                    invoices: self.rng.gen_range(20..70),
                    validated: self.rng.gen_range(10..50),
                    approved: self.rng.gen_range(8..43),
                    paid: self.rng.gen_range(5..35),
                }
            })
            .collect()
    }

    pub fn credit_trends(&mut self, start: NaiveDate, months: u32) -> Vec<CreditTrendPoint> {
        self.monthly_series(start, months)
            .into_iter()
            .map(|month| CreditTrendPoint {
                month,
                credit_quality: self.rng.gen_range(70..100),
                default_rate: self.rng.gen_range(1..6),
            })
            .collect()
    }

    pub fn performance_history(&mut self, start: NaiveDate, months: u32) -> Vec<PerformancePoint> {
        self.monthly_series(start, months)
            .into_iter()
            .map(|month| PerformancePoint {
                month,
                processing_time: round_dp(self.rng.gen_range(1.0..4.0), 1),
                cost_per_doc: round_dp(self.rng.gen_range(0.5..1.0), 2),
            })
            .collect()
    }

    /// 30-day volume and sentiment plus a 24-hour traffic profile for
    /// `agent` (`all` for the platform-wide view).
    pub fn overview(&mut self, agent: &str) -> OverviewSeries {
        let base: u32 = if agent == "all" {
            4000
        } else {
            1000 + agent.len() as u32 * 200
        };

        let volume = (1..=30)
            .map(|day| VolumePoint {
                day,
                requests: base + self.rng.gen_range(0..base / 2),
                tasks: base * 9 / 10 + self.rng.gen_range(0..base / 2),
            })
            .collect();

        let sentiment = (1..=30)
            .map(|day| SentimentPoint {
                day,
                positive: self.rng.gen_range(20..100),
                negative: self.rng.gen_range(0..15),
            })
            .collect();

        let hourly_traffic = (0..24u32)
            .map(|hour| {
                let mut value: u32 = self.rng.gen_range(10..30);
                if is_peak_hour(hour) {
                    value += self.rng.gen_range(40..80);
                }
                if is_night_hour(hour) {
                    value = value.saturating_sub(10).max(5);
                }
                TrafficPoint {
                    hour: format!("{hour}:00"),
                    value,
                }
            })
            .collect();

        OverviewSeries {
            agent: agent.to_string(),
            volume,
            sentiment,
            hourly_traffic,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
