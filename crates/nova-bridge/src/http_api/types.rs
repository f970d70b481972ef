use serde::{Deserialize, Serialize};

use nova_api_types::{AgentSummary, AgentSummaryStatus};
use nova_core::analytics::{RecentDocument, StageCount};
use nova_core::catalog::CatalogAgent;
use nova_core::facets::CatalogFilter;
use nova_core::mock_data::{MonthlyPoint, PerformancePoint};
use nova_core::types::{
    ActionHistoryItem, CreditBand, Customer, CustomerStatus, Invoice, InvoiceStage, InvoiceStatus,
    RiskLevel,
};

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

/// An invoice together with the values derived from it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub status: InvoiceStatus,
    pub risk_level: RiskLevel,
    pub next_stage: Option<InvoiceStage>,
}

impl From<Invoice> for InvoiceDetail {
    fn from(invoice: Invoice) -> Self {
        Self {
            status: invoice.status(),
            risk_level: invoice.risk_level(),
            next_stage: invoice.stage.next(),
            invoice,
        }
    }
}

/// Result of a stage mutation. `changed` is false for no-op requests.
#[derive(Debug, Clone, Serialize)]
pub struct StageUpdateResponse {
    pub changed: bool,
    pub invoice: InvoiceDetail,
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub status: CustomerStatus,
    pub credit_band: CreditBand,
    pub low_credit_warning: bool,
    pub invoices: Vec<Invoice>,
}

impl CustomerDetail {
    pub fn new(customer: Customer, invoices: Vec<Invoice>) -> Self {
        Self {
            status: customer.status(),
            credit_band: customer.credit_band(),
            low_credit_warning: customer.has_low_credit(),
            customer,
            invoices,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerActionResponse {
    pub action: ActionHistoryItem,
    pub customer: Customer,
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// The three operational agents shown on the dashboard.
pub(crate) fn agent_summaries() -> Vec<AgentSummary> {
    vec![
        AgentSummary {
            id: "AGENT001".into(),
            name: "Invoice Processor AI".into(),
            description: "Automated invoice extraction and processing".into(),
            status: AgentSummaryStatus::Active,
            uptime: 99.8,
            documents_processed: 15_420,
            accuracy: 97.5,
            average_processing_time: 2.3,
        },
        AgentSummary {
            id: "AGENT002".into(),
            name: "Customer Insights Engine".into(),
            description: "Advanced customer credit analysis and insights".into(),
            status: AgentSummaryStatus::Active,
            uptime: 99.6,
            documents_processed: 8_930,
            accuracy: 96.8,
            average_processing_time: 1.8,
        },
        AgentSummary {
            id: "AGENT003".into(),
            name: "Order Processor".into(),
            description: "Intelligent order processing and fulfillment".into(),
            status: AgentSummaryStatus::ComingSoon,
            uptime: 0.0,
            documents_processed: 0,
            accuracy: 0.0,
            average_processing_time: 0.0,
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    #[serde(flatten)]
    pub summary: AgentSummary,
    pub monthly_metrics: Vec<MonthlyPoint>,
    pub performance_history: Vec<PerformancePoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    pub stages: Vec<StageCount>,
    pub recent_documents: Vec<RecentDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewQuery {
    pub agent: Option<String>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// `?functions=a,b&countries=DE,FR`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub functions: Option<String>,
    pub countries: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogListResponse {
    pub total: usize,
    pub filter: CatalogFilter,
    pub agents: Vec<CatalogAgent>,
}
