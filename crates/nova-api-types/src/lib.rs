//! Request bodies and response views shared by the REST server and the CLI.
//!
//! Response views are deliberately loose (`#[serde(default)]` everywhere) so
//! a client keeps working when the server adds fields.

use serde::{Deserialize, Serialize};

// ── Errors ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ── Status ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub uptime_seconds: u64,
    #[serde(default)]
    pub customers: usize,
    #[serde(default)]
    pub invoices: usize,
    #[serde(default)]
    pub metrics: usize,
    #[serde(default)]
    pub catalog_agents: usize,
    #[serde(default)]
    pub auth_required: bool,
}

// ── Request bodies ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageUpdateRequest {
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerActionRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub username: Option<String>,
}

// ── Agents ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentSummaryStatus {
    Active,
    ComingSoon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: AgentSummaryStatus,
    pub uptime: f64,
    pub documents_processed: u64,
    pub accuracy: f64,
    pub average_processing_time: f64,
}

// ── Client views ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInvoice {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub issue_date: String,
    #[serde(default)]
    pub risk_score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCustomer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub credit_score: u16,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub pending_orders: u32,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetricSummary {
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub total_volume: u64,
    #[serde(default)]
    pub average_accuracy: f64,
    #[serde(default)]
    pub positive_feedback: u64,
    #[serde(default)]
    pub negative_feedback: u64,
    #[serde(default)]
    pub average_processing_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCatalogAgent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub business_function: String,
    #[serde(default)]
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocaleSettings {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClientState {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub settings: ApiLocaleSettings,
}
