use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Round `value` to `dp` decimal places (half away from zero).
pub fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Parse error shared by the string-backed enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// InvoiceStage
// ---------------------------------------------------------------------------

/// Position of an invoice in the processing workflow. Variants are declared
/// in workflow order, so the derived `Ord` is the workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStage {
    Received,
    Extracted,
    Validated,
    SentForApproval,
    Approved,
    AssignedToPayments,
    Paid,
}

impl InvoiceStage {
    pub const ALL: [InvoiceStage; 7] = [
        InvoiceStage::Received,
        InvoiceStage::Extracted,
        InvoiceStage::Validated,
        InvoiceStage::SentForApproval,
        InvoiceStage::Approved,
        InvoiceStage::AssignedToPayments,
        InvoiceStage::Paid,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage that follows `self`, or `None` at `Paid`.
    pub fn next(self) -> Option<InvoiceStage> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Only single-step forward moves are valid.
    pub fn can_transition_to(self, target: InvoiceStage) -> bool {
        self.next() == Some(target)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStage::Received => "received",
            InvoiceStage::Extracted => "extracted",
            InvoiceStage::Validated => "validated",
            InvoiceStage::SentForApproval => "sent_for_approval",
            InvoiceStage::Approved => "approved",
            InvoiceStage::AssignedToPayments => "assigned_to_payments",
            InvoiceStage::Paid => "paid",
        }
    }

    /// Human-readable form, e.g. "sent for approval".
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for InvoiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("invoice stage", s))
    }
}

// ---------------------------------------------------------------------------
// Derived classifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Open,
    Paid,
}

impl FromStr for InvoiceStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(InvoiceStatus::Open),
            "paid" => Ok(InvoiceStatus::Paid),
            _ => Err(ParseEnumError::new("invoice status", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => RiskLevel::High,
            40..=69 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    AtRisk,
}

impl FromStr for CustomerStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(CustomerStatus::Active),
            "at_risk" | "at-risk" => Ok(CustomerStatus::AtRisk),
            _ => Err(ParseEnumError::new("customer status", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditBand {
    Good,
    Fair,
    Poor,
}

/// Scores below this trigger the low-credit warning.
pub const LOW_CREDIT_THRESHOLD: u16 = 600;
const GOOD_CREDIT_THRESHOLD: u16 = 700;

impl CreditBand {
    pub fn from_score(score: u16) -> Self {
        if score >= GOOD_CREDIT_THRESHOLD {
            CreditBand::Good
        } else if score >= LOW_CREDIT_THRESHOLD {
            CreditBand::Fair
        } else {
            CreditBand::Poor
        }
    }
}

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerAction {
    #[serde(rename = "Suggest Close Orders")]
    SuggestCloseOrders,
    #[serde(rename = "Trigger Close Order")]
    TriggerCloseOrder,
    #[serde(rename = "Send Payment Email")]
    SendPaymentEmail,
    #[serde(rename = "Send Receivable Email")]
    SendReceivableEmail,
}

impl CustomerAction {
    pub const ALL: [CustomerAction; 4] = [
        CustomerAction::SuggestCloseOrders,
        CustomerAction::TriggerCloseOrder,
        CustomerAction::SendPaymentEmail,
        CustomerAction::SendReceivableEmail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CustomerAction::SuggestCloseOrders => "Suggest Close Orders",
            CustomerAction::TriggerCloseOrder => "Trigger Close Order",
            CustomerAction::SendPaymentEmail => "Send Payment Email",
            CustomerAction::SendReceivableEmail => "Send Receivable Email",
        }
    }
}

impl fmt::Display for CustomerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerAction {
    type Err = ParseEnumError;

    /// Accepts the display name ("Send Payment Email") or its snake_case
    /// form ("send_payment_email"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', " ");
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ParseEnumError::new("customer action", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionHistoryItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: CustomerAction,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub region: String,
    pub credit_score: u16,
    pub accounts_payable: f64,
    pub accounts_receivable: f64,
    pub balance: f64,
    pub pending_orders: u32,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub action_history: Vec<ActionHistoryItem>,
}

impl Customer {
    pub fn status(&self) -> CustomerStatus {
        if self.has_low_credit() {
            CustomerStatus::AtRisk
        } else {
            CustomerStatus::Active
        }
    }

    pub fn credit_band(&self) -> CreditBand {
        CreditBand::from_score(self.credit_score)
    }

    pub fn has_low_credit(&self) -> bool {
        self.credit_score < LOW_CREDIT_THRESHOLD
    }

    /// Record `action` in the history and apply its field changes.
    pub fn apply_action(
        &mut self,
        action: CustomerAction,
        user: impl Into<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> ActionHistoryItem {
        if action == CustomerAction::TriggerCloseOrder {
            self.pending_orders = 0;
        }
        self.last_activity = now;

        let item = ActionHistoryItem {
            id: format!("ACT-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]),
            timestamp: now,
            action,
            user: user.into(),
            notes,
        };
        self.action_history.push(item.clone());
        item
    }
}

// ---------------------------------------------------------------------------
// Invoice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub invoice_number: String,
    pub vendor: String,
    pub customer: String,
    pub amount: f64,
    pub currency: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTimelineItem {
    pub stage: InvoiceStage,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ActivityTimelineItem {
    pub fn completed(stage: InvoiceStage, timestamp: DateTime<Utc>, user: impl Into<String>) -> Self {
        Self {
            stage,
            timestamp,
            user: user.into(),
            notes: Some(format!("{} completed", stage.label())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub amount: f64,
    pub currency: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub stage: InvoiceStage,
    pub risk_score: u8,
    pub country: String,
    pub pdf_url: String,
    pub extracted_fields: ExtractedFields,
    #[serde(default)]
    pub activity_timeline: Vec<ActivityTimelineItem>,
}

/// Outcome of a stage mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageChange {
    Advanced { from: InvoiceStage, to: InvoiceStage },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invoice cannot move from {from} to {to}")]
pub struct StageTransitionError {
    pub from: InvoiceStage,
    pub to: InvoiceStage,
}

impl Invoice {
    pub fn status(&self) -> InvoiceStatus {
        if self.stage == InvoiceStage::Paid {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Open
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }

    /// Move one stage forward. At `Paid` this is a no-op.
    pub fn advance(&mut self, user: &str, now: DateTime<Utc>) -> StageChange {
        match self.stage.next() {
            Some(next) => self.apply_stage(next, user, now),
            None => StageChange::Unchanged,
        }
    }

    /// Move to `target`, which must be the current stage (no-op) or the
    /// immediately following one.
    pub fn move_to(
        &mut self,
        target: InvoiceStage,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<StageChange, StageTransitionError> {
        if target == self.stage {
            return Ok(StageChange::Unchanged);
        }
        if !self.stage.can_transition_to(target) {
            return Err(StageTransitionError {
                from: self.stage,
                to: target,
            });
        }
        Ok(self.apply_stage(target, user, now))
    }

    fn apply_stage(&mut self, next: InvoiceStage, user: &str, now: DateTime<Utc>) -> StageChange {
        let from = self.stage;
        self.stage = next;
        self.activity_timeline
            .push(ActivityTimelineItem::completed(next, now, user));
        StageChange::Advanced { from, to: next }
    }
}

// ---------------------------------------------------------------------------
// AgentMetric
// ---------------------------------------------------------------------------

/// Agent names used on metric samples.
pub const METRIC_AGENTS: [&str; 3] = ["Invoice Processor", "Customer Insights", "Order Processor"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetric {
    pub id: String,
    pub date: DateTime<Utc>,
    pub agent: String,
    pub country: String,
    pub volume: u32,
    pub accuracy: f64,
    pub positive_feedback: u32,
    pub negative_feedback: u32,
    pub average_processing_time: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
