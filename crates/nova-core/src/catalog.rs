//! The static agent catalog.
//!
//! The catalog ships inside the binary as JSON and is parsed once on first
//! access. Records are never mutated after that.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const EMBEDDED_CATALOG: &str = include_str!("../data/agents.json");

/// Business functions offered as facet values.
pub const BUSINESS_FUNCTIONS: [&str; 5] = [
    "Extended Finance Functions",
    "Human Resources",
    "Supply Chain",
    "Marketing",
    "Manufacturing",
];

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog parse: {0}")]
    Parse(String),
    #[error("catalog contains duplicate agent id '{0}'")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentStatus {
    Active,
    ComingSoon,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Technologies {
    #[serde(default)]
    pub apps: Vec<String>,
    #[serde(default)]
    pub automation: Vec<String>,
    #[serde(default)]
    pub aiml: Vec<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
}

/// Free-text ROI claims. Numbers are extracted by [`crate::roadmap`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiText {
    pub cost_to_build: String,
    pub expected_token_utilization: String,
    pub maintenance_vs_business_benefits: String,
    pub man_hours_reduced: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDocumentation {
    pub business_use_case: String,
    pub roi: RoiText,
    pub realization_timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAgent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: AgentStatus,
    pub path: String,
    #[serde(default)]
    pub technologies: Technologies,
    pub business_function: String,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub trigger_types: Vec<String>,
    pub contact: String,
    pub document: String,
    #[serde(default)]
    pub countries: Vec<String>,
    pub documentation: AgentDocumentation,
}

impl CatalogAgent {
    pub fn is_coming_soon(&self) -> bool {
        self.status == AgentStatus::ComingSoon
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    agents: Vec<CatalogAgent>,
}

impl Catalog {
    /// Parse a catalog from JSON, rejecting duplicate ids.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let agents: Vec<CatalogAgent> =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let mut seen = std::collections::HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.id.as_str()) {
                return Err(CatalogError::DuplicateId(agent.id.clone()));
            }
        }
        Ok(Self { agents })
    }

    /// The catalog compiled into this binary.
    pub fn embedded() -> Result<&'static Catalog, CatalogError> {
        static CATALOG: OnceLock<Result<Catalog, CatalogError>> = OnceLock::new();
        CATALOG
            .get_or_init(|| {
                let parsed = Catalog::from_json(EMBEDDED_CATALOG);
                if let Ok(ref c) = parsed {
                    tracing::debug!(agents = c.len(), "embedded catalog loaded");
                }
                parsed
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn agents(&self) -> &[CatalogAgent] {
        &self.agents
    }

    pub fn get(&self, id: &str) -> Option<&CatalogAgent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn coming_soon(&self) -> impl Iterator<Item = &CatalogAgent> {
        self.agents.iter().filter(|a| a.is_coming_soon())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
