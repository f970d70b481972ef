//! Multi-select facet filtering over the catalog.
//!
//! Selections within one facet are OR'd; the two facets are AND'd. An empty
//! facet places no constraint.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogAgent;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    /// Business-function selections, matched by substring so that
    /// "Supply Chain" also selects "Supply Chain (touchpoints with ...)".
    #[serde(default)]
    pub functions: Vec<String>,
    /// Country codes, matched by membership in the agent's country list.
    #[serde(default)]
    pub countries: Vec<String>,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a function selection on or off.
    pub fn toggle_function(&mut self, function: &str) {
        toggle(&mut self.functions, function);
    }

    pub fn toggle_country(&mut self, code: &str) {
        toggle(&mut self.countries, code);
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.countries.is_empty()
    }

    pub fn matches(&self, agent: &CatalogAgent) -> bool {
        let function_ok = self.functions.is_empty()
            || self
                .functions
                .iter()
                .any(|f| agent.business_function.contains(f.as_str()));
        let country_ok = self.countries.is_empty()
            || self
                .countries
                .iter()
                .any(|c| agent.countries.iter().any(|ac| ac == c));
        function_ok && country_ok
    }

    /// Filter `agents`, keeping their relative order.
    pub fn apply<'a>(&self, agents: &'a [CatalogAgent]) -> Vec<&'a CatalogAgent> {
        agents.iter().filter(|a| self.matches(a)).collect()
    }
}

fn toggle(list: &mut Vec<String>, value: &str) {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
    } else {
        list.push(value.to_string());
    }
}

/// Split a comma-separated query value into trimmed, non-empty entries.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
