//! Domain layer for the Nova Platform dashboard.
//!
//! Everything here is synchronous and I/O-light: the static agent catalog,
//! seeded demo data, filtering, ROI derivation, analytics, locale-aware
//! formatting, and the configuration / client-state files.

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod facets;
pub mod locale;
pub mod mock_data;
pub mod query;
pub mod roadmap;
pub mod settings;
pub mod types;
