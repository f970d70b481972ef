use std::path::Path;

use anyhow::Context;
use nova_core::mock_data::{DatasetCounts, MockDataGenerator};
use tracing::info;

/// Write a seeded dataset fixture that `mock_data.fixture_path` can point at.
pub fn run(seed: u64, counts: DatasetCounts, out: &Path) -> anyhow::Result<()> {
    let dataset = MockDataGenerator::new(seed).dataset(&counts);
    dataset
        .save(out)
        .with_context(|| format!("failed to write fixture {}", out.display()))?;
    info!(seed, path = %out.display(), "fixture written");
    println!(
        "wrote {} customers, {} invoices, {} metrics to {}",
        dataset.customers.len(),
        dataset.invoices.len(),
        dataset.metrics.len(),
        out.display()
    );
    Ok(())
}
