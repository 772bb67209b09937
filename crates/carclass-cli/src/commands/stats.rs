//! Stats command implementation.

use anyhow::{Context, Result};
use carclass_store::PredictionStore;
use clap::Args;
use std::path::PathBuf;

/// Print aggregate statistics for an existing database
///
/// # Example
///
/// ```bash
/// carclass stats --db-path ./carclass.db
/// ```
#[derive(Args, Debug, Clone)]
pub struct StatsCommand {
    /// Path of the SQLite database file
    #[arg(long, default_value = "./carclass.db", env = "CARCLASS_DB_PATH")]
    pub db_path: PathBuf,
}

impl StatsCommand {
    /// Execute the stats command.
    pub fn run(&self) -> Result<()> {
        let store = PredictionStore::open(&self.db_path)
            .with_context(|| format!("Failed to open database at {:?}", self.db_path))?;
        let stats = store.stats().context("Failed to aggregate statistics")?;

        println!("Total predictions:    {}", stats.total_predictions);
        println!(
            "Most predicted class: {}",
            stats.most_predicted_class.as_deref().unwrap_or("-")
        );
        println!("Average confidence:   {:.4}", stats.average_confidence);

        if !stats.predictions_by_class.is_empty() {
            println!("Predictions by class:");
            let mut entries: Vec<_> = stats.predictions_by_class.iter().collect();
            entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (label, count) in entries {
                println!("  {label}: {count}");
            }
        }
        Ok(())
    }
}
