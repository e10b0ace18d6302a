use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "house-collector")]
#[command(about = "Collects house listings from multiple websites into a document store")]
pub struct CollectorConfig {
    /// Base URL of the document store
    #[arg(long, default_value = "http://localhost:8080")]
    pub store_url: String,

    /// Maximum number of workers per provider run
    #[arg(long, default_value = "100")]
    pub max_workers: usize,

    /// Process listings concurrently when the provider fetches per item
    #[arg(long)]
    pub concurrent: bool,

    /// Time to wait, in minutes, between collection passes
    #[arg(long, default_value = "30")]
    pub check_interval_min: u64,

    /// Cap on candidates enumerated per provider per run
    #[arg(long, default_value = "9999999")]
    pub max_candidates: usize,

    /// Run a single pass and exit
    #[arg(long)]
    pub run_once: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,
}

impl Validate for CollectorConfig {
    fn validate(&self) -> Result<()> {
        validate_url("store_url", &self.store_url)?;
        validate_positive_number("max_workers", self.max_workers, 1)?;
        validate_positive_number("check_interval_min", self.check_interval_min as usize, 1)?;
        validate_positive_number("max_candidates", self.max_candidates, 1)?;
        Ok(())
    }
}
