//! CLI argument parsing for Geolift

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "geolift")]
#[command(version)]
#[command(about = "Geo incrementality test power analysis and significance testing", long_about = None)]
pub struct Cli {
    /// Primary metric CSV (new-customer revenue)
    #[arg(long = "revenue", value_name = "FILE")]
    pub revenue: PathBuf,

    /// Secondary metric CSV (new-customer orders); analyzed with the same pipeline
    #[arg(long = "orders", value_name = "FILE")]
    pub orders: Option<PathBuf>,

    /// Name of the metric column in the primary CSV
    #[arg(long = "revenue-column", value_name = "NAME", default_value = "revenue")]
    pub revenue_column: String,

    /// Name of the metric column in the secondary CSV
    #[arg(long = "orders-column", value_name = "NAME", default_value = "orders")]
    pub orders_column: String,

    /// TOML configuration file; flags below override its values
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Weekly budget ($)
    #[arg(long = "weekly-budget", value_name = "DOLLARS")]
    pub weekly_budget: Option<f64>,

    /// Budget increase (%)
    #[arg(long = "budget-increase", value_name = "PCT")]
    pub budget_increase_pct: Option<f64>,

    /// Test duration (weeks)
    #[arg(long = "test-weeks", value_name = "WEEKS")]
    pub test_weeks: Option<u32>,

    /// Holdout share (%)
    #[arg(long = "holdout", value_name = "PCT")]
    pub holdout_pct: Option<f64>,

    /// Significance level (alpha)
    #[arg(long = "alpha", value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Desired statistical power
    #[arg(long = "power", value_name = "POWER")]
    pub power: Option<f64>,

    /// Seed for the holdout draw
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
