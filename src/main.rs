use anyhow::{Context, Result};
use clap::Parser;
use geolift::{cli::Cli, config::ExperimentConfig, ingest, pipeline, report};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Build the experiment configuration: TOML file first, CLI flags override
fn load_config(args: &Cli) -> Result<ExperimentConfig> {
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::from_toml_file(path)?,
        None => ExperimentConfig::default(),
    };

    if let Some(v) = args.weekly_budget {
        config.weekly_budget = v;
    }
    if let Some(v) = args.budget_increase_pct {
        config.budget_increase_pct = v;
    }
    if let Some(v) = args.test_weeks {
        config.test_weeks = v;
    }
    if let Some(v) = args.holdout_pct {
        config.holdout_pct = v;
    }
    if let Some(v) = args.alpha {
        config.alpha = v;
    }
    if let Some(v) = args.power {
        config.power = v;
    }
    if let Some(v) = args.seed {
        config.seed = v;
    }

    Ok(config)
}

/// Load one metric file, run the pipeline, and render its report
fn analyze_file(
    path: &std::path::Path,
    metric_column: &str,
    config: &ExperimentConfig,
) -> Result<String> {
    let series = ingest::load_metric_csv(path, metric_column)
        .with_context(|| format!("failed to load '{}'", path.display()))?;
    let result = pipeline::run_experiment(&series, config)
        .with_context(|| format!("analysis failed for '{}'", path.display()))?;
    Ok(report::render_report(&result))
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;
    if let Err(e) = config.validate() {
        anyhow::bail!("invalid configuration: {}", e);
    }

    println!("{}", analyze_file(&args.revenue, &args.revenue_column, &config)?);

    if let Some(orders) = &args.orders {
        println!("{}", analyze_file(orders, &args.orders_column, &config)?);
    }

    Ok(())
}
