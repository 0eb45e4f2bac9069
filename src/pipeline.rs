// Experiment pipeline: assignment -> window -> power -> significance
//
// One linear pass per metric file, re-executed in full on every run. The
// pipeline owns the soft warnings (small control group, underpowered
// samples) and the per-date aggregation used for charting; formatting lives
// in the report module.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use trueno::Vector;

use crate::analysis::{compare_groups, solve_power, PowerAnalysis, TestOutcome};
use crate::assignment::{assign_groups, Group, GroupAssignment};
use crate::config::ExperimentConfig;
use crate::ingest::MetricSeries;
use crate::window::trailing_window;

/// Non-fatal conditions surfaced alongside the results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentWarning {
    /// Control group has very few observations; the test result is fragile
    SmallControlGroup { rows: usize },

    /// Either group is below the power-derived sample size requirement
    Underpowered {
        required: u64,
        test_rows: usize,
        control_rows: usize,
    },
}

impl fmt::Display for ExperimentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentWarning::SmallControlGroup { rows } => write!(
                f,
                "control group has only {} rows; increase holdout share or test duration",
                rows
            ),
            ExperimentWarning::Underpowered {
                required,
                test_rows,
                control_rows,
            } => write!(
                f,
                "sample sizes below the required {} per group (test={}, control={}); \
                 consider increasing test duration or holdout share",
                required, test_rows, control_rows
            ),
        }
    }
}

/// Per-date mean of each group, for the time-series chart
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMeans {
    pub date: NaiveDate,
    pub control: Option<f32>,
    pub test: Option<f32>,
}

/// Everything one run of the pipeline produces for one metric
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    /// Metric label (value column name)
    pub metric: String,

    pub assignment: GroupAssignment,

    /// Mean of the metric over the whole window, both groups pooled
    pub baseline_mean: f32,

    /// Sample standard deviation over the window
    pub std_dev: f32,

    pub power: PowerAnalysis,

    /// Observation counts inside the window
    pub test_rows: usize,
    pub control_rows: usize,

    pub outcome: TestOutcome,

    pub total_budget: f64,

    pub warnings: Vec<ExperimentWarning>,

    /// Per-date group means, sorted by date
    pub daily_means: Vec<DailyMeans>,
}

/// Run the full incrementality analysis for one metric series.
///
/// # Errors
/// Fails on invalid configuration, an empty unit set, an effectively empty
/// test window, or a zero-variance metric. A too-small control group is a
/// soft warning, not an error: the significance stage reports a skipped
/// outcome instead.
pub fn run_experiment(
    series: &MetricSeries,
    config: &ExperimentConfig,
) -> Result<ExperimentReport> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    // Step 1: assign geos, holding out the configured share
    let units = series.unit_ids();
    let assignment = assign_groups(&units, config.holdout_fraction(), config.seed)
        .context("group assignment failed")?;

    // Step 2: restrict to the trailing test window
    let windowed = trailing_window(series, config.window_days());
    if windowed.len() < 2 {
        bail!(
            "only {} observation(s) in the trailing {}-day window; need at least 2",
            windowed.len(),
            config.window_days()
        );
    }

    // Step 3: power analysis over the pooled window
    let values: Vec<f32> = windowed.observations.iter().map(|o| o.value as f32).collect();
    let v = Vector::from_slice(&values);
    let baseline_mean = v.mean().context("failed to compute baseline mean")?;

    // trueno returns population variance (divide by n); the power analysis
    // uses the sample standard deviation (n - 1)
    let population_variance = v.variance().context("failed to compute variance")?;
    let n = values.len() as f32;
    let std_dev = (population_variance * n / (n - 1.0)).sqrt();

    let power = solve_power(
        f64::from(baseline_mean),
        f64::from(std_dev),
        config.budget_increase_fraction(),
        config.alpha,
        config.power,
    )?;

    // Step 4: split the window by group and check sample sizes
    let mut test_values = Vec::new();
    let mut control_values = Vec::new();
    for obs in &windowed.observations {
        match assignment.group_of(&obs.geo) {
            Group::Test => test_values.push(obs.value as f32),
            Group::Control => control_values.push(obs.value as f32),
        }
    }

    let mut warnings = Vec::new();
    if control_values.len() < 5 {
        let warning = ExperimentWarning::SmallControlGroup {
            rows: control_values.len(),
        };
        tracing::warn!("{}", warning);
        warnings.push(warning);
    }
    if (test_values.len() as u64) < power.required_per_group
        || (control_values.len() as u64) < power.required_per_group
    {
        let warning = ExperimentWarning::Underpowered {
            required: power.required_per_group,
            test_rows: test_values.len(),
            control_rows: control_values.len(),
        };
        tracing::warn!("{}", warning);
        warnings.push(warning);
    }

    // Step 5: significance test on the observed outcomes
    let outcome = compare_groups(&test_values, &control_values)?;

    let daily_means = aggregate_daily_means(&windowed, &assignment);

    Ok(ExperimentReport {
        metric: series.metric.clone(),
        assignment,
        baseline_mean,
        std_dev,
        power,
        test_rows: test_values.len(),
        control_rows: control_values.len(),
        outcome,
        total_budget: config.total_budget(),
        warnings,
        daily_means,
    })
}

/// Per-date, per-group mean of the windowed series
fn aggregate_daily_means(series: &MetricSeries, assignment: &GroupAssignment) -> Vec<DailyMeans> {
    #[derive(Default)]
    struct Accum {
        control_sum: f64,
        control_n: u32,
        test_sum: f64,
        test_n: u32,
    }

    let mut by_date: BTreeMap<NaiveDate, Accum> = BTreeMap::new();
    for obs in &series.observations {
        let entry = by_date.entry(obs.date).or_default();
        match assignment.group_of(&obs.geo) {
            Group::Control => {
                entry.control_sum += obs.value;
                entry.control_n += 1;
            }
            Group::Test => {
                entry.test_sum += obs.value;
                entry.test_n += 1;
            }
        }
    }

    by_date
        .into_iter()
        .map(|(date, accum)| DailyMeans {
            date,
            control: (accum.control_n > 0)
                .then(|| (accum.control_sum / f64::from(accum.control_n)) as f32),
            test: (accum.test_n > 0).then(|| (accum.test_sum / f64::from(accum.test_n)) as f32),
        })
        .collect()
}
