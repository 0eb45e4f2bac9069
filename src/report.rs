//! Text report rendering.
//!
//! Pure formatting over an `ExperimentReport`: the control-unit listing, the
//! key/value summary table, warnings, and the per-date group-mean table.
//! Values the pipeline could not compute render as `N/A`.

use crate::analysis::TestOutcome;
use crate::pipeline::ExperimentReport;

/// Render the full text report for one metric.
pub fn render_report(report: &ExperimentReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Incrementality Test Power Analysis: {} ===\n\n",
        report.metric
    ));

    render_control_units(report, &mut out);
    out.push('\n');
    render_summary_table(report, &mut out);

    if !report.warnings.is_empty() {
        out.push('\n');
        for warning in &report.warnings {
            out.push_str(&format!("⚠️  {}\n", warning));
        }
    }

    out.push('\n');
    render_daily_means(report, &mut out);

    out
}

fn render_control_units(report: &ExperimentReport, out: &mut String) {
    let assignment = &report.assignment;
    if assignment.holdout_count() == 0 {
        out.push_str(&format!(
            "Control units: none (holdout share rounds to zero of {} units)\n",
            assignment.total_units()
        ));
        return;
    }

    out.push_str(&format!(
        "Control units ({} of {}, {:.1}% holdout):\n",
        assignment.holdout_count(),
        assignment.total_units(),
        assignment.holdout_percent()
    ));
    for unit in assignment.control_units() {
        out.push_str(&format!("  - {}\n", unit));
    }
}

fn render_summary_table(report: &ExperimentReport, out: &mut String) {
    out.push_str(&format!("{:<32} {:>14}\n", "Metric", "Value"));
    out.push_str(&format!("{:-<32} {:->14}\n", "", ""));
    for (key, value) in summary_rows(report) {
        out.push_str(&format!("{:<32} {:>14}\n", key, value));
    }
}

/// Key/value rows of the summary table, in display order
fn summary_rows(report: &ExperimentReport) -> Vec<(String, String)> {
    let mut rows = vec![
        (
            "Required Sample Size per Group".to_string(),
            report.power.required_per_group.to_string(),
        ),
        (
            "Actual Sample Size (Test)".to_string(),
            report.test_rows.to_string(),
        ),
        (
            "Actual Sample Size (Control)".to_string(),
            report.control_rows.to_string(),
        ),
        (
            format!("Baseline ({} mean)", report.metric),
            format!("{:.2}", report.baseline_mean),
        ),
        (
            "Expected Lift".to_string(),
            format!("{:.2}", report.power.expected_lift),
        ),
        (
            "Effect Size".to_string(),
            format!("{:.3}", report.power.effect_size),
        ),
    ];

    match &report.outcome {
        TestOutcome::Tested(test) => {
            rows.push((
                "Observed Lift".to_string(),
                format!("{:.2}", test.lift_absolute),
            ));
            rows.push((
                "Observed Lift %".to_string(),
                test.lift_percent
                    .map_or_else(|| "N/A".to_string(), |p| format!("{:.2}%", p)),
            ));
            rows.push(("T-Statistic".to_string(), format!("{:.3}", test.statistic)));
            rows.push(("P-Value".to_string(), format!("{:.4}", test.pvalue)));
        }
        TestOutcome::Skipped { .. } => {
            rows.push(("Observed Lift".to_string(), "N/A".to_string()));
            rows.push(("Observed Lift %".to_string(), "N/A".to_string()));
            rows.push(("T-Statistic".to_string(), "N/A".to_string()));
            rows.push(("P-Value".to_string(), "N/A".to_string()));
        }
    }

    rows.push((
        "Total Test Budget".to_string(),
        format!("${:.2}", report.total_budget),
    ));
    rows.push((
        "Holdout Share".to_string(),
        format!("{:.1}%", report.assignment.holdout_percent()),
    ));

    rows
}

fn render_daily_means(report: &ExperimentReport, out: &mut String) {
    out.push_str("Daily Means: Test vs Control\n");
    out.push_str(&format!(
        "{:<12} {:>12} {:>12}\n",
        "Date", "Control", "Test"
    ));
    out.push_str(&format!("{:-<12} {:->12} {:->12}\n", "", "", ""));

    for daily in &report.daily_means {
        let control = daily
            .control
            .map_or_else(|| "-".to_string(), |m| format!("{:.2}", m));
        let test = daily
            .test
            .map_or_else(|| "-".to_string(), |m| format!("{:.2}", m));
        out.push_str(&format!(
            "{:<12} {:>12} {:>12}\n",
            daily.date.format("%Y-%m-%d"),
            control,
            test
        ));
    }

    if let TestOutcome::Skipped { reason } = &report.outcome {
        out.push_str(&format!("\nSignificance test skipped: {}\n", reason));
    }
}
