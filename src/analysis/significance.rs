// Significance testing for observed test vs. control outcomes
//
// Uses aprender's independent t-test with unequal variances (Welch's test):
// geo groups are different sizes by construction, so pooled-variance
// assumptions do not hold. Groups with fewer than 2 observations cannot be
// tested at all; that case is an explicit skipped outcome, not an error and
// not a partial result.

use anyhow::{Context, Result};
use trueno::Vector;

/// Result of the Welch t-test plus the observed lift
#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceTest {
    /// t-statistic (positive when the test group mean is higher)
    pub statistic: f32,

    /// p-value (two-tailed)
    pub pvalue: f32,

    /// Welch-Satterthwaite degrees of freedom
    pub df: f32,

    /// Mean of the test group
    pub test_mean: f32,

    /// Mean of the control group
    pub control_mean: f32,

    /// Observed absolute lift (test mean − control mean)
    pub lift_absolute: f32,

    /// Observed lift as a percentage of the control mean; `None` when the
    /// control mean is zero
    pub lift_percent: Option<f32>,
}

/// Outcome of the significance stage
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    /// Both groups had enough observations and the test ran
    Tested(SignificanceTest),

    /// Either group had fewer than 2 observations; nothing was computed
    Skipped { reason: String },
}

impl TestOutcome {
    pub fn is_tested(&self) -> bool {
        matches!(self, TestOutcome::Tested(_))
    }
}

/// Compare observed test vs. control values with Welch's t-test.
///
/// # Arguments
/// * `test` - Metric values from geos receiving the budget increase
/// * `control` - Metric values from holdout geos
///
/// # Example
/// ```
/// use geolift::analysis::{compare_groups, TestOutcome};
///
/// let outcome = compare_groups(&[10.0, 12.0, 11.0], &[8.0, 9.0]).unwrap();
/// match outcome {
///     TestOutcome::Tested(test) => {
///         assert!(test.statistic > 0.0);
///         assert!((test.lift_percent.unwrap() - 29.41).abs() < 0.05);
///     }
///     TestOutcome::Skipped { .. } => panic!("both groups have >= 2 observations"),
/// }
/// ```
pub fn compare_groups(test: &[f32], control: &[f32]) -> Result<TestOutcome> {
    if test.len() < 2 || control.len() < 2 {
        return Ok(TestOutcome::Skipped {
            reason: format!(
                "need at least 2 observations per group, got test={} control={}",
                test.len(),
                control.len()
            ),
        });
    }

    // Welch's variant: unequal variances
    let ttest = aprender::stats::hypothesis::ttest_ind(test, control, false)
        .context("failed to compute Welch t-test")?;

    let test_mean = Vector::from_slice(test)
        .mean()
        .context("failed to compute test-group mean")?;
    let control_mean = Vector::from_slice(control)
        .mean()
        .context("failed to compute control-group mean")?;

    let lift_absolute = test_mean - control_mean;
    let lift_percent = if control_mean.abs() < f32::EPSILON {
        None
    } else {
        Some((lift_absolute / control_mean) * 100.0)
    };

    Ok(TestOutcome::Tested(SignificanceTest {
        statistic: ttest.statistic,
        pvalue: ttest.pvalue,
        df: ttest.df,
        test_mean,
        control_mean,
        lift_absolute,
        lift_percent,
    }))
}
