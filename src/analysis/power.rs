// Power analysis: effect size and required sample size
//
// The sample size solver inverts the power function of a two-sided,
// two-sample t-test with equal group sizes. It seeds n from the
// normal-quantile closed form and then iterates the Student-t quantile
// update n = 2·((t_{1−α/2,df} + t_{power,df}) / d)² with df = 2n − 2 until
// the fixed point; the result matches the continuous noncentral-t solve to
// well under one sample for practical parameters.

use anyhow::{bail, Context, Result};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Result of the power analysis for one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerAnalysis {
    /// Standardized effect size (expected lift ÷ standard deviation)
    pub effect_size: f64,

    /// Expected absolute lift in metric units
    pub expected_lift: f64,

    /// Required sample size per group (ceiling of the continuous solve)
    pub required_per_group: u64,
}

/// Standardized effect size for the assumed uplift.
///
/// `effect = (uplift_fraction × baseline_mean) / std_dev`
///
/// # Errors
/// A zero (or non-finite) standard deviation would make the effect size
/// infinite; it is rejected here instead of propagating as NaN. The expected
/// lift must be positive for the one-directional budget increase.
pub fn effect_size(baseline_mean: f64, std_dev: f64, uplift_fraction: f64) -> Result<f64> {
    if !std_dev.is_finite() || std_dev <= 0.0 {
        bail!(
            "metric has zero variance in the test window (std dev = {}); effect size is undefined",
            std_dev
        );
    }

    let lift = uplift_fraction * baseline_mean;
    if !lift.is_finite() || lift <= 0.0 {
        bail!(
            "expected lift must be positive, got {} ({}% of baseline {})",
            lift,
            uplift_fraction * 100.0,
            baseline_mean
        );
    }

    Ok(lift / std_dev)
}

/// Required per-group sample size for a two-sided two-sample t-test.
///
/// Monotone by construction: non-decreasing in `power`, non-increasing in
/// `alpha`. The returned size is at least 2 (a t-test needs 2 observations
/// per group regardless of how large the effect is).
///
/// # Example
/// ```
/// use geolift::analysis::required_sample_size;
///
/// // The canonical medium effect at 95% confidence and 80% power
/// let n = required_sample_size(0.5, 0.05, 0.8).unwrap();
/// assert_eq!(n, 64);
/// ```
pub fn required_sample_size(effect_size: f64, alpha: f64, power: f64) -> Result<u64> {
    if !effect_size.is_finite() || effect_size <= 0.0 {
        bail!("effect size must be positive, got {}", effect_size);
    }
    if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
        bail!("alpha must be in (0, 1), got {}", alpha);
    }
    if !power.is_finite() || power <= 0.0 || power >= 1.0 {
        bail!("power must be in (0, 1), got {}", power);
    }

    let normal = Normal::new(0.0, 1.0).context("failed to construct standard normal")?;
    let z_alpha = normal.inverse_cdf(1.0 - alpha / 2.0);
    let z_power = normal.inverse_cdf(power);

    // Normal-approximation starting point
    let mut n = 2.0 * ((z_alpha + z_power) / effect_size).powi(2);

    // Refine with Student-t quantiles at the implied degrees of freedom
    for _ in 0..16 {
        let df = (2.0 * n - 2.0).max(1.0);
        let t = StudentsT::new(0.0, 1.0, df)
            .with_context(|| format!("failed to construct t-distribution with df {}", df))?;
        let t_alpha = t.inverse_cdf(1.0 - alpha / 2.0);
        let t_power = t.inverse_cdf(power);
        let next = 2.0 * ((t_alpha + t_power) / effect_size).powi(2);

        let converged = (next - n).abs() < 1e-6;
        n = next;
        if converged {
            break;
        }
    }

    Ok((n.ceil() as u64).max(2))
}

/// Run the full power analysis for one metric window.
pub fn solve_power(
    baseline_mean: f64,
    std_dev: f64,
    uplift_fraction: f64,
    alpha: f64,
    power: f64,
) -> Result<PowerAnalysis> {
    let effect = effect_size(baseline_mean, std_dev, uplift_fraction)?;
    let required_per_group = required_sample_size(effect, alpha, power)?;

    Ok(PowerAnalysis {
        effect_size: effect,
        expected_lift: uplift_fraction * baseline_mean,
        required_per_group,
    })
}
