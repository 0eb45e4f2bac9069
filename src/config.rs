// Experiment configuration
//
// All knobs of the incrementality test live here: budget assumptions for the
// expected lift, the test window, the holdout share, and the statistical
// parameters of the power analysis. Values can come from a TOML file, CLI
// flags, or both (flags win).

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Configuration for a geo incrementality experiment
///
/// # Example
/// ```
/// use geolift::config::ExperimentConfig;
///
/// let config = ExperimentConfig::default();
/// assert_eq!(config.alpha, 0.1);
/// assert_eq!(config.power, 0.8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Weekly marketing budget in dollars
    pub weekly_budget: f64,

    /// Budget increase applied to test geos, as a percentage (e.g. 20 = +20%)
    ///
    /// The expected lift for the power analysis is
    /// `budget_increase_pct / 100 × baseline mean`.
    pub budget_increase_pct: f64,

    /// Test duration in weeks; the analysis window is the trailing
    /// `test_weeks × 7` days of the series
    pub test_weeks: u32,

    /// Share of geos held out as the control group, as a percentage
    ///
    /// The holdout count is `floor(unit_count × holdout_pct / 100)`, so small
    /// shares over few geos can legitimately round down to zero.
    pub holdout_pct: f64,

    /// Statistical significance level (alpha) for the two-sided test
    ///
    /// - 0.1 (default): 90% confidence, common for marketing experiments
    /// - 0.05: 95% confidence, stricter
    pub alpha: f64,

    /// Desired statistical power (probability of detecting the assumed effect)
    pub power: f64,

    /// Seed for the holdout draw; a fixed seed makes the assignment
    /// reproducible across runs
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            weekly_budget: 500.0,
            budget_increase_pct: 20.0,
            test_weeks: 4,
            holdout_pct: 20.0,
            alpha: 0.1,
            power: 0.8,
            seed: 42,
        }
    }
}

impl ExperimentConfig {
    /// Budget increase as a fraction (20% → 0.2)
    pub fn budget_increase_fraction(&self) -> f64 {
        self.budget_increase_pct / 100.0
    }

    /// Holdout share as a fraction (20% → 0.2)
    pub fn holdout_fraction(&self) -> f64 {
        self.holdout_pct / 100.0
    }

    /// Length of the analysis window in days
    pub fn window_days(&self) -> i64 {
        i64::from(self.test_weeks) * 7
    }

    /// Total budget over the test: `weekly × (1 + increase) × weeks`
    pub fn total_budget(&self) -> f64 {
        self.weekly_budget * (1.0 + self.budget_increase_fraction()) * f64::from(self.test_weeks)
    }

    /// Load configuration from a TOML file
    ///
    /// Missing keys fall back to their defaults, so a partial file is valid.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.weekly_budget.is_finite() || self.weekly_budget < 0.0 {
            return Err(format!(
                "weekly_budget must be non-negative, got {}",
                self.weekly_budget
            ));
        }

        if !self.budget_increase_pct.is_finite() || self.budget_increase_pct <= 0.0 {
            return Err(format!(
                "budget_increase_pct must be positive (a zero increase has no detectable effect), got {}",
                self.budget_increase_pct
            ));
        }

        if self.test_weeks == 0 {
            return Err("test_weeks must be at least 1".to_string());
        }

        if !self.holdout_pct.is_finite() || !(0.0..=100.0).contains(&self.holdout_pct) {
            return Err(format!(
                "holdout_pct must be in [0, 100], got {}",
                self.holdout_pct
            ));
        }

        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(format!("alpha must be in (0, 1), got {}", self.alpha));
        }

        if !self.power.is_finite() || self.power <= 0.0 || self.power >= 1.0 {
            return Err(format!("power must be in (0, 1), got {}", self.power));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExperimentConfig::default();
        assert_eq!(config.weekly_budget, 500.0);
        assert_eq!(config.budget_increase_pct, 20.0);
        assert_eq!(config.test_weeks, 4);
        assert_eq!(config.holdout_pct, 20.0);
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.power, 0.8);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_days() {
        let config = ExperimentConfig {
            test_weeks: 4,
            ..Default::default()
        };
        assert_eq!(config.window_days(), 28);
    }

    #[test]
    fn test_total_budget() {
        let config = ExperimentConfig::default();
        // 500 * 1.2 * 4
        assert!((config.total_budget() - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_alpha() {
        let config = ExperimentConfig {
            alpha: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ExperimentConfig {
            alpha: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_power() {
        let config = ExperimentConfig {
            power: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_holdout() {
        let config = ExperimentConfig {
            holdout_pct: 120.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ExperimentConfig {
            holdout_pct: -5.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_budget_increase_rejected() {
        let config = ExperimentConfig {
            budget_increase_pct: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_test_weeks_rejected() {
        let config = ExperimentConfig {
            test_weeks: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: ExperimentConfig = toml::from_str("alpha = 0.05\ntest_weeks = 8").unwrap();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.test_weeks, 8);
        // Untouched keys keep their defaults
        assert_eq!(config.power, 0.8);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExperimentConfig {
            holdout_pct: 30.0,
            seed: 7,
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        let back: ExperimentConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.holdout_pct, 30.0);
        assert_eq!(back.seed, 7);
    }
}
