// Statistical core: power analysis and significance testing
//
// This module wraps aprender's hypothesis testing and trueno's vector
// primitives, plus statrs distribution quantiles, to provide the two
// statistical operations of an incrementality experiment:
//
// - power.rs: effect size and required per-group sample size for a
//   two-sided, two-sample t-test
// - significance.rs: Welch's t-test on the observed test/control values
//
// Degenerate inputs (zero variance, non-positive expected lift, too few
// observations) surface as errors or an explicit skipped outcome, never as
// silent NaNs.

mod power;
mod significance;

pub use power::{effect_size, required_sample_size, solve_power, PowerAnalysis};
pub use significance::{compare_groups, SignificanceTest, TestOutcome};
