// Test/control group assignment for geo units
//
// The holdout is a seeded random sample drawn without replacement, so the
// same unit set and seed always produce the same partition. Unit ids are
// sorted and deduplicated before the draw, which makes the assignment
// independent of input row order.

use std::collections::BTreeSet;
use std::fmt;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Which arm of the experiment a geo unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Group {
    /// Receives the budget increase
    Test,
    /// Held out as the counterfactual baseline
    Control,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Test => write!(f, "test"),
            Group::Control => write!(f, "control"),
        }
    }
}

/// Fixed partition of geo units into test and control for one run
#[derive(Debug, Clone)]
pub struct GroupAssignment {
    units: Vec<String>,
    control: BTreeSet<String>,
    seed: u64,
}

impl GroupAssignment {
    /// Group membership for a unit; units outside the assignment's universe
    /// count as test (they were never held out)
    pub fn group_of(&self, unit: &str) -> Group {
        if self.control.contains(unit) {
            Group::Control
        } else {
            Group::Test
        }
    }

    /// Control units in sorted order
    pub fn control_units(&self) -> impl Iterator<Item = &str> {
        self.control.iter().map(String::as_str)
    }

    /// Test units in sorted order
    pub fn test_units(&self) -> impl Iterator<Item = &str> {
        self.units
            .iter()
            .filter(|u| !self.control.contains(u.as_str()))
            .map(String::as_str)
    }

    pub fn holdout_count(&self) -> usize {
        self.control.len()
    }

    pub fn total_units(&self) -> usize {
        self.units.len()
    }

    /// Realized holdout share as a percentage of total units
    pub fn holdout_percent(&self) -> f64 {
        (self.control.len() as f64 / self.units.len() as f64) * 100.0
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Partition geo units into control/test with a seeded draw.
///
/// Draws `floor(N × holdout_fraction)` control units without replacement.
/// Every unit is assigned exactly once; a fraction that floors to zero units
/// yields an empty control group, which downstream components must handle.
///
/// # Errors
/// Fails on an empty unit set or a fraction outside [0, 1].
pub fn assign_groups(
    units: &[String],
    holdout_fraction: f64,
    seed: u64,
) -> Result<GroupAssignment> {
    if units.is_empty() {
        bail!("cannot assign groups: no geographic units in the input");
    }

    if !holdout_fraction.is_finite() || !(0.0..=1.0).contains(&holdout_fraction) {
        bail!(
            "holdout fraction must be in [0, 1], got {}",
            holdout_fraction
        );
    }

    let unique: BTreeSet<&String> = units.iter().collect();
    let sorted: Vec<String> = unique.into_iter().cloned().collect();

    let holdout_count = (sorted.len() as f64 * holdout_fraction).floor() as usize;

    let mut rng = StdRng::seed_from_u64(seed);
    let control: BTreeSet<String> = sorted
        .choose_multiple(&mut rng, holdout_count)
        .cloned()
        .collect();

    Ok(GroupAssignment {
        units: sorted,
        control,
        seed,
    })
}
