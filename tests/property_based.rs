//! Property-based tests for the statistical core
//!
//! Covers the invariants that must hold for every input, not just the
//! worked examples: partition totality, seeded determinism, solver
//! monotonicity, and the strict window boundary.

use proptest::prelude::*;

use chrono::NaiveDate;
use geolift::analysis::{compare_groups, required_sample_size, TestOutcome};
use geolift::assignment::{assign_groups, Group};
use geolift::ingest::{MetricSeries, Observation};
use geolift::window::trailing_window;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_assignment_is_total_partition(
        units in prop::collection::hash_set("[a-z]{2,8}", 1..40),
        fraction in 0.0f64..=1.0,
        seed in 0u64..1000,
    ) {
        let units: Vec<String> = units.into_iter().collect();
        let assignment = assign_groups(&units, fraction, seed).unwrap();

        // Control size is the floor of the requested share
        let expected = (units.len() as f64 * fraction).floor() as usize;
        prop_assert_eq!(assignment.holdout_count(), expected);

        // Every unit lands in exactly one group
        let control: Vec<&str> = assignment.control_units().collect();
        let test: Vec<&str> = assignment.test_units().collect();
        prop_assert_eq!(control.len() + test.len(), units.len());
        for unit in &units {
            match assignment.group_of(unit) {
                Group::Control => prop_assert!(control.contains(&unit.as_str())),
                Group::Test => prop_assert!(test.contains(&unit.as_str())),
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_assignment_deterministic_and_order_independent(
        units in prop::collection::hash_set("[a-z]{2,8}", 1..30),
        fraction in 0.0f64..=1.0,
        seed in 0u64..1000,
    ) {
        let forward: Vec<String> = units.iter().cloned().collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a: Vec<String> = assign_groups(&forward, fraction, seed)
            .unwrap()
            .control_units()
            .map(str::to_string)
            .collect();
        let b: Vec<String> = assign_groups(&reversed, fraction, seed)
            .unwrap()
            .control_units()
            .map(str::to_string)
            .collect();

        prop_assert_eq!(a, b);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_sample_size_monotone_in_power(
        effect in 0.1f64..2.0,
        alpha in 0.01f64..0.2,
        power in 0.5f64..0.9,
    ) {
        let lower = required_sample_size(effect, alpha, power).unwrap();
        let higher = required_sample_size(effect, alpha, power + 0.05).unwrap();
        prop_assert!(higher >= lower);
    }

    #[test]
    fn prop_sample_size_monotone_in_alpha(
        effect in 0.1f64..2.0,
        alpha in 0.01f64..0.15,
        power in 0.5f64..0.95,
    ) {
        let strict = required_sample_size(effect, alpha, power).unwrap();
        let loose = required_sample_size(effect, alpha + 0.05, power).unwrap();
        prop_assert!(strict >= loose);
    }

    #[test]
    fn prop_sample_size_at_least_two(
        effect in 0.1f64..50.0,
        alpha in 0.01f64..0.2,
        power in 0.5f64..0.95,
    ) {
        let n = required_sample_size(effect, alpha, power).unwrap();
        prop_assert!(n >= 2);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_small_groups_never_tested(
        test_len in 0usize..2,
        control in prop::collection::vec(0.0f32..100.0, 0..10),
    ) {
        let test: Vec<f32> = (0..test_len).map(|i| i as f32).collect();
        let outcome = compare_groups(&test, &control).unwrap();
        let is_skipped = matches!(outcome, TestOutcome::Skipped { .. });
        prop_assert!(is_skipped);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_window_boundary_is_strict(
        day_offsets in prop::collection::vec(0i64..120, 1..60),
        window in 1i64..90,
    ) {
        let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let observations: Vec<Observation> = day_offsets
            .iter()
            .enumerate()
            .map(|(i, &offset)| Observation {
                date: origin + chrono::Duration::days(offset),
                geo: format!("geo{}", i),
                value: 1.0,
            })
            .collect();
        let series = MetricSeries::from_observations("revenue", observations);

        let max_date = series.max_date().unwrap();
        let cutoff = max_date - chrono::Duration::days(window);
        let filtered = trailing_window(&series, window);

        // Exactly the strictly-later rows survive
        let expected = series
            .observations
            .iter()
            .filter(|o| o.date > cutoff)
            .count();
        prop_assert_eq!(filtered.len(), expected);
        for obs in &filtered.observations {
            prop_assert!(obs.date > cutoff);
        }

        // The latest day always survives a positive window
        prop_assert!(filtered.observations.iter().any(|o| o.date == max_date));
    }
}
