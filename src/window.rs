//! Trailing-window filter for metric series.

use chrono::Duration;

use crate::ingest::MetricSeries;

/// Restrict a series to the trailing `days`-day window.
///
/// The cutoff is `max(date) − days`; rows are kept when `date > cutoff`, so
/// the boundary day itself is excluded. An empty input yields an empty
/// output, and a window longer than the data span keeps the whole series.
pub fn trailing_window(series: &MetricSeries, days: i64) -> MetricSeries {
    let Some(max_date) = series.max_date() else {
        return MetricSeries::new(series.metric.clone());
    };

    let cutoff = max_date - Duration::days(days);
    let observations = series
        .observations
        .iter()
        .filter(|o| o.date > cutoff)
        .cloned()
        .collect();

    MetricSeries::from_observations(series.metric.clone(), observations)
}
