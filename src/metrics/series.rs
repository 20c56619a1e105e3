//! Typed metric series plus the trailing-window and delta derivations.
//!
//! Two flavors come off the wire: day-granularity series keyed by `dates`
//! (real calendar dates, windowed against an injected reference point)
//! and hour-granularity series keyed by `hours` (opaque timestamp labels,
//! windowed positionally). Both are immutable once validated and replaced
//! wholesale on refetch.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use super::validate;
use crate::error::MetricsError;

/// One day of a daily series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub count: f64,
}

/// One hour of an hourly series. The label is kept opaque; no timestamp
/// semantics are assumed beyond acquisition order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub hour: String,
    pub count: f64,
}

/// Trailing windows supported for daily series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyWindow {
    Days7,
    Days30,
}

impl DailyWindow {
    pub fn days(self) -> i64 {
        match self {
            DailyWindow::Days7 => 7,
            DailyWindow::Days30 => 30,
        }
    }
}

/// Trailing windows supported for hourly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourlyWindow {
    Hours12,
    Hours24,
}

impl HourlyWindow {
    pub fn hours(self) -> usize {
        match self {
            HourlyWindow::Hours12 => 12,
            HourlyWindow::Hours24 => 24,
        }
    }
}

/// Period-over-period change between the two most recent points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub latest: f64,
    pub previous: f64,
    /// Percentage change, rounded to one decimal for display.
    pub percent: f64,
}

impl Delta {
    pub fn is_increase(&self) -> bool {
        self.percent >= 0.0
    }
}

/// The day-before reference point used when windowing daily series.
/// Recomputed at render time so consecutive renders track real time.
pub fn yesterday() -> NaiveDate {
    Utc::now().date_naive() - Duration::days(1)
}

/// Delta over a count column. Tri-state: `Ok(Some)` when computable,
/// `Ok(None)` when the previous value is zero (a zero base would show a
/// misleading spike, so the delta is suppressed rather than ±inf),
/// `Err(InsufficientData)` below two points.
fn delta_over(counts: &[f64]) -> Result<Option<Delta>, MetricsError> {
    if counts.len() < 2 {
        return Err(MetricsError::InsufficientData {
            needed: 2,
            got: counts.len(),
        });
    }
    let latest = counts[counts.len() - 1];
    let previous = counts[counts.len() - 2];
    if previous <= 0.0 {
        return Ok(None);
    }
    let percent = round1((latest - previous) / previous * 100.0);
    Ok(Some(Delta {
        latest,
        previous,
        percent,
    }))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Day-granularity series, ordered as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySeries {
    points: Vec<DailyPoint>,
}

impl DailySeries {
    /// Validate a `{dates: string[], counts: number[]}` payload into a
    /// typed series. Input order is preserved; nothing is sorted or
    /// deduplicated.
    pub fn from_payload(payload: &Value) -> Result<Self, MetricsError> {
        let (labels, counts) = validate::aligned_columns(payload, "dates", "counts")?;
        let mut points = Vec::with_capacity(labels.len());
        for (idx, (label, count)) in labels.iter().zip(counts).enumerate() {
            let date = parse_date(label).ok_or_else(|| {
                MetricsError::Validation(format!("`dates[{idx}]` is not a date: {label:?}"))
            })?;
            points.push(DailyPoint { date, count });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<DailyPoint> {
        self.points.last().copied()
    }

    /// Trailing sub-series relative to `reference`: a point survives iff
    /// its date is at or after `reference - window`. A series shorter
    /// than the window comes back whole, unpadded. Re-windowing never
    /// refetches; it re-filters the data in hand.
    pub fn window(&self, window: DailyWindow, reference: NaiveDate) -> DailySeries {
        let start = reference - Duration::days(window.days());
        DailySeries {
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start)
                .copied()
                .collect(),
        }
    }

    /// Change between the two most recent days. See [`Delta`].
    pub fn delta(&self) -> Result<Option<Delta>, MetricsError> {
        let counts: Vec<f64> = self.points.iter().map(|p| p.count).collect();
        delta_over(&counts)
    }
}

/// Hour-granularity series, ordered as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlySeries {
    points: Vec<HourlyPoint>,
}

impl HourlySeries {
    /// Validate a `{hours: string[], counts: number[]}` payload.
    pub fn from_payload(payload: &Value) -> Result<Self, MetricsError> {
        let (labels, counts) = validate::aligned_columns(payload, "hours", "counts")?;
        let points = labels
            .into_iter()
            .zip(counts)
            .map(|(hour, count)| HourlyPoint { hour, count })
            .collect();
        Ok(Self { points })
    }

    pub fn points(&self) -> &[HourlyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&HourlyPoint> {
        self.points.last()
    }

    /// Positional trailing slice: the last N entries, independent of
    /// wall-clock time. Shorter series come back whole.
    pub fn window(&self, window: HourlyWindow) -> HourlySeries {
        let n = window.hours();
        let skip = self.points.len().saturating_sub(n);
        HourlySeries {
            points: self.points[skip..].to_vec(),
        }
    }

    /// Change between the two most recent hours. See [`Delta`].
    pub fn delta(&self) -> Result<Option<Delta>, MetricsError> {
        let counts: Vec<f64> = self.points.iter().map(|p| p.count).collect();
        delta_over(&counts)
    }
}

/// Accept plain ISO dates and fall back to full RFC 3339 timestamps,
/// which some backends emit for day-granularity labels.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn daily_fixture(days: i64, ending: NaiveDate) -> DailySeries {
        let dates: Vec<String> = (0..days)
            .map(|i| (ending - Duration::days(days - 1 - i)).to_string())
            .collect();
        let counts: Vec<f64> = (0..days).map(|i| i as f64).collect();
        DailySeries::from_payload(&json!({ "dates": dates, "counts": counts })).unwrap()
    }

    #[test]
    fn validation_rejects_length_mismatch() {
        let payload = json!({ "dates": ["2024-01-01"], "counts": [1, 2] });
        let err = DailySeries::from_payload(&payload).unwrap_err();
        assert!(matches!(err, MetricsError::Validation(_)));
    }

    #[test]
    fn validation_rejects_bad_dates() {
        let payload = json!({ "dates": ["2024-01-01", "not-a-date"], "counts": [1, 2] });
        let err = DailySeries::from_payload(&payload).unwrap_err();
        assert!(err.to_string().contains("dates[1]"), "got: {err}");
    }

    #[test]
    fn rfc3339_labels_are_accepted() {
        let payload = json!({ "dates": ["2024-06-01T00:00:00Z"], "counts": [7] });
        let series = DailySeries::from_payload(&payload).unwrap();
        assert_eq!(
            series.points()[0].date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn input_order_is_preserved() {
        // Out-of-order input stays out of order; the validator never sorts.
        let payload = json!({
            "dates": ["2024-03-02", "2024-03-01"],
            "counts": [2, 1],
        });
        let series = DailySeries::from_payload(&payload).unwrap();
        assert_eq!(series.points()[0].count, 2.0);
        assert_eq!(series.points()[1].count, 1.0);
    }

    #[test]
    fn thirty_day_window_boundary_is_inclusive() {
        // 40 daily points ending the day before the reference: the 30-day
        // window keeps exactly 30, the oldest sitting exactly 30 days back.
        let reference = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let series = daily_fixture(40, reference - Duration::days(1));
        let windowed = series.window(DailyWindow::Days30, reference);
        assert_eq!(windowed.len(), 30);
        assert_eq!(
            windowed.points()[0].date,
            reference - Duration::days(30)
        );
    }

    #[test]
    fn short_series_comes_back_whole() {
        let reference = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let series = daily_fixture(3, reference);
        assert_eq!(series.window(DailyWindow::Days7, reference).len(), 3);
        assert_eq!(series.window(DailyWindow::Days30, reference).len(), 3);
    }

    #[test]
    fn shifting_reference_shifts_the_window() {
        let reference = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let series = daily_fixture(40, reference - Duration::days(1));
        let today = series.window(DailyWindow::Days7, reference);
        let tomorrow = series.window(DailyWindow::Days7, reference + Duration::days(1));
        assert_eq!(today.len(), 7);
        assert_eq!(tomorrow.len(), 6);
    }

    #[test]
    fn hourly_window_takes_trailing_slice() {
        let hours: Vec<String> = (0..30).map(|i| format!("h{i}")).collect();
        let counts: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let series =
            HourlySeries::from_payload(&json!({ "hours": hours, "counts": counts })).unwrap();

        let last12 = series.window(HourlyWindow::Hours12);
        assert_eq!(last12.len(), 12);
        assert_eq!(last12.points()[0].hour, "h18");

        let last24 = series.window(HourlyWindow::Hours24);
        assert_eq!(last24.len(), 24);
        assert_eq!(last24.points()[23].hour, "h29");
    }

    #[test]
    fn hourly_window_on_short_series() {
        let series =
            HourlySeries::from_payload(&json!({ "hours": ["a", "b"], "counts": [1, 2] }))
                .unwrap();
        assert_eq!(series.window(HourlyWindow::Hours24).len(), 2);
    }

    #[test]
    fn delta_matches_formula_rounded() {
        let series = HourlySeries::from_payload(
            &json!({ "hours": ["a", "b", "c"], "counts": [50.0, 120.0, 160.0] }),
        )
        .unwrap();
        let delta = series.delta().unwrap().unwrap();
        // (160 - 120) / 120 * 100 = 33.333... -> 33.3
        assert_eq!(delta.percent, 33.3);
        assert_eq!(delta.latest, 160.0);
        assert!(delta.is_increase());
    }

    #[test]
    fn delta_negative_direction() {
        let series = HourlySeries::from_payload(
            &json!({ "hours": ["a", "b"], "counts": [200.0, 150.0] }),
        )
        .unwrap();
        let delta = series.delta().unwrap().unwrap();
        assert_eq!(delta.percent, -25.0);
        assert!(!delta.is_increase());
    }

    #[test]
    fn delta_suppressed_on_zero_base() {
        // A zero previous value never produces ±inf; the delta is withheld.
        let series = HourlySeries::from_payload(
            &json!({ "hours": ["a", "b"], "counts": [0.0, 500.0] }),
        )
        .unwrap();
        assert_eq!(series.delta().unwrap(), None);
    }

    #[test]
    fn delta_needs_two_points() {
        let one = HourlySeries::from_payload(&json!({ "hours": ["a"], "counts": [9.0] }))
            .unwrap();
        assert!(matches!(
            one.delta().unwrap_err(),
            MetricsError::InsufficientData { needed: 2, got: 1 }
        ));

        let empty =
            HourlySeries::from_payload(&json!({ "hours": [], "counts": [] })).unwrap();
        assert!(matches!(
            empty.delta().unwrap_err(),
            MetricsError::InsufficientData { needed: 2, got: 0 }
        ));
    }
}
