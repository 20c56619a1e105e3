//! The concrete dashboard widgets.
//!
//! Each constructor wires one backend endpoint through its validation
//! and transformation pipeline and hands back an independent
//! [`Widget`]. Chart widgets keep the full validated series so a window
//! switch re-filters in place instead of refetching.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::client::{MetricsClient, Quote};
use crate::metrics::{
    CategoricalDistribution, CategoryShare, DailySeries, Delta, HourlySeries,
    ResponseTimeHistograms,
};
use crate::widget::{Widget, WidgetState};

/// Headline number plus its period-over-period badge. `delta` is `None`
/// when the previous period was zero (suppressed by policy).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatCard {
    pub latest: f64,
    pub delta: Option<Delta>,
}

/// Active users today, compared to the day before.
pub fn active_users_card(client: &MetricsClient) -> Widget<StatCard> {
    let client = client.clone();
    Widget::spawn("active-users-card", move || {
        let client = client.clone();
        async move {
            let payload = client.daily_active_users().await?;
            let series = DailySeries::from_payload(&payload)?;
            let delta = series.delta()?;
            let latest = series.latest().map(|p| p.count).unwrap_or_default();
            Ok(StatCard { latest, delta })
        }
    })
}

/// Requests in the last hour, compared to the hour before.
pub fn api_requests_card(client: &MetricsClient) -> Widget<StatCard> {
    let client = client.clone();
    Widget::spawn("api-requests-card", move || {
        let client = client.clone();
        async move {
            let payload = client.api_requests().await?;
            let series = HourlySeries::from_payload(&payload)?;
            let delta = series.delta()?;
            let latest = series.latest().map(|p| p.count).unwrap_or_default();
            Ok(StatCard { latest, delta })
        }
    })
}

/// Daily active users trend; window with [`DailySeries::window`] at
/// render time against an injected reference date.
pub fn daily_users_chart(client: &MetricsClient) -> Widget<DailySeries> {
    let client = client.clone();
    Widget::spawn("daily-users-chart", move || {
        let client = client.clone();
        async move {
            let payload = client.daily_active_users().await?;
            DailySeries::from_payload(&payload)
        }
    })
}

/// Hourly API request trend; window with [`HourlySeries::window`] at
/// render time.
pub fn api_requests_chart(client: &MetricsClient) -> Widget<HourlySeries> {
    let client = client.clone();
    Widget::spawn("api-requests-chart", move || {
        let client = client.clone();
        async move {
            let payload = client.api_requests().await?;
            HourlySeries::from_payload(&payload)
        }
    })
}

/// New signups over the backend's full reporting window, unfiltered.
pub fn new_signups_chart(client: &MetricsClient) -> Widget<DailySeries> {
    let client = client.clone();
    Widget::spawn("new-signups-chart", move || {
        let client = client.clone();
        async move {
            let payload = client.new_signups().await?;
            DailySeries::from_payload(&payload)
        }
    })
}

/// Top countries by share of usage, ranked and truncated eagerly.
pub fn country_usage_chart(client: &MetricsClient, top: usize) -> Widget<Vec<CategoryShare>> {
    let client = client.clone();
    Widget::spawn("country-usage-chart", move || {
        let client = client.clone();
        async move {
            let payload = client.country_metrics().await?;
            let dist = CategoricalDistribution::from_payload(&payload, "country", "counts")?;
            Ok(dist.rank(top))
        }
    })
}

/// Feature usage fractions, one row per feature.
pub fn feature_usage_table(client: &MetricsClient) -> Widget<CategoricalDistribution> {
    let client = client.clone();
    Widget::spawn("feature-usage-table", move || {
        let client = client.clone();
        async move {
            let payload = client.feature_usage().await?;
            CategoricalDistribution::from_payload(&payload, "feature", "fraction")
        }
    })
}

/// Error counts per API endpoint, one row per endpoint.
pub fn endpoint_errors_table(client: &MetricsClient) -> Widget<CategoricalDistribution> {
    let client = client.clone();
    Widget::spawn("endpoint-errors-table", move || {
        let client = client.clone();
        async move {
            let payload = client.endpoint_errors().await?;
            CategoricalDistribution::from_payload(&payload, "endpoint", "counts")
        }
    })
}

/// Response-time buckets for every endpoint, bucketized eagerly so tab
/// switches are pure selection.
pub fn response_time_histograms(client: &MetricsClient) -> Widget<ResponseTimeHistograms> {
    let client = client.clone();
    Widget::spawn("response-time-histograms", move || {
        let client = client.clone();
        async move {
            let payload = client.response_times().await?;
            ResponseTimeHistograms::from_payload(&payload)
        }
    })
}

/// The quote board: the one widget with user-triggered refresh. The
/// requested count rides along in a shared slot so a refresh can change
/// it without respawning the widget.
pub struct QuoteBoard {
    widget: Widget<Vec<Quote>>,
    count: Arc<AtomicU32>,
}

impl QuoteBoard {
    pub fn spawn(client: &MetricsClient, initial_count: u32) -> Self {
        let count = Arc::new(AtomicU32::new(initial_count.max(1)));
        let client = client.clone();
        let shared = count.clone();
        let widget = Widget::spawn("quote-board", move || {
            let client = client.clone();
            let shared = shared.clone();
            async move { client.quotes(shared.load(Ordering::Acquire)).await }
        });
        Self { widget, count }
    }

    /// Fetch a fresh batch of `n` quotes, overwriting the previous
    /// data or error in place.
    pub fn refresh(&self, n: u32) -> bool {
        self.count.store(n.max(1), Ordering::Release);
        self.widget.refresh()
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    pub fn state(&self) -> WidgetState<Vec<Quote>> {
        self.widget.state()
    }

    pub async fn settled(&mut self) -> WidgetState<Vec<Quote>> {
        self.widget.settled().await
    }
}
