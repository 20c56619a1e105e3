//! Pulseboard - Operational Metrics Dashboard Engine
//!
//! One-shot runner: spawns every dashboard widget against the
//! configured metrics backend, waits for each to settle, and reports
//! what the presentation layer would render. Widgets are independent;
//! a failing one is reported and the rest keep their data.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulseboard::metrics::{yesterday, DailyWindow, HourlyWindow};
use pulseboard::widget::WidgetState;
use pulseboard::widgets::{
    active_users_card, api_requests_card, api_requests_chart, country_usage_chart,
    daily_users_chart, endpoint_errors_table, feature_usage_table, new_signups_chart,
    response_time_histograms, QuoteBoard,
};
use pulseboard::{DashboardConfig, MetricsClient, WidgetStatus};

#[derive(Parser, Debug)]
#[command(name = "pulseboard", about = "Operational metrics dashboard engine")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Metrics backend base URL (overrides config)
    #[arg(long, env = "PULSEBOARD_BASE_URL")]
    base_url: Option<String>,

    /// Number of quotes to request from the quote board
    /// (defaults to the configured count)
    #[arg(long)]
    quotes: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("pulseboard=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    }
    .with_env_overrides();
    if let Some(url) = args.base_url {
        config.base_url = url;
    }

    info!(base_url = %config.base_url, "starting dashboard engine");
    let client = MetricsClient::new(&config).context("Failed to build metrics client")?;

    let mut users_card = active_users_card(&client);
    let mut requests_card = api_requests_card(&client);
    let mut users_chart = daily_users_chart(&client);
    let mut requests_chart = api_requests_chart(&client);
    let mut signups_chart = new_signups_chart(&client);
    let mut countries = country_usage_chart(&client, config.top_categories);
    let mut features = feature_usage_table(&client);
    let mut errors = endpoint_errors_table(&client);
    let mut histograms = response_time_histograms(&client);
    let quote_count = args.quotes.unwrap_or(config.default_quote_count);
    let mut quotes = QuoteBoard::spawn(&client, quote_count);

    if let Some(card) = report("active users (today)", users_card.settled().await) {
        match card.delta {
            Some(d) => info!("  {} users, {:+.1}% vs yesterday", card.latest, d.percent),
            None => info!("  {} users (no comparable previous day)", card.latest),
        }
    }
    if let Some(card) = report("api requests (last hour)", requests_card.settled().await) {
        match card.delta {
            Some(d) => info!("  {} requests, {:+.1}% vs previous hour", card.latest, d.percent),
            None => info!("  {} requests (no comparable previous hour)", card.latest),
        }
    }

    let reference = yesterday();
    if let Some(series) = report("daily active users chart", users_chart.settled().await) {
        info!(
            "  {} points fetched, {} in the 30d window, {} in the 7d window (up to {reference})",
            series.len(),
            series.window(DailyWindow::Days30, reference).len(),
            series.window(DailyWindow::Days7, reference).len(),
        );
    }
    if let Some(series) = report("api requests chart", requests_chart.settled().await) {
        info!(
            "  {} points fetched, {} in the trailing 24h, {} in the trailing 12h",
            series.len(),
            series.window(HourlyWindow::Hours24).len(),
            series.window(HourlyWindow::Hours12).len(),
        );
    }
    if let Some(series) = report("new signups chart", signups_chart.settled().await) {
        info!("  {} points", series.len());
    }

    if let Some(ranked) = report("top country usage", countries.settled().await) {
        for share in &ranked {
            info!("  {:<8} {:>6.2}%", share.category, share.percentage);
        }
    }
    if let Some(dist) = report("feature usage", features.settled().await) {
        for entry in dist.entries() {
            info!("  {:<24} {:.3}", entry.category, entry.count);
        }
    }
    if let Some(dist) = report("endpoint errors", errors.settled().await) {
        for entry in dist.entries() {
            info!("  {:<24} {}", entry.category, entry.count);
        }
    }
    if let Some(all) = report("response times", histograms.settled().await) {
        for histogram in all.endpoints() {
            let buckets: Vec<String> = histogram
                .buckets
                .iter()
                .map(|b| format!("{}:{}", b.label, b.count))
                .collect();
            info!("  {:<24} {}", histogram.endpoint, buckets.join(" "));
        }
    }
    if let Some(batch) = report("quotes", quotes.settled().await) {
        for quote in &batch {
            info!("  \"{}\" ({})", quote.quote, quote.author);
        }
    }

    Ok(())
}

/// Log the settled state of one widget; returns its data on success.
fn report<T>(label: &str, state: WidgetState<T>) -> Option<T> {
    match state.status {
        WidgetStatus::Success => {
            info!("{label}: ok");
            state.data
        }
        _ => {
            warn!(
                "{label}: {}",
                state.error.as_deref().unwrap_or("no data loaded")
            );
            None
        }
    }
}
