//! Pulseboard Core Library
//!
//! Metrics transformation and widget-lifecycle engine: validates raw
//! backend payloads, derives display-ready structures, and runs each
//! dashboard widget's fetch/loading/error state machine independently.

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod widget;
pub mod widgets;

pub use client::{MetricsClient, Quote};
pub use config::DashboardConfig;
pub use error::MetricsError;
pub use widget::{Widget, WidgetState, WidgetStatus};
