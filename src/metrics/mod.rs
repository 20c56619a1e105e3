//! Pure payload transformations.
//!
//! Everything here is synchronous and side-effect free: raw JSON goes
//! in, a typed render-ready structure (or a [`crate::MetricsError`])
//! comes out. The async world lives in [`crate::client`] and
//! [`crate::widget`].

pub mod distribution;
pub mod histogram;
pub mod series;
pub mod validate;

pub use distribution::{CategoricalDistribution, CategoryCount, CategoryShare};
pub use histogram::{EndpointHistogram, HistogramBucket, ResponseTimeHistograms, OPEN_END};
pub use series::{
    yesterday, DailyPoint, DailySeries, DailyWindow, Delta, HourlyPoint, HourlySeries,
    HourlyWindow,
};
