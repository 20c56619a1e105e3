//! Response-time histograms: per-endpoint bin edges into display buckets.

use serde::Serialize;
use serde_json::Value;

use super::validate;
use crate::error::MetricsError;

/// Marker for the right edge of the final, open-ended bucket.
pub const OPEN_END: &str = "∞";

/// One display bucket: a labeled interval and its count, unchanged from
/// the wire (no rebinning, no merging).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub label: String,
    pub count: f64,
}

/// All buckets for one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointHistogram {
    pub endpoint: String,
    pub buckets: Vec<HistogramBucket>,
}

/// Histograms for every endpoint in one payload, computed eagerly so
/// that selecting an endpoint for display never recomputes the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseTimeHistograms {
    endpoints: Vec<EndpointHistogram>,
}

impl ResponseTimeHistograms {
    /// Validate and bucketize a `{endpoint: string[], response_time:
    /// {bins_left_edge: number[], counts: number[]}[]}` payload. The
    /// outer arrays must align; each inner pair must align; bin edges
    /// must be strictly ascending.
    pub fn from_payload(payload: &Value) -> Result<Self, MetricsError> {
        let names = validate::string_column(payload, "endpoint")?;
        let series = validate::require_array(payload, "response_time")?;
        if names.len() != series.len() {
            return Err(MetricsError::Validation(format!(
                "`endpoint` and `response_time` arrays have different lengths ({} vs {})",
                names.len(),
                series.len()
            )));
        }

        let mut endpoints = Vec::with_capacity(names.len());
        for (endpoint, inner) in names.into_iter().zip(series) {
            let edges = validate::number_column(inner, "bins_left_edge")?;
            let counts = validate::number_column(inner, "counts")?;
            if edges.len() != counts.len() {
                return Err(MetricsError::Validation(format!(
                    "`bins_left_edge` and `counts` for {endpoint:?} have different lengths ({} vs {})",
                    edges.len(),
                    counts.len()
                )));
            }
            for pair in edges.windows(2) {
                if pair[1] <= pair[0] {
                    return Err(MetricsError::Validation(format!(
                        "`bins_left_edge` for {endpoint:?} is not strictly ascending ({} after {})",
                        pair[1], pair[0]
                    )));
                }
            }
            endpoints.push(EndpointHistogram {
                endpoint,
                buckets: bucketize(&edges, &counts),
            });
        }
        Ok(Self { endpoints })
    }

    pub fn endpoints(&self) -> &[EndpointHistogram] {
        &self.endpoints
    }

    pub fn get(&self, endpoint: &str) -> Option<&EndpointHistogram> {
        self.endpoints.iter().find(|h| h.endpoint == endpoint)
    }
}

/// N ascending left edges + N aligned counts -> N buckets. Bucket i is
/// labeled `edge[i]-edge[i+1]`; the last bucket has no right neighbor
/// and gets the open-ended marker instead.
fn bucketize(edges: &[f64], counts: &[f64]) -> Vec<HistogramBucket> {
    edges
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(i, (left, count))| {
            let right = match edges.get(i + 1) {
                Some(edge) => format_edge(*edge),
                None => OPEN_END.to_string(),
            };
            HistogramBucket {
                label: format!("{}-{}", format_edge(*left), right),
                count: *count,
            }
        })
        .collect()
}

/// Integral edges render without a trailing `.0`.
fn format_edge(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
