//! Error taxonomy for the metrics pipeline.
//!
//! Everything that can go wrong between the wire and a render-ready
//! structure maps onto one of these variants. All of them are caught at
//! the widget boundary and turned into the widget's `Error` state; none
//! propagate past a single widget.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    /// Network-level failure or a non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request deadline expired before a response arrived.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// A payload shape invariant was violated: missing array, type
    /// mismatch, length mismatch, malformed JSON body.
    #[error("invalid payload: {0}")]
    Validation(String),

    /// Fewer points than an operation requires (deltas need two).
    #[error("insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },
}

impl MetricsError {
    /// Transport and timeout failures may succeed on a later attempt;
    /// validation and insufficient-data failures will not until the
    /// backend changes what it serves.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MetricsError::Transport(_) | MetricsError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(MetricsError::Transport("connection refused".into()).is_retryable());
        assert!(MetricsError::Timeout("30s elapsed".into()).is_retryable());
        assert!(!MetricsError::Validation("counts missing".into()).is_retryable());
        assert!(!MetricsError::InsufficientData { needed: 2, got: 1 }.is_retryable());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = MetricsError::InsufficientData { needed: 2, got: 0 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 2 points, got 0"
        );
    }
}
