//! Widget Lifecycle Controller
//!
//! Every dashboard widget owns one of these: a small state machine
//! (`Idle -> Loading -> Success | Error`) driven by a single spawned
//! task that runs the widget's fetch/validate/transform pipeline.
//! Widgets are fully independent; one failing never touches another.
//!
//! The fetch is bound to the widget's lifetime. Dropping the [`Widget`]
//! closes the state channel, the task's `select!` observes the closure,
//! and any in-flight result is discarded instead of being written to a
//! dead state slot.

use std::future::Future;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::MetricsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Pull-based view of one widget's slot: status plus at most one of
/// `data` / `error`.
#[derive(Debug, Clone)]
pub struct WidgetState<T> {
    pub status: WidgetStatus,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> WidgetState<T> {
    fn idle() -> Self {
        Self {
            status: WidgetStatus::Idle,
            data: None,
            error: None,
        }
    }

    /// Terminal until an explicit refresh.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, WidgetStatus::Success | WidgetStatus::Error)
    }
}

/// Handle to one independently-lifecycled widget.
pub struct Widget<T> {
    name: String,
    state_rx: watch::Receiver<WidgetState<T>>,
    refresh_tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl<T> Widget<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawn a widget around its loader (the fetch + validate +
    /// transform pipeline). The first load starts immediately; after it
    /// settles the loader only runs again on [`Widget::refresh`].
    pub fn spawn<L, Fut>(name: impl Into<String>, loader: L) -> Self
    where
        L: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, MetricsError>> + Send,
    {
        let name = name.into();
        let (state_tx, state_rx) = watch::channel(WidgetState::idle());
        let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<()>();

        let task_name = name.clone();
        let task = tokio::spawn(async move {
            loop {
                // Entering Loading clears the previous error; prior data
                // stays visible until the new result overwrites it.
                state_tx.send_modify(|s| {
                    s.status = WidgetStatus::Loading;
                    s.error = None;
                });

                tokio::select! {
                    _ = state_tx.closed() => {
                        debug!(widget = %task_name, "torn down mid-fetch, discarding result");
                        return;
                    }
                    result = loader() => {
                        match result {
                            Ok(data) => {
                                debug!(widget = %task_name, "loaded");
                                state_tx.send_modify(|s| {
                                    s.status = WidgetStatus::Success;
                                    s.data = Some(data);
                                    s.error = None;
                                });
                            }
                            Err(err) => {
                                warn!(
                                    widget = %task_name,
                                    retryable = err.is_retryable(),
                                    "load failed: {err}"
                                );
                                state_tx.send_modify(|s| {
                                    s.status = WidgetStatus::Error;
                                    s.data = None;
                                    s.error = Some(err.to_string());
                                });
                            }
                        }
                    }
                }

                // Hold the terminal state until a refresh or teardown.
                tokio::select! {
                    _ = state_tx.closed() => return,
                    msg = refresh_rx.recv() => {
                        if msg.is_none() {
                            return;
                        }
                    }
                }
            }
        });

        Self {
            name,
            state_rx,
            refresh_tx,
            task,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current state slot.
    pub fn state(&self) -> WidgetState<T> {
        self.state_rx.borrow().clone()
    }

    pub fn status(&self) -> WidgetStatus {
        self.state_rx.borrow().status
    }

    /// Ask for another load. Returns false if the widget's task is
    /// already gone.
    pub fn refresh(&self) -> bool {
        self.refresh_tx.send(()).is_ok()
    }

    /// Wait until the current cycle reaches Success or Error and return
    /// that state.
    pub async fn settled(&mut self) -> WidgetState<T> {
        loop {
            {
                let state = self.state_rx.borrow_and_update();
                if state.is_settled() {
                    return state.clone();
                }
            }
            if self.state_rx.changed().await.is_err() {
                return self.state_rx.borrow().clone();
            }
        }
    }

    /// Whether the backing task has exited (it only does on teardown).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
