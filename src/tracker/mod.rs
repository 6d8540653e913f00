//! Polls the focused window and turns focus transitions into [ActivityRecord]s.

pub mod focus;
pub mod shutdown;

use std::{fmt::Display, time::Duration};

use anyhow::Result;
use clap::ValueEnum;
use focus::{ClosedInterval, FocusTracker};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::{
    classify::Classifier,
    storage::{entities::ActivityRecord, log_store::CsvLogStore},
    utils::{clock::Clock, time::truncate_to_seconds},
    window_api::{read_active_title, WindowManager},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// When closed records reach the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FlushPolicy {
    /// Buffer everything and write once when tracking stops. A killed process loses the session.
    #[default]
    OnExit,
    /// Append each record as soon as its window loses focus.
    EachTransition,
}

impl Display for FlushPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlushPolicy::OnExit => write!(f, "on-exit"),
            FlushPolicy::EachTransition => write!(f, "each-transition"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackingOptions {
    pub poll_interval: Duration,
    pub flush_policy: FlushPolicy,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            flush_policy: FlushPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingSummary {
    /// Records written to the log during the session.
    pub saved: usize,
}

pub struct TrackingSession {
    window_manager: Box<dyn WindowManager>,
    classifier: Classifier,
    store: CsvLogStore,
    clock: Box<dyn Clock>,
    options: TrackingOptions,
    shutdown: CancellationToken,
}

impl TrackingSession {
    pub fn new(
        window_manager: Box<dyn WindowManager>,
        classifier: Classifier,
        store: CsvLogStore,
        clock: Box<dyn Clock>,
        options: TrackingOptions,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            window_manager,
            classifier,
            store,
            clock,
            options,
            shutdown,
        }
    }

    /// Token that stops [TrackingSession::run] when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    async fn close_interval(&self, closed: ClosedInterval) -> ActivityRecord {
        let (category, detail) = self.classifier.categorize(&closed.title).await;
        let record = ActivityRecord::new(closed.title, category, detail, closed.start, closed.end);
        println!(
            "Tracked: {} ({} - {}) for {:.2} seconds.",
            record.application, record.category, record.detail, record.duration_seconds
        );
        record
    }

    /// Executes the polling loop until `shutdown` is cancelled, then flushes whatever is still
    /// buffered. The window focused at that moment is not recorded.
    #[instrument(skip(self), fields(options = ?self.options))]
    pub async fn run(mut self) -> Result<TrackingSummary> {
        let mut focus = FocusTracker::new();
        let mut buffer = Vec::<ActivityRecord>::new();
        let mut saved = 0usize;

        let mut poll_point = self.clock.instant();
        loop {
            poll_point += self.options.poll_interval;

            let title = read_active_title(self.window_manager.as_mut());
            let now = truncate_to_seconds(self.clock.time()).naive_local();

            if let Some(closed) = focus.observe(&title, now) {
                let record = self.close_interval(closed).await;
                debug!("Closed {:?}", record);
                match self.options.flush_policy {
                    FlushPolicy::OnExit => buffer.push(record),
                    FlushPolicy::EachTransition => {
                        self.store.append_async(vec![record]).await?;
                        saved += 1;
                    }
                }
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = self.clock.sleep_until(poll_point) => ()
            }
        }

        println!("\nTracking stopped. Saving logs...");
        info!("Tracking stopped, flushing {} records", buffer.len());
        // Always written, so even an empty session leaves a table behind.
        saved += buffer.len();
        self.store.append_async(buffer).await?;
        Ok(TrackingSummary { saved })
    }
}
