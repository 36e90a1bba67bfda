//! # Notification Dispatch
//!
//! Pushes a normalized failure to two independent, injected UI channels: a
//! transient toast and a blocking alert. The channels are capability traits
//! so the pipeline runs (and tests) without a UI runtime; the host app
//! injects its real toast/alert implementations.

use std::collections::VecDeque;
use std::sync::Mutex;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::types::NotificationEvent;

/// Default capacity of the in-memory notification buffer
pub const DEFAULT_MEMORY_LIMIT: usize = 100;

/// A notification channel failed to present an event.
#[derive(Debug, Error)]
#[error("notification sink unavailable: {reason}")]
pub struct SinkError {
    reason: String,
}

impl SinkError {
    /// Creates a sink error with the given reason
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// An injected UI notification channel.
///
/// Implementations must not panic. A sink that cannot present (for example a
/// toast overlay that is not mounted yet) returns an error; the dispatcher
/// logs it and carries on with the remaining channel.
pub trait NotificationSink: Send + Sync {
    /// Presents the event to the user
    fn show(&self, event: &NotificationEvent) -> Result<(), SinkError>;
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    fn show(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        (**self).show(event)
    }
}

/// Notification sink that emits through `tracing`.
///
/// Default wiring for both channels when the host app injects nothing, and a
/// reasonable stand-in during headless runs.
#[derive(Debug)]
pub struct TracingSink {
    channel: &'static str,
}

impl TracingSink {
    /// Sink standing in for the transient toast channel
    pub fn toast() -> Self {
        Self { channel: "toast" }
    }

    /// Sink standing in for the blocking alert channel
    pub fn alert() -> Self {
        Self { channel: "alert" }
    }
}

impl NotificationSink for TracingSink {
    fn show(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        info!(
            channel = self.channel,
            title = %event.title,
            message = %event.message,
            "User notification"
        );
        Ok(())
    }
}

/// Bounded in-memory notification buffer.
///
/// Keeps the most recent events up to a fixed limit. Used as the recording
/// sink in tests and as a "recent notifications" feed inside the app.
#[derive(Debug)]
pub struct MemorySink {
    limit: usize,
    events: Mutex<VecDeque<NotificationEvent>>,
}

impl MemorySink {
    /// Creates a buffer with the default capacity
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MEMORY_LIMIT)
    }

    /// Creates a buffer keeping at most `limit` events
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            events: Mutex::new(VecDeque::with_capacity(limit.min(DEFAULT_MEMORY_LIMIT))),
        }
    }

    /// Returns the buffered events, oldest first
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    /// Returns true when no events are buffered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for MemorySink {
    fn show(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| SinkError::new("notification buffer poisoned"))?;

        events.push_back(event.clone());
        while events.len() > self.limit {
            events.pop_front();
        }
        Ok(())
    }
}

/// Dispatches each notification event to both channels.
///
/// Fires the toast first, then the alert, with the identical event. A failing
/// channel is logged and swallowed so the other channel always gets its
/// chance. There is no deduplication or coalescing across calls: every
/// dispatch produces exactly one toast attempt and one alert attempt.
pub struct Dispatcher {
    toast: Box<dyn NotificationSink>,
    alert: Box<dyn NotificationSink>,
    record_metrics: bool,
}

impl Dispatcher {
    /// Creates a dispatcher over the given toast and alert channels
    pub fn new(toast: Box<dyn NotificationSink>, alert: Box<dyn NotificationSink>) -> Self {
        Self {
            toast,
            alert,
            record_metrics: true,
        }
    }

    /// Enables or disables notification counters
    pub fn with_metrics(mut self, record_metrics: bool) -> Self {
        self.record_metrics = record_metrics;
        self
    }

    /// Pushes the event through both channels
    pub fn dispatch(&self, event: &NotificationEvent) {
        self.fire("toast", self.toast.as_ref(), event);
        self.fire("alert", self.alert.as_ref(), event);
    }

    fn fire(&self, channel: &'static str, sink: &dyn NotificationSink, event: &NotificationEvent) {
        match sink.show(event) {
            Ok(()) => {
                if self.record_metrics {
                    match channel {
                        "toast" => counter!("notifications.toast", 1),
                        _ => counter!("notifications.alert", 1),
                    }
                }
            }
            Err(err) => {
                warn!(channel, error = %err, title = %event.title, "Notification sink failed");
                if self.record_metrics {
                    counter!("notifications.sink_error", 1);
                }
            }
        }
    }
}
