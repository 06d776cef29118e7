//! Delivery side of the notification center.
//!
//! The core persists a notification and then hands it to a [`NotificationSink`].
//! What happens after that (sockets, push, mail) belongs to whoever implements the sink.

use log::{info, warn};
use serde::Serialize;
use std::sync::Mutex;
use tokio::sync::broadcast;

use crate::core::shared::models::Notification;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SinkEvent {
    Notification(Notification),
    UnreadCount { count: i64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub user_id: i32,
    #[serde(flatten)]
    pub event: SinkEvent,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("channel closed")]
    Closed,
    #[error("delivery failed: {0}")]
    Failed(String),
}

pub trait NotificationSink: Send + Sync {
    fn deliver(&self, user_id: i32, event: &SinkEvent) -> Result<(), SinkError>;
}

/// Post-commit list of events produced by one unit of work.
#[derive(Debug, Default)]
pub struct Outbox {
    deliveries: Vec<Delivery>,
}

impl Outbox {
    pub fn push(&mut self, user_id: i32, event: SinkEvent) {
        self.deliveries.push(Delivery { user_id, event });
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Best effort. A failed delivery is logged and never surfaces to the caller.
    pub fn dispatch(self, sink: &dyn NotificationSink) {
        for delivery in self.deliveries {
            if let Err(e) = sink.deliver(delivery.user_id, &delivery.event) {
                warn!(
                    "[NOTIFY] Delivery to user {} failed: {}",
                    delivery.user_id, e
                );
            }
        }
    }
}

/// Fans events out to in-process subscribers such as a websocket bridge.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Delivery>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.tx.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn deliver(&self, user_id: i32, event: &SinkEvent) -> Result<(), SinkError> {
        // No subscribers is not a failure; the row is already persisted.
        let _ = self.tx.send(Delivery {
            user_id,
            event: event.clone(),
        });
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, user_id: i32, event: &SinkEvent) -> Result<(), SinkError> {
        match event {
            SinkEvent::Notification(n) => info!(
                "[NOTIFY] user={} type={} title={}",
                user_id, n.notification_type, n.title
            ),
            SinkEvent::UnreadCount { count } => {
                info!("[NOTIFY] user={} unread={}", user_id, count)
            }
        }
        Ok(())
    }
}

/// Records every delivery. Useful for embedding and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Delivery>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn deliver(&self, user_id: i32, event: &SinkEvent) -> Result<(), SinkError> {
        let mut delivered = self
            .delivered
            .lock()
            .map_err(|e| SinkError::Failed(e.to_string()))?;
        delivered.push(Delivery {
            user_id,
            event: event.clone(),
        });
        Ok(())
    }
}
