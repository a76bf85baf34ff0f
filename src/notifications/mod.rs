//! Best-effort notices emitted after hours for a week change.
//!
//! Delivery never affects the operation that produced the notice: failures
//! are logged and dropped.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// "Someone updated hours for a week" notice for other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekUpdateNotice {
    pub id: Uuid,
    pub actor: String,
    pub production_week_id: i64,
    pub reporting_week_start_date: NaiveDate,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl WeekUpdateNotice {
    pub fn new(actor: &str, production_week_id: i64, reporting_week_start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor: actor.to_string(),
            production_week_id,
            reporting_week_start_date,
            message: format!(
                "{} updated hours for the week of {}.",
                actor,
                reporting_week_start_date.format("%b %d, %Y")
            ),
            created_at: Utc::now(),
        }
    }
}

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification channel is full")]
    ChannelFull,
    #[error("Notification channel is closed")]
    ChannelClosed,
}

/// Receives week update notices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notice: WeekUpdateNotice) -> Result<(), NotificationError>;
}

/// Writes notices to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, notice: WeekUpdateNotice) -> Result<(), NotificationError> {
        info!(
            notice_id = %notice.id,
            production_week_id = notice.production_week_id,
            actor = %notice.actor,
            "{}",
            notice.message
        );
        Ok(())
    }
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSink;

#[async_trait]
impl NotificationSink for NoopNotificationSink {
    async fn notify(&self, _notice: WeekUpdateNotice) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Hands notices to a bounded channel without waiting for capacity.
#[derive(Debug, Clone)]
pub struct ChannelNotificationSink {
    sender: mpsc::Sender<WeekUpdateNotice>,
}

impl ChannelNotificationSink {
    pub fn new(sender: mpsc::Sender<WeekUpdateNotice>) -> Self {
        Self { sender }
    }

    /// Creates a sink and the receiving end of its channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<WeekUpdateNotice>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl NotificationSink for ChannelNotificationSink {
    async fn notify(&self, notice: WeekUpdateNotice) -> Result<(), NotificationError> {
        self.sender.try_send(notice).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NotificationError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => NotificationError::ChannelClosed,
        })
    }
}

/// Delivers each notice, logging and counting failures instead of
/// returning them.
pub async fn dispatch(sink: &Arc<dyn NotificationSink>, notices: Vec<WeekUpdateNotice>) {
    for notice in notices {
        let week_id = notice.production_week_id;
        match sink.notify(notice).await {
            Ok(()) => counter!("shopfloor.notifications.sent", 1),
            Err(e) => {
                counter!("shopfloor.notifications.failed", 1);
                warn!(production_week_id = week_id, error = %e, "Failed to deliver week update notice");
            }
        }
    }
}

/// Runs [`dispatch`] on its own task so the caller never waits on the sink.
pub fn spawn_dispatch(
    sink: Arc<dyn NotificationSink>,
    notices: Vec<WeekUpdateNotice>,
) -> Option<JoinHandle<()>> {
    if notices.is_empty() {
        return None;
    }
    debug!(notices = notices.len(), "Queueing week update notices");
    Some(tokio::spawn(async move {
        dispatch(&sink, notices).await;
    }))
}
