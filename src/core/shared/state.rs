use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::utils::DbPool;
use crate::notifications::{BroadcastSink, NotificationSink, Outbox};

pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub sink: Arc<dyn NotificationSink>,
    /// Present when the sink is the in-process broadcaster, so transports can subscribe.
    pub broadcaster: Option<BroadcastSink>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("sink", &"Arc<dyn NotificationSink>")
            .field("broadcaster", &self.broadcaster.is_some())
            .finish()
    }
}

impl AppState {
    pub fn new(conn: DbPool, config: AppConfig) -> Self {
        let broadcaster = BroadcastSink::new(config.notification_buffer);
        Self {
            conn,
            config,
            sink: Arc::new(broadcaster.clone()),
            broadcaster: Some(broadcaster),
        }
    }

    pub fn with_sink(conn: DbPool, config: AppConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            conn,
            config,
            sink,
            broadcaster: None,
        }
    }

    /// Runs `op` in one write-locking transaction on the blocking pool, then
    /// hands the queued notifications to the sink once the commit succeeded.
    pub async fn transact<T, F>(&self, op: F) -> PlanResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection, &mut Outbox) -> PlanResult<T> + Send + 'static,
    {
        let pool = self.conn.clone();
        let (value, outbox) = tokio::task::spawn_blocking(move || -> PlanResult<(T, Outbox)> {
            let mut pooled = pool.get()?;
            let conn: &mut SqliteConnection = &mut pooled;
            let mut outbox = Outbox::default();
            let value = conn.immediate_transaction(|c| op(c, &mut outbox))?;
            Ok((value, outbox))
        })
        .await
        .map_err(|e| PlanError::Internal(format!("worker task failed: {e}")))??;

        outbox.dispatch(self.sink.as_ref());
        Ok(value)
    }

    /// Read-only counterpart of [`AppState::transact`].
    pub async fn query<T, F>(&self, op: F) -> PlanResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> PlanResult<T> + Send + 'static,
    {
        let pool = self.conn.clone();
        tokio::task::spawn_blocking(move || -> PlanResult<T> {
            let mut pooled = pool.get()?;
            let conn: &mut SqliteConnection = &mut pooled;
            conn.transaction(op)
        })
        .await
        .map_err(|e| PlanError::Internal(format!("worker task failed: {e}")))?
    }
}
