//! Background Task Sync Processor
//!
//! Drives the task projection's resyncs from a single background task:
//! - Startup: the first interval tick completes immediately
//! - Scheduled: resyncs on a fixed interval (hourly by default)
//! - Manual: wake signals resync on demand
//! - Graceful shutdown support
//!
//! All three paths run through one loop, so syncs are serialized. Rapid
//! wakes are coalesced: a wake that arrives while a resync is running queues
//! at most one follow-up run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::services::task_projection::TaskProjection;

/// Handle to wake the sync processor
///
/// This is a lightweight, cloneable handle that can be handed to UI layers
/// carrying a manual "resync now" action.
///
/// Multiple wakes are coalesced - the processor resyncs once regardless of
/// how many wake signals were sent.
#[derive(Clone)]
pub struct SyncWaker {
    trigger_tx: mpsc::Sender<()>,
}

impl SyncWaker {
    /// Wake the sync processor to resync now
    ///
    /// Non-blocking. If a resync is already pending this is a no-op
    /// (signals are coalesced).
    pub fn wake(&self) {
        // Use try_send to avoid blocking - if channel is full, a resync is already queued
        match self.trigger_tx.try_send(()) {
            Ok(_) => {
                tracing::debug!("TaskSyncProcessor wake signal sent");
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                // Channel full means the processor will resync anyway
                tracing::debug!("TaskSyncProcessor already has pending wake");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("TaskSyncProcessor has shut down, wake ignored");
            }
        }
    }
}

/// Configuration for the background sync schedule
#[derive(Debug, Clone)]
pub struct SyncProcessorConfig {
    /// Time between scheduled resyncs
    pub interval: Duration,
}

impl Default for SyncProcessorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Background driver for task projection resyncs
///
/// Owns one background task that serializes every resync: the startup sync,
/// the scheduled interval syncs, and manual wakes all run through the same
/// loop, one at a time.
pub struct TaskSyncProcessor {
    waker: SyncWaker,
    _shutdown_tx: mpsc::Sender<()>,
}

impl TaskSyncProcessor {
    /// Create and start the processor with the default hourly schedule
    pub fn new(projection: Arc<TaskProjection>) -> Self {
        Self::with_config(projection, SyncProcessorConfig::default())
    }

    /// Create and start the processor with an explicit schedule
    ///
    /// Spawns the background task immediately. The first interval tick
    /// completes at once, so construction also triggers the startup sync;
    /// no separate call is needed.
    pub fn with_config(projection: Arc<TaskProjection>, config: SyncProcessorConfig) -> Self {
        tracing::info!(
            "TaskSyncProcessor initializing (interval {}s)",
            config.interval.as_secs()
        );

        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(10);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        // A zero period would panic in tokio's timer
        let period = config.interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased; // Check shutdown first

                    _ = shutdown_rx.recv() => {
                        tracing::info!("TaskSyncProcessor shutting down");
                        break;
                    }

                    Some(_) = trigger_rx.recv() => {
                        tracing::debug!("TaskSyncProcessor woken up by trigger");
                        // Drain any additional pending triggers (coalesce rapid wakes)
                        while trigger_rx.try_recv().is_ok() {}
                        Self::run_sync(&projection).await;
                    }

                    _ = ticker.tick() => {
                        tracing::debug!("TaskSyncProcessor scheduled resync");
                        Self::run_sync(&projection).await;
                    }
                }
            }
        });

        let waker = SyncWaker { trigger_tx };

        Self {
            waker,
            _shutdown_tx: shutdown_tx,
        }
    }

    async fn run_sync(projection: &Arc<TaskProjection>) {
        match projection.sync().await {
            Ok(count) => {
                tracing::debug!("Resync finished with {} tasks", count);
            }
            Err(e) => {
                // The projection keeps its previous list; the next tick or wake retries
                tracing::warn!("Resync failed: {}", e);
            }
        }
    }

    /// Get a cloneable waker handle
    ///
    /// Use this to pass to other layers (like an input router) so they can
    /// request a resync without holding the processor itself.
    pub fn waker(&self) -> SyncWaker {
        self.waker.clone()
    }

    /// Wake the processor to resync now (alias for the waker)
    pub fn wake(&self) {
        self.waker.wake();
    }

    /// Shutdown processor gracefully
    ///
    /// Dropping the handles closes the channels. The background task
    /// finishes any in-progress resync and exits cleanly.
    pub fn shutdown(self) {
        tracing::info!("Shutting down TaskSyncProcessor");
        // Channels will be dropped, signaling shutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DomainEvent, GraphStore};
    use mindgraph_assistant_engine::ScriptedAssistant;
    use tokio::sync::{broadcast, mpsc};
    use tokio::time::timeout;

    /// Test that SyncWaker sends a signal when woken
    #[test]
    fn test_waker_wake_sends_signal() {
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(10);
        let waker = SyncWaker { trigger_tx };

        waker.wake();

        assert!(
            trigger_rx.try_recv().is_ok(),
            "Wake should have sent a signal"
        );
    }

    /// Test that multiple rapid wakes are coalesced (channel capacity behavior)
    #[test]
    fn test_waker_coalesces_multiple_wakes() {
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(2); // Small capacity
        let waker = SyncWaker { trigger_tx };

        waker.wake();
        waker.wake();
        waker.wake(); // Should be coalesced (channel full)

        let mut count = 0;
        while trigger_rx.try_recv().is_ok() {
            count += 1;
        }

        assert!(
            count <= 2,
            "Excess wakes should be coalesced, got {} signals",
            count
        );
    }

    /// Test that waker handles closed channel gracefully
    #[test]
    fn test_waker_handles_closed_channel() {
        let (trigger_tx, trigger_rx) = mpsc::channel::<()>(10);
        let waker = SyncWaker { trigger_tx };

        drop(trigger_rx);

        // Wake should not panic, just log a warning
        waker.wake();
    }

    /// Test that waker is cloneable and all clones work
    #[test]
    fn test_waker_is_cloneable() {
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(10);
        let waker1 = SyncWaker { trigger_tx };
        let waker2 = waker1.clone();

        waker1.wake();
        waker2.wake();

        assert!(trigger_rx.try_recv().is_ok(), "First wake should send");
        assert!(trigger_rx.try_recv().is_ok(), "Second wake should send");
    }

    async fn projection_with_lists(
        lists: &[&str],
    ) -> (broadcast::Receiver<DomainEvent>, Arc<TaskProjection>) {
        let store = Arc::new(GraphStore::seeded());
        let events = store.subscribe_to_events();
        let engine = Arc::new(ScriptedAssistant::new());
        for list in lists {
            engine.push_task_list(list.to_string()).await;
        }
        let projection = Arc::new(TaskProjection::new(store, engine));
        (events, projection)
    }

    async fn next_resync(events: &mut broadcast::Receiver<DomainEvent>) -> usize {
        loop {
            let event = timeout(Duration::from_secs(1), events.recv())
                .await
                .expect("expected a resync event")
                .expect("event channel closed");
            if let DomainEvent::TasksResynced { count } = event {
                return count;
            }
        }
    }

    #[tokio::test]
    async fn test_startup_sync_runs_immediately() {
        let (mut events, projection) =
            projection_with_lists(&[r#"[{"id": "t1", "title": "Standup", "nodeId": "work"}]"#])
                .await;

        let processor = TaskSyncProcessor::new(Arc::clone(&projection));

        assert_eq!(next_resync(&mut events).await, 1);
        assert_eq!(projection.task_count().await, 1);
        processor.shutdown();
    }

    #[tokio::test]
    async fn test_manual_wake_triggers_resync() {
        let (mut events, projection) = projection_with_lists(&[
            r#"[{"id": "t1", "title": "Standup", "nodeId": "work"}]"#,
            r#"[{"id": "t1", "title": "Standup", "nodeId": "work"},
                {"id": "t2", "title": "Run", "nodeId": "health"}]"#,
        ])
        .await;

        let processor = TaskSyncProcessor::new(Arc::clone(&projection));
        assert_eq!(next_resync(&mut events).await, 1);

        processor.wake();
        assert_eq!(next_resync(&mut events).await, 2);
        assert_eq!(projection.task_count().await, 2);
        processor.shutdown();
    }

    #[tokio::test]
    async fn test_scheduled_resync_fires() {
        let (mut events, projection) = projection_with_lists(&[
            r#"[{"id": "t1", "title": "Standup", "nodeId": "work"}]"#,
            r#"[{"id": "t2", "title": "Run", "nodeId": "health"}]"#,
        ])
        .await;

        let processor = TaskSyncProcessor::with_config(
            projection,
            SyncProcessorConfig {
                interval: Duration::from_millis(50),
            },
        );

        // Startup tick, then the scheduled tick 50ms later
        assert_eq!(next_resync(&mut events).await, 1);
        assert_eq!(next_resync(&mut events).await, 1);
        processor.shutdown();
    }

    #[tokio::test]
    async fn test_no_resync_after_shutdown() {
        let (mut events, projection) =
            projection_with_lists(&[r#"[{"id": "t1", "title": "Standup", "nodeId": "work"}]"#])
                .await;

        let processor = TaskSyncProcessor::new(Arc::clone(&projection));
        assert_eq!(next_resync(&mut events).await, 1);

        let waker = processor.waker();
        processor.shutdown();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The loop has exited; a late wake is ignored
        waker.wake();
        assert!(
            timeout(Duration::from_millis(150), events.recv())
                .await
                .is_err(),
            "No resync should run after shutdown"
        );
    }
}
