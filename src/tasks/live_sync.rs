use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::{Notify, mpsc};
use tokio::time::{MissedTickBehavior, interval};

use crate::gateway::PollGateway;
use crate::models::Poll;

/// Refresh period while a poll view is open.
pub const SYNC_INTERVAL_SECONDS: u64 = 5;

const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Periodic re-fetch of one poll while its view is active.
///
/// The first tick fires immediately and establishes the baseline snapshot;
/// after that, one fetch per period. Fetches are strictly sequential: the
/// loop awaits each `get_poll` before taking the next tick, so overlapping
/// requests cannot occur. A failed fetch is logged and the next tick retries
/// independently.
pub struct LiveSync;

impl LiveSync {
    pub fn start(
        gateway: Arc<dyn PollGateway>,
        poll_id: impl Into<String>,
        period: Duration,
    ) -> (LiveSyncHandle, mpsc::Receiver<Poll>) {
        let poll_id = poll_id.into();
        let cancelled = Arc::new(AtomicBool::new(false));
        let notify = Arc::new(Notify::new());
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);

        let task_cancelled = Arc::clone(&cancelled);
        let task_notify = Arc::clone(&notify);
        let task = tokio::spawn(async move {
            let mut ticks = interval(period);
            // One fetch per elapsed period, no catch-up bursts after a slow
            // fetch.
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = task_notify.notified() => break,
                    _ = ticks.tick() => {}
                }
                if task_cancelled.load(Ordering::SeqCst) {
                    break;
                }

                match gateway.get_poll(&poll_id).await {
                    Ok(poll) => {
                        // A fetch that resolved after cancellation is
                        // discarded, never delivered to a torn-down view.
                        if task_cancelled.load(Ordering::SeqCst) {
                            break;
                        }
                        let delivered = tokio::select! {
                            _ = task_notify.notified() => false,
                            sent = tx.send(poll) => sent.is_ok(),
                        };
                        if !delivered {
                            break;
                        }
                    }
                    Err(err) => {
                        if task_cancelled.load(Ordering::SeqCst) {
                            break;
                        }
                        warn!("live sync fetch failed for poll {poll_id}: {err}");
                    }
                }
            }
            debug!("live sync stopped for poll {poll_id}");
        });

        (
            LiveSyncHandle {
                cancelled,
                notify,
                task,
            },
            rx,
        )
    }
}

/// Cancellation handle for one view's sync loop. `stop` is idempotent and
/// guarantees no snapshot is delivered afterwards.
pub struct LiveSyncHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
    task: tokio::task::JoinHandle<()>,
}

impl LiveSyncHandle {
    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }
}

impl Drop for LiveSyncHandle {
    // View teardown cancels the schedule even without an explicit stop.
    fn drop(&mut self) {
        self.stop();
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::time::timeout;

    use super::*;
    use crate::error::PollError;
    use crate::gateway::MemoryGateway;
    use crate::identity::StaticIdentity;
    use crate::models::PollDraft;

    const PERIOD: Duration = Duration::from_millis(20);
    const WAIT: Duration = Duration::from_millis(500);

    fn seeded_gateway() -> Arc<MemoryGateway> {
        Arc::new(MemoryGateway::seeded(Arc::new(StaticIdentity::signed_in(
            "u1",
        ))))
    }

    #[tokio::test]
    async fn baseline_snapshot_arrives_immediately() {
        let gateway = seeded_gateway();
        let (_handle, mut updates) = LiveSync::start(gateway, "1", PERIOD);

        let baseline = timeout(WAIT, updates.recv()).await.unwrap().unwrap();
        assert_eq!(baseline.id, "1");
        assert_eq!(baseline.total_votes(), 18);
    }

    #[tokio::test]
    async fn refreshes_pick_up_backend_changes() {
        let gateway = seeded_gateway();
        let (_handle, mut updates) = LiveSync::start(gateway.clone(), "1", PERIOD);

        let baseline = timeout(WAIT, updates.recv()).await.unwrap().unwrap();
        let pre = baseline.choice("c3").unwrap().count;

        // Another client votes between ticks.
        gateway.cast_vote("1", "c3").await.unwrap();

        let updated = timeout(WAIT, async {
            loop {
                let poll = updates.recv().await.unwrap();
                if poll.choice("c3").unwrap().count > pre {
                    return poll;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(updated.choice("c3").unwrap().count, pre + 1);
    }

    #[tokio::test]
    async fn stop_delivers_no_further_snapshots() {
        let gateway = seeded_gateway();
        // Long period so the only snapshot before stop is the baseline.
        let (handle, mut updates) = LiveSync::start(gateway, "1", Duration::from_secs(60));

        timeout(WAIT, updates.recv()).await.unwrap().unwrap();
        handle.stop();

        // The loop exits and drops the sender without another delivery.
        let next = timeout(WAIT, updates.recv()).await.unwrap();
        assert!(next.is_none());
    }

    /// Fails the first `failures` fetches, then delegates to the seeded store.
    struct FlakyGateway {
        calls: AtomicUsize,
        failures: usize,
        inner: Arc<MemoryGateway>,
    }

    #[async_trait]
    impl PollGateway for FlakyGateway {
        async fn list_polls(&self) -> Result<Vec<Poll>, PollError> {
            self.inner.list_polls().await
        }

        async fn get_poll(&self, poll_id: &str) -> Result<Poll, PollError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(PollError::Transport("flaky backend".to_string()))
            } else {
                self.inner.get_poll(poll_id).await
            }
        }

        async fn create_poll(&self, draft: &PollDraft) -> Result<Poll, PollError> {
            self.inner.create_poll(draft).await
        }

        async fn cast_vote(&self, poll_id: &str, choice_id: &str) -> Result<(), PollError> {
            self.inner.cast_vote(poll_id, choice_id).await
        }
    }

    #[tokio::test]
    async fn fetch_failures_do_not_stop_the_schedule() {
        let gateway = Arc::new(FlakyGateway {
            calls: AtomicUsize::new(0),
            failures: 2,
            inner: seeded_gateway(),
        });
        let (_handle, mut updates) = LiveSync::start(gateway, "2", PERIOD);

        // First two ticks fail and are only logged; the third delivers.
        let poll = timeout(WAIT, updates.recv()).await.unwrap().unwrap();
        assert_eq!(poll.id, "2");
        assert_eq!(poll.total_votes(), 17);
    }
}
