//! Scoped group of repeating timers.
//!
//! Every timer spawned through a [`TimerGroup`] shares one shutdown signal, so
//! the whole group is cancelled at once: by [`TimerGroup::cancel`], by a
//! [`TimerGroupCanceller`] held inside one of the callbacks, or by dropping
//! the group.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` for JoinHandle storage because:
//! 1. Operations are O(1) push or O(n) drain (cancel only)
//! 2. Lock is never held across `.await` points

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug)]
pub struct TimerGroup {
    shutdown_tx: Arc<watch::Sender<bool>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Cancels the group it was taken from. Safe to call from inside a callback.
#[derive(Debug, Clone)]
pub struct TimerGroupCanceller {
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl TimerGroupCanceller {
    pub fn cancel(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

impl TimerGroup {
    pub fn new() -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            shutdown_tx: Arc::new(shutdown_tx),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Run `f` every `period`, first one `period` from now, until `f` returns
    /// `false` or the group is cancelled. Cancellation wins over a tick that is
    /// ready at the same instant.
    ///
    /// Spawning on a cancelled group does nothing.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn_interval_until<F>(&self, period: Duration, mut f: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        if self.is_cancelled() {
            return;
        }
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                let cancelled = *shutdown_rx.borrow();
                if cancelled {
                    break;
                }
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        // Release the borrow before `f`, which may cancel the group.
                        let cancelled = *shutdown_rx.borrow();
                        if cancelled || !f() {
                            break;
                        }
                    }
                }
            }
        });
        self.handles.lock().push(handle);
    }

    pub fn canceller(&self) -> TimerGroupCanceller {
        TimerGroupCanceller {
            shutdown_tx: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Stop every timer in the group. Idempotent.
    pub fn cancel(&self) {
        self.shutdown_tx.send_replace(true);
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Timers whose task has not yet exited.
    pub fn running_timers(&self) -> usize {
        self.handles
            .lock()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

impl Default for TimerGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerGroup {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_one_period_out() {
        let group = TimerGroup::new();
        let hits = counter();
        let h = Arc::clone(&hits);
        group.spawn_interval_until(Duration::from_secs(1), move || {
            h.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_returning_false_stops_its_timer() {
        let group = TimerGroup::new();
        let hits = counter();
        let h = Arc::clone(&hits);
        group.spawn_interval_until(Duration::from_millis(100), move || {
            h.fetch_add(1, Ordering::SeqCst) < 2
        });

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(group.running_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_every_timer() {
        let group = TimerGroup::new();
        let hits = counter();
        for period_ms in [100, 1000, 4000] {
            let h = Arc::clone(&hits);
            group.spawn_interval_until(Duration::from_millis(period_ms), move || {
                h.fetch_add(1, Ordering::SeqCst);
                true
            });
        }

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let before = hits.load(Ordering::SeqCst);
        group.cancel();
        group.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(hits.load(Ordering::SeqCst), before);
        assert!(group.is_cancelled());
        assert_eq!(group.running_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn canceller_inside_callback_stops_siblings() {
        let group = TimerGroup::new();
        let fast_hits = counter();
        let f = Arc::clone(&fast_hits);
        group.spawn_interval_until(Duration::from_millis(100), move || {
            f.fetch_add(1, Ordering::SeqCst);
            true
        });
        let canceller = group.canceller();
        group.spawn_interval_until(Duration::from_secs(1), move || {
            canceller.cancel();
            false
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        // The sibling may have fired on the shared 1s boundary, never after.
        assert!(fast_hits.load(Ordering::SeqCst) <= 10);
        assert!(group.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_group_cancels() {
        let hits = counter();
        {
            let group = TimerGroup::new();
            let h = Arc::clone(&hits);
            group.spawn_interval_until(Duration::from_millis(100), move || {
                h.fetch_add(1, Ordering::SeqCst);
                true
            });
            tokio::time::sleep(Duration::from_millis(350)).await;
        }
        let before = hits.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_after_cancel_is_a_no_op() {
        let group = TimerGroup::new();
        group.cancel();
        let hits = counter();
        let h = Arc::clone(&hits);
        group.spawn_interval_until(Duration::from_millis(10), move || {
            h.fetch_add(1, Ordering::SeqCst);
            true
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(group.running_timers(), 0);
    }
}
