//! Breathing session controller.
//!
//! Owns one [`Session`] and the [`TimerGroup`] driving it. The three periodic
//! processes (countdown, progress, phase) each deliver their ticks through
//! [`Session::apply`] under one lock, tagged with the generation of the session
//! that spawned them, so a tick can never touch a session it does not own.
//!
//! ## Usage
//!
//! ```ignore
//! let mut controller = BreathingController::new(BreathingConfig::default())?;
//! let mut frames = controller.subscribe();
//! controller.start(60)?;
//! while frames.changed().await.is_ok() {
//!     render(&frames.borrow_and_update());
//! }
//! ```

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};

use super::session::{Session, SessionSnapshot, Tick, TickOutcome};
use super::timer_group::{TimerGroup, TimerGroupCanceller};
use crate::error::{ConfigError, Result};
use crate::events::Event;
use crate::storage::BreathingConfig;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct BreathingController {
    config: BreathingConfig,
    session: Arc<Mutex<Session>>,
    /// Timers of the current session; `None` before the first start.
    timers: Option<TimerGroup>,
    generation: u64,
    snapshot_tx: Arc<watch::Sender<SessionSnapshot>>,
    events_tx: broadcast::Sender<Event>,
}

impl BreathingController {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `config` fails
    /// [`BreathingConfig::validate`], e.g. a zero cadence that could never tick.
    pub fn new(config: BreathingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: BreathingConfig) -> Self {
        let (snapshot_tx, _snapshot_rx) = watch::channel(Session::idle().snapshot());
        let (events_tx, _events_rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            session: Arc::new(Mutex::new(Session::idle())),
            timers: None,
            generation: 0,
            snapshot_tx: Arc::new(snapshot_tx),
            events_tx,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &BreathingConfig {
        &self.config
    }

    /// Copy of the current session.
    pub fn session(&self) -> Session {
        self.session.lock().clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    pub fn is_active(&self) -> bool {
        self.session.lock().is_active()
    }

    pub fn is_complete(&self) -> bool {
        self.session.lock().is_complete()
    }

    pub fn describe_current_phase(&self) -> String {
        self.session.lock().describe_current_phase()
    }

    /// Timers still alive for the current session.
    pub fn running_timers(&self) -> usize {
        self.timers.as_ref().map_or(0, TimerGroup::running_timers)
    }

    /// Receives a fresh snapshot after every tick that changed the session.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.events_tx.subscribe()
    }

    /// Resolve once the current session is no longer active and return its
    /// final snapshot. Returns immediately if nothing is running.
    pub async fn wait_for_completion(&self) -> SessionSnapshot {
        let mut rx = self.snapshot_tx.subscribe();
        let finished = match rx.wait_for(|snap| !snap.is_active).await {
            Ok(snap) => Some(snap.clone()),
            Err(_) => None,
        };
        finished.unwrap_or_else(|| self.snapshot())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session of `duration_secs`, replacing any session in progress.
    ///
    /// The previous session's timers are cancelled before the new ones are
    /// spawned. A rejected duration leaves the current session and its timers
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `duration_secs` is zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn start(&mut self, duration_secs: u64) -> Result<Event> {
        let generation = self.generation + 1;
        let fresh = Session::start_with_cadence(duration_secs, generation, self.config.cadence())
            .map_err(|err| {
                tracing::warn!(duration_secs, error = %err, "rejected breathing session");
                err
            })?;
        self.generation = generation;

        if let Some(timers) = self.timers.take() {
            timers.cancel();
        }

        let previous = {
            let mut session = self.session.lock();
            let previous = std::mem::replace(&mut *session, fresh);
            self.snapshot_tx.send_replace(session.snapshot());
            previous
        };

        self.spawn_timers(generation);

        let cycle_count = duration_secs / super::CYCLE_SECS;
        let event = if previous.is_active() {
            tracing::info!(
                previous_generation = previous.generation(),
                generation,
                duration_secs,
                "breathing session preempted"
            );
            Event::SessionPreempted {
                previous_generation: previous.generation(),
                previous_remaining_secs: previous.remaining_secs(),
                generation,
                duration_secs,
                cycle_count,
                at: Utc::now(),
            }
        } else {
            tracing::info!(generation, duration_secs, cycle_count, "breathing session started");
            Event::SessionStarted {
                generation,
                duration_secs,
                cycle_count,
                at: Utc::now(),
            }
        };
        let _ = self.events_tx.send(event.clone());
        Ok(event)
    }

    /// Start one of the configured preset lengths.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `secs` is not in the configured presets.
    pub fn start_preset(&mut self, secs: u64) -> Result<Event> {
        let secs = self.config.preset(secs).map_err(|err| {
            tracing::warn!(secs, error = %err, "rejected breathing preset");
            err
        })?;
        self.start(secs)
    }

    /// Cancel the timers and return to the not-started state.
    ///
    /// Returns `Some(Event::SessionCancelled)` if a session was running.
    pub fn stop(&mut self) -> Option<Event> {
        if let Some(timers) = self.timers.take() {
            timers.cancel();
        }

        let previous = {
            let mut session = self.session.lock();
            let previous = std::mem::replace(&mut *session, Session::idle());
            self.snapshot_tx.send_replace(session.snapshot());
            previous
        };

        if !previous.is_active() {
            return None;
        }
        tracing::info!(
            generation = previous.generation(),
            remaining_secs = previous.remaining_secs(),
            "breathing session cancelled"
        );
        let event = Event::SessionCancelled {
            generation: previous.generation(),
            remaining_secs: previous.remaining_secs(),
            at: Utc::now(),
        };
        let _ = self.events_tx.send(event.clone());
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn_timers(&mut self, generation: u64) {
        let group = TimerGroup::new();
        let cadences = [
            (Tick::Countdown, self.config.countdown_interval()),
            (Tick::Progress, self.config.progress_interval()),
            (Tick::Phase, self.config.phase_interval()),
        ];
        for (tick, period) in cadences {
            let feed = TickFeed {
                generation,
                session: Arc::clone(&self.session),
                snapshot_tx: Arc::clone(&self.snapshot_tx),
                events_tx: self.events_tx.clone(),
                canceller: group.canceller(),
            };
            group.spawn_interval_until(period, move || feed.deliver(tick));
        }
        self.timers = Some(group);
    }
}

impl Default for BreathingController {
    fn default() -> Self {
        Self::with_valid_config(BreathingConfig::default())
    }
}

/// What one periodic callback needs to feed ticks into its own session.
struct TickFeed {
    generation: u64,
    session: Arc<Mutex<Session>>,
    snapshot_tx: Arc<watch::Sender<SessionSnapshot>>,
    events_tx: broadcast::Sender<Event>,
    canceller: TimerGroupCanceller,
}

impl TickFeed {
    /// Apply `tick` and publish the result. Returns whether this timer should
    /// keep running.
    fn deliver(&self, tick: Tick) -> bool {
        let (outcome, cycle_count) = {
            let mut session = self.session.lock();
            let outcome = session.apply(self.generation, tick);
            if matches!(
                outcome,
                TickOutcome::Updated | TickOutcome::PhaseChanged(_) | TickOutcome::Completed
            ) {
                // Published under the lock so observers see snapshots in apply order.
                self.snapshot_tx.send_replace(session.snapshot());
            }
            if outcome == TickOutcome::Completed {
                // Stop the siblings before the lock is released.
                self.canceller.cancel();
            }
            (outcome, session.cycle_count())
        };

        match outcome {
            TickOutcome::Completed => {
                tracing::info!(generation = self.generation, cycle_count, "breathing session complete");
                let _ = self.events_tx.send(Event::SessionCompleted {
                    generation: self.generation,
                    cycle_count,
                    at: Utc::now(),
                });
            }
            TickOutcome::PhaseChanged(phase) => {
                tracing::debug!(generation = self.generation, %phase, "breathing phase changed");
                let _ = self.events_tx.send(Event::PhaseChanged {
                    generation: self.generation,
                    phase,
                    at: Utc::now(),
                });
            }
            TickOutcome::Stale | TickOutcome::Ignored => {
                tracing::debug!(generation = self.generation, ?tick, ?outcome, "dropping tick");
            }
            TickOutcome::Updated => {}
        }
        outcome.keeps_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breathing::{BreathingPhase, SessionStatus};
    use std::time::Duration;

    async fn advance_secs(secs: f64) {
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn start_publishes_initial_state() {
        let mut controller = BreathingController::default();
        let event = controller.start(60).unwrap();
        assert!(matches!(
            event,
            Event::SessionStarted { duration_secs: 60, cycle_count: 3, .. }
        ));

        let snap = controller.subscribe().borrow().clone();
        assert_eq!(snap.status, SessionStatus::Active);
        assert_eq!(snap.remaining_secs, 60);
        assert_eq!(snap.progress_ratio, 0.0);
        assert_eq!(snap.phase, BreathingPhase::Inhale);
        assert_eq!(snap.cycle_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_start_keeps_current_session() {
        let mut controller = BreathingController::default();
        controller.start(30).unwrap();
        advance_secs(5.05).await;

        assert!(controller.start(0).is_err());
        assert!(controller.is_active());
        assert_eq!(controller.session().remaining_secs(), 25);
        assert_eq!(controller.running_timers(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn session_completes_and_timers_stop() {
        let mut controller = BreathingController::default();
        controller.start(8).unwrap();
        let done = controller.wait_for_completion().await;

        assert!(done.is_complete);
        assert!(!done.is_active);
        assert_eq!(done.remaining_secs, 0);
        assert_eq!(done.progress_ratio, 100.0);
        assert_eq!(done.phase, BreathingPhase::Exhale);

        advance_secs(1.0).await;
        assert_eq!(controller.running_timers(), 0);
        assert_eq!(controller.snapshot(), done);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_and_resets() {
        let mut controller = BreathingController::default();
        assert!(controller.stop().is_none());

        controller.start(60).unwrap();
        advance_secs(3.05).await;
        let event = controller.stop();
        assert!(matches!(
            event,
            Some(Event::SessionCancelled { remaining_secs: 57, .. })
        ));
        assert_eq!(controller.session(), Session::idle());

        advance_secs(120.0).await;
        assert_eq!(controller.session(), Session::idle());
        assert_eq!(controller.running_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_cadence_is_rejected_up_front() {
        let config = BreathingConfig {
            phase_interval_ms: 0,
            ..BreathingConfig::default()
        };
        let err = BreathingController::new(config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "breathing.phase_interval_ms"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_preset_is_rejected() {
        let config = BreathingConfig {
            presets: vec![30],
            ..BreathingConfig::default()
        };
        let mut controller = BreathingController::new(config).unwrap();
        assert!(controller.start_preset(60).is_err());
        assert_eq!(controller.snapshot().status, SessionStatus::Idle);
        assert_eq!(controller.running_timers(), 0);

        controller.start_preset(30).unwrap();
        assert_eq!(controller.snapshot().remaining_secs, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_the_lifecycle() {
        let mut controller = BreathingController::default();
        let mut events = controller.events();
        controller.start(4).unwrap();
        controller.wait_for_completion().await;

        assert!(matches!(events.recv().await, Ok(Event::SessionStarted { .. })));
        let mut saw_completed = false;
        while let Ok(event) = events.try_recv() {
            if let Event::SessionCompleted { cycle_count, .. } = event {
                assert_eq!(cycle_count, 0);
                saw_completed = true;
            }
        }
        assert!(saw_completed);
    }
}
