//! Deterministic simulation harness for breathing sessions.
//!
//! Drives a [`Session`] in 0.1 s steps without a runtime. On boundaries where
//! several periodic processes are due at once (every second, every four
//! seconds) the delivery order is chosen by a [`TickOrder`], so tests can pin
//! down or randomize the interleavings a real event loop may produce.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::session::{Session, Tick, TickOutcome, PHASE_SECS, PROGRESS_STEPS_PER_SEC};
use crate::error::ValidationError;

const STEP_MS: u64 = 1000 / PROGRESS_STEPS_PER_SEC;

/// Length of one simulation step.
pub const STEP: Duration = Duration::from_millis(STEP_MS);

/// Seed for deterministic tick ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulationSeed(pub u64);

impl Default for SimulationSeed {
    fn default() -> Self {
        Self(42)
    }
}

/// Delivery order for ticks that fall due on the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOrder {
    /// Countdown, then progress, then phase.
    CountdownFirst,
    /// Progress, then phase, then countdown.
    CountdownLast,
    /// A fresh seeded shuffle on every step.
    Seeded(SimulationSeed),
}

impl Default for TickOrder {
    fn default() -> Self {
        Self::CountdownLast
    }
}

/// Virtual clock owning one session.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    session: Session,
    order: TickOrder,
    rng: Mcg128Xsl64,
    steps: u64,
    /// Set once the session completes; mirrors the timer group being cancelled.
    stopped: bool,
}

impl SimulatedClock {
    pub fn new(session: Session, order: TickOrder) -> Self {
        let seed = match order {
            TickOrder::Seeded(seed) => seed,
            _ => SimulationSeed::default(),
        };
        let stopped = !session.is_active();
        Self {
            session,
            order,
            rng: Mcg128Xsl64::seed_from_u64(seed.0),
            steps: 0,
            stopped,
        }
    }

    /// Start a session of `duration_secs` under simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveDuration`] for a zero duration.
    pub fn start(duration_secs: u64, order: TickOrder) -> Result<Self, ValidationError> {
        Ok(Self::new(Session::start(duration_secs, 1)?, order))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn elapsed(&self) -> Duration {
        steps_to_duration(self.steps)
    }

    /// Whether timers are still delivering ticks.
    pub fn is_running(&self) -> bool {
        !self.stopped
    }

    /// Advance one step, delivering every tick due at its end.
    pub fn step(&mut self) -> Vec<(Tick, TickOutcome)> {
        if self.stopped {
            return Vec::new();
        }
        self.steps += 1;

        let mut due = Vec::with_capacity(3);
        if self.steps % PROGRESS_STEPS_PER_SEC == 0 {
            due.push(Tick::Countdown);
        }
        due.push(Tick::Progress);
        if self.steps % (PHASE_SECS * PROGRESS_STEPS_PER_SEC) == 0 {
            due.push(Tick::Phase);
        }
        match self.order {
            TickOrder::CountdownFirst => {}
            TickOrder::CountdownLast => {
                let mid = usize::from(due[0] == Tick::Countdown);
                due.rotate_left(mid);
            }
            TickOrder::Seeded(_) => due.shuffle(&mut self.rng),
        }

        let mut delivered = Vec::with_capacity(due.len());
        for tick in due {
            if self.stopped {
                break;
            }
            let outcome = self.deliver(tick);
            if outcome == TickOutcome::Completed {
                self.stopped = true;
            }
            delivered.push((tick, outcome));
        }
        delivered
    }

    /// Advance by `duration`, rounded down to whole steps. Stops early once
    /// the session completes.
    pub fn advance(&mut self, duration: Duration) {
        let steps = duration.as_millis() / STEP.as_millis();
        for _ in 0..steps {
            if self.stopped {
                break;
            }
            self.step();
        }
    }

    /// Step until the session completes. Returns the simulated time it took.
    pub fn run_to_completion(&mut self) -> Duration {
        let start = self.steps;
        while !self.stopped {
            self.step();
        }
        steps_to_duration(self.steps - start)
    }

    /// Hand one tick to the session directly, even after the timers stopped.
    /// Lets tests show that late ticks leave a finished session alone.
    pub fn deliver(&mut self, tick: Tick) -> TickOutcome {
        let generation = self.session.generation();
        self.session.apply(generation, tick)
    }
}

fn steps_to_duration(steps: u64) -> Duration {
    Duration::from_millis(steps.saturating_mul(STEP_MS))
}
