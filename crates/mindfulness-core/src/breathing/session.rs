//! Breathing session state machine.
//!
//! A [`Session`] is a plain value. It never touches a clock: three periodic
//! processes deliver [`Tick`]s and [`Session::apply`] is the single function
//! that mutates the session after it is started. Keeping every mutation in one
//! place is what makes the termination rule hold regardless of the order in
//! which same-boundary ticks arrive.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Active -> Complete
//!           ^          |
//!           +-- start -+   (start from any state replaces the session)
//! ```

use serde::{Deserialize, Serialize};

use super::format_mmss;
use super::phase::{BreathingPhase, VisualScale, PHASES_PER_CYCLE};
use crate::error::ValidationError;

/// Seconds spent in each phase.
pub const PHASE_SECS: u64 = 4;
/// Seconds in one full inhale/hold/exhale/rest cycle.
pub const CYCLE_SECS: u64 = PHASE_SECS * PHASES_PER_CYCLE;
/// Progress increments delivered per second of session time.
pub const PROGRESS_STEPS_PER_SEC: u64 = 10;

/// Periods of the three processes, in milliseconds.
///
/// A session counts its progress bar and its settled final phase in ticks of
/// these periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    pub countdown_ms: u64,
    pub progress_ms: u64,
    pub phase_ms: u64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            countdown_ms: 1000,
            progress_ms: 1000 / PROGRESS_STEPS_PER_SEC,
            phase_ms: PHASE_SECS * 1000,
        }
    }
}

impl Cadence {
    /// Session length in milliseconds of countdown time.
    fn span_ms(self, duration_secs: u64) -> u64 {
        duration_secs.saturating_mul(self.countdown_ms.max(1))
    }

    /// Progress ticks that fit in a session of `duration_secs`; at least one.
    pub fn progress_steps(self, duration_secs: u64) -> u64 {
        (self.span_ms(duration_secs) / self.progress_ms.max(1)).max(1)
    }

    /// Phase ticks due up to and including the session's last countdown tick.
    pub fn phase_rotations(self, duration_secs: u64) -> u64 {
        self.span_ms(duration_secs) / self.phase_ms.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No session has been started.
    Idle,
    Active,
    Complete,
}

/// One firing of a periodic process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tick {
    /// Every second: one second less remaining.
    Countdown,
    /// Every tenth of a second: progress bar step.
    Progress,
    /// Every four seconds: next breathing phase.
    Phase,
}

/// What a tick did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick was issued for a session that has since been replaced.
    Stale,
    /// The session is not active; nothing changed.
    Ignored,
    Updated,
    PhaseChanged(BreathingPhase),
    /// This tick ended the session. Returned exactly once per session.
    Completed,
}

impl TickOutcome {
    /// Whether the process that delivered the tick should keep running.
    pub fn keeps_running(self) -> bool {
        matches!(self, Self::Updated | Self::PhaseChanged(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    generation: u64,
    status: SessionStatus,
    requested_duration_secs: u64,
    remaining_secs: u64,
    /// Progress increments applied so far. The ratio is derived from this so
    /// repeated float additions never drift.
    progress_steps: u64,
    /// Phase ticks applied so far; the phase is `phase_rotations % 4`.
    phase_rotations: u64,
    cycle_count: u64,
    cadence: Cadence,
}

impl Session {
    /// A session that was never started.
    pub fn idle() -> Self {
        Self {
            generation: 0,
            status: SessionStatus::Idle,
            requested_duration_secs: 0,
            remaining_secs: 0,
            progress_steps: 0,
            phase_rotations: 0,
            cycle_count: 0,
            cadence: Cadence::default(),
        }
    }

    /// Start a fresh session owned by `generation`, ticking at the default
    /// cadence.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveDuration`] for a zero duration.
    pub fn start(duration_secs: u64, generation: u64) -> Result<Self, ValidationError> {
        Self::start_with_cadence(duration_secs, generation, Cadence::default())
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveDuration`] for a zero duration.
    pub fn start_with_cadence(
        duration_secs: u64,
        generation: u64,
        cadence: Cadence,
    ) -> Result<Self, ValidationError> {
        if duration_secs == 0 {
            return Err(ValidationError::NonPositiveDuration { secs: duration_secs });
        }
        Ok(Self {
            generation,
            status: SessionStatus::Active,
            requested_duration_secs: duration_secs,
            remaining_secs: duration_secs,
            progress_steps: 0,
            phase_rotations: 0,
            cycle_count: duration_secs / CYCLE_SECS,
            cadence,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Complete
    }

    pub fn requested_duration_secs(&self) -> u64 {
        self.requested_duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn phase(&self) -> BreathingPhase {
        BreathingPhase::from_index(self.phase_rotations)
    }

    /// Progress increments needed to fill the bar.
    pub fn total_progress_steps(&self) -> u64 {
        if self.requested_duration_secs == 0 {
            return 0;
        }
        self.cadence.progress_steps(self.requested_duration_secs)
    }

    /// 0.0 ..= 100.0. Exactly 100.0 only once the session has completed.
    pub fn progress_ratio(&self) -> f64 {
        let total = self.total_progress_steps();
        if total == 0 {
            return 0.0;
        }
        (self.progress_steps as f64 * 100.0 / total as f64).min(100.0)
    }

    /// Display text for the breathing area.
    ///
    /// Shows the cue for the current phase, or the completion summary once the
    /// session has ended. An idle session shows the first cue.
    pub fn describe_current_phase(&self) -> String {
        if self.is_complete() {
            completion_summary(self.cycle_count)
        } else {
            self.phase().instruction().to_string()
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let phase = self.phase();
        SessionSnapshot {
            generation: self.generation,
            status: self.status,
            requested_duration_secs: self.requested_duration_secs,
            remaining_secs: self.remaining_secs,
            formatted_remaining: format_mmss(self.remaining_secs),
            progress_ratio: self.progress_ratio(),
            phase,
            phase_label: self.describe_current_phase(),
            visual_scale: phase.visual_scale(),
            cycle_count: self.cycle_count,
            is_active: self.is_active(),
            is_complete: self.is_complete(),
        }
    }

    // ── Transition ───────────────────────────────────────────────────

    /// Apply one tick delivered on behalf of `generation`.
    ///
    /// Ticks for another generation or for a session that is not active leave
    /// the session untouched.
    pub fn apply(&mut self, generation: u64, tick: Tick) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Stale;
        }
        if self.status != SessionStatus::Active {
            return TickOutcome::Ignored;
        }

        match tick {
            Tick::Countdown => {
                self.remaining_secs = self.remaining_secs.saturating_sub(1);
                if self.remaining_secs == 0 {
                    self.complete();
                    TickOutcome::Completed
                } else {
                    TickOutcome::Updated
                }
            }
            Tick::Progress => {
                // Hold one step short of full: 100% is reserved for completion.
                let ceiling = self.total_progress_steps().saturating_sub(1);
                if self.progress_steps < ceiling {
                    self.progress_steps += 1;
                }
                TickOutcome::Updated
            }
            Tick::Phase => {
                self.phase_rotations += 1;
                TickOutcome::PhaseChanged(self.phase())
            }
        }
    }

    /// Termination: active -> complete, bar full, phase settled at the value
    /// it has at the session's last second. Settling makes the end state
    /// independent of whether the final phase tick arrived before the final
    /// countdown tick.
    fn complete(&mut self) {
        self.status = SessionStatus::Complete;
        self.remaining_secs = 0;
        self.progress_steps = self.total_progress_steps();
        self.phase_rotations = self
            .phase_rotations
            .max(self.cadence.phase_rotations(self.requested_duration_secs));
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

/// Everything a view needs to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub status: SessionStatus,
    pub requested_duration_secs: u64,
    pub remaining_secs: u64,
    /// Remaining time as MM:SS.
    pub formatted_remaining: String,
    pub progress_ratio: f64,
    pub phase: BreathingPhase,
    pub phase_label: String,
    pub visual_scale: VisualScale,
    pub cycle_count: u64,
    pub is_active: bool,
    pub is_complete: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Session::idle().snapshot()
    }
}

/// Message shown once a session has run to the end.
pub fn completion_summary(cycles: u64) -> String {
    format!(
        "Session Complete! You completed {cycles} breathing cycles. \
         Take a moment to notice how calm you feel."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_seconds(session: &mut Session, secs: u64) {
        let generation = session.generation();
        for step in 1..=secs * PROGRESS_STEPS_PER_SEC {
            session.apply(generation, Tick::Progress);
            if step % PROGRESS_STEPS_PER_SEC == 0 {
                session.apply(generation, Tick::Countdown);
            }
            if step % (PHASE_SECS * PROGRESS_STEPS_PER_SEC) == 0 {
                session.apply(generation, Tick::Phase);
            }
        }
    }

    #[test]
    fn start_sets_initial_state() {
        let s = Session::start(60, 1).unwrap();
        assert_eq!(s.status(), SessionStatus::Active);
        assert_eq!(s.requested_duration_secs(), 60);
        assert_eq!(s.remaining_secs(), 60);
        assert_eq!(s.progress_ratio(), 0.0);
        assert_eq!(s.phase(), BreathingPhase::Inhale);
        assert_eq!(s.cycle_count(), 3);
        assert!(s.is_active());
        assert!(!s.is_complete());
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert_eq!(
            Session::start(0, 1),
            Err(ValidationError::NonPositiveDuration { secs: 0 })
        );
    }

    #[test]
    fn idle_session_ignores_ticks() {
        let mut s = Session::idle();
        assert_eq!(s.apply(0, Tick::Countdown), TickOutcome::Ignored);
        assert_eq!(s.apply(0, Tick::Phase), TickOutcome::Ignored);
        assert_eq!(s, Session::idle());
    }

    #[test]
    fn stale_generation_is_rejected() {
        let mut s = Session::start(30, 2).unwrap();
        let before = s.clone();
        assert_eq!(s.apply(1, Tick::Countdown), TickOutcome::Stale);
        assert_eq!(s.apply(1, Tick::Progress), TickOutcome::Stale);
        assert_eq!(s, before);
    }

    #[test]
    fn sixty_second_session_completes() {
        let mut s = Session::start(60, 1).unwrap();
        run_seconds(&mut s, 60);
        assert_eq!(s.remaining_secs(), 0);
        assert!(s.is_complete());
        assert!(!s.is_active());
        assert_eq!(s.progress_ratio(), 100.0);
        assert_eq!(s.cycle_count(), 3);
    }

    #[test]
    fn completion_is_reported_once() {
        let mut s = Session::start(2, 1).unwrap();
        assert_eq!(s.apply(1, Tick::Countdown), TickOutcome::Updated);
        assert_eq!(s.apply(1, Tick::Countdown), TickOutcome::Completed);
        let done = s.clone();
        for tick in [Tick::Countdown, Tick::Progress, Tick::Phase] {
            assert_eq!(s.apply(1, tick), TickOutcome::Ignored);
        }
        assert_eq!(s, done);
    }

    #[test]
    fn progress_is_held_below_full_while_active() {
        let mut s = Session::start(1, 1).unwrap();
        for _ in 0..50 {
            s.apply(1, Tick::Progress);
        }
        assert!(s.is_active());
        assert!(s.progress_ratio() < 100.0);
        assert!(s.progress_ratio() >= 90.0);
    }

    #[test]
    fn phase_rotates_once_in_sixteen_seconds() {
        let mut s = Session::start(300, 1).unwrap();
        let mut seen = vec![s.phase()];
        for _ in 0..4 {
            s.apply(1, Tick::Phase);
            seen.push(s.phase());
        }
        assert_eq!(
            seen,
            vec![
                BreathingPhase::Inhale,
                BreathingPhase::Hold,
                BreathingPhase::Exhale,
                BreathingPhase::Rest,
                BreathingPhase::Inhale,
            ]
        );
    }

    #[test]
    fn sixteen_second_session_ends_on_inhale_when_countdown_wins() {
        let mut s = Session::start(16, 1).unwrap();
        for _ in 0..3 {
            s.apply(1, Tick::Phase);
        }
        for _ in 0..16 {
            s.apply(1, Tick::Countdown);
        }
        // The fourth phase tick lost the race on the final boundary.
        assert_eq!(s.apply(1, Tick::Phase), TickOutcome::Ignored);
        assert!(s.is_complete());
        assert_eq!(s.phase(), BreathingPhase::Inhale);
    }

    #[test]
    fn final_phase_follows_a_custom_cadence_in_either_order() {
        // Phase every 3 s: the 6 s boundary is the second rotation.
        let cadence = Cadence {
            phase_ms: 3000,
            ..Cadence::default()
        };
        let mut countdown_wins = Session::start_with_cadence(6, 1, cadence).unwrap();
        let mut phase_wins = countdown_wins.clone();

        countdown_wins.apply(1, Tick::Phase);
        for _ in 0..6 {
            countdown_wins.apply(1, Tick::Countdown);
        }

        phase_wins.apply(1, Tick::Phase);
        for _ in 0..5 {
            phase_wins.apply(1, Tick::Countdown);
        }
        phase_wins.apply(1, Tick::Phase);
        assert_eq!(phase_wins.apply(1, Tick::Countdown), TickOutcome::Completed);

        assert_eq!(countdown_wins.phase(), BreathingPhase::Exhale);
        assert_eq!(phase_wins.phase(), BreathingPhase::Exhale);
    }

    #[test]
    fn progress_total_follows_the_cadence() {
        let cadence = Cadence {
            countdown_ms: 100,
            progress_ms: 10,
            phase_ms: 400,
        };
        let s = Session::start_with_cadence(60, 1, cadence).unwrap();
        assert_eq!(s.total_progress_steps(), 600);
        assert_eq!(cadence.phase_rotations(60), 15);

        let coarse = Cadence {
            progress_ms: 2000,
            ..Cadence::default()
        };
        assert_eq!(coarse.progress_steps(1), 1);
    }

    #[test]
    fn describe_reports_cycles_after_completion() {
        let mut s = Session::start(48, 1).unwrap();
        assert_eq!(s.describe_current_phase(), "Breathe in slowly...");
        run_seconds(&mut s, 48);
        let text = s.describe_current_phase();
        assert!(text.starts_with("Session Complete!"));
        assert!(text.contains("You completed 3 breathing cycles."));
    }

    #[test]
    fn snapshot_mirrors_state() {
        let s = Session::start(180, 4).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.generation, 4);
        assert_eq!(snap.formatted_remaining, "03:00");
        assert_eq!(snap.phase_label, "Breathe in slowly...");
        assert_eq!(snap.visual_scale, VisualScale::Expanded);
        assert!(snap.is_active);
        assert!(!snap.is_complete);
    }
}
