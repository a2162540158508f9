//! Guided breathing sessions.
//!
//! - [`Session`]: pure state machine fed by [`Tick`]s
//! - [`TimerGroup`]: the three repeating timers, cancelled as one
//! - [`BreathingController`]: owns a session and its timers on a Tokio runtime
//! - [`SimulatedClock`]: drives a session without a runtime, for tests and dry runs

mod controller;
mod phase;
mod session;
pub mod simulation;
mod timer_group;

pub use controller::BreathingController;
pub use phase::{BreathingPhase, VisualScale, PHASES_PER_CYCLE};
pub use session::{
    completion_summary, Cadence, Session, SessionSnapshot, SessionStatus, Tick, TickOutcome,
    CYCLE_SECS, PHASE_SECS, PROGRESS_STEPS_PER_SEC,
};
pub use simulation::{SimulatedClock, SimulationSeed, TickOrder};
pub use timer_group::{TimerGroup, TimerGroupCanceller};

use serde::{Deserialize, Serialize};

/// Session lengths offered by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Self::OneMinute, Self::ThreeMinutes, Self::FiveMinutes];

    pub const fn secs(self) -> u64 {
        match self {
            Self::OneMinute => 60,
            Self::ThreeMinutes => 180,
            Self::FiveMinutes => 300,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OneMinute => "1 Minute",
            Self::ThreeMinutes => "3 Minutes",
            Self::FiveMinutes => "5 Minutes",
        }
    }

    pub fn from_secs(secs: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.secs() == secs)
    }
}

/// Format seconds as MM:SS. Minutes keep growing past 99.
pub fn format_mmss(secs: u64) -> String {
    let minutes = secs / 60;
    let seconds = secs % 60;
    format!("{minutes:02}:{seconds:02}")
}
