use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::breathing::BreathingPhase;
use crate::wellness::Theme;

/// Every lifecycle change in the widget produces an Event.
/// Views subscribe to them; per-tick redraws go through session snapshots instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        generation: u64,
        duration_secs: u64,
        cycle_count: u64,
        at: DateTime<Utc>,
    },
    /// A new session replaced one that was still running.
    SessionPreempted {
        previous_generation: u64,
        /// Seconds the replaced session still had to go.
        previous_remaining_secs: u64,
        generation: u64,
        duration_secs: u64,
        cycle_count: u64,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        generation: u64,
        phase: BreathingPhase,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        generation: u64,
        cycle_count: u64,
        at: DateTime<Utc>,
    },
    /// The session was stopped before it ran out.
    SessionCancelled {
        generation: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    AffirmationLiked {
        streak: u32,
        at: DateTime<Utc>,
    },
    ThemeChanged {
        theme: Theme,
        at: DateTime<Utc>,
    },
}
