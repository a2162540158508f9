//! # Mindfulness Core Library
//!
//! Business logic for a single-screen wellness widget: a daily affirmation and
//! quote, a like streak, and a guided breathing timer. Views (the CLI, or any
//! other front end) are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Breathing**: a session state machine fed by three periodic processes
//!   (countdown every second, progress every tenth of a second, phase every
//!   four seconds) that run as one cancellable timer group on Tokio
//! - **Simulation**: the same state machine on a virtual clock, with
//!   controllable tick interleavings
//! - **Wellness**: in-memory affirmation/quote picks, streak and theme
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`BreathingController`]: owns the active session and its timers
//! - [`Session`]: the breathing state machine
//! - [`Dashboard`]: everything on the widget apart from breathing
//! - [`Config`]: application configuration management

pub mod breathing;
pub mod error;
pub mod events;
pub mod storage;
pub mod wellness;

pub use breathing::{
    BreathingController, BreathingPhase, Cadence, Preset, Session, SessionSnapshot, SessionStatus,
    SimulatedClock, Tick, TickOrder, TickOutcome,
};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use storage::{BreathingConfig, Config, UiConfig};
pub use wellness::{Dashboard, DashboardSnapshot, StreakCounter, Theme};
