//! The rest of the widget: daily content, the like streak and the theme.
//!
//! All of it lives in memory for one run; nothing here is persisted.

pub mod content;
mod dashboard;
mod streak;
mod theme;

pub use dashboard::{Dashboard, DashboardSnapshot};
pub use streak::StreakCounter;
pub use theme::Theme;
