use serde::{Deserialize, Serialize};

/// Counts how many times today's affirmation has been liked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakCounter {
    count: u32,
}

impl StreakCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u32 {
        self.count
    }

    /// Record a like and return the new streak.
    pub fn like(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Encouragement shown right after a like.
    pub fn message(&self) -> String {
        format!("Great job! You've maintained a {} day streak!", self.count)
    }
}
