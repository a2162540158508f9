use serde::{Deserialize, Serialize};

/// Number of phases in one breathing cycle.
pub const PHASES_PER_CYCLE: u64 = 4;

/// One 4-second segment of a breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathingPhase {
    Inhale,
    Hold,
    Exhale,
    Rest,
}

/// Presentation hint for the breathing circle.
///
/// Only two sizes are distinguished: the lungs are full during inhale and hold,
/// relaxed during exhale and rest. Views are free to ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualScale {
    Expanded,
    Relaxed,
}

impl BreathingPhase {
    pub const ALL: [BreathingPhase; 4] = [Self::Inhale, Self::Hold, Self::Exhale, Self::Rest];

    /// Phase for a rotation count, wrapping every four rotations.
    pub fn from_index(index: u64) -> Self {
        Self::ALL[(index % PHASES_PER_CYCLE) as usize]
    }

    /// Cue shown to the user while this phase is running.
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Inhale => "Breathe in slowly...",
            Self::Hold => "Hold...",
            Self::Exhale => "Breathe out gently...",
            Self::Rest => "Rest...",
        }
    }

    pub const fn visual_scale(self) -> VisualScale {
        match self {
            Self::Inhale | Self::Hold => VisualScale::Expanded,
            Self::Exhale | Self::Rest => VisualScale::Relaxed,
        }
    }
}

impl std::fmt::Display for BreathingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Inhale => "Inhale",
            Self::Hold => "Hold",
            Self::Exhale => "Exhale",
            Self::Rest => "Rest",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_index_wraps() {
        assert_eq!(BreathingPhase::from_index(0), BreathingPhase::Inhale);
        assert_eq!(BreathingPhase::from_index(4), BreathingPhase::Inhale);
        assert_eq!(BreathingPhase::from_index(7), BreathingPhase::Rest);
    }

    #[test]
    fn two_tier_visual_mapping() {
        assert_eq!(BreathingPhase::Inhale.visual_scale(), VisualScale::Expanded);
        assert_eq!(BreathingPhase::Hold.visual_scale(), VisualScale::Expanded);
        assert_eq!(BreathingPhase::Exhale.visual_scale(), VisualScale::Relaxed);
        assert_eq!(BreathingPhase::Rest.visual_scale(), VisualScale::Relaxed);
    }
}
