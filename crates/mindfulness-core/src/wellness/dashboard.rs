use chrono::{NaiveDate, Utc};
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::content::{random_affirmation, random_quote};
use super::{StreakCounter, Theme};
use crate::events::Event;

/// Everything on the widget apart from the breathing exercise.
#[derive(Debug, Clone)]
pub struct Dashboard {
    date: NaiveDate,
    affirmation: &'static str,
    quote: &'static str,
    streak: StreakCounter,
    theme: Theme,
}

/// Serializable view of a [`Dashboard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub date: String,
    pub affirmation: String,
    pub quote: String,
    pub streak: u32,
    pub theme: Theme,
}

impl Dashboard {
    /// Pick today's affirmation and quote from `rng`.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, date: NaiveDate, theme: Theme) -> Self {
        Self {
            date,
            affirmation: random_affirmation(rng),
            quote: random_quote(rng),
            streak: StreakCounter::new(),
            theme,
        }
    }

    /// Seeded picks are reproducible; `None` draws from OS entropy.
    pub fn with_seed(seed: Option<u64>, date: NaiveDate, theme: Theme) -> Self {
        let mut rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self::new(&mut rng, date, theme)
    }

    pub fn affirmation(&self) -> &'static str {
        self.affirmation
    }

    pub fn quote(&self) -> &'static str {
        self.quote
    }

    pub fn streak(&self) -> u32 {
        self.streak.current()
    }

    pub fn streak_message(&self) -> String {
        self.streak.message()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Long date for the header, e.g. "Friday, October 16, 2026".
    pub fn formatted_date(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }

    pub fn like(&mut self) -> Event {
        let streak = self.streak.like();
        tracing::debug!(streak, "affirmation liked");
        Event::AffirmationLiked {
            streak,
            at: Utc::now(),
        }
    }

    pub fn toggle_theme(&mut self) -> Event {
        self.theme = self.theme.toggled();
        Event::ThemeChanged {
            theme: self.theme,
            at: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            date: self.formatted_date(),
            affirmation: self.affirmation.to_string(),
            quote: self.quote.to_string(),
            streak: self.streak.current(),
            theme: self.theme,
        }
    }
}
