//! Affirmations and quotes shown on the dashboard.

use rand::seq::SliceRandom;
use rand::Rng;

pub const AFFIRMATIONS: [&str; 6] = [
    "I am capable of achieving anything I set my mind to.",
    "I choose to be confident and self-assured.",
    "I am surrounded by love and positive energy.",
    "I trust in my abilities and inner wisdom.",
    "I am grateful for all the abundance in my life.",
    "I radiate peace, love, and harmony.",
];

pub const QUOTES: [&str; 6] = [
    "The only way to do great work is to love what you do.",
    "Believe you can and you're halfway there.",
    "Everything you've ever wanted is on the other side of fear.",
    "The future belongs to those who believe in the beauty of their dreams.",
    "Your mind is a garden, your thoughts are the seeds.",
    "Every moment is a fresh beginning.",
];

pub fn random_affirmation<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    AFFIRMATIONS.choose(rng).copied().unwrap_or(AFFIRMATIONS[0])
}

pub fn random_quote<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    QUOTES.choose(rng).copied().unwrap_or(QUOTES[0])
}
