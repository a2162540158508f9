//! Terminal rendering of breathing frames.

use mindfulness_core::breathing::VisualScale;
use mindfulness_core::{SessionSnapshot, UiConfig};

/// Breathing circle: large while the lungs are full, small otherwise.
fn circle(scale: VisualScale) -> &'static str {
    match scale {
        VisualScale::Expanded => "( O )",
        VisualScale::Relaxed => " (o) ",
    }
}

pub fn progress_bar(ratio: f64, width: u32) -> String {
    let width = width as usize;
    let filled = ((ratio.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled.min(width)))
}

/// One line describing the session at this instant.
pub fn frame(snap: &SessionSnapshot, ui: &UiConfig) -> String {
    let mut line = format!("{} {}", circle(snap.visual_scale), snap.formatted_remaining);
    if ui.show_progress_bar {
        line.push(' ');
        line.push_str(&progress_bar(snap.progress_ratio, ui.progress_bar_width));
        line.push_str(&format!(" {:>3.0}%", snap.progress_ratio));
    }
    if snap.is_active {
        line.push_str("  ");
        line.push_str(&snap.phase_label);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindfulness_core::Session;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "[....]");
        assert_eq!(progress_bar(50.0, 4), "[##..]");
        assert_eq!(progress_bar(100.0, 4), "[####]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
    }

    #[test]
    fn frame_shows_countdown_and_cue() {
        let snap = Session::start(90, 1).unwrap().snapshot();
        let line = frame(&snap, &UiConfig::default());
        assert!(line.starts_with("( O ) 01:30 ["));
        assert!(line.ends_with("Breathe in slowly..."));
    }

    #[test]
    fn frame_without_bar() {
        let snap = Session::start(5, 1).unwrap().snapshot();
        let ui = UiConfig {
            show_progress_bar: false,
            ..UiConfig::default()
        };
        assert_eq!(frame(&snap, &ui), "( O ) 00:05  Breathe in slowly...");
    }
}
