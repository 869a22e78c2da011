use std::{
    fmt::Display,
    sync::atomic::{AtomicBool, Ordering},
};

use metainfo_core::check::RelationStatus;
use nu_ansi_term::Color::{self, Green, Red, Yellow};

pub struct Icons;

impl Icons {
    pub const ARROW: &str = "→";
    pub const CHECK: &str = "✓";
    pub const CROSS: &str = "✗";
    pub const QUESTION: &str = "?";
    pub const WARNING: &str = "⚠";
}

pub static COLOR: AtomicBool = AtomicBool::new(true);

pub fn disable_color() {
    COLOR.store(false, Ordering::Relaxed);
}

pub fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if COLOR.load(Ordering::Relaxed) {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

pub fn status_icon(status: RelationStatus) -> Colored<&'static str> {
    match status {
        RelationStatus::Satisfied => Colored(Green, Icons::CHECK),
        RelationStatus::NotSatisfied => Colored(Red, Icons::CROSS),
        RelationStatus::Unknown => Colored(Yellow, Icons::QUESTION),
        RelationStatus::Error => Colored(Red, Icons::WARNING),
    }
}

/// Rough verdict for a compatibility score.
pub fn score_verdict(score: u8) -> Colored<&'static str> {
    match score {
        0 => Colored(Red, "incompatible"),
        1..=49 => Colored(Red, "poor"),
        50..=79 => Colored(Yellow, "limited"),
        80..=99 => Colored(Green, "good"),
        _ => Colored(Green, "perfect"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_verdict() {
        assert_eq!(score_verdict(0).1, "incompatible");
        assert_eq!(score_verdict(63).1, "limited");
        assert_eq!(score_verdict(100).1, "perfect");
    }
}
