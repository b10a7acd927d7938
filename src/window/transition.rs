//! Two-phase open/minimize/close transitions.
//!
//! Beginning a transition starts a fade and hands out a [`TransitionHandle`].
//! The side effects of a minimize or close only run once the host reports the
//! fade as finished by passing that handle back. Each new transition bumps the
//! window's generation, so a handle from a superseded fade is ignored.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Open,
    Minimize,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionHandle {
    pub(crate) generation: u64,
    pub(crate) kind: TransitionKind,
}

impl TransitionHandle {
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Opacity animation between two levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    from: f32,
    to: f32,
    started: Instant,
    duration: Duration,
}

impl Fade {
    pub fn new(from: f32, to: f32, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    pub fn opacity_at(&self, now: Instant) -> f32 {
        let progress = self.progress(now);
        self.from + (self.to - self.from) * progress
    }

    pub fn finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_interpolates_and_finishes() {
        let start = Instant::now();
        let fade = Fade::new(1.0, 0.0, start, Duration::from_millis(200));
        assert_eq!(fade.opacity_at(start), 1.0);
        let mid = fade.opacity_at(start + Duration::from_millis(100));
        assert!((mid - 0.5).abs() < 0.01);
        assert!(!fade.finished(start + Duration::from_millis(150)));
        assert!(fade.finished(start + Duration::from_millis(200)));
        assert_eq!(fade.opacity_at(start + Duration::from_secs(5)), 0.0);
    }

    #[test]
    fn zero_duration_is_immediately_done() {
        let start = Instant::now();
        let fade = Fade::new(0.0, 1.0, start, Duration::ZERO);
        assert!(fade.finished(start));
        assert_eq!(fade.opacity_at(start), 1.0);
    }
}
