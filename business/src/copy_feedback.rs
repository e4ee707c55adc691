//! Copy button feedback: `Idle -> Copied -> Idle` or `Idle -> Error -> Idle`.
//!
//! The revert timer is owned here as a plain deadline rather than a spawned sleep, so a
//! reset simply disarms it and an old deadline can never clobber a newer state. The owner
//! calls [`CopyFeedback::poll`] from its update loop.

use std::time::Duration;

use tokio::time::Instant;

/// How long `Copied` / `Error` stay visible.
pub const COPY_FEEDBACK_RESET: Duration = Duration::from_millis(1600);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
    Error,
}

impl CopyState {
    /// Copy button label for this state.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Copy data URL",
            Self::Copied => "Copied",
            Self::Error => "Copy failed",
        }
    }
}

#[derive(Debug, Default)]
pub struct CopyFeedback {
    state: CopyState,
    revert_at: Option<Instant>,
}

impl CopyFeedback {
    pub fn state(&self) -> CopyState {
        self.state
    }

    /// When the current state will fall back to idle, if a revert is armed.
    pub fn revert_at(&self) -> Option<Instant> {
        self.revert_at
    }

    /// Shows `state` and (re)arms the revert timer from `now`.
    pub fn record(&mut self, state: CopyState, now: Instant) {
        self.state = state;
        self.revert_at = match state {
            CopyState::Idle => None,
            CopyState::Copied | CopyState::Error => Some(now + COPY_FEEDBACK_RESET),
        };
    }

    /// Forces idle and disarms any pending revert.
    pub fn reset(&mut self) {
        self.state = CopyState::Idle;
        self.revert_at = None;
    }

    /// Reverts to idle once the deadline has passed. Returns `true` if the state changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.revert_at {
            Some(deadline) if now >= deadline => {
                self.reset();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(CopyState::Idle.label(), "Copy data URL");
        assert_eq!(CopyState::Copied.label(), "Copied");
        assert_eq!(CopyState::Error.label(), "Copy failed");
    }

    #[tokio::test(start_paused = true)]
    async fn copied_reverts_after_delay() {
        let mut feedback = CopyFeedback::default();
        let start = Instant::now();

        feedback.record(CopyState::Copied, start);
        assert!(!feedback.poll(start + Duration::from_millis(1599)));
        assert_eq!(feedback.state(), CopyState::Copied);

        assert!(feedback.poll(start + COPY_FEEDBACK_RESET));
        assert_eq!(feedback.state(), CopyState::Idle);
        assert!(feedback.revert_at().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_copy_rearms_timer() {
        let mut feedback = CopyFeedback::default();
        let start = Instant::now();

        feedback.record(CopyState::Copied, start);
        let later = start + Duration::from_millis(1000);
        feedback.record(CopyState::Copied, later);

        assert!(!feedback.poll(start + COPY_FEEDBACK_RESET));
        assert!(feedback.poll(later + COPY_FEEDBACK_RESET));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_disarms_pending_revert() {
        let mut feedback = CopyFeedback::default();
        let start = Instant::now();

        feedback.record(CopyState::Error, start);
        feedback.reset();

        assert_eq!(feedback.state(), CopyState::Idle);
        assert!(!feedback.poll(start + COPY_FEEDBACK_RESET));
    }
}
