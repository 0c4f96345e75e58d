use std::time::{Duration, Instant};

/// How long a notice stays visible unless replaced or dismissed.
pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(4);

/// A transient user-facing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Message text.
    pub message: String,
    /// When it was posted.
    pub posted_at: Instant,
    /// When it disappears on its own.
    pub dismiss_at: Instant,
}

/// Holds at most one notice with a single pending auto-dismiss deadline.
///
/// Time is passed in by the caller, which keeps the board deterministic under test.
#[derive(Clone, Debug)]
pub struct NoticeBoard {
    timeout: Duration,
    current: Option<Notice>,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeBoard {
    /// Board with the standard four second timeout.
    pub fn new() -> Self {
        Self::with_timeout(NOTICE_TIMEOUT)
    }

    /// Board with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            current: None,
        }
    }

    /// Show `message`, replacing any notice still on screen and rescheduling the dismissal.
    pub fn post(&mut self, message: impl Into<String>, now: Instant) -> &Notice {
        let message = message.into();
        tracing::debug!(%message, "notice posted");
        self.current.insert(Notice {
            message,
            posted_at: now,
            dismiss_at: now + self.timeout,
        })
    }

    /// The notice visible at `now`, if any.
    pub fn current(&self, now: Instant) -> Option<&Notice> {
        self.current.as_ref().filter(|n| now < n.dismiss_at)
    }

    /// Drop the notice once its deadline has passed. Returns whether one was dismissed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.current {
            Some(n) if now >= n.dismiss_at => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Remove the notice immediately.
    pub fn dismiss(&mut self) -> Option<Notice> {
        self.current.take()
    }

    /// Deadline of the one scheduled dismissal.
    pub fn pending_dismissal(&self) -> Option<Instant> {
        self.current.as_ref().map(|n| n.dismiss_at)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/notice.rs"]
mod tests;
