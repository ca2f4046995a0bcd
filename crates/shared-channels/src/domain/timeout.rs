//! Wait policy shared by `send` and `receive`.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// How long a channel operation may wait.
///
/// The signed-millisecond convention used by configuration maps onto this
/// type via [`Timeout::from_millis`]: zero is a single non-blocking attempt,
/// a positive value bounds the wait, a negative value waits indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// One attempt, never wait.
    NonBlocking,
    /// Wait at most this long.
    Bounded(Duration),
    /// Wait until success or cancellation of the caller.
    #[default]
    Indefinite,
}

impl Timeout {
    /// Convert a signed millisecond value into a timeout.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        match millis {
            0 => Self::NonBlocking,
            m if m < 0 => Self::Indefinite,
            m => Self::Bounded(Duration::from_millis(m.unsigned_abs())),
        }
    }

    /// Bounded wait of the given duration. A zero duration is non-blocking.
    #[must_use]
    pub fn after(duration: Duration) -> Self {
        if duration.is_zero() {
            Self::NonBlocking
        } else {
            Self::Bounded(duration)
        }
    }

    /// Signed millisecond representation (inverse of `from_millis`).
    #[must_use]
    pub fn as_millis(&self) -> i64 {
        match self {
            Self::NonBlocking => 0,
            Self::Indefinite => -1,
            Self::Bounded(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Whether the operation may suspend at all.
    #[must_use]
    pub fn may_wait(&self) -> bool {
        !matches!(self, Self::NonBlocking)
    }

    /// Absolute deadline for a bounded wait starting now. A bound too far
    /// out to represent yields `None` and the wait is unbounded.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Bounded(d) => Instant::now().checked_add(*d),
            _ => None,
        }
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Self::after(duration)
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonBlocking => write!(f, "non-blocking"),
            Self::Bounded(d) => write!(f, "{}ms", d.as_millis()),
            Self::Indefinite => write!(f, "indefinite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_millis_convention() {
        assert_eq!(Timeout::from_millis(0), Timeout::NonBlocking);
        assert_eq!(Timeout::from_millis(-1), Timeout::Indefinite);
        assert_eq!(Timeout::from_millis(i64::MIN), Timeout::Indefinite);
        assert_eq!(
            Timeout::from_millis(250),
            Timeout::Bounded(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_as_millis_inverse() {
        for millis in [-1, 0, 1, 5000] {
            assert_eq!(Timeout::from_millis(millis).as_millis(), millis);
        }
    }

    #[test]
    fn test_zero_duration_is_non_blocking() {
        assert_eq!(Timeout::from(Duration::ZERO), Timeout::NonBlocking);
        assert!(!Timeout::NonBlocking.may_wait());
        assert!(Timeout::default().may_wait());
    }

    #[tokio::test]
    async fn test_unrepresentable_deadline_waits_indefinitely() {
        let huge = Timeout::Bounded(Duration::MAX);
        assert!(huge.may_wait());
        assert!(huge.deadline().is_none());
        assert!(Timeout::from_millis(10).deadline().is_some());
    }

    #[test]
    fn test_display() {
        assert_eq!(Timeout::from_millis(30).to_string(), "30ms");
        assert_eq!(Timeout::Indefinite.to_string(), "indefinite");
    }
}
