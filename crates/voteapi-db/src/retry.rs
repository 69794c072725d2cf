//! Retry policy for serialization conflicts.
//!
//! The default policy retries forever with no pause, which suits the very
//! low write contention of a reference dataset. Deployments that expect
//! sustained contention can cap the number of attempts (surfacing
//! [`DbError::Overloaded`]) and add a fixed pause between attempts.

use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::DbError;

/// When and how often a conflicting transaction is re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on attempts, counting the first one. `None` is unbounded.
    pub max_attempts: Option<NonZeroU32>,
    /// Pause between a conflict and the next attempt.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RetryPolicy {
    /// Retry forever, immediately.
    pub const fn unbounded() -> Self {
        Self {
            max_attempts: None,
            backoff: Duration::ZERO,
        }
    }

    /// Give up after `max` attempts in total.
    #[must_use]
    pub const fn with_max_attempts(mut self, max: NonZeroU32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// Sleep `backoff` before every retry.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Decide what follows a failed attempt number `attempt` (1-based).
    ///
    /// Returns the pause before the next attempt when `err` is a
    /// serialization conflict and the ceiling allows another try. Any other
    /// error comes back unchanged; a conflict past the ceiling becomes
    /// [`DbError::Overloaded`].
    pub fn next_delay(&self, err: DbError, attempt: u32) -> Result<Duration, DbError> {
        if !err.is_serialization_failure() {
            return Err(err);
        }
        if self.max_attempts.is_some_and(|max| attempt >= max.get()) {
            return Err(DbError::Overloaded { attempts: attempt });
        }
        Ok(self.backoff)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voteapi_types::EntityKind;

    use super::*;
    use crate::error::test_support::pg_error;

    #[test]
    fn default_is_unbounded_without_pause() {
        let policy = RetryPolicy::default();
        assert_eq!(policy, RetryPolicy::unbounded());
        for attempt in [1, 10, 10_000, u32::MAX] {
            assert_eq!(
                policy.next_delay(pg_error("40001"), attempt).unwrap(),
                Duration::ZERO
            );
        }
    }

    #[test]
    fn other_errors_are_returned_immediately() {
        let policy = RetryPolicy::unbounded();
        let err = policy
            .next_delay(DbError::NotFound(EntityKind::State), 1)
            .unwrap_err();
        assert!(err.is_not_found());

        let err = policy.next_delay(pg_error("23505"), 1).unwrap_err();
        assert!(matches!(err, DbError::Postgres(_)));
    }

    #[test]
    fn ceiling_turns_conflict_into_overloaded() {
        let policy = RetryPolicy::unbounded().with_max_attempts(NonZeroU32::new(3).unwrap());
        assert!(policy.next_delay(pg_error("40001"), 1).is_ok());
        assert!(policy.next_delay(pg_error("40001"), 2).is_ok());
        let err = policy.next_delay(pg_error("40001"), 3).unwrap_err();
        assert!(matches!(err, DbError::Overloaded { attempts: 3 }));
    }

    #[test]
    fn single_attempt_never_retries() {
        let policy = RetryPolicy::unbounded().with_max_attempts(NonZeroU32::MIN);
        let err = policy.next_delay(pg_error("40001"), 1).unwrap_err();
        assert!(matches!(err, DbError::Overloaded { attempts: 1 }));
    }

    #[test]
    fn backoff_is_reported() {
        let policy = RetryPolicy::unbounded().with_backoff(Duration::from_millis(20));
        assert_eq!(
            policy.next_delay(pg_error("40001"), 1).unwrap(),
            Duration::from_millis(20)
        );
    }
}
