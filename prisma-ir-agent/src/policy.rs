//! Retry policy for producer calls.

use std::time::Duration;

use crate::error::PolicyError;

/// Bounds on how long and how often a producer is asked for a component.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use prisma_ir_agent::RetryPolicy;
///
/// let policy = RetryPolicy::new(5)?
///     .with_timeout(Duration::from_secs(30))?
///     .with_retry_delay(Duration::from_millis(250));
/// assert_eq!(policy.max_attempts(), 5);
///
/// assert!(RetryPolicy::new(0).is_err());
/// # Ok::<(), prisma_ir_agent::PolicyError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    timeout: Duration,
    retry_delay: Duration,
}

impl RetryPolicy {
    /// Default number of attempts per component
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Upper bound on attempts per component
    pub const MAX_ATTEMPTS_LIMIT: u32 = 32;

    /// Default timeout of a single producer call
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a policy with the given attempt budget.
    ///
    /// # Errors
    /// Returns `PolicyError::MaxAttemptsOutOfRange` unless
    /// `1 <= max_attempts <= MAX_ATTEMPTS_LIMIT`.
    pub fn new(max_attempts: u32) -> Result<Self, PolicyError> {
        if max_attempts == 0 || max_attempts > Self::MAX_ATTEMPTS_LIMIT {
            return Err(PolicyError::MaxAttemptsOutOfRange {
                max: Self::MAX_ATTEMPTS_LIMIT,
                actual: max_attempts,
            });
        }
        Ok(Self {
            max_attempts,
            timeout: Self::DEFAULT_TIMEOUT,
            retry_delay: Duration::ZERO,
        })
    }

    /// Set the per-call timeout.
    ///
    /// # Errors
    /// Returns `PolicyError::ZeroTimeout` for a zero duration.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, PolicyError> {
        if timeout.is_zero() {
            return Err(PolicyError::ZeroTimeout);
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Set the pause between attempts.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            timeout: Self::DEFAULT_TIMEOUT,
            retry_delay: Duration::ZERO,
        }
    }
}
