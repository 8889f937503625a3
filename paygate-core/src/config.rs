//! Retry configuration shared by the HTTP client and its callers.

use crate::error::{ConfigValidationError, ValidationResult};
use std::time::Duration;

/// Upper bound accepted by [`RetryPolicy::validate`].
pub const MAX_REASONABLE_ATTEMPTS: u32 = 10;

/// How many times one logical call may be dispatched to the executor.
///
/// `max_attempts` counts the first attempt, so `1` means "no retry".
/// Attempts run strictly one after another; `delay` is waited between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// Exactly one attempt.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Up to three attempts in total, rescheduled immediately.
    pub const fn max_3_times() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::ZERO,
        }
    }

    /// A policy with the given attempt budget.
    pub const fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    /// Sets the delay between attempts.
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// True when a failed call is reported as retry exhaustion rather than
    /// with the underlying error.
    pub const fn retries(&self) -> bool {
        self.max_attempts > 1
    }

    /// Validates the policy.
    ///
    /// ```rust
    /// use paygate_core::config::RetryPolicy;
    ///
    /// assert!(RetryPolicy::max_3_times().validate().is_ok());
    /// assert!(RetryPolicy::attempts(0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<ValidationResult, ConfigValidationError> {
        if self.max_attempts == 0 {
            return Err(ConfigValidationError::too_low("max_attempts", 0, 1));
        }
        if self.max_attempts > MAX_REASONABLE_ATTEMPTS {
            return Err(ConfigValidationError::too_high(
                "max_attempts",
                self.max_attempts,
                MAX_REASONABLE_ATTEMPTS,
            ));
        }

        let mut result = ValidationResult::new();
        if self.delay > Duration::from_secs(30) {
            result.add_warning(format!(
                "retry delay {:?} is longer than the default read timeout",
                self.delay
            ));
        }
        Ok(result)
    }
}
