//! Retry policy for transient operating system failures

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum retry attempts after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry
    #[serde(with = "humantime_serde", default = "default_retry_delay")]
    pub initial_delay: Duration,

    /// Upper bound of the delay between two attempts
    #[serde(with = "humantime_serde", default = "default_max_retry_delay")]
    pub max_delay: Duration,

    /// Exponential backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay: default_retry_delay(),
            max_delay: default_max_retry_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// Policy retrying immediately, mostly useful in tests
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Delay to wait before the given retry (1-based), never above `max_delay`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16) as i32;
        let multiplier = if self.backoff_multiplier.is_finite() {
            self.backoff_multiplier.max(1.0)
        } else {
            1.0
        };
        let seconds = (self.initial_delay.as_secs_f64() * multiplier.powi(exponent))
            .min(self.max_delay.as_secs_f64());

        Duration::try_from_secs_f64(seconds)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails permanently or retries are exhausted
    pub fn retry<T, F>(&self, description: &str, mut operation: F) -> std::io::Result<T>
    where
        F: FnMut() -> std::io::Result<T>,
    {
        let mut attempt = 0;

        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(error) if is_transient(error.kind()) && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Transient failure during {description}: {error}, retrying in {delay:?} (attempt {attempt}/{})",
                        self.max_retries
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
                Err(error) => {
                    debug!("{description} failed after {attempt} retries: {error}");
                    return Err(error);
                }
            }
        }
    }
}

/// Whether an I/O failure of this kind may succeed when attempted again
pub fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(50)
}

fn default_max_retry_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(50));
        assert_eq!(policy.max_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_delay_grows_and_is_capped() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for(1), Duration::from_millis(50));
        assert_eq!(policy.delay_for(2), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(200));
        assert_eq!(policy.delay_for(10), Duration::from_secs(1));
    }

    #[test]
    fn test_huge_delays_are_capped() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_secs(u64::MAX / 2),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 4.0,
        };

        assert_eq!(policy.delay_for(1), Duration::from_secs(30));
        assert_eq!(policy.delay_for(5), Duration::from_secs(30));
    }

    #[test]
    fn test_non_finite_multiplier_does_not_grow_the_delay() {
        let policy = RetryPolicy {
            backoff_multiplier: f64::INFINITY,
            ..RetryPolicy::default()
        };

        assert_eq!(policy.delay_for(3), Duration::from_millis(50));

        let policy = RetryPolicy {
            backoff_multiplier: f64::NAN,
            ..RetryPolicy::default()
        };

        assert_eq!(policy.delay_for(3), Duration::from_millis(50));
    }

    #[test]
    fn test_transient_failures_are_retried() {
        let policy = RetryPolicy::immediate(3);
        let mut calls = 0;

        let result = policy.retry("test", || {
            calls += 1;
            if calls < 3 {
                Err(std::io::Error::from(ErrorKind::Interrupted))
            } else {
                Ok(calls)
            }
        });

        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_permanent_failures_are_not_retried() {
        let policy = RetryPolicy::immediate(3);
        let mut calls = 0;

        let result: std::io::Result<()> = policy.retry("test", || {
            calls += 1;
            Err(std::io::Error::from(ErrorKind::NotFound))
        });

        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retries_are_bounded() {
        let policy = RetryPolicy::immediate(2);
        let mut calls = 0;

        let result: std::io::Result<()> = policy.retry("test", || {
            calls += 1;
            Err(std::io::Error::from(ErrorKind::TimedOut))
        });

        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_policy_deserializes_human_durations() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"max_retries": 5, "initial_delay": "10ms"}"#).unwrap();

        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(10));
        assert_eq!(policy.max_delay, Duration::from_secs(1));
    }
}
