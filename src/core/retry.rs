

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed,
    Exponential { max_delay: Duration },
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            backoff: Backoff::Fixed,
        }
    }

    pub fn exponential(max_attempts: u32, initial: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: initial,
            backoff: Backoff::Exponential { max_delay },
        }
    }

    /// Sum of the sleeps between attempts if every attempt fails.
    pub fn total_delay(&self) -> Duration {
        let mut total = Duration::ZERO;
        let mut delay = self.delay;
        for _ in 1..self.max_attempts {
            total += delay;
            delay = self.next_delay(delay);
        }
        total
    }

    fn next_delay(&self, current: Duration) -> Duration {
        match self.backoff {
            Backoff::Fixed => current,
            Backoff::Exponential { max_delay } => (current * 2).min(max_delay),
        }
    }
}


#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last: E,
}

impl<E: Display> Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gave up after {} attempt(s): {}", self.attempts, self.last)
    }
}

impl<E: std::fmt::Debug + Display> std::error::Error for RetryError<E> {}


/// Runs `op` until it succeeds or `policy.max_attempts` is reached. The closure
/// receives the 1-based attempt number.
pub async fn retry_with<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delay = policy.delay;
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt >= policy.max_attempts => {
                debug!("{} failed (final attempt {}): {}", label, attempt, e);
                return Err(RetryError { attempts: attempt, last: e });
            }
            Err(e) => {
                debug!("{} failed (attempt {}), retrying in {:?}: {}", label, attempt, delay, e);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                delay = policy.next_delay(delay);
                attempt += 1;
            }
        }
    }
}
