use crate::{ResourceCacheConfig, ResourceLoadError, ResourceLoadResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound on how long a cancelled token can go unnoticed during a `reload_interval` wait
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Stops a reload loop from another thread. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ReloadCancelToken {
    cancelled: Arc<AtomicBool>,
}

impl ReloadCancelToken {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Re-arm the token so it can stop a later loop
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}

/// Runs `attempt_fn` until it succeeds. `attempt_fn` receives the 1-based attempt number.
///
/// If `config.reload_loop` is false this makes exactly one attempt and returns its result.
///
/// If `config.reload_loop` is true, failures are handed to `on_failure` and the attempt is repeated,
/// forever. This is a blocking call with no attempt limit, no timeout and no backoff; the only
/// pause between attempts is `config.reload_interval`, if set. It is meant for resources that
/// will show up eventually (a file being written by another process) and will hang the calling
/// thread on a resource that never does. Passing a `cancel_token` is the only way out short of
/// success: once it is cancelled the loop returns the most recent error tagged as
/// `ResourceLoadErrorKind::Cancelled`. The token is checked after each failed attempt, so at least
/// one attempt is always made. A pending `reload_interval` wait is also cut short, within
/// `CANCEL_POLL_INTERVAL`, when the token is cancelled.
pub fn load_with_reload<T, AttemptFn, FailureFn>(
    config: &ResourceCacheConfig,
    cancel_token: Option<&ReloadCancelToken>,
    mut attempt_fn: AttemptFn,
    mut on_failure: FailureFn,
) -> ResourceLoadResult<T>
where
    AttemptFn: FnMut(u64) -> ResourceLoadResult<T>,
    FailureFn: FnMut(&ResourceLoadError, u64),
{
    let mut attempt = 1;
    loop {
        let error = match attempt_fn(attempt) {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        on_failure(&error, attempt);

        if !config.reload_loop {
            return Err(error);
        }

        if let Some(cancel_token) = cancel_token {
            if cancel_token.is_cancelled() {
                return Err(error.into_cancelled());
            }
        }

        if let Some(reload_interval) = config.reload_interval {
            if !wait_for_retry(reload_interval, cancel_token) {
                return Err(error.into_cancelled());
            }
        }

        attempt += 1;
    }
}

// Sleeps for `interval`, waking up every CANCEL_POLL_INTERVAL to check the token. Returns false if
// the token was cancelled during the wait.
fn wait_for_retry(
    interval: Duration,
    cancel_token: Option<&ReloadCancelToken>,
) -> bool {
    let cancel_token = match cancel_token {
        Some(cancel_token) => cancel_token,
        None => {
            std::thread::sleep(interval);
            return true;
        }
    };

    let deadline = Instant::now() + interval;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return true;
        }

        std::thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
        if cancel_token.is_cancelled() {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail_n_times(n: u64) -> impl FnMut(u64) -> ResourceLoadResult<&'static str> {
        move |attempt| {
            if attempt <= n {
                Err(ResourceLoadError::not_found())
            } else {
                Ok("loaded")
            }
        }
    }

    #[test]
    fn test_single_attempt_without_reload_loop() {
        let mut failures = 0;
        let result = load_with_reload(
            &ResourceCacheConfig::default(),
            None,
            fail_n_times(3),
            |_, _| failures += 1,
        );
        assert!(result.is_err());
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_reload_loop_retries_until_success() {
        let mut attempts_seen = vec![];
        let result = load_with_reload(
            &ResourceCacheConfig::reload_loop(),
            None,
            fail_n_times(4),
            |_, attempt| attempts_seen.push(attempt),
        );
        assert_eq!(result.unwrap(), "loaded");
        assert_eq!(attempts_seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reload_loop_with_interval() {
        let config = ResourceCacheConfig::reload_loop()
            .with_reload_interval(Duration::from_millis(1));
        let result = load_with_reload(&config, None, fail_n_times(2), |_, _| {});
        assert_eq!(result.unwrap(), "loaded");
    }

    #[test]
    fn test_cancel_stops_reload_loop() {
        let token = ReloadCancelToken::new();
        let cancel_from_callback = token.clone();
        let mut failures = 0;
        let result: ResourceLoadResult<()> = load_with_reload(
            &ResourceCacheConfig::reload_loop(),
            Some(&token),
            |_| Err(ResourceLoadError::not_found()),
            |_, attempt| {
                failures += 1;
                if attempt == 3 {
                    cancel_from_callback.cancel();
                }
            },
        );

        let error = result.unwrap_err();
        assert!(error.is_cancelled());
        assert_eq!(failures, 3);

        token.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancelled_token_still_attempts_once() {
        let token = ReloadCancelToken::new();
        token.cancel();
        let result = load_with_reload(
            &ResourceCacheConfig::reload_loop(),
            Some(&token),
            fail_n_times(0),
            |_, _| {},
        );
        assert_eq!(result.unwrap(), "loaded");
    }

    #[test]
    fn test_cancel_interrupts_reload_interval() {
        let token = ReloadCancelToken::new();
        let cancel_from_thread = token.clone();
        let config =
            ResourceCacheConfig::reload_loop().with_reload_interval(Duration::from_secs(60));

        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            cancel_from_thread.cancel();
        });

        let start = Instant::now();
        let mut failures = 0;
        let result: ResourceLoadResult<()> = load_with_reload(
            &config,
            Some(&token),
            |_| Err(ResourceLoadError::not_found()),
            |_, _| failures += 1,
        );
        canceller.join().unwrap();

        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(failures, 1);
        assert!(start.elapsed() < Duration::from_secs(30));
    }
}
