//! Bounded retry with exponential backoff.
//!
//! Only connection establishment goes through here. Steady-state calls fail
//! fast so that a signed transaction is never broadcast twice.

use backoff::{backoff::Backoff, ExponentialBackoff};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::warn;

/// Attempt budget and delay schedule for [`retry`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
	/// Total number of attempts, including the first one.
	pub max_attempts: usize,
	pub initial_interval: Duration,
	pub max_interval: Duration,
	pub multiplier: f64,
	/// Deadline covering every attempt and every delay.
	pub deadline: Duration,
}

impl RetryPolicy {
	/// Policy used when dialing a node.
	pub fn dial(max_attempts: usize, deadline: Duration) -> Self {
		Self {
			max_attempts,
			initial_interval: Duration::from_millis(200),
			max_interval: Duration::from_secs(2),
			multiplier: 2.0,
			deadline,
		}
	}

	fn backoff(&self) -> ExponentialBackoff {
		ExponentialBackoff {
			current_interval: self.initial_interval,
			initial_interval: self.initial_interval,
			max_interval: self.max_interval,
			multiplier: self.multiplier,
			max_elapsed_time: None,
			..Default::default()
		}
	}
}

/// Failure of a retried operation, annotated with how many attempts ran.
#[derive(Debug)]
pub enum RetryError<E> {
	/// Every attempt failed; `source` is the last error.
	Exhausted { attempts: usize, source: E },
	/// The overall deadline elapsed before an attempt succeeded.
	DeadlineExceeded { attempts: usize, deadline: Duration },
}

impl<E> RetryError<E> {
	pub fn attempts(&self) -> usize {
		match self {
			RetryError::Exhausted { attempts, .. } | RetryError::DeadlineExceeded { attempts, .. } => {
				*attempts
			},
		}
	}
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RetryError::Exhausted { attempts, source } => {
				write!(f, "failed after {} attempts: {}", attempts, source)
			},
			RetryError::DeadlineExceeded { attempts, deadline } => write!(
				f,
				"deadline of {:?} exceeded after {} attempts",
				deadline, attempts
			),
		}
	}
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			RetryError::Exhausted { source, .. } => Some(source),
			RetryError::DeadlineExceeded { .. } => None,
		}
	}
}

/// Runs `operation` until it succeeds, the attempt budget is spent, or the
/// policy deadline passes.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, RetryError<E>>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: fmt::Display,
{
	let max_attempts = policy.max_attempts.max(1);
	let attempts = AtomicUsize::new(0);

	let run = async {
		let mut backoff = policy.backoff();
		loop {
			let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
			match operation().await {
				Ok(value) => return Ok(value),
				Err(err) if attempt >= max_attempts => return Err(err),
				Err(err) => {
					let delay = backoff.next_backoff().unwrap_or(policy.max_interval);
					warn!(
						attempt,
						max_attempts,
						delay_ms = delay.as_millis() as u64,
						error = %err,
						"Attempt failed, retrying"
					);
					tokio::time::sleep(delay).await;
				},
			}
		}
	};

	match tokio::time::timeout(policy.deadline, run).await {
		Ok(Ok(value)) => Ok(value),
		Ok(Err(source)) => Err(RetryError::Exhausted {
			attempts: attempts.load(Ordering::Relaxed),
			source,
		}),
		Err(_) => Err(RetryError::DeadlineExceeded {
			attempts: attempts.load(Ordering::Relaxed),
			deadline: policy.deadline,
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fast_policy(max_attempts: usize) -> RetryPolicy {
		RetryPolicy {
			max_attempts,
			initial_interval: Duration::from_millis(1),
			max_interval: Duration::from_millis(5),
			multiplier: 2.0,
			deadline: Duration::from_secs(5),
		}
	}

	#[tokio::test]
	async fn test_succeeds_after_transient_failures() {
		let calls = AtomicUsize::new(0);
		let result = retry(&fast_policy(5), || {
			let n = calls.fetch_add(1, Ordering::SeqCst);
			async move {
				if n < 2 {
					Err(format!("refused {}", n))
				} else {
					Ok(n)
				}
			}
		})
		.await;

		assert_eq!(result.unwrap(), 2);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn test_exhausted_reports_last_error_and_attempts() {
		let calls = AtomicUsize::new(0);
		let result: Result<(), _> = retry(&fast_policy(3), || {
			let n = calls.fetch_add(1, Ordering::SeqCst);
			async move { Err(format!("refused {}", n)) }
		})
		.await;

		match result {
			Err(RetryError::Exhausted { attempts, source }) => {
				assert_eq!(attempts, 3);
				assert_eq!(source, "refused 2");
			},
			other => panic!("unexpected result: {:?}", other),
		}
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_deadline_cuts_attempts_short() {
		let policy = RetryPolicy {
			deadline: Duration::from_millis(50),
			..fast_policy(10)
		};
		let result: Result<(), RetryError<String>> = retry(&policy, || async {
			tokio::time::sleep(Duration::from_secs(1)).await;
			Err("slow".to_string())
		})
		.await;

		let err = result.unwrap_err();
		assert!(matches!(err, RetryError::DeadlineExceeded { .. }));
		assert_eq!(err.attempts(), 1);
		assert!(err.to_string().contains("deadline"));
	}
}
