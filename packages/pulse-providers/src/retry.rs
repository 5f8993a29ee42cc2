use std::{future::Future, time::Duration};

use crate::Error;

/// Exponential backoff schedule for a bounded number of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
	pub base: Duration,
}
impl Backoff {
	pub fn from_config(cfg: &pulse_config::Auth) -> Self {
		Self { max_attempts: cfg.max_attempts.max(1), base: Duration::from_millis(cfg.backoff_base_ms) }
	}

	/// Delay slept after failed attempt `attempt` (1-based): `base * 2^attempt`.
	pub fn delay_after(&self, attempt: u32) -> Duration {
		self.base.saturating_mul(2_u32.saturating_pow(attempt))
	}
}
impl Default for Backoff {
	fn default() -> Self {
		Self::from_config(&pulse_config::Auth::default())
	}
}

#[derive(Debug)]
pub struct Exhausted {
	pub attempts: u32,
	/// Error from the final attempt.
	pub last: Error,
}

/// Runs `op` until it succeeds or the schedule is spent. `op` receives the 1-based attempt
/// number. No delay follows the final attempt.
pub async fn retry<T, F, Fut>(backoff: &Backoff, mut op: F) -> Result<T, Exhausted>
where
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = crate::Result<T>>,
{
	let max_attempts = backoff.max_attempts.max(1);
	let mut attempt = 1;

	loop {
		match op(attempt).await {
			Ok(value) => return Ok(value),
			Err(err) if attempt >= max_attempts => {
				return Err(Exhausted { attempts: attempt, last: err });
			},
			Err(err) => {
				let delay = backoff.delay_after(attempt);

				tracing::warn!(
					error = %err,
					attempt,
					max_attempts,
					delay_ms = delay.as_millis() as u64,
					"Attempt failed. Retrying after backoff."
				);

				tokio::time::sleep(delay).await;

				attempt += 1;
			},
		}
	}
}
