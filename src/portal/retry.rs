//! Attempt budget and doubling backoff applied to each candidate endpoint.

// self
use crate::_prelude::*;

/// Per-candidate retry settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Login attempts made against one candidate before falling through (at least one).
	pub attempts: u32,
	/// Delay after the first failed attempt; each later delay doubles.
	pub base_delay: Duration,
}
impl RetryPolicy {
	/// Default attempts per candidate.
	pub const DEFAULT_ATTEMPTS: u32 = 3;
	/// Default delay after the first failed attempt.
	pub const DEFAULT_BASE_DELAY: Duration = Duration::milliseconds(500);

	/// Creates a policy, clamping `attempts` to at least one and negative delays to zero.
	pub fn new(attempts: u32, base_delay: Duration) -> Self {
		Self {
			attempts: attempts.max(1),
			base_delay: if base_delay.is_negative() { Duration::ZERO } else { base_delay },
		}
	}

	/// Returns the sleep after the `failed`-th failed attempt (1-based), or `None` when
	/// the candidate's budget is spent.
	pub fn delay_after(&self, failed: u32) -> Option<Duration> {
		if failed == 0 || failed >= self.attempts {
			return None;
		}

		let factor = 1_u32
			.checked_shl(failed - 1)
			.and_then(|value| i32::try_from(value).ok())
			.unwrap_or(i32::MAX);

		Some(self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX))
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_BASE_DELAY)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn delays_double_between_attempts() {
		let policy = RetryPolicy::default();
		let first = policy.delay_after(1).expect("A delay should follow the first failure.");
		let second = policy.delay_after(2).expect("A delay should follow the second failure.");

		assert_eq!(first, Duration::milliseconds(500));
		assert_eq!(second, first * 2);
		assert_eq!(policy.delay_after(3), None, "No delay after the final attempt.");
		assert_eq!(policy.delay_after(0), None);
	}

	#[test]
	fn constructor_clamps_inputs() {
		let policy = RetryPolicy::new(0, Duration::seconds(-1));

		assert_eq!(policy.attempts, 1);
		assert_eq!(policy.base_delay, Duration::ZERO);
		assert_eq!(policy.delay_after(1), None);
	}

	#[test]
	fn large_attempt_counts_saturate() {
		let policy = RetryPolicy::new(u32::MAX, Duration::seconds(1));

		assert_eq!(policy.delay_after(40), Some(Duration::seconds(i64::from(i32::MAX))));
	}
}
