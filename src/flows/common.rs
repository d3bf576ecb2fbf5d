//! Shared helpers for flow implementations (single-flight guards, backoff sleeps).

// self
use crate::{_prelude::*, auth::TenantId, flows::PortalAuth, http::PortalHttpClient};

/// Returns (and creates on demand) the single-flight guard for a tenant.
pub(crate) fn flow_guard<C>(auth: &PortalAuth<C>, tenant: &TenantId) -> Arc<AsyncMutex<()>>
where
	C: ?Sized + PortalHttpClient,
{
	let mut guards = auth.flow_guards.lock();

	guards.entry(tenant.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}

/// Suspends the current task for `delay` on the Tokio timer; non-positive delays return
/// immediately.
pub(crate) async fn backoff(delay: Duration) {
	let delay = std::time::Duration::try_from(delay).unwrap_or_default();

	if !delay.is_zero() {
		tokio::time::sleep(delay).await;
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::time::Instant;
	// self
	use super::*;

	#[tokio::test]
	async fn backoff_waits_at_least_the_delay() {
		let started = Instant::now();

		backoff(Duration::milliseconds(20)).await;

		assert!(started.elapsed() >= std::time::Duration::from_millis(20));
	}

	#[tokio::test]
	async fn negative_backoff_is_a_noop() {
		let started = Instant::now();

		backoff(Duration::seconds(-5)).await;

		assert!(started.elapsed() < std::time::Duration::from_secs(1));
	}
}
