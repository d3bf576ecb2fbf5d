// self
use crate::{_prelude::*, obs::FlowKind, portal::AttemptFailure};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by broker flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind, stage, and tenant.
	pub fn new(kind: FlowKind, stage: &'static str, tenant: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("portal_token.flow", flow = kind.as_str(), stage, tenant);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage, tenant);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Per-attempt diagnostics, silent unless the config's debug flag is set.
#[derive(Clone, Copy, Debug)]
pub struct Diagnostics {
	enabled: bool,
}
impl Diagnostics {
	/// Creates a handle; `enabled` mirrors `PortalConfig::debug`.
	pub const fn new(enabled: bool) -> Self {
		Self { enabled }
	}

	/// Returns whether diagnostics are emitted.
	pub const fn enabled(self) -> bool {
		self.enabled
	}

	/// A cached token satisfied the request.
	pub fn cache_hit(self, expires_at: OffsetDateTime) {
		if !self.enabled {
			return;
		}

		#[cfg(feature = "tracing")]
		tracing::debug!(%expires_at, "serving cached portal token");
		#[cfg(not(feature = "tracing"))]
		let _ = expires_at;
	}

	/// A login attempt failed.
	pub fn attempt_failed(self, candidate: &str, attempt: u32, failure: &AttemptFailure) {
		if !self.enabled {
			return;
		}

		#[cfg(feature = "tracing")]
		tracing::debug!(
			candidate,
			attempt,
			reason = failure.as_str(),
			%failure,
			"portal login attempt failed"
		);
		#[cfg(not(feature = "tracing"))]
		let _ = (candidate, attempt, failure);
	}

	/// The acquirer is about to sleep before retrying `candidate`.
	pub fn backoff(self, candidate: &str, delay: Duration) {
		if !self.enabled {
			return;
		}

		#[cfg(feature = "tracing")]
		tracing::debug!(
			candidate,
			delay_ms = delay.whole_milliseconds() as u64,
			"backing off before retry"
		);
		#[cfg(not(feature = "tracing"))]
		let _ = (candidate, delay);
	}

	/// A candidate exhausted its attempts; the next one (if any) is tried.
	pub fn candidate_exhausted(self, candidate: &str, attempts: u32) {
		if !self.enabled {
			return;
		}

		#[cfg(feature = "tracing")]
		tracing::debug!(candidate, attempts, "candidate login endpoint exhausted");
		#[cfg(not(feature = "tracing"))]
		let _ = (candidate, attempts);
	}

	/// A login succeeded.
	pub fn granted(self, candidate: &str, expires_at: OffsetDateTime) {
		if !self.enabled {
			return;
		}

		#[cfg(feature = "tracing")]
		tracing::debug!(candidate, %expires_at, "portal login succeeded");
		#[cfg(not(feature = "tracing"))]
		let _ = (candidate, expires_at);
	}
}

/// Warns that TLS certificate validation is disabled for `base_url`.
pub fn warn_insecure_tls(base_url: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(base_url, "TLS certificate validation is disabled for the portal client");
	#[cfg(not(feature = "tracing"))]
	let _ = base_url;
}

/// Warns that every candidate login endpoint failed for `tenant`.
pub fn warn_exhausted(tenant: &str, attempts: u32, last_failure: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(tenant, attempts, last_failure, "portal authentication exhausted");
	#[cfg(not(feature = "tracing"))]
	let _ = (tenant, attempts, last_failure);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn disabled_diagnostics_are_silent() {
		let diag = Diagnostics::new(false);

		assert!(!diag.enabled());

		diag.backoff("v2-domain", Duration::milliseconds(500));
		diag.attempt_failed("v2-domain", 1, &AttemptFailure::MissingAccessToken);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Acquire, "instrument_wraps_future", "acme");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
