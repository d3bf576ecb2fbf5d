// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"portal_token_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records one login attempt against `candidate`; `result` is `granted` or a failure label.
pub fn record_login_attempt(candidate: &str, result: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"portal_token_login_attempt_total",
			"candidate" => candidate.to_owned(),
			"result" => result
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (candidate, result);
	}
}
