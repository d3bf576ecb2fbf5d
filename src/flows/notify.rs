//! Authenticated disposition notices sent to the campaign portal.

// self
use crate::{
	_prelude::*,
	auth::TenantId,
	config::ACCOUNT_HEADER_NAME,
	error::ConfigError,
	flows::PortalAuth,
	http::{PortalHttpClient, PortalRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	portal,
};

/// Default path template for disposition notices.
pub const DEFAULT_NOTIFY_PATH: &str = "api/v2/domains/{tenant}/dispositions";

const BODY_PREVIEW_LIMIT: usize = 256;

/// Final outcome of a call, as reported to the campaign portal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispositionNotice {
	/// Call-center call identifier.
	pub call_id: String,
	/// Campaign the call belongs to.
	pub campaign_id: String,
	/// Top-level call type chosen by the agent.
	pub call_type: String,
	/// Disposition chosen under the call type.
	pub disposition: String,
	/// Free-form agent notes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// Agent who submitted the disposition.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub agent: Option<String>,
}
impl DispositionNotice {
	/// Creates a notice without notes or agent.
	pub fn new(
		call_id: impl Into<String>,
		campaign_id: impl Into<String>,
		call_type: impl Into<String>,
		disposition: impl Into<String>,
	) -> Self {
		Self {
			call_id: call_id.into(),
			campaign_id: campaign_id.into(),
			call_type: call_type.into(),
			disposition: disposition.into(),
			notes: None,
			agent: None,
		}
	}

	/// Attaches agent notes.
	pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
		self.notes = Some(notes.into());

		self
	}

	/// Attaches the submitting agent.
	pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
		self.agent = Some(agent.into());

		self
	}
}

impl<C> PortalAuth<C>
where
	C: ?Sized + PortalHttpClient,
{
	/// Sends `notice` for `tenant` with a bearer token from [`PortalAuth::acquire_token`].
	///
	/// Exhausted logins propagate unchanged; a non-2xx answer becomes
	/// [`Error::Notification`]. Notices are not retried.
	pub async fn notify_disposition(
		&self,
		tenant: &TenantId,
		notice: &DispositionNotice,
	) -> Result<()> {
		const KIND: FlowKind = FlowKind::Notify;

		let span = FlowSpan::new(KIND, "notify_disposition", tenant);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.acquire_token(tenant).await?;
				let url = portal::resolve_path(
					&self.config.base_url,
					self.notify_path.split('/'),
					tenant,
				)?;
				let body =
					serde_json::to_value(notice).map_err(|source| ConfigError::Payload { source })?;
				let request = PortalRequest::new(url, body)
					.with_header("authorization", token.bearer())
					.with_header(ACCOUNT_HEADER_NAME, self.config.account_for(tenant));
				let response = self.http_client.post_json(request).await?;

				if response.is_success() {
					return Ok(());
				}

				let body_preview = String::from_utf8_lossy(&response.body)
					.chars()
					.take(BODY_PREVIEW_LIMIT)
					.collect();

				Err(Error::Notification { status: response.status, body_preview })
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn notice_serializes_in_camel_case_without_empty_fields() {
		let notice = DispositionNotice::new("call-1", "spring-promo", "sales", "callback");
		let value = serde_json::to_value(&notice).expect("Notice should serialize.");

		assert_eq!(
			value,
			serde_json::json!({
				"callId": "call-1",
				"campaignId": "spring-promo",
				"callType": "sales",
				"disposition": "callback",
			})
		);

		let value = serde_json::to_value(notice.with_notes("call after 5pm").with_agent("jo"))
			.expect("Notice should serialize.");

		assert_eq!(value["notes"], "call after 5pm");
		assert_eq!(value["agent"], "jo");
	}
}
