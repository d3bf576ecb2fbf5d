//! Token acquisition with an expiry-aware cache, candidate fallback, and backoff.
//!
//! [`PortalAuth::acquire_token`] serves a cached token while more than the configured
//! safety margin remains. Otherwise it walks the login candidates in order, giving each
//! one [`RetryPolicy::attempts`](crate::portal::RetryPolicy) tries separated by doubling
//! backoff, and caches the first token it gets. A per-tenant single-flight guard makes
//! concurrent callers for the same tenant wait for one login instead of racing the portal.
//! Per-attempt failures are values ([`LoginOutcome::Rejected`]); only total exhaustion is
//! reported as [`Error::Exhausted`].

// self
use crate::{
	_prelude::*,
	auth::{TenantId, TokenSecret},
	config::ACCOUNT_HEADER_NAME,
	error::ConfigError,
	flows::{PortalAuth, common},
	http::{PortalHttpClient, PortalRequest},
	obs::{self, Diagnostics, FlowKind, FlowOutcome, FlowSpan},
	portal::{AttemptFailure, LoginCandidate, LoginOutcome},
};

impl<C> PortalAuth<C>
where
	C: ?Sized + PortalHttpClient,
{
	/// Returns a bearer token for `tenant`, logging in only when the cache cannot serve one.
	///
	/// Must run inside a Tokio runtime with timers enabled; retries sleep between attempts.
	pub async fn acquire_token(&self, tenant: &TenantId) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Acquire;

		let span = FlowSpan::new(KIND, "acquire_token", tenant);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let diag = Diagnostics::new(self.config.debug);

				if let Some(token) = self.cached_token(tenant, diag) {
					return Ok((token, FlowOutcome::CacheHit));
				}

				let guard = common::flow_guard(self, tenant);
				let _singleflight = guard.lock().await;

				// Another caller may have logged in while this one waited on the guard.
				if let Some(token) = self.cached_token(tenant, diag) {
					return Ok((token, FlowOutcome::CacheHit));
				}

				self.login(tenant, diag).await.map(|token| (token, FlowOutcome::Success))
			})
			.await;

		match result {
			Ok((token, outcome)) => {
				obs::record_flow_outcome(KIND, outcome);

				Ok(token)
			},
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				Err(e)
			},
		}
	}

	fn cached_token(&self, tenant: &TenantId, diag: Diagnostics) -> Option<TokenSecret> {
		let record =
			self.cache.fresh_at(tenant, OffsetDateTime::now_utc(), self.config.safety_margin)?;

		diag.cache_hit(record.expires_at);

		Some(record.access_token)
	}

	async fn login(&self, tenant: &TenantId, diag: Diagnostics) -> Result<TokenSecret> {
		if self.candidates.is_empty() {
			return Err(ConfigError::NoCandidates.into());
		}

		let mut attempts = 0_u32;
		let mut last_failure = None;

		for candidate in &self.candidates {
			match self.login_with(candidate, tenant, diag, &mut attempts).await? {
				LoginOutcome::Granted(grant) => {
					let record = grant.into_record(
						tenant.clone(),
						OffsetDateTime::now_utc(),
						self.config.default_ttl,
					);
					let token = record.access_token.clone();

					diag.granted(&candidate.label, record.expires_at);
					self.cache.insert(record);

					return Ok(token);
				},
				LoginOutcome::Rejected(failure) => {
					diag.candidate_exhausted(&candidate.label, self.config.retry.attempts);

					last_failure = Some(failure);
				},
			}
		}

		let last_failure = last_failure
			.as_ref()
			.map(AttemptFailure::to_string)
			.unwrap_or_else(|| "no login attempt was made".into());

		obs::warn_exhausted(tenant, attempts, &last_failure);

		Err(Error::Exhausted { tenant: tenant.to_string(), attempts, last_failure })
	}

	/// Runs every attempt allowed for `candidate`, returning the grant or the final failure.
	async fn login_with(
		&self,
		candidate: &LoginCandidate,
		tenant: &TenantId,
		diag: Diagnostics,
		attempts: &mut u32,
	) -> Result<LoginOutcome> {
		let retry = self.config.retry;
		let url = candidate.url(&self.config.base_url, tenant)?;
		let body = candidate.body(tenant, &self.config.username, self.config.password.expose());
		let account = self.config.account_for(tenant);
		let mut attempt = 0;

		loop {
			attempt += 1;
			*attempts += 1;

			let request = PortalRequest::new(url.clone(), body.clone())
				.with_header(ACCOUNT_HEADER_NAME, account);
			let outcome = match self.http_client.post_json(request).await {
				Ok(response) => LoginOutcome::from_response(response.status, &response.body),
				Err(e) => LoginOutcome::from(e),
			};
			let failure = match outcome {
				LoginOutcome::Granted(grant) => {
					obs::record_login_attempt(&candidate.label, "granted");

					return Ok(LoginOutcome::Granted(grant));
				},
				LoginOutcome::Rejected(failure) => failure,
			};

			obs::record_login_attempt(&candidate.label, failure.as_str());
			diag.attempt_failed(&candidate.label, attempt, &failure);

			match retry.delay_after(attempt) {
				Some(delay) => {
					diag.backoff(&candidate.label, delay);
					common::backoff(delay).await;
				},
				None => return Ok(LoginOutcome::Rejected(failure)),
			}
		}
	}
}
