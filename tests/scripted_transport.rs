// std
use std::{collections::VecDeque, sync::Arc, time::Instant};
// crates.io
use parking_lot::Mutex;
use time::Duration;
// self
use portal_token_broker::{
	auth::TenantId,
	config::PortalConfig,
	error::{Error, TransportError},
	flows::PortalAuth,
	http::{PortalHttpClient, PortalRequest, PortalResponse, TransportFuture},
	portal::{LoginCandidate, RetryPolicy},
	url::Url,
};

type Reply = Result<PortalResponse, TransportError>;

/// Answers requests from a queue (falling back to `fallback`) and records every call.
struct ScriptedTransport {
	replies: Mutex<VecDeque<Reply>>,
	fallback: fn() -> Reply,
	latency: std::time::Duration,
	calls: Mutex<Vec<(Instant, PortalRequest)>>,
}
impl ScriptedTransport {
	fn new(replies: impl IntoIterator<Item = Reply>, fallback: fn() -> Reply) -> Self {
		Self {
			replies: Mutex::new(replies.into_iter().collect()),
			fallback,
			latency: std::time::Duration::ZERO,
			calls: Mutex::new(Vec::new()),
		}
	}

	fn with_latency(mut self, latency: std::time::Duration) -> Self {
		self.latency = latency;

		self
	}

	fn calls(&self) -> Vec<(Instant, PortalRequest)> {
		self.calls.lock().clone()
	}
}
impl PortalHttpClient for ScriptedTransport {
	fn post_json(&self, request: PortalRequest) -> TransportFuture<'_> {
		self.calls.lock().push((Instant::now(), request));

		let reply = self.replies.lock().pop_front().unwrap_or_else(self.fallback);
		let latency = self.latency;

		Box::pin(async move {
			if !latency.is_zero() {
				tokio::time::sleep(latency).await;
			}

			reply
		})
	}
}

fn ok(body: &str) -> Reply {
	Ok(PortalResponse { status: 200, body: body.as_bytes().to_vec() })
}

fn unavailable() -> Reply {
	Ok(PortalResponse { status: 503, body: b"maintenance".to_vec() })
}

fn config(retry: RetryPolicy) -> PortalConfig {
	PortalConfig::builder(
		Url::parse("https://portal.example.com/").expect("URL fixture should parse."),
		"agent",
		"hunter2",
	)
	.retry(retry)
	.build()
	.expect("Portal config should build for scripted transport tests.")
}

fn tenant() -> TenantId {
	TenantId::new("acme").expect("Tenant identifier should be valid for scripted transport tests.")
}

#[tokio::test]
async fn backoff_doubles_between_attempts() {
	let transport = Arc::new(ScriptedTransport::new([], unavailable));
	let auth = PortalAuth::<ScriptedTransport>::with_http_client(
		config(RetryPolicy::new(3, Duration::milliseconds(40))),
		transport.clone(),
	)
	.with_candidates([LoginCandidate::new("only", "auth/login")]);
	let err = auth.acquire_token(&tenant()).await.expect_err("Every attempt should fail.");

	assert!(matches!(err, Error::Exhausted { attempts: 3, .. }));

	let calls = transport.calls();

	assert_eq!(calls.len(), 3);

	let first_gap = calls[1].0 - calls[0].0;
	let second_gap = calls[2].0 - calls[1].0;

	assert!(first_gap >= std::time::Duration::from_millis(40), "First gap was {first_gap:?}.");
	assert!(second_gap >= std::time::Duration::from_millis(80), "Second gap was {second_gap:?}.");
}

#[tokio::test]
async fn transport_failures_are_retried_then_next_candidate_wins() {
	let transport = Arc::new(ScriptedTransport::new(
		[
			Err(TransportError::Timeout),
			Err(TransportError::Timeout),
			ok(r#"{"accessToken":"v1-token"}"#),
		],
		unavailable,
	));
	let auth = PortalAuth::<ScriptedTransport>::with_http_client(
		config(RetryPolicy::new(2, Duration::ZERO)),
		transport.clone(),
	);
	let token = auth.acquire_token(&tenant()).await.expect("Second candidate should succeed.");

	assert_eq!(token.expose(), "v1-token");

	let paths = transport
		.calls()
		.into_iter()
		.map(|(_, request)| request.url.path().to_owned())
		.collect::<Vec<_>>();

	assert_eq!(
		paths,
		["/api/v2/domains/acme/auth/login", "/api/v2/domains/acme/auth/login", "/api/v1/auth/login"]
	);
}

#[tokio::test]
async fn concurrent_callers_share_one_login() {
	let transport = Arc::new(
		ScriptedTransport::new([], || ok(r#"{"accessToken":"shared","expiresIn":600}"#))
			.with_latency(std::time::Duration::from_millis(50)),
	);
	let auth =
		PortalAuth::<ScriptedTransport>::with_http_client(config(RetryPolicy::default()), transport.clone());
	let tenant = tenant();
	let other = auth.clone();
	let (first, second, third) = tokio::join!(
		auth.acquire_token(&tenant),
		other.acquire_token(&tenant),
		auth.acquire_token(&tenant),
	);

	assert_eq!(first.expect("First caller should succeed.").expose(), "shared");
	assert_eq!(second.expect("Second caller should succeed.").expose(), "shared");
	assert_eq!(third.expect("Third caller should succeed.").expose(), "shared");
	assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn tenants_do_not_share_tokens() {
	let transport = Arc::new(ScriptedTransport::new(
		[ok(r#"{"accessToken":"for-acme"}"#), ok(r#"{"accessToken":"for-globex"}"#)],
		unavailable,
	));
	let auth =
		PortalAuth::<ScriptedTransport>::with_http_client(config(RetryPolicy::default()), transport.clone());
	let globex = TenantId::new("globex").expect("Tenant identifier should be valid.");
	let acme = auth.acquire_token(&tenant()).await.expect("First tenant should log in.");
	let globex = auth.acquire_token(&globex).await.expect("Second tenant should log in.");

	assert_eq!(acme.expose(), "for-acme");
	assert_eq!(globex.expose(), "for-globex");
	assert_eq!(auth.cache.len(), 2);

	let accounts = transport
		.calls()
		.into_iter()
		.map(|(_, request)| request.header("x-account").map(str::to_owned))
		.collect::<Vec<_>>();

	assert_eq!(accounts, [Some("acme".to_owned()), Some("globex".to_owned())]);
}
