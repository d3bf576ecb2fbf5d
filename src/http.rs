//! Transport primitives for portal logins and notifications.
//!
//! [`PortalHttpClient`] is the broker's only dependency on an HTTP stack. The default
//! [`ReqwestHttpClient`] applies the configured per-request timeout and, only when
//! explicitly enabled, relaxed TLS certificate validation. Tests and downstream crates can
//! supply their own implementation to observe or script portal traffic.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::{config::PortalConfig, error::ConfigError, obs};

/// Boxed future returned by [`PortalHttpClient::post_json`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<PortalResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of posting JSON to the portal.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// every clone of the broker, and the returned future must be `Send` so acquisitions can
/// hop executors.
///
/// Brokers must be driven from within a Tokio runtime with the time driver enabled, since
/// backoff between login attempts sleeps on [`tokio::time::sleep`]. This holds for custom
/// transports as well.
pub trait PortalHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` as a JSON `POST` and resolves with the raw status and body.
	///
	/// Non-2xx statuses are responses, not errors; only failures that prevent a response
	/// (connect, TLS, timeout) map to [`TransportError`].
	fn post_json(&self, request: PortalRequest) -> TransportFuture<'_>;
}

/// Outbound JSON request addressed to the portal.
#[derive(Clone)]
pub struct PortalRequest {
	/// Absolute endpoint URL.
	pub url: Url,
	/// Extra request headers (name, value).
	pub headers: Vec<(String, String)>,
	/// JSON body.
	pub body: serde_json::Value,
}
impl PortalRequest {
	/// Creates a request with an `Accept: application/json` header.
	pub fn new(url: Url, body: serde_json::Value) -> Self {
		Self { url, headers: vec![("accept".into(), "application/json".into())], body }
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
impl Debug for PortalRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let headers = self
			.headers
			.iter()
			.map(|(name, value)| {
				if name.eq_ignore_ascii_case("authorization") {
					(name.as_str(), "<redacted>")
				} else {
					(name.as_str(), value.as_str())
				}
			})
			.collect::<Vec<_>>();

		f.debug_struct("PortalRequest")
			.field("url", &self.url.as_str())
			.field("headers", &headers)
			.field("body", &"<omitted>")
			.finish()
	}
}

/// Raw portal response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortalResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl PortalResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the config's request timeout and TLS leniency flag.
	pub fn from_config(config: &PortalConfig) -> Result<Self, ConfigError> {
		let timeout = std::time::Duration::try_from(config.request_timeout).map_err(|_| {
			ConfigError::InvalidSetting {
				name: "request_timeout",
				reason: "timeout must not be negative".into(),
			}
		})?;
		let mut builder = ReqwestClient::builder().timeout(timeout);

		if config.accept_invalid_certs {
			obs::warn_insecure_tls(config.base_url.as_str());

			builder = builder.danger_accept_invalid_certs(true);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl PortalHttpClient for ReqwestHttpClient {
	fn post_json(&self, request: PortalRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let mut builder = self.0.post(request.url).json(&request.body);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(PortalResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_debug_redacts_authorization() {
		let request = PortalRequest::new(
			Url::parse("https://portal.example.com/api").expect("URL fixture should parse."),
			serde_json::json!({ "password": "hunter2" }),
		)
		.with_header("Authorization", "Bearer abc")
		.with_header("X-Account", "acme");
		let rendered = format!("{request:?}");

		assert!(!rendered.contains("Bearer abc"));
		assert!(!rendered.contains("hunter2"));
		assert!(rendered.contains("acme"));
		assert_eq!(request.header("x-account"), Some("acme"));
		assert_eq!(request.header("ACCEPT"), Some("application/json"));
	}

	#[test]
	fn response_success_covers_2xx_only() {
		assert!(PortalResponse { status: 204, body: Vec::new() }.is_success());
		assert!(!PortalResponse { status: 302, body: Vec::new() }.is_success());
		assert!(!PortalResponse { status: 199, body: Vec::new() }.is_success());
	}

	#[cfg(feature = "reqwest")]
	#[tokio::test]
	async fn reqwest_client_posts_json_with_headers() {
		// crates.io
		use httpmock::prelude::*;
		// self
		use crate::{_preludet, portal::RetryPolicy};

		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(POST)
					.path("/echo")
					.header("x-account", "acme")
					.header("accept", "application/json")
					.json_body(serde_json::json!({ "ping": true }));
				then.status(418).body("teapot");
			})
			.await;
		let auth = _preludet::build_reqwest_test_auth(&server.base_url(), RetryPolicy::default());
		let request = PortalRequest::new(
			Url::parse(&server.url("/echo")).expect("Mock URL should parse."),
			serde_json::json!({ "ping": true }),
		)
		.with_header("X-Account", "acme");
		let response =
			auth.http_client.post_json(request).await.expect("Transport should reach the mock.");

		mock.assert_calls_async(1).await;

		assert_eq!(response.status, 418);
		assert_eq!(response.body, b"teapot");
		assert!(!response.is_success());
	}

	#[cfg(feature = "reqwest")]
	#[tokio::test]
	async fn reqwest_client_maps_refused_connections_to_transport_errors() {
		// self
		use crate::{config::PortalConfig, portal::RetryPolicy};

		let config = PortalConfig::builder(
			Url::parse("http://127.0.0.1:9").expect("URL fixture should parse."),
			"agent",
			"hunter2",
		)
		.retry(RetryPolicy::default())
		.request_timeout(Duration::seconds(2))
		.build()
		.expect("Config fixture should build.");
		let client = ReqwestHttpClient::from_config(&config).expect("Client should build.");
		let err = client
			.post_json(PortalRequest::new(config.base_url.clone(), serde_json::json!({})))
			.await
			.expect_err("Nothing listens on the discard port.");

		assert!(matches!(err, TransportError::Network { .. } | TransportError::Timeout));
	}
}
