//! Demonstrates acquiring a tenant token against a mock portal whose newest login endpoint is
//! down, falling back to the next candidate and then reusing the cached token.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::Duration;
// self
use portal_token_broker::{
	auth::TenantId,
	config::PortalConfig,
	flows::{DispositionNotice, PortalAuth},
	portal::RetryPolicy,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let v2_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/domains/acme/auth/login");
			then.status(503).body("maintenance");
		})
		.await;
	let v1_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"expires_in\":900}");
		})
		.await;
	let notice_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v2/domains/acme/dispositions")
				.header("authorization", "Bearer demo-access");
			then.status(204);
		})
		.await;
	let config = PortalConfig::builder(Url::parse(&server.base_url())?, "agent", "hunter2")
		.retry(RetryPolicy::new(3, Duration::milliseconds(100)))
		.debug(true)
		.build()?;
	let auth = PortalAuth::new(config)?;
	let tenant = TenantId::new("acme")?;
	let token = auth.acquire_token(&tenant).await?;

	println!("Portal token: {}.", token.expose());

	auth.notify_disposition(
		&tenant,
		&DispositionNotice::new("call-42", "spring-promo", "sales", "callback"),
	)
	.await?;

	v2_mock.assert_calls_async(3).await;
	v1_mock.assert_async().await;
	notice_mock.assert_async().await;

	Ok(())
}
