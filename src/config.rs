//! Portal connection settings, builder, and environment loader.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError, portal::RetryPolicy};

/// Environment variable names read by [`PortalConfig::from_env`].
pub mod env {
	/// Portal base URL.
	pub const BASE_URL: &str = "PORTAL_BASE_URL";
	/// Login username.
	pub const USERNAME: &str = "PORTAL_USERNAME";
	/// Login password.
	pub const PASSWORD: &str = "PORTAL_PASSWORD";
	/// Optional account header override.
	pub const ACCOUNT_HEADER: &str = "PORTAL_ACCOUNT_HEADER";
	/// Verbose diagnostic logging toggle.
	pub const DEBUG: &str = "PORTAL_DEBUG";
	/// Relaxed TLS certificate validation toggle.
	pub const INSECURE_TLS: &str = "PORTAL_INSECURE_TLS";
	/// Per-request timeout in seconds.
	pub const REQUEST_TIMEOUT_SECS: &str = "PORTAL_REQUEST_TIMEOUT_SECS";
}

/// Header carrying the account (tenant or override) on every portal request.
pub const ACCOUNT_HEADER_NAME: &str = "X-Account";

/// Settings shared by token acquisition and notifications.
#[derive(Clone)]
pub struct PortalConfig {
	/// Portal base URL; candidate paths are appended to it.
	pub base_url: Url,
	/// Login username.
	pub username: String,
	/// Login password.
	pub password: TokenSecret,
	/// Value sent in [`ACCOUNT_HEADER_NAME`] instead of the tenant id, when set.
	pub account_header: Option<String>,
	/// Emits per-attempt diagnostics when true.
	pub debug: bool,
	/// Disables TLS certificate validation. Never enable outside local development.
	pub accept_invalid_certs: bool,
	/// Timeout applied to each individual HTTP request.
	pub request_timeout: Duration,
	/// Attempts and backoff per candidate endpoint.
	pub retry: RetryPolicy,
	/// Cached tokens with this much or less remaining validity are refreshed.
	pub safety_margin: Duration,
	/// Validity assumed when the portal omits `expiresIn`.
	pub default_ttl: Duration,
}
impl PortalConfig {
	/// Default per-request timeout.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);
	/// Default refresh safety margin.
	pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::minutes(2);
	/// Default token validity when the portal does not report one.
	pub const DEFAULT_TTL: Duration = Duration::hours(1);

	/// Creates a builder seeded with the required settings.
	pub fn builder(
		base_url: Url,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> PortalConfigBuilder {
		PortalConfigBuilder::new(base_url, username.into(), password.into())
	}

	/// Loads settings from the process environment after reading a `.env` file, if any.
	pub fn from_env() -> Result<Self, ConfigError> {
		dotenv::dotenv().ok();

		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads settings through `lookup`, which maps variable names (see [`env`]) to values.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |name: &'static str| {
			lookup(name)
				.filter(|value| !value.trim().is_empty())
				.ok_or(ConfigError::MissingSetting { name })
		};
		let base_url = Url::parse(required(env::BASE_URL)?.trim())
			.map_err(|source| ConfigError::InvalidBaseUrl { source })?;
		let mut builder =
			Self::builder(base_url, required(env::USERNAME)?, required(env::PASSWORD)?);

		if let Some(account) = lookup(env::ACCOUNT_HEADER).filter(|value| !value.trim().is_empty())
		{
			builder = builder.account_header(account.trim());
		}
		if let Some(raw) = lookup(env::DEBUG) {
			builder = builder.debug(parse_flag(env::DEBUG, &raw)?);
		}
		if let Some(raw) = lookup(env::INSECURE_TLS) {
			builder = builder.accept_invalid_certs(parse_flag(env::INSECURE_TLS, &raw)?);
		}
		if let Some(raw) = lookup(env::REQUEST_TIMEOUT_SECS) {
			let secs = raw.trim().parse::<u32>().map_err(|e| ConfigError::InvalidSetting {
				name: env::REQUEST_TIMEOUT_SECS,
				reason: e.to_string(),
			})?;

			builder = builder.request_timeout(Duration::seconds(i64::from(secs)));
		}

		builder.build()
	}

	/// Value for [`ACCOUNT_HEADER_NAME`] when talking to the portal about `tenant`.
	pub fn account_for<'a>(&'a self, tenant: &'a str) -> &'a str {
		self.account_header.as_deref().unwrap_or(tenant)
	}
}
impl Debug for PortalConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PortalConfig")
			.field("base_url", &self.base_url.as_str())
			.field("username", &self.username)
			.field("password", &self.password)
			.field("account_header", &self.account_header)
			.field("debug", &self.debug)
			.field("accept_invalid_certs", &self.accept_invalid_certs)
			.field("request_timeout", &self.request_timeout)
			.field("retry", &self.retry)
			.field("safety_margin", &self.safety_margin)
			.field("default_ttl", &self.default_ttl)
			.finish()
	}
}

/// Builder for [`PortalConfig`] values.
#[derive(Debug)]
pub struct PortalConfigBuilder {
	config: PortalConfig,
}
impl PortalConfigBuilder {
	fn new(base_url: Url, username: String, password: String) -> Self {
		Self {
			config: PortalConfig {
				base_url,
				username,
				password: TokenSecret::new(password),
				account_header: None,
				debug: false,
				accept_invalid_certs: false,
				request_timeout: PortalConfig::DEFAULT_REQUEST_TIMEOUT,
				retry: RetryPolicy::default(),
				safety_margin: PortalConfig::DEFAULT_SAFETY_MARGIN,
				default_ttl: PortalConfig::DEFAULT_TTL,
			},
		}
	}

	/// Overrides the account header value.
	pub fn account_header(mut self, value: impl Into<String>) -> Self {
		self.config.account_header = Some(value.into());

		self
	}

	/// Enables or disables verbose diagnostics.
	pub fn debug(mut self, enabled: bool) -> Self {
		self.config.debug = enabled;

		self
	}

	/// Enables or disables relaxed TLS certificate validation.
	pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
		self.config.accept_invalid_certs = enabled;

		self
	}

	/// Sets the per-request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;

		self
	}

	/// Sets the per-candidate retry policy.
	pub fn retry(mut self, retry: RetryPolicy) -> Self {
		self.config.retry = retry;

		self
	}

	/// Sets the refresh safety margin.
	pub fn safety_margin(mut self, margin: Duration) -> Self {
		self.config.safety_margin = margin;

		self
	}

	/// Sets the validity assumed when the portal omits `expiresIn`.
	pub fn default_ttl(mut self, ttl: Duration) -> Self {
		self.config.default_ttl = ttl;

		self
	}

	/// Validates and returns the config.
	pub fn build(self) -> Result<PortalConfig, ConfigError> {
		let config = self.config;

		if config.base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeABase { url: config.base_url.to_string() });
		}
		if config.username.trim().is_empty() {
			return Err(ConfigError::MissingSetting { name: "username" });
		}
		if config.password.expose().is_empty() {
			return Err(ConfigError::MissingSetting { name: "password" });
		}
		if !config.request_timeout.is_positive() {
			return Err(ConfigError::InvalidSetting {
				name: "request_timeout",
				reason: "timeout must be positive".into(),
			});
		}
		if config.safety_margin.is_negative() {
			return Err(ConfigError::InvalidSetting {
				name: "safety_margin",
				reason: "margin must not be negative".into(),
			});
		}
		if !config.default_ttl.is_positive() {
			return Err(ConfigError::InvalidSetting {
				name: "default_ttl",
				reason: "validity must be positive".into(),
			});
		}

		Ok(config)
	}
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"" | "0" | "false" | "no" | "off" => Ok(false),
		other => Err(ConfigError::InvalidSetting {
			name,
			reason: format!("`{other}` is not a boolean flag"),
		}),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map = pairs
			.iter()
			.map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
			.collect::<HashMap<_, _>>();

		move |name| map.get(name).cloned()
	}

	#[test]
	fn builder_defaults_are_strict() {
		let config = PortalConfig::builder(
			Url::parse("https://portal.example.com").expect("URL fixture should parse."),
			"agent",
			"hunter2",
		)
		.build()
		.expect("Config with required settings should build.");

		assert!(!config.accept_invalid_certs, "TLS validation must stay on by default.");
		assert!(!config.debug);
		assert_eq!(config.retry, RetryPolicy::default());
		assert_eq!(config.safety_margin, Duration::minutes(2));
		assert_eq!(config.default_ttl, Duration::hours(1));
		assert_eq!(config.account_for("acme"), "acme");
		assert!(!format!("{config:?}").contains("hunter2"));
	}

	#[test]
	fn lookup_reads_all_settings() {
		let config = PortalConfig::from_lookup(lookup_from(&[
			(env::BASE_URL, " https://portal.example.com/ns-api "),
			(env::USERNAME, "agent"),
			(env::PASSWORD, "hunter2"),
			(env::ACCOUNT_HEADER, "acme-master"),
			(env::DEBUG, "yes"),
			(env::INSECURE_TLS, "TRUE"),
			(env::REQUEST_TIMEOUT_SECS, "5"),
		]))
		.expect("Complete environment should load.");

		assert_eq!(config.base_url.as_str(), "https://portal.example.com/ns-api");
		assert_eq!(config.account_for("acme"), "acme-master");
		assert!(config.debug);
		assert!(config.accept_invalid_certs);
		assert_eq!(config.request_timeout, Duration::seconds(5));
	}

	#[test]
	fn lookup_reports_missing_and_invalid_values() {
		let err = PortalConfig::from_lookup(lookup_from(&[(env::BASE_URL, "https://x.test")]))
			.expect_err("Missing credentials must be rejected.");

		assert!(matches!(err, ConfigError::MissingSetting { name: env::USERNAME }));

		let err = PortalConfig::from_lookup(lookup_from(&[
			(env::BASE_URL, "https://x.test"),
			(env::USERNAME, "agent"),
			(env::PASSWORD, "hunter2"),
			(env::DEBUG, "maybe"),
		]))
		.expect_err("Unknown flag values must be rejected.");

		assert!(matches!(err, ConfigError::InvalidSetting { name: env::DEBUG, .. }));

		let err = PortalConfig::from_lookup(lookup_from(&[(env::BASE_URL, "not a url")]))
			.expect_err("Unparseable base URLs must be rejected.");

		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn builder_rejects_non_positive_timeout() {
		let err = PortalConfig::builder(
			Url::parse("https://portal.example.com").expect("URL fixture should parse."),
			"agent",
			"hunter2",
		)
		.request_timeout(Duration::ZERO)
		.build()
		.expect_err("Zero timeout must be rejected.");

		assert!(matches!(err, ConfigError::InvalidSetting { name: "request_timeout", .. }));
	}
}
