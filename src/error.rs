//! Broker-level error types shared across flows, transports, and configuration.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Every candidate login endpoint failed all of its attempts.
	#[error(
		"Authentication exhausted for tenant `{tenant}` after {attempts} attempts; check the portal credentials and login endpoints (last failure: {last_failure})."
	)]
	Exhausted {
		/// Tenant whose login failed.
		tenant: String,
		/// Total number of login attempts made across all candidates.
		attempts: u32,
		/// Human-readable summary of the final attempt failure.
		last_failure: String,
	},
	/// Portal rejected a disposition notice.
	#[error("Portal rejected the disposition notice with HTTP {status}.")]
	Notification {
		/// HTTP status code returned by the portal.
		status: u16,
		/// Truncated response body for diagnostics.
		body_preview: String,
	},
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required setting was not supplied.
	#[error("Missing required setting `{name}`.")]
	MissingSetting {
		/// Setting or environment variable name.
		name: &'static str,
	},
	/// A setting was supplied but could not be interpreted.
	#[error("Setting `{name}` has an invalid value: {reason}.")]
	InvalidSetting {
		/// Setting or environment variable name.
		name: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
	/// Portal base URL cannot be parsed.
	#[error("Portal base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Portal base URL cannot carry path segments (e.g., `mailto:` or `data:` URLs).
	#[error("Portal base URL `{url}` cannot be used as a base for endpoint paths.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Tenant identifier failed validation.
	#[error(transparent)]
	InvalidTenant(#[from] crate::auth::IdentifierError),
	/// No candidate login endpoints were configured.
	#[error("At least one candidate login endpoint is required.")]
	NoCandidates,
	/// Outbound payload could not be encoded as JSON.
	#[error("Request payload could not be serialized.")]
	Payload {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the portal.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request timed out before the portal answered.
	#[error("Request to the portal timed out.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the portal.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}
