//! Login response parsing and the tagged per-attempt outcome.

// crates.io
use serde::{Deserializer, de::DeserializeOwned};
// self
use crate::{
	_prelude::*,
	auth::{TenantId, TokenRecord, TokenSecret},
	error::TransportError,
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Result of one login attempt against one candidate.
#[derive(Debug)]
pub enum LoginOutcome {
	/// The portal issued an access token.
	Granted(LoginGrant),
	/// The attempt failed; the acquirer retries or falls through to the next candidate.
	Rejected(AttemptFailure),
}
impl LoginOutcome {
	/// Classifies a raw HTTP response from a login endpoint.
	pub fn from_response(status: u16, body: &[u8]) -> Self {
		if !(200..300).contains(&status) {
			return Self::Rejected(AttemptFailure::Status { status, body_preview: preview(body) });
		}

		let de = &mut serde_json::Deserializer::from_slice(body);
		let parsed: LoginResponseBody = match serde_path_to_error::deserialize(de) {
			Ok(parsed) => parsed,
			Err(source) => return Self::Rejected(AttemptFailure::Malformed { source }),
		};

		match parsed.access_token.filter(|token| !token.is_empty()) {
			Some(access_token) => Self::Granted(LoginGrant {
				access_token,
				refresh_token: parsed.refresh_token.filter(|token| !token.is_empty()),
				expires_in: parsed.expires_in.and_then(Seconds::positive),
			}),
			None => Self::Rejected(AttemptFailure::MissingAccessToken),
		}
	}
}
impl From<TransportError> for LoginOutcome {
	fn from(e: TransportError) -> Self {
		Self::Rejected(AttemptFailure::Transport(e))
	}
}

/// Why a login attempt did not yield a token.
#[derive(Debug, ThisError)]
pub enum AttemptFailure {
	/// The request never produced a response.
	#[error("{0}")]
	Transport(#[source] TransportError),
	/// The portal answered with a non-2xx status.
	#[error("portal returned HTTP {status}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// A 2xx body was not valid JSON of the expected shape.
	#[error("login response is malformed at `{}`", .source.path())]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A 2xx body carried neither `accessToken` nor `access_token`.
	#[error("login response did not include an access token")]
	MissingAccessToken,
}
impl AttemptFailure {
	/// Stable label suitable for metric fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Transport(_) => "transport",
			Self::Status { .. } => "status",
			Self::Malformed { .. } => "malformed",
			Self::MissingAccessToken => "missing_access_token",
		}
	}
}

/// Token material extracted from a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginGrant {
	/// Access token value.
	pub access_token: String,
	/// Refresh token value, when issued.
	pub refresh_token: Option<String>,
	/// Positive validity reported by the portal.
	pub expires_in: Option<Duration>,
}
impl LoginGrant {
	/// Converts the grant into a cache record, falling back to `default_ttl` when the portal
	/// did not report a validity or reported one past the representable date range.
	pub fn into_record(
		self,
		tenant: TenantId,
		issued_at: OffsetDateTime,
		default_ttl: Duration,
	) -> TokenRecord {
		let expires_at = self
			.expires_in
			.and_then(|ttl| issued_at.checked_add(ttl))
			.unwrap_or_else(|| issued_at.saturating_add(default_ttl));

		TokenRecord {
			tenant,
			access_token: TokenSecret::new(self.access_token),
			refresh_token: self.refresh_token.map(TokenSecret::new),
			issued_at,
			expires_at,
		}
	}
}
impl Debug for LoginGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginGrant")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

#[derive(Deserialize)]
struct LoginResponseBody {
	#[serde(rename = "accessToken", alias = "access_token")]
	access_token: Option<String>,
	#[serde(default, rename = "refreshToken", alias = "refresh_token", deserialize_with = "lenient")]
	refresh_token: Option<String>,
	#[serde(default, rename = "expiresIn", alias = "expires_in", deserialize_with = "lenient")]
	expires_in: Option<Seconds>,
}

/// Reads an optional field, treating values of an unexpected shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let value = serde_json::Value::deserialize(deserializer)?;

	Ok(serde_json::from_value(value).ok())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
	Integer(i64),
	Float(f64),
	Text(String),
}
impl Seconds {
	fn positive(self) -> Option<Duration> {
		let secs = match self {
			Self::Integer(value) => value,
			Self::Float(value) if value.is_finite() => value as i64,
			Self::Float(_) => return None,
			Self::Text(value) => value.trim().parse().ok()?,
		};

		(secs > 0).then(|| Duration::seconds(secs))
	}
}

fn preview(body: &[u8]) -> String {
	let body = String::from_utf8_lossy(body);

	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.into_owned();
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}
