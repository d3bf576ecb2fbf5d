//! Ordered login endpoint shapes tried for compatibility with older portal versions.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::TenantId, error::ConfigError};

/// Path segment replaced with the tenant identifier.
pub const TENANT_PLACEHOLDER: &str = "{tenant}";

/// One login URL shape plus the fixed body fields it expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginCandidate {
	/// Short label used in logs and metrics.
	pub label: String,
	/// Path segments appended to the portal base URL; [`TENANT_PLACEHOLDER`] segments are
	/// substituted with the tenant.
	pub path: Vec<String>,
	/// Extra string fields merged into the JSON login body.
	pub body: BTreeMap<String, String>,
}
impl LoginCandidate {
	/// Creates a candidate from a `/`-separated path template such as
	/// `api/v2/domains/{tenant}/auth/login`.
	pub fn new(label: impl Into<String>, path: &str) -> Self {
		Self {
			label: label.into(),
			path: path.split('/').filter(|segment| !segment.is_empty()).map(Into::into).collect(),
			body: BTreeMap::new(),
		}
	}

	/// Adds a fixed body field sent with every attempt against this candidate.
	pub fn with_body_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.body.insert(key.into(), value.into());

		self
	}

	/// Built-in candidates, most specific API version first.
	pub fn defaults() -> Vec<Self> {
		vec![
			Self::new("v2-domain", "api/v2/domains/{tenant}/auth/login"),
			Self::new("v1-login", "api/v1/auth/login").with_body_field("grant_type", "password"),
			Self::new("legacy-login", "auth/login"),
		]
	}

	/// Resolves the login URL for `tenant` under `base`.
	pub fn url(&self, base: &Url, tenant: &TenantId) -> Result<Url, ConfigError> {
		resolve_path(base, self.path.iter().map(String::as_str), tenant)
	}

	/// Builds the JSON login body; `domain`, `username`, and `password` always win over
	/// fixed fields with the same name.
	pub fn body(&self, tenant: &TenantId, username: &str, password: &str) -> Value {
		let mut body = self
			.body
			.iter()
			.map(|(key, value)| (key.clone(), Value::String(value.clone())))
			.collect::<Map<_, _>>();

		body.insert("domain".into(), Value::String(tenant.to_string()));
		body.insert("username".into(), Value::String(username.to_owned()));
		body.insert("password".into(), Value::String(password.to_owned()));

		Value::Object(body)
	}
}

/// Appends `segments` to `base`, substituting [`TENANT_PLACEHOLDER`] with `tenant`.
///
/// Segments are percent-encoded, so a tenant can never inject extra path components.
pub fn resolve_path<'a, I>(base: &Url, segments: I, tenant: &TenantId) -> Result<Url, ConfigError>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut url = base.clone();

	{
		let mut path = url
			.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeABase { url: base.to_string() })?;

		path.pop_if_empty();

		for segment in segments.into_iter().filter(|segment| !segment.is_empty()) {
			if segment == TENANT_PLACEHOLDER {
				path.push(tenant);
			} else {
				path.push(segment);
			}
		}
	}

	Ok(url)
}
