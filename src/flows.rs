//! High-level flow orchestrators: token acquisition and disposition notices.

pub mod acquire;
pub mod common;
pub mod notify;

pub use notify::*;

// self
use crate::{
	_prelude::*,
	auth::TenantId,
	cache::TokenCache,
	config::PortalConfig,
	http::PortalHttpClient,
	portal::LoginCandidate,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport.
pub type ReqwestPortalAuth = PortalAuth<ReqwestHttpClient>;

/// Owns everything needed to authenticate against the portal on behalf of tenants.
///
/// The broker holds the HTTP transport, the connection settings, the ordered login
/// candidates, and the tenant → token cache, so flows never reach for global state.
/// Clones share the transport, the cache, and the per-tenant single-flight guards.
pub struct PortalAuth<C>
where
	C: ?Sized + PortalHttpClient,
{
	/// HTTP client wrapper used for every outbound portal request.
	pub http_client: Arc<C>,
	/// Portal connection settings and credentials.
	pub config: PortalConfig,
	/// Login endpoint shapes, tried in order.
	pub candidates: Vec<LoginCandidate>,
	/// Path template (relative to the base URL) for disposition notices.
	pub notify_path: String,
	/// Tenant-keyed token cache.
	pub cache: TokenCache,
	flow_guards: Arc<Mutex<HashMap<TenantId, Arc<AsyncMutex<()>>>>>,
}
impl<C> PortalAuth<C>
where
	C: ?Sized + PortalHttpClient,
{
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(config: PortalConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			config,
			candidates: LoginCandidate::defaults(),
			notify_path: notify::DEFAULT_NOTIFY_PATH.into(),
			cache: TokenCache::default(),
			flow_guards: Default::default(),
		}
	}

	/// Replaces the ordered login candidates.
	pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = LoginCandidate>) -> Self {
		self.candidates = candidates.into_iter().collect();

		self
	}

	/// Shares an existing cache instead of starting empty.
	pub fn with_cache(mut self, cache: TokenCache) -> Self {
		self.cache = cache;

		self
	}

	/// Overrides the disposition notice path template.
	pub fn with_notify_path(mut self, path: impl Into<String>) -> Self {
		self.notify_path = path.into();

		self
	}
}
#[cfg(feature = "reqwest")]
impl PortalAuth<ReqwestHttpClient> {
	/// Creates a broker with its own reqwest transport built from `config`.
	///
	/// The transport applies `config.request_timeout` to every request and relaxes TLS
	/// validation only when `config.accept_invalid_certs` is set.
	pub fn new(config: PortalConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(&config)?;

		Ok(Self::with_http_client(config, http_client))
	}
}
impl<C> Clone for PortalAuth<C>
where
	C: ?Sized + PortalHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			config: self.config.clone(),
			candidates: self.candidates.clone(),
			notify_path: self.notify_path.clone(),
			cache: self.cache.clone(),
			flow_guards: self.flow_guards.clone(),
		}
	}
}
impl<C> Debug for PortalAuth<C>
where
	C: ?Sized + PortalHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PortalAuth")
			.field("config", &self.config)
			.field("candidates", &self.candidates)
			.field("notify_path", &self.notify_path)
			.field("cached_tenants", &self.cache.len())
			.finish()
	}
}
