//! Owned, process-lifetime token cache keyed by tenant.

// self
use crate::{
	_prelude::*,
	auth::{TenantId, TokenRecord},
};

type CacheMap = Arc<RwLock<HashMap<TenantId, TokenRecord>>>;

/// Thread-safe tenant → token map shared by clones of the owning broker.
///
/// Holds at most one record per tenant; [`TokenCache::insert`] overwrites any prior entry.
/// The acquirer never removes entries, it only replaces them once they fall inside the
/// safety margin.
#[derive(Clone, Debug, Default)]
pub struct TokenCache(CacheMap);
impl TokenCache {
	/// Stores `record` under its tenant, returning the record it replaced.
	pub fn insert(&self, record: TokenRecord) -> Option<TokenRecord> {
		self.0.write().insert(record.tenant.clone(), record)
	}

	/// Returns the cached record for `tenant` regardless of freshness.
	pub fn get(&self, tenant: &str) -> Option<TokenRecord> {
		self.0.read().get(tenant).cloned()
	}

	/// Returns the cached record only if more than `margin` remains before expiry at `now`.
	pub fn fresh_at(
		&self,
		tenant: &str,
		now: OffsetDateTime,
		margin: Duration,
	) -> Option<TokenRecord> {
		self.0.read().get(tenant).filter(|record| record.is_fresh_at(now, margin)).cloned()
	}

	/// Number of tenants with a cached record.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no tenant has a cached record.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
