//! Tenant-scoped bearer tokens for call-center portal integrations: ordered candidate login
//! endpoints with doubling backoff, plus an owned expiry-aware cache.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod portal;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::PortalConfig,
		flows::{PortalAuth, ReqwestPortalAuth},
		portal::RetryPolicy,
	};

	/// Test credentials sent by brokers built with [`build_reqwest_test_auth`].
	pub const TEST_USERNAME: &str = "agent";
	/// Test password sent by brokers built with [`build_reqwest_test_auth`].
	pub const TEST_PASSWORD: &str = "hunter2";

	/// Builds a config pointing at `base_url` with a fast retry policy so backoff does not
	/// slow tests down.
	pub fn test_config(base_url: &str, retry: RetryPolicy) -> PortalConfig {
		PortalConfig::builder(
			Url::parse(base_url).expect("Failed to parse test portal base URL."),
			TEST_USERNAME,
			TEST_PASSWORD,
		)
		.retry(retry)
		.debug(true)
		.request_timeout(Duration::seconds(5))
		.build()
		.expect("Failed to build test portal config.")
	}

	/// Constructs a reqwest-backed [`PortalAuth`] against `base_url` (typically an
	/// `httpmock` server).
	pub fn build_reqwest_test_auth(base_url: &str, retry: RetryPolicy) -> ReqwestPortalAuth {
		PortalAuth::new(test_config(base_url, retry))
			.expect("Failed to build reqwest transport for tests.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
