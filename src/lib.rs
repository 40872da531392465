//! Pluggable SSO strategy for the Timberlake membership-management API: login redirect,
//! two-step token validation, and member-info normalization with audit-friendly redaction.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod events;
pub mod http;
pub mod obs;
pub mod provider;
pub mod strategy;
pub mod xml;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		events::{AppEventSink, MemoryEventSink},
		http::ReqwestApiClient,
		provider::{ProviderConfig, ProviderDialect},
		strategy::TimberlakeStrategy,
	};

	/// Strategy type alias used by reqwest-backed integration tests.
	pub type ReqwestTestStrategy = TimberlakeStrategy<ReqwestApiClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_api_client() -> ReqwestApiClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestApiClient::with_client(client)
	}

	/// Constructs a [`TimberlakeStrategy`] backed by an in-memory audit sink and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_strategy(
		config: ProviderConfig,
		dialect: ProviderDialect,
	) -> (ReqwestTestStrategy, Arc<MemoryEventSink>) {
		let sink_backend = Arc::new(MemoryEventSink::default());
		let sink: Arc<dyn AppEventSink> = sink_backend.clone();
		let strategy =
			TimberlakeStrategy::with_http_client(config, dialect, test_reqwest_api_client())
				.with_event_sink(sink);

		(strategy, sink_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
#[cfg(test)] use timberlake_sso as _;
#[cfg(test)] use tokio as _;
