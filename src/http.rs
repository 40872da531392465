//! Transport primitives for the provider's verification calls.
//!
//! The module exposes [`ApiHttpClient`], the strategy's only dependency on an
//! HTTP stack. Both verification calls are plain GETs authenticated via query
//! parameters, so the contract stays deliberately small: one request, one
//! status-plus-body response, no redirect following, no retries.

// std
use std::{borrow::Cow, ops::Deref};
// crates.io
#[cfg(feature = "reqwest")] use reqwest::redirect::Policy;
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{_prelude::*, error::TransportError};

/// Future returned by [`ApiHttpClient::get`].
pub type ApiFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing the provider's GET calls.
///
/// Implementations must be `Send + Sync + 'static` so one strategy value can be
/// shared across host worker threads without additional wrappers. A single call
/// maps to a single network attempt; transport-level retries are out of scope.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes a GET request against the provided URL.
	fn get<'a>(&'a self, url: &'a Url) -> ApiFuture<'a>;
}

/// Status and body captured from one provider response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for an HTTP 200 response; the provider never uses other 2xx codes.
	pub fn is_success(&self) -> bool {
		self.status == 200
	}

	/// Lossy text view of the body for previews and audit logs.
	pub fn body_text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The verification endpoints answer directly rather than delegating to another
/// URI; [`ReqwestApiClient::new`] disables redirect following accordingly, and
/// any custom [`ReqwestClient`] should do the same.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestApiClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestApiClient {
	/// Builds the default transport with redirect following disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestApiClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestApiClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestApiClient {
	fn get<'a>(&'a self, url: &'a Url) -> ApiFuture<'a> {
		let client = self.0.clone();
		let url = url.clone();

		Box::pin(async move {
			let response = client.get(url).send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn success_only_covers_exactly_200() {
		assert!(ApiResponse { status: 200, body: Vec::new() }.is_success());
		assert!(!ApiResponse { status: 204, body: Vec::new() }.is_success());
		assert!(!ApiResponse { status: 500, body: Vec::new() }.is_success());
	}

	#[test]
	fn body_text_is_lossy() {
		let response = ApiResponse { status: 200, body: vec![0x68, 0x69, 0xFF] };

		assert_eq!(response.body_text(), "hi\u{FFFD}");
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn default_transport_builds() {
		ReqwestApiClient::new().expect("Default transport should build.");
	}
}
