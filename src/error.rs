//! Strategy-level error types shared across the request and callback phases.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider returned a well-formed response that could not be decoded.
	#[error(transparent)]
	Parse(#[from] crate::xml::ParseError),
	/// Audit sink failure surfaced while recording the flow.
	#[error(transparent)]
	Event(#[from] crate::events::EventError),

	/// Provider answered one of the verification calls with a non-200 status.
	#[error("The {stage} call returned HTTP {status}.")]
	NonSuccessStatus {
		/// Which verification call failed (`validate_token` or `member_info`).
		stage: &'static str,
		/// HTTP status code returned by the provider.
		status: u16,
		/// Preview of the response body for diagnostics.
		body_preview: String,
	},
	/// Callback request arrived without the `AuthenticationToken` parameter.
	#[error("Callback request is missing the AuthenticationToken parameter.")]
	MissingAuthenticationToken,
	/// Dialect requires a slug that the request did not carry.
	#[error("No slug was available from the {origin} for this dialect.")]
	MissingSlug {
		/// Where the dialect expected to find the slug.
		origin: &'static str,
	},
}
impl Error {
	/// Builds a [`Error::NonSuccessStatus`] with a truncated body preview.
	pub fn non_success(stage: &'static str, status: u16, body: &str) -> Self {
		Self::NonSuccessStatus { stage, status, body_preview: truncate_preview(body) }
	}
}

/// Configuration and validation failures raised at strategy construction.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Joined endpoint URL cannot be parsed.
	#[error("Joined endpoint URL is invalid: {url}.")]
	InvalidEndpoint {
		/// URL string that failed parsing.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures surfaced by [`ApiHttpClient`](crate::http::ApiHttpClient) implementations.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
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
		Self::network(e)
	}
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}
