//! Audit-event contract and built-in sink implementations.
//!
//! Some host deployments track every SSO attempt as an application event:
//! request/response log lines, a redacted identity summary on success, and a
//! failed marker when either verification call errors. [`AppEventSink`] is the
//! strategy's only dependency on that store; hosts without audit logging simply
//! never attach a sink, and [`NoopEventSink`] exists for call sites that need a
//! sink value regardless.

pub mod memory;

pub use memory::MemoryEventSink;

// self
use crate::{_prelude::*, auth::{SECURITY_MASK, Slug}};

/// Future returned by [`AppEventSink`] methods.
pub type EventFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, EventError>> + 'a + Send>>;

/// Audit-event store contract implemented by host applications.
pub trait AppEventSink
where
	Self: Send + Sync,
{
	/// Looks up (by preferred identifier, then slug) or creates the event owning this flow.
	fn create_or_find<'a>(
		&'a self,
		slug: Option<&'a Slug>,
		activity_type: &'a str,
		preferred_id: Option<&'a str>,
	) -> EventFuture<'a, AppEventId>;

	/// Appends a log line to the event.
	fn log<'a>(&'a self, event: &'a AppEventId, level: LogLevel, text: String)
	-> EventFuture<'a, ()>;

	/// Stores the redacted identity summary on the event.
	fn update_summary<'a>(
		&'a self,
		event: &'a AppEventId,
		summary: JsonValue,
	) -> EventFuture<'a, ()>;

	/// Marks the event as failed.
	fn mark_failed<'a>(&'a self, event: &'a AppEventId) -> EventFuture<'a, ()>;
}

/// Opaque identifier of an application event owned by the host.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AppEventId(String);
impl AppEventId {
	/// Wraps a host-assigned event identifier.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}
}
impl AsRef<str> for AppEventId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<String> for AppEventId {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<AppEventId> for String {
	fn from(value: AppEventId) -> Self {
		value.0
	}
}
impl Debug for AppEventId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "AppEventId({})", self.0)
	}
}
impl Display for AppEventId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Severity of an audit log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
	/// Routine request/response trace.
	Info,
	/// Failure while exchanging with the provider.
	Error,
}
impl LogLevel {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LogLevel::Info => "info",
			LogLevel::Error => "error",
		}
	}
}
impl Display for LogLevel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error type produced by [`AppEventSink`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum EventError {
	/// Backend-level failure of the host's event store.
	#[error("Event store failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Sink that discards every audit call; the default for hosts without event tracking.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEventSink;
impl AppEventSink for NoopEventSink {
	fn create_or_find<'a>(
		&'a self,
		_slug: Option<&'a Slug>,
		_activity_type: &'a str,
		preferred_id: Option<&'a str>,
	) -> EventFuture<'a, AppEventId> {
		let id = AppEventId::new(preferred_id.unwrap_or("disabled"));

		Box::pin(async move { Ok(id) })
	}

	fn log<'a>(
		&'a self,
		_event: &'a AppEventId,
		_level: LogLevel,
		_text: String,
	) -> EventFuture<'a, ()> {
		Box::pin(async { Ok(()) })
	}

	fn update_summary<'a>(
		&'a self,
		_event: &'a AppEventId,
		_summary: JsonValue,
	) -> EventFuture<'a, ()> {
		Box::pin(async { Ok(()) })
	}

	fn mark_failed<'a>(&'a self, _event: &'a AppEventId) -> EventFuture<'a, ()> {
		Box::pin(async { Ok(()) })
	}
}

/// Replaces the `securitykey` and `token` query values with [`SECURITY_MASK`].
///
/// Every URL written to a log or audit sink must pass through here first so
/// the shared secret and the callback token never reach persistent storage.
pub fn redact_url(url: &Url) -> String {
	if url.query().is_none() {
		return url.to_string();
	}

	let query = url
		.query_pairs()
		.map(|(key, value)| {
			if key.eq_ignore_ascii_case("securitykey") || key.eq_ignore_ascii_case("token") {
				format!("{}={SECURITY_MASK}", encode(&key))
			} else {
				format!("{}={}", encode(&key), encode(&value))
			}
		})
		.collect::<Vec<_>>()
		.join("&");
	let mut redacted = url.clone();

	redacted.set_query(Some(&query));

	redacted.to_string()
}

fn encode(value: &str) -> String {
	url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn redaction_masks_security_key_and_token() {
		let url = Url::parse(
			"https://secure005.membershipsoftware.org/api/Validate/?securitykey=top-secret&token=opaque-token",
		)
		.expect("Redaction fixture URL should parse.");
		let redacted = redact_url(&url);

		assert!(!redacted.contains("top-secret"));
		assert!(!redacted.contains("opaque-token"));
		assert_eq!(
			redacted,
			"https://secure005.membershipsoftware.org/api/Validate/?securitykey=[FILTERED]&token=[FILTERED]",
		);
	}

	#[test]
	fn redaction_is_case_insensitive_and_preserves_other_params() {
		let url = Url::parse("https://example.com/api?SecurityKey=k&contactID=42&Token=t")
			.expect("Redaction fixture URL should parse.");
		let redacted = redact_url(&url);

		assert!(!redacted.contains("=k&"));
		assert!(redacted.contains("contactID=42"));
		assert!(!redacted.ends_with("=t"));
	}

	#[test]
	fn redaction_leaves_queryless_urls_untouched() {
		let url = Url::parse("https://example.com/login.asp")
			.expect("Redaction fixture URL should parse.");

		assert_eq!(redact_url(&url), "https://example.com/login.asp");
	}

	#[tokio::test]
	async fn noop_sink_honors_the_preferred_identifier() {
		let sink = NoopEventSink;
		let preferred = sink
			.create_or_find(None, "sso", Some("evt-7"))
			.await
			.expect("Noop lookup should succeed.");
		let fallback = sink
			.create_or_find(None, "sso", None)
			.await
			.expect("Noop lookup should succeed.");

		assert_eq!(preferred.as_ref(), "evt-7");
		assert_eq!(fallback.as_ref(), "disabled");

		sink.log(&preferred, LogLevel::Info, "discarded".into())
			.await
			.expect("Noop logging should succeed.");
		sink.mark_failed(&preferred).await.expect("Noop failure marking should succeed.");
	}
}
