//! Redacting wrappers for the shared security key and the callback token.

// self
use crate::_prelude::*;

/// Mask substituted for credential values before a URL reaches any log or audit sink.
pub const SECURITY_MASK: &str = "[FILTERED]";

/// Fixed validity window the provider grants a callback token.
pub const TOKEN_TTL: Duration = Duration::seconds(60);

/// Static shared secret required on every outbound API call to the provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityKey(String);
impl SecurityKey {
	/// Wraps a new security key string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner key value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the configured key carries no characters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for SecurityKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SecurityKey").field(&SECURITY_MASK).finish()
	}
}
impl Display for SecurityKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(SECURITY_MASK)
	}
}

/// Opaque authentication token received from the provider's login redirect.
///
/// Not a real OAuth 2.0 bearer token: the raw string is reused verbatim as the
/// validation credential, and the provider only honors it for a fixed
/// 60-second window.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	token: String,
	issued_at: OffsetDateTime,
}
impl AccessToken {
	/// Wraps the raw callback token, stamping the current instant as issued-at.
	pub fn new(token: impl Into<String>) -> Self {
		Self::issued_at(token, OffsetDateTime::now_utc())
	}

	/// Wraps the raw callback token with an explicit issued-at instant.
	pub fn issued_at(token: impl Into<String>, issued_at: OffsetDateTime) -> Self {
		Self { token: token.into(), issued_at }
	}

	/// Returns the raw token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.token
	}

	/// Fixed relative validity window granted by the provider.
	pub const fn expires_in(&self) -> Duration {
		TOKEN_TTL
	}

	/// Expiry instant derived from issued-at plus the fixed window.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.issued_at + TOKEN_TTL
	}

	/// Returns `true` once the fixed validity window has elapsed at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("token", &SECURITY_MASK)
			.field("issued_at", &self.issued_at)
			.finish()
	}
}
