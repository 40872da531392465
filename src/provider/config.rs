//! Validated strategy configuration and its builder.

// self
use crate::{_prelude::*, auth::SecurityKey};

/// Immutable configuration consumed by the strategy for the lifetime of a flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Login page the user is redirected to during the request phase.
	pub authorize_url: Url,
	/// Base URL the two verification endpoints hang off.
	pub api_base_url: Url,
	/// Relative path of the member-info endpoint.
	pub user_info_path: String,
	/// Relative path of the token-validation endpoint.
	pub validate_path: String,
	/// Shared secret required on every outbound API call.
	pub security_key: SecurityKey,
	/// Preferred audit-event identifier, when the host tracks application events.
	pub app_event_id: Option<String>,
}
impl ProviderConfig {
	/// Creates a new builder.
	pub fn builder() -> ProviderConfigBuilder {
		ProviderConfigBuilder::new()
	}
}

/// Errors raised while constructing or validating the configuration.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// Authorize URL is required for the request phase.
	#[error("Missing authorize URL.")]
	MissingAuthorizeUrl,
	/// API base URL is required for both verification calls.
	#[error("Missing API base URL.")]
	MissingApiBaseUrl,
	/// Member-info endpoint path is required.
	#[error("Missing user-info endpoint path.")]
	MissingUserInfoPath,
	/// Token-validation endpoint path is required.
	#[error("Missing validate endpoint path.")]
	MissingValidatePath,
	/// Security key must be supplied and non-empty.
	#[error("Security key must be set.")]
	MissingSecurityKey,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug, Default)]
pub struct ProviderConfigBuilder {
	/// Login page for the request phase.
	pub authorize_url: Option<Url>,
	/// Base URL for the verification endpoints.
	pub api_base_url: Option<Url>,
	/// Relative member-info endpoint path.
	pub user_info_path: Option<String>,
	/// Relative token-validation endpoint path.
	pub validate_path: Option<String>,
	/// Shared API secret.
	pub security_key: Option<SecurityKey>,
	/// Preferred audit-event identifier.
	pub app_event_id: Option<String>,
}
impl ProviderConfigBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the authorize URL.
	pub fn authorize_url(mut self, url: Url) -> Self {
		self.authorize_url = Some(url);

		self
	}

	/// Sets the API base URL.
	pub fn api_base_url(mut self, url: Url) -> Self {
		self.api_base_url = Some(url);

		self
	}

	/// Sets the member-info endpoint path.
	pub fn user_info_path(mut self, path: impl Into<String>) -> Self {
		self.user_info_path = Some(path.into());

		self
	}

	/// Sets the token-validation endpoint path.
	pub fn validate_path(mut self, path: impl Into<String>) -> Self {
		self.validate_path = Some(path.into());

		self
	}

	/// Sets the shared security key.
	pub fn security_key(mut self, key: impl Into<String>) -> Self {
		self.security_key = Some(SecurityKey::new(key));

		self
	}

	/// Sets the preferred audit-event identifier.
	pub fn app_event_id(mut self, id: impl Into<String>) -> Self {
		self.app_event_id = Some(id.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		let authorize_url =
			self.authorize_url.ok_or(ProviderConfigError::MissingAuthorizeUrl)?;
		let api_base_url = self.api_base_url.ok_or(ProviderConfigError::MissingApiBaseUrl)?;
		let user_info_path = self
			.user_info_path
			.filter(|path| !path.is_empty())
			.ok_or(ProviderConfigError::MissingUserInfoPath)?;
		let validate_path = self
			.validate_path
			.filter(|path| !path.is_empty())
			.ok_or(ProviderConfigError::MissingValidatePath)?;
		let security_key = self
			.security_key
			.filter(|key| !key.is_empty())
			.ok_or(ProviderConfigError::MissingSecurityKey)?;
		let config = ProviderConfig {
			authorize_url,
			api_base_url,
			user_info_path,
			validate_path,
			security_key,
			app_event_id: self.app_event_id,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ProviderConfig {
	/// Validates invariants for the configuration.
	fn validate(&self) -> Result<(), ProviderConfigError> {
		validate_endpoint("authorize", &self.authorize_url)?;
		validate_endpoint("API base", &self.api_base_url)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderConfigError> {
	if url.scheme() != "https" {
		Err(ProviderConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse configuration URL fixture.")
	}

	fn full_builder() -> ProviderConfigBuilder {
		ProviderConfig::builder()
			.authorize_url(url("https://staging.membershipsoftware.org/login.asp"))
			.api_base_url(url("https://secure005.membershipsoftware.org/stagingsecure"))
			.user_info_path("api/GetBasicMemberInfo/")
			.validate_path("api/ValidateAuthenticationToken/")
			.security_key("key-123")
	}

	#[test]
	fn builder_requires_every_field() {
		assert_eq!(
			ProviderConfig::builder().build().expect_err("Empty builder should fail."),
			ProviderConfigError::MissingAuthorizeUrl,
		);

		let err = full_builder()
			.security_key("")
			.build()
			.expect_err("Empty security key should be rejected.");

		assert_eq!(err, ProviderConfigError::MissingSecurityKey);
	}

	#[test]
	fn builder_rejects_insecure_endpoints() {
		let err = full_builder()
			.api_base_url(url("http://secure005.membershipsoftware.org/stagingsecure"))
			.build()
			.expect_err("Plain HTTP API base should be rejected.");

		assert!(matches!(err, ProviderConfigError::InsecureEndpoint { endpoint: "API base", .. }));
	}

	#[test]
	fn builder_accepts_complete_configuration() {
		let config = full_builder()
			.app_event_id("evt-9")
			.build()
			.expect("Complete configuration should validate.");

		assert_eq!(config.user_info_path, "api/GetBasicMemberInfo/");
		assert_eq!(config.app_event_id.as_deref(), Some("evt-9"));
		assert_eq!(format!("{:?}", config.security_key), "SecurityKey(\"[FILTERED]\")");
	}
}
