//! The Timberlake strategy: request phase, callback phase, and URL assembly.
//!
//! One strategy value covers all historical deployments of the provider API;
//! the [`ProviderDialect`] supplied at construction selects the variant-specific
//! behavior (slug passing style, contact parameter name, member schema). The
//! strategy holds no per-flow state: each callback invocation works through a
//! [`CallbackExchange`] that memoizes the two verification calls.

pub mod exchange;

pub use exchange::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, CanonicalIdentity, MemberInfo, Slug},
	error::ConfigError,
	events::{AppEventId, AppEventSink},
	http::ApiHttpClient,
	obs::{self, InstrumentStage, StageKind, StageOutcome},
	provider::{ProviderConfig, ProviderDialect, SlugSource},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestApiClient;

/// Provider name reported in every [`AuthOutcome`].
pub const PROVIDER_NAME: &str = "timberlake";

/// Host-supplied inputs for the request phase.
///
/// The host passes both values it has at hand; the dialect's slug source
/// decides which one the strategy reads.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
	/// `origin` value previously stored in the host session.
	pub session_origin: Option<String>,
	/// `slug` query parameter carried by the incoming login request.
	pub query_slug: Option<String>,
}

/// Query parameters extracted from the provider's callback redirect.
#[derive(Clone, Debug, Default)]
pub struct CallbackRequest {
	/// Opaque `AuthenticationToken` query parameter.
	pub authentication_token: Option<String>,
	/// `slug` query parameter echoed back by the provider, when present.
	pub slug: Option<String>,
}

/// Redirect target produced by the request phase.
///
/// Kept as a raw string: the provider expects the nested callback URL and slug
/// verbatim, so the location is assembled by concatenation rather than
/// percent-encoded pair appending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectLocation(String);
impl RedirectLocation {
	/// Returns the location as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Consumes the wrapper and returns the raw location.
	pub fn into_inner(self) -> String {
		self.0
	}
}
impl Display for RedirectLocation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Normalized authentication result handed to the host's downstream handler.
#[derive(Clone, Debug)]
pub struct AuthOutcome {
	/// Strategy name, always [`PROVIDER_NAME`].
	pub provider: &'static str,
	/// Stable provider-scoped user identifier.
	pub uid: String,
	/// Normalized identity record.
	pub info: CanonicalIdentity,
	/// Callback token the identity was verified with.
	pub credentials: AccessToken,
	/// Raw member fields the identity was derived from.
	pub raw_info: MemberInfo,
	/// Audit event that tracked this flow, when the host records events.
	pub app_event: Option<AppEventId>,
}

/// Authentication strategy for the Timberlake membership provider.
///
/// Configuration and dialect are immutable for the lifetime of the strategy;
/// the only shared state is the HTTP client and the optional audit sink, both
/// read-only after construction, so one value serves concurrent flows.
#[derive(Clone)]
pub struct TimberlakeStrategy<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP client used for both outbound verification calls.
	pub http_client: Arc<C>,
	/// Validated provider configuration.
	pub config: ProviderConfig,
	/// Deployment dialect selecting variant-specific behavior.
	pub dialect: ProviderDialect,
	pub(crate) events: Option<Arc<dyn AppEventSink>>,
}
impl<C> TimberlakeStrategy<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a strategy that reuses the caller-provided transport.
	pub fn with_http_client(
		config: ProviderConfig,
		dialect: ProviderDialect,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self { http_client: http_client.into(), config, dialect, events: None }
	}

	/// Attaches an audit-event sink; every subsequent flow is recorded through it.
	pub fn with_event_sink(mut self, sink: Arc<dyn AppEventSink>) -> Self {
		self.events = Some(sink);

		self
	}

	/// Builds the redirect to the provider's login page.
	///
	/// The location is `authorize_url?redirectURL=<callback><sep>slug=<slug>`
	/// with every `/` stripped from the slug. No state is retained beyond what
	/// the host session already holds.
	pub fn request_phase(
		&self,
		ctx: &RequestContext,
		callback_url: &Url,
	) -> Result<RedirectLocation> {
		const KIND: StageKind = StageKind::RequestPhase;

		let _guard = obs::enter_stage(KIND);

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = self.build_redirect(ctx, callback_url);

		match &result {
			Ok(_) => obs::record_stage_outcome(KIND, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	fn build_redirect(&self, ctx: &RequestContext, callback_url: &Url) -> Result<RedirectLocation> {
		let origin = match self.dialect.slug_source {
			SlugSource::Session => ctx
				.session_origin
				.as_deref()
				.ok_or(Error::MissingSlug { origin: "session" })?,
			SlugSource::CallbackQuery => ctx
				.query_slug
				.as_deref()
				.ok_or(Error::MissingSlug { origin: "login request query" })?,
		};
		let slug = Slug::sanitize(origin);

		if slug.is_empty() {
			return Err(Error::MissingSlug {
				origin: match self.dialect.slug_source {
					SlugSource::Session => "session",
					SlugSource::CallbackQuery => "login request query",
				},
			});
		}

		let separator = self.dialect.slug_separator.as_char();
		let location = format!(
			"{}?redirectURL={}{}slug={}",
			self.config.authorize_url, callback_url, separator, slug,
		);

		Ok(RedirectLocation(location))
	}

	/// Handles the provider's callback redirect end to end.
	///
	/// Wraps the raw token, resolves the audit event when a sink is attached,
	/// then drives the two-step verification through a [`CallbackExchange`].
	/// Failures propagate as typed errors; the host never receives a
	/// partially-populated identity.
	pub async fn callback_phase(&self, request: &CallbackRequest) -> Result<AuthOutcome> {
		const KIND: StageKind = StageKind::Callback;

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = self.run_callback(request).in_stage(KIND).await;

		match &result {
			Ok(_) => obs::record_stage_outcome(KIND, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	async fn run_callback(&self, request: &CallbackRequest) -> Result<AuthOutcome> {
		let token = request
			.authentication_token
			.as_deref()
			.filter(|token| !token.is_empty())
			.ok_or(Error::MissingAuthenticationToken)?;
		let slug = request.slug.as_deref().map(Slug::sanitize).filter(|slug| !slug.is_empty());

		if self.dialect.slug_source == SlugSource::CallbackQuery && slug.is_none() {
			return Err(Error::MissingSlug { origin: "callback query" });
		}

		let access_token = AccessToken::new(token);
		let event = match self.events.as_ref() {
			Some(events) => Some(
				events
					.create_or_find(slug.as_ref(), "sso", self.config.app_event_id.as_deref())
					.await?,
			),
			None => None,
		};
		let mut exchange = self.start_exchange(access_token).with_audit_event(event.clone());
		let raw_info = exchange.member_info().await?;
		let info = raw_info.identity();

		Ok(AuthOutcome {
			provider: PROVIDER_NAME,
			uid: info.uid.clone(),
			info,
			credentials: exchange.into_access_token(),
			raw_info,
			app_event: event,
		})
	}

	/// Begins a memoized verification exchange for one callback invocation.
	pub fn start_exchange(&self, access_token: AccessToken) -> CallbackExchange<'_, C> {
		CallbackExchange::new(self, access_token)
	}
}
#[cfg(feature = "reqwest")]
impl TimberlakeStrategy<ReqwestApiClient> {
	/// Creates a strategy with the crate's default reqwest transport.
	///
	/// Fails when the underlying HTTP client cannot be constructed.
	pub fn new(config: ProviderConfig, dialect: ProviderDialect) -> Result<Self> {
		Ok(Self::with_http_client(config, dialect, ReqwestApiClient::new()?))
	}
}
impl<C> Debug for TimberlakeStrategy<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TimberlakeStrategy")
			.field("config", &self.config)
			.field("dialect", &self.dialect)
			.field("events_attached", &self.events.is_some())
			.finish()
	}
}

/// Joins a base URL and a relative path with exactly one `/` at the seam.
///
/// Idempotent with respect to trailing/leading slashes on either side; the
/// path's own trailing slash is preserved because the provider's endpoints
/// require it.
pub fn join_url(base: &Url, path: &str) -> Result<Url, ConfigError> {
	let base_str = base.as_str();
	let joined = match (base_str.ends_with('/'), path.starts_with('/')) {
		(true, true) => format!("{}{}", base_str, &path[1..]),
		(false, false) => format!("{base_str}/{path}"),
		_ => format!("{base_str}{path}"),
	};

	Url::parse(&joined).map_err(|source| ConfigError::InvalidEndpoint { url: joined, source })
}
