//! Memoized two-step verification exchange for one callback invocation.
//!
//! The contact identifier and member info are each fetched at most once per
//! exchange; the info call is populated from the validation call's result, so
//! the two outbound GETs are strictly sequential and a failed validation
//! short-circuits the member-info call entirely.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, CanonicalIdentity, ContactId, MemberInfo, Membership},
	events::{AppEventId, LogLevel, redact_url},
	http::ApiHttpClient,
	obs::{self, InstrumentStage, StageKind, StageOutcome},
	provider::MemberSchema,
	strategy::{PROVIDER_NAME, TimberlakeStrategy, join_url},
	xml::{ParseError, XmlDocument},
};

const MEMBER_INFO_ROOT: &str = "GetBasicMemberInfo";

/// Per-callback verification state: one token, at most one of each outbound call.
///
/// Not shared across requests; the strategy creates a fresh exchange for every
/// callback invocation via
/// [`TimberlakeStrategy::start_exchange`].
pub struct CallbackExchange<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	strategy: &'a TimberlakeStrategy<C>,
	access_token: AccessToken,
	event: Option<AppEventId>,
	contact_id: Option<ContactId>,
	member_info: Option<MemberInfo>,
}
impl<'a, C> CallbackExchange<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	pub(super) fn new(strategy: &'a TimberlakeStrategy<C>, access_token: AccessToken) -> Self {
		Self { strategy, access_token, event: None, contact_id: None, member_info: None }
	}

	/// Attaches the audit event that request/response lines are recorded against.
	pub fn with_audit_event(mut self, event: Option<AppEventId>) -> Self {
		self.event = event;

		self
	}

	/// Callback token this exchange verifies.
	pub fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	/// Consumes the exchange and returns the callback token.
	pub fn into_access_token(self) -> AccessToken {
		self.access_token
	}

	/// Returns the contact identifier, validating the token on first access.
	pub async fn contact_id(&mut self) -> Result<ContactId> {
		if let Some(id) = self.contact_id.clone() {
			return Ok(id);
		}

		const KIND: StageKind = StageKind::ValidateToken;

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = self.validate_auth_token().in_stage(KIND).await;

		match &result {
			Ok(id) => {
				obs::record_stage_outcome(KIND, StageOutcome::Success);

				self.contact_id = Some(id.clone());
			},
			Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	/// Returns the raw member info, driving both verification calls on first access.
	pub async fn member_info(&mut self) -> Result<MemberInfo> {
		if let Some(info) = self.member_info.clone() {
			return Ok(info);
		}

		// Resolved before the member-info stage begins so a failed validation
		// never counts as a member-info attempt.
		let contact_id = self.contact_id().await?;

		const KIND: StageKind = StageKind::MemberInfo;

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = self.fetch_member_info(contact_id).in_stage(KIND).await;

		match &result {
			Ok(info) => {
				obs::record_stage_outcome(KIND, StageOutcome::Success);

				self.member_info = Some(info.clone());
			},
			Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	/// Returns the normalized identity, driving both verification calls on first access.
	pub async fn identity(&mut self) -> Result<CanonicalIdentity> {
		Ok(self.member_info().await?.identity())
	}

	async fn validate_auth_token(&mut self) -> Result<ContactId> {
		let url = self.validate_url()?;

		self.audit_log(
			LogLevel::Info,
			format!("{PROVIDER_NAME} Validate Auth Token Request:\nGET {}", redact_url(&url)),
		)
		.await?;

		let response = match self.strategy.http_client.get(&url).await {
			Ok(response) => response,
			Err(e) => {
				self.audit_failure(format!(
					"{PROVIDER_NAME} Validate Auth Token Response Error: {e}"
				))
				.await?;

				return Err(e.into());
			},
		};

		if !response.is_success() {
			self.audit_failure(format!(
				"{PROVIDER_NAME} Validate Auth Token Response Error (code: {}):\n{}",
				response.status,
				response.body_text(),
			))
			.await?;

			return Err(Error::non_success("validate_token", response.status, &response.body_text()));
		}

		self.audit_log(
			LogLevel::Info,
			format!(
				"{PROVIDER_NAME} Validate Auth Token Response (code: {}):\n{}",
				response.status,
				response.body_text(),
			),
		)
		.await?;

		match decode_contact_id(&response.body) {
			Ok(id) => Ok(id),
			Err(e) => {
				self.audit_failure(format!(
					"{PROVIDER_NAME} Validate Auth Token Response could not be decoded: {e}"
				))
				.await?;

				Err(e.into())
			},
		}
	}

	async fn fetch_member_info(&mut self, contact_id: ContactId) -> Result<MemberInfo> {
		let url = self.member_info_url(&contact_id)?;

		self.audit_log(
			LogLevel::Info,
			format!("{PROVIDER_NAME} Get Basic Member Info Request:\nGET {}", redact_url(&url)),
		)
		.await?;

		let response = match self.strategy.http_client.get(&url).await {
			Ok(response) => response,
			Err(e) => {
				self.audit_failure(format!(
					"{PROVIDER_NAME} Get Basic Member Info Response Error: {e}"
				))
				.await?;

				return Err(e.into());
			},
		};

		if !response.is_success() {
			self.audit_failure(format!(
				"{PROVIDER_NAME} Get Basic Member Info Response Error (code: {}):\n{}",
				response.status,
				response.body_text(),
			))
			.await?;

			return Err(Error::non_success("member_info", response.status, &response.body_text()));
		}

		self.audit_log(
			LogLevel::Info,
			format!(
				"{PROVIDER_NAME} Get Basic Member Info Response (code: {}):\n{}",
				response.status,
				response.body_text(),
			),
		)
		.await?;

		let info = match decode_member_info(
			self.strategy.dialect.member_schema,
			contact_id,
			&response.body,
		) {
			Ok(info) => info,
			Err(e) => {
				self.audit_failure(format!(
					"{PROVIDER_NAME} Get Basic Member Info Response could not be decoded: {e}"
				))
				.await?;

				return Err(e.into());
			},
		};

		self.audit_summary(info.identity().summary()).await?;

		Ok(info)
	}

	fn validate_url(&self) -> Result<Url> {
		let config = &self.strategy.config;
		let mut url = join_url(&config.api_base_url, &config.validate_path)?;
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("securitykey", config.security_key.expose());
		pairs.append_pair("token", self.access_token.expose());

		drop(pairs);

		Ok(url)
	}

	fn member_info_url(&self, contact_id: &ContactId) -> Result<Url> {
		let config = &self.strategy.config;
		let mut url = join_url(&config.api_base_url, &config.user_info_path)?;
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("securitykey", config.security_key.expose());
		pairs.append_pair(self.strategy.dialect.contact_param.as_str(), contact_id.as_ref());

		drop(pairs);

		Ok(url)
	}

	async fn audit_log(&self, level: LogLevel, text: String) -> Result<()> {
		let (Some(events), Some(event)) = (self.strategy.events.as_ref(), self.event.as_ref())
		else {
			return Ok(());
		};

		events.log(event, level, text).await?;

		Ok(())
	}

	async fn audit_failure(&self, text: String) -> Result<()> {
		let (Some(events), Some(event)) = (self.strategy.events.as_ref(), self.event.as_ref())
		else {
			return Ok(());
		};

		events.log(event, LogLevel::Error, text).await?;
		events.mark_failed(event).await?;

		Ok(())
	}

	async fn audit_summary(&self, summary: JsonValue) -> Result<()> {
		let (Some(events), Some(event)) = (self.strategy.events.as_ref(), self.event.as_ref())
		else {
			return Ok(());
		};

		events.update_summary(event, summary).await?;

		Ok(())
	}
}
impl<C> Debug for CallbackExchange<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallbackExchange")
			.field("event", &self.event)
			.field("contact_id", &self.contact_id)
			.field("member_info_cached", &self.member_info.is_some())
			.finish()
	}
}

fn decode_contact_id(body: &[u8]) -> Result<ContactId, ParseError> {
	const PATH: &[&str] = &["ValidateAuthenticationToken", "ValidateAuthenticationTokenResult"];

	let doc = XmlDocument::decode(body)?;
	let text = doc.required_text_at(PATH)?;

	ContactId::new(text).map_err(|_| ParseError::EmptyField { path: PATH.join("/") })
}

fn decode_member_info(
	schema: MemberSchema,
	contact_id: ContactId,
	body: &[u8],
) -> Result<MemberInfo, ParseError> {
	let doc = XmlDocument::decode(body)?;
	let text = |field: &str| Ok::<_, ParseError>(doc.text_at(&[MEMBER_INFO_ROOT, field])?.to_owned());

	match schema {
		MemberSchema::Legacy => Ok(MemberInfo {
			contact_id,
			member_id: None,
			first_name: text("FirstName")?,
			last_name: text("LastName")?,
			email: text("EmailAddress")?,
			membership: Membership::Legacy {
				member_type: text("MemberType")?,
				expiration_date: text("ExpirationDate")?,
			},
		}),
		MemberSchema::Revised => Ok(MemberInfo {
			contact_id,
			member_id: Some(
				doc.required_text_at(&[MEMBER_INFO_ROOT, "MemberID"])?.to_owned(),
			),
			first_name: text("FirstName")?,
			last_name: text("LastName")?,
			email: text("EmailAddress")?,
			membership: Membership::Revised {
				is_active: doc.flag_at(&[MEMBER_INFO_ROOT, "IsActive"])?,
				is_member: doc.flag_at(&[MEMBER_INFO_ROOT, "IsMember"])?,
			},
		}),
	}
}
