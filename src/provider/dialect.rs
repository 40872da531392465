//! Dialect descriptor collapsing the historical provider API variants.

// self
use crate::_prelude::*;

/// Provider-deployment quirks that influence URL assembly and response decoding.
///
/// Four near-identical deployments of the membership API exist in the wild;
/// they differ only in the fields captured here, so one strategy parameterized
/// by a dialect replaces four duplicated flows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderDialect {
	/// Query-parameter name carrying the contact identifier on the info call.
	pub contact_param: ContactParam,
	/// Separator placed between the callback URL and the slug parameter.
	pub slug_separator: SlugSeparator,
	/// Where the strategy reads the slug from.
	pub slug_source: SlugSource,
	/// Element set expected in the member-info response.
	pub member_schema: MemberSchema,
}

/// Query-parameter name used to pass the contact identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactParam {
	#[default]
	/// Older deployments expect `contactID`.
	ContactId,
	/// Newer deployments expect `memberKey`.
	MemberKey,
}
impl ContactParam {
	/// Returns the literal query-parameter name.
	pub const fn as_str(self) -> &'static str {
		match self {
			ContactParam::ContactId => "contactID",
			ContactParam::MemberKey => "memberKey",
		}
	}
}

/// Separator between the `redirectURL` value and the appended slug parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugSeparator {
	#[default]
	/// Slug starts the callback URL's query string (`?slug=`).
	Question,
	/// Slug extends an existing query string (`&slug=`).
	Ampersand,
}
impl SlugSeparator {
	/// Returns the literal separator character.
	pub const fn as_char(self) -> char {
		match self {
			SlugSeparator::Question => '?',
			SlugSeparator::Ampersand => '&',
		}
	}
}

/// Where the slug is read from during each phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugSource {
	#[default]
	/// Host session carries an `origin` value set before the request phase.
	Session,
	/// Provider echoes the slug back as a callback query parameter.
	CallbackQuery,
}

/// Element set expected in the `GetBasicMemberInfo` response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSchema {
	#[default]
	/// `FirstName`, `LastName`, `EmailAddress`, `MemberType`, `ExpirationDate`.
	Legacy,
	/// `MemberID`, `FirstName`, `LastName`, `EmailAddress`, `IsActive`, `IsMember`.
	Revised,
}
