//! Normalized member records produced by the verification calls.

// crates.io
use time::{Date, error::Parse as TimeParseError, macros::format_description};
// self
use crate::{_prelude::*, auth::ContactId};

/// Raw member fields decoded from the `GetBasicMemberInfo` response.
///
/// The populated fields depend on the dialect's member schema; `member_id` is
/// only present for the revised API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
	/// Contact identifier obtained from the validation call.
	pub contact_id: ContactId,
	/// Member identifier reported by the revised API, when present.
	pub member_id: Option<String>,
	/// Member's first name.
	pub first_name: String,
	/// Member's last name.
	pub last_name: String,
	/// Member's email address.
	pub email: String,
	/// Schema-dependent membership attributes.
	pub membership: Membership,
}
impl MemberInfo {
	/// Normalizes the raw fields into the canonical identity handed to the host.
	///
	/// The revised API reports its own `MemberID`, which takes precedence over
	/// the contact identifier as the stable uid.
	pub fn identity(&self) -> CanonicalIdentity {
		let uid =
			self.member_id.clone().unwrap_or_else(|| self.contact_id.as_ref().to_owned());

		CanonicalIdentity {
			uid,
			first_name: self.first_name.clone(),
			last_name: self.last_name.clone(),
			email: self.email.clone(),
			membership: self.membership.clone(),
		}
	}
}

/// Membership attributes, varying by provider deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
	/// Legacy schema reporting a member type and an expiration date.
	Legacy {
		/// Provider-assigned membership class.
		member_type: String,
		/// Expiration date as reported, `MM/DD/YYYY`.
		expiration_date: String,
	},
	/// Revised schema reporting activity flags instead of dates.
	Revised {
		/// Whether the account is currently active.
		is_active: bool,
		/// Whether the account holds a membership.
		is_member: bool,
	},
}
impl Membership {
	/// Parses the legacy `MM/DD/YYYY` expiration date, when the schema carries one.
	pub fn expiration_date(&self) -> Option<Result<Date, TimeParseError>> {
		let Membership::Legacy { expiration_date, .. } = self else {
			return None;
		};
		let format = format_description!("[month padding:none]/[day padding:none]/[year]");

		Some(Date::parse(expiration_date, &format))
	}
}

/// Normalized identity record handed to the host framework.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalIdentity {
	/// Stable provider-scoped user identifier.
	pub uid: String,
	/// Member's first name.
	pub first_name: String,
	/// Member's last name.
	pub last_name: String,
	/// Member's email address.
	pub email: String,
	/// Schema-dependent membership attributes.
	pub membership: Membership,
}
impl CanonicalIdentity {
	/// Redacted summary persisted into audit events: identity fields only, no credentials.
	pub fn summary(&self) -> JsonValue {
		serde_json::json!({
			"user_info": {
				"uid": self.uid,
				"email": self.email,
				"first_name": self.first_name,
				"last_name": self.last_name,
			}
		})
	}
}
