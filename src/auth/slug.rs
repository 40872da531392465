//! Origin slugs and the intermediate contact identifier.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

/// Application-specific routing identifier passed through the redirect round trip.
///
/// The provider echoes the slug back verbatim as a callback query parameter, so
/// construction strips every `/` to keep the value from breaking the redirect
/// URL it is embedded in.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Slug(String);
impl Slug {
	/// Sanitizes an origin value into a slug, removing every `/` character.
	pub fn sanitize(origin: impl AsRef<str>) -> Self {
		Self(origin.as_ref().chars().filter(|&c| c != '/').collect())
	}

	/// Returns `true` when the sanitized slug carries no characters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for Slug {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for Slug {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<String> for Slug {
	fn from(value: String) -> Self {
		Self::sanitize(value)
	}
}
impl From<Slug> for String {
	fn from(value: Slug) -> Self {
		value.0
	}
}
impl Debug for Slug {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Slug({})", self.0)
	}
}
impl Display for Slug {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Provider-issued identifier returned by token validation.
///
/// Required input to the member-info call; lives only within one callback
/// invocation and is never persisted.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContactId(String);
impl ContactId {
	/// Wraps a validation result after rejecting empty values.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ContactIdError> {
		let view = value.as_ref();

		if view.trim().is_empty() {
			return Err(ContactIdError::Empty);
		}

		Ok(Self(view.to_owned()))
	}
}
impl AsRef<str> for ContactId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for ContactId {
	type Error = ContactIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<ContactId> for String {
	fn from(value: ContactId) -> Self {
		value.0
	}
}
impl Debug for ContactId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ContactId({})", self.0)
	}
}
impl Display for ContactId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ContactId {
	type Err = ContactIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Error returned when a validation result cannot be used as a contact identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ContactIdError {
	/// The validation call answered with an empty result element.
	#[error("Contact identifier cannot be empty.")]
	Empty,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn slug_strips_every_slash() {
		assert_eq!(Slug::sanitize("foo/bar").as_ref(), "foobar");
		assert_eq!(Slug::sanitize("/leading/and/trailing/").as_ref(), "leadingandtrailing");
		assert_eq!(Slug::sanitize("plain").as_ref(), "plain");
	}

	#[test]
	fn slug_serde_sanitizes_on_deserialize() {
		let slug: Slug = serde_json::from_str("\"foo/bar\"")
			.expect("Slug should deserialize from a JSON string.");

		assert_eq!(slug.as_ref(), "foobar");
	}

	#[test]
	fn contact_id_rejects_empty_values() {
		assert_eq!(ContactId::new(""), Err(ContactIdError::Empty));
		assert_eq!(ContactId::new("   "), Err(ContactIdError::Empty));

		let id = ContactId::new("42").expect("Non-empty contact identifier should be accepted.");

		assert_eq!(id.as_ref(), "42");
	}
}
