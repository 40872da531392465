//! Decoding for the provider's XML response bodies.
//!
//! Responses are small element-only documents (no meaningful attributes), so
//! the decoder lowers them into a nested name/value map and field access goes
//! through schema-checked path lookups that return typed errors instead of
//! propagating silent nulls.

// crates.io
use quick_xml::{Reader, events::Event};
// self
use crate::_prelude::*;

/// Errors raised while decoding a provider response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ParseError {
	/// Body is not well-formed XML.
	#[error("Response body is not well-formed XML: {message}.")]
	Malformed {
		/// Human-readable decoder failure.
		message: String,
	},
	/// A required element is absent from the document.
	#[error("Response is missing the required element `{path}`.")]
	MissingField {
		/// Slash-joined element path that failed resolution.
		path: String,
	},
	/// A required element is present but carries no text.
	#[error("Response element `{path}` is empty.")]
	EmptyField {
		/// Slash-joined element path that resolved to an empty value.
		path: String,
	},
	/// A boolean element carries a value other than `true`/`false`.
	#[error("Response element `{path}` is not a boolean: `{value}`.")]
	InvalidFlag {
		/// Slash-joined element path of the offending flag.
		path: String,
		/// Literal element text that failed boolean parsing.
		value: String,
	},
}

/// One decoded XML node: either leaf text or a map of child elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlNode {
	/// Leaf element containing only character data.
	Text(String),
	/// Element containing child elements; repeated names keep the last occurrence.
	Element(BTreeMap<String, XmlNode>),
}

/// Decoded XML document rooted at its top-level elements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlDocument(BTreeMap<String, XmlNode>);
impl XmlDocument {
	/// Decodes a response body into a nested element map.
	pub fn decode(body: &[u8]) -> Result<Self, ParseError> {
		let text = std::str::from_utf8(body)
			.map_err(|e| ParseError::Malformed { message: e.to_string() })?;
		let mut reader = Reader::from_str(text);

		reader.config_mut().trim_text(true);

		let mut root = BTreeMap::new();
		// (element name, children decoded so far, accumulated text)
		let mut stack: Vec<(String, BTreeMap<String, XmlNode>, String)> = Vec::new();

		loop {
			match reader
				.read_event()
				.map_err(|e| ParseError::Malformed { message: e.to_string() })?
			{
				Event::Start(start) => {
					let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

					stack.push((name, BTreeMap::new(), String::new()));
				},
				Event::Empty(empty) => {
					let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
					let target = stack.last_mut().map(|(_, children, _)| children);

					target.unwrap_or(&mut root).insert(name, XmlNode::Text(String::new()));
				},
				Event::Text(text) => {
					let value = text
						.unescape()
						.map_err(|e| ParseError::Malformed { message: e.to_string() })?;

					if let Some((_, _, buf)) = stack.last_mut() {
						buf.push_str(&value);
					}
				},
				Event::CData(data) => {
					let value = String::from_utf8_lossy(&data);

					if let Some((_, _, buf)) = stack.last_mut() {
						buf.push_str(&value);
					}
				},
				Event::End(end) => {
					let Some((name, children, text)) = stack.pop() else {
						return Err(ParseError::Malformed {
							message: "unexpected closing tag".into(),
						});
					};

					if end.name().as_ref() != name.as_bytes() {
						return Err(ParseError::Malformed {
							message: format!("mismatched closing tag for `{name}`"),
						});
					}

					let node = if children.is_empty() {
						XmlNode::Text(text)
					} else {
						XmlNode::Element(children)
					};
					let target = stack.last_mut().map(|(_, c, _)| c);

					target.unwrap_or(&mut root).insert(name, node);
				},
				Event::Eof => {
					if !stack.is_empty() {
						return Err(ParseError::Malformed {
							message: "unexpected end of document".into(),
						});
					}

					break;
				},
				// Declarations, comments, and processing instructions carry no member data.
				_ => {},
			}
		}

		Ok(Self(root))
	}

	/// Resolves the text value at a nested element path.
	pub fn text_at(&self, path: &[&str]) -> Result<&str, ParseError> {
		let mut children = &self.0;
		let (leaf, ancestors) =
			path.split_last().ok_or_else(|| missing_field(path))?;

		for segment in ancestors {
			match children.get(*segment) {
				Some(XmlNode::Element(inner)) => children = inner,
				_ => return Err(missing_field(path)),
			}
		}

		match children.get(*leaf) {
			Some(XmlNode::Text(text)) => Ok(text),
			_ => Err(missing_field(path)),
		}
	}

	/// Resolves a non-empty text value at a nested element path.
	pub fn required_text_at(&self, path: &[&str]) -> Result<&str, ParseError> {
		let text = self.text_at(path)?;

		if text.is_empty() {
			return Err(ParseError::EmptyField { path: path.join("/") });
		}

		Ok(text)
	}

	/// Resolves a boolean element (`true`/`false`, case-insensitive) at a nested path.
	pub fn flag_at(&self, path: &[&str]) -> Result<bool, ParseError> {
		let text = self.text_at(path)?;

		if text.eq_ignore_ascii_case("true") {
			Ok(true)
		} else if text.eq_ignore_ascii_case("false") {
			Ok(false)
		} else {
			Err(ParseError::InvalidFlag { path: path.join("/"), value: text.to_owned() })
		}
	}
}

fn missing_field(path: &[&str]) -> ParseError {
	ParseError::MissingField { path: path.join("/") }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const VALIDATE_BODY: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
		<ValidateAuthenticationToken>\
		<ValidateAuthenticationTokenResult>42</ValidateAuthenticationTokenResult>\
		</ValidateAuthenticationToken>";

	#[test]
	fn decodes_nested_provider_response() {
		let doc = XmlDocument::decode(VALIDATE_BODY.as_bytes())
			.expect("Validation response fixture should decode.");

		assert_eq!(
			doc.text_at(&["ValidateAuthenticationToken", "ValidateAuthenticationTokenResult"]),
			Ok("42"),
		);
	}

	#[test]
	fn missing_elements_return_typed_errors() {
		let doc = XmlDocument::decode(VALIDATE_BODY.as_bytes())
			.expect("Validation response fixture should decode.");
		let err = doc
			.text_at(&["ValidateAuthenticationToken", "NoSuchElement"])
			.expect_err("Absent element should not resolve.");

		assert_eq!(
			err,
			ParseError::MissingField { path: "ValidateAuthenticationToken/NoSuchElement".into() },
		);
	}

	#[test]
	fn empty_and_self_closed_elements_are_distinguished_from_missing() {
		let body = "<GetBasicMemberInfo><FirstName/><LastName></LastName></GetBasicMemberInfo>";
		let doc = XmlDocument::decode(body.as_bytes()).expect("Fixture should decode.");

		assert_eq!(doc.text_at(&["GetBasicMemberInfo", "FirstName"]), Ok(""));
		assert_eq!(doc.text_at(&["GetBasicMemberInfo", "LastName"]), Ok(""));
		assert_eq!(
			doc.required_text_at(&["GetBasicMemberInfo", "FirstName"]),
			Err(ParseError::EmptyField { path: "GetBasicMemberInfo/FirstName".into() }),
		);
	}

	#[test]
	fn flags_parse_case_insensitively() {
		let body = "<GetBasicMemberInfo><IsActive>True</IsActive>\
			<IsMember>garbage</IsMember></GetBasicMemberInfo>";
		let doc = XmlDocument::decode(body.as_bytes()).expect("Fixture should decode.");

		assert_eq!(doc.flag_at(&["GetBasicMemberInfo", "IsActive"]), Ok(true));
		assert_eq!(
			doc.flag_at(&["GetBasicMemberInfo", "IsMember"]),
			Err(ParseError::InvalidFlag {
				path: "GetBasicMemberInfo/IsMember".into(),
				value: "garbage".into(),
			}),
		);
	}

	#[test]
	fn malformed_documents_are_rejected() {
		assert!(matches!(
			XmlDocument::decode(b"<Open><Inner></Open>"),
			Err(ParseError::Malformed { .. }),
		));
		assert!(matches!(
			XmlDocument::decode(b"<Unclosed>"),
			Err(ParseError::Malformed { .. }),
		));
	}
}
