//! Case-normalized environment configuration identifiers.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const MAX_LEN: usize = 128;

/// Reasons a string is not a usable environment identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// Nothing was given.
	#[error("Environment identifier cannot be empty.")]
	Empty,
	/// Spaces, tabs or newlines appear in the value.
	#[error("Environment identifier contains whitespace.")]
	ContainsWhitespace,
	/// The value is longer than identifiers may be.
	#[error("Environment identifier exceeds {max} characters.")]
	TooLong {
		/// Length limit in bytes.
		max: usize,
	},
}

/// Stable configuration identifier of an environment (e.g. `api.sandbox.ebay.com`).
///
/// Identifiers are lowercased on construction, so two spellings that differ only in case
/// compare equal and hash to the same cache slot.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnvironmentId(String);
impl EnvironmentId {
	/// Validates `value` and lowercases it.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let raw = value.as_ref();

		check(raw)?;

		Ok(Self(raw.to_lowercase()))
	}

	pub(crate) fn from_constant(raw: &'static str) -> Self {
		debug_assert!(check(raw).is_ok() && raw == raw.to_lowercase());

		Self(raw.to_owned())
	}
}
impl Deref for EnvironmentId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for EnvironmentId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<EnvironmentId> for String {
	fn from(value: EnvironmentId) -> Self {
		value.0
	}
}
impl TryFrom<String> for EnvironmentId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl Borrow<str> for EnvironmentId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for EnvironmentId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Environment({})", self.0)
	}
}
impl Display for EnvironmentId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for EnvironmentId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn check(raw: &str) -> Result<(), IdentifierError> {
	match raw {
		"" => Err(IdentifierError::Empty),
		_ if raw.len() > MAX_LEN => Err(IdentifierError::TooLong { max: MAX_LEN }),
		_ if raw.contains(char::is_whitespace) => Err(IdentifierError::ContainsWhitespace),
		_ => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_normalize_case_and_validate() {
		let id = EnvironmentId::new("API.Sandbox.eBay.com")
			.expect("Mixed-case identifier should be accepted.");

		assert_eq!(id.as_ref(), "api.sandbox.ebay.com");
		assert_eq!(id, EnvironmentId::new("api.sandbox.ebay.com").expect("Lowercase is valid."));
		assert_eq!(EnvironmentId::new(""), Err(IdentifierError::Empty));
		assert_eq!(EnvironmentId::new(" api.ebay.com"), Err(IdentifierError::ContainsWhitespace));
		assert!(EnvironmentId::new("a".repeat(MAX_LEN + 1)).is_err());
	}

	#[test]
	fn deserialization_normalizes_and_rejects_whitespace() {
		let id: EnvironmentId = serde_json::from_str("\"API.eBay.com\"")
			.expect("Identifier should deserialize successfully.");

		assert_eq!(id.as_ref(), "api.ebay.com");
		assert!(serde_json::from_str::<EnvironmentId>("\"with space\"").is_err());
	}

	#[test]
	fn maps_can_be_queried_with_plain_strings() {
		let map: HashMap<EnvironmentId, u8> = HashMap::from_iter([(
			EnvironmentId::new("api.ebay.com").expect("Identifier fixture should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("api.ebay.com"), Some(&7));
	}
}
