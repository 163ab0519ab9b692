//! Validated identifiers that go into the client assertion.
//!
//! Apple issues three identifiers alongside each key: the client identifier (assertion
//! subject and `client_id` form field), the team identifier (assertion issuer), and the
//! key identifier (`kid` header). All three are opaque tokens, so validation only rejects
//! values that could never have been issued.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::{
	_prelude::*,
	auth::{ENV_CLIENT_ID, ENV_KEY_ID, ENV_TEAM_ID},
	error::CredentialError,
};

const MAX_LEN: usize = 128;

/// Which credential identifier a value or error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
	/// [`ClientId`].
	Client,
	/// [`TeamId`].
	Team,
	/// [`KeyId`].
	Key,
}
impl IdentifierKind {
	/// Environment variable consulted by `from_env`.
	pub const fn env_var(self) -> &'static str {
		match self {
			Self::Client => ENV_CLIENT_ID,
			Self::Team => ENV_TEAM_ID,
			Self::Key => ENV_KEY_ID,
		}
	}

	fn validate(self, value: &str) -> Result<(), IdentifierError> {
		if value.is_empty() {
			return Err(IdentifierError::Empty { kind: self });
		}
		if let Some(position) = value.chars().position(char::is_whitespace) {
			return Err(IdentifierError::ContainsWhitespace { kind: self, position });
		}

		let len = value.chars().count();

		if len > MAX_LEN {
			return Err(IdentifierError::TooLong { kind: self, len, max: MAX_LEN });
		}

		Ok(())
	}
}
impl Display for IdentifierKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(match self {
			Self::Client => "Client",
			Self::Team => "Team",
			Self::Key => "Key",
		})
	}
}

/// Error returned when an identifier is rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Offending identifier.
		kind: IdentifierKind,
	},
	/// The identifier contains whitespace, typically from a pasted or padded value.
	#[error("{kind} identifier contains whitespace at character {position}.")]
	ContainsWhitespace {
		/// Offending identifier.
		kind: IdentifierKind,
		/// Character index of the first whitespace.
		position: usize,
	},
	/// The identifier is longer than any issued value.
	#[error("{kind} identifier is {len} characters long; at most {max} are allowed.")]
	TooLong {
		/// Offending identifier.
		kind: IdentifierKind,
		/// Character count of the rejected value.
		len: usize,
		/// Maximum permitted character count.
		max: usize,
	},
}

macro_rules! credential_id {
	($(#[$meta:meta])* $name:ident => $kind:ident) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Identifier kind.
			pub const KIND: IdentifierKind = IdentifierKind::$kind;

			/// Validates and wraps `value`.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				Self::try_from(value.as_ref().to_owned())
			}

			/// Reads and validates the identifier from its `SEARCH_ADS_*` variable.
			pub fn from_env() -> Result<Self, CredentialError> {
				let name = Self::KIND.env_var();
				let value = std::env::var(name)
					.ok()
					.filter(|value| !value.is_empty())
					.ok_or(CredentialError::MissingEnv { name })?;

				Ok(Self::try_from(value)?)
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::KIND.validate(&value)?;

				Ok(Self(value))
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}Id({})", Self::KIND, self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

credential_id! {
	/// Client identifier (`SEARCHADS.<uuid>`); the assertion subject and `client_id` field.
	ClientId => Client
}
credential_id! {
	/// Team identifier (`SEARCHADS.<uuid>`); the assertion issuer.
	TeamId => Team
}
credential_id! {
	/// Key identifier shown next to the uploaded public key; the assertion `kid` header.
	KeyId => Key
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::BTreeSet;
	// self
	use super::*;

	#[test]
	fn padded_values_are_rejected_with_position() {
		assert_eq!(
			ClientId::new("SEARCHADS.abc ").expect_err("Trailing space should be rejected."),
			IdentifierError::ContainsWhitespace { kind: IdentifierKind::Client, position: 13 }
		);
		assert_eq!(
			TeamId::new("").expect_err("Empty team should be rejected."),
			IdentifierError::Empty { kind: IdentifierKind::Team }
		);
		assert!(KeyId::new(format!("key{}id", '\u{00A0}')).is_err());
	}

	#[test]
	fn length_limit_counts_characters() {
		KeyId::new("é".repeat(MAX_LEN)).expect("Multi-byte identifier at the limit should pass.");

		let err = KeyId::new("a".repeat(MAX_LEN + 1)).expect_err("Overlong key should fail.");

		assert_eq!(
			err.to_string(),
			"Key identifier is 129 characters long; at most 128 are allowed."
		);
	}

	#[test]
	fn deserialization_validates() {
		let client: ClientId = serde_json::from_str("\"SEARCHADS.2f8c\"")
			.expect("Client identifier should deserialize.");

		assert_eq!(&*client, "SEARCHADS.2f8c");
		assert_eq!(format!("{client:?}"), "ClientId(SEARCHADS.2f8c)");
		assert!(serde_json::from_str::<TeamId>("\"\"").is_err());
	}

	#[test]
	fn identifiers_borrow_as_str() {
		let keys = BTreeSet::from([KeyId::new("K1").expect("Key should be valid.")]);

		assert!(keys.contains("K1"));
		assert_eq!(KeyId::KIND.env_var(), "SEARCH_ADS_KEY_ID");
	}
}
