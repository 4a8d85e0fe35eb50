//! Provider API keys that never leak through logs or responses

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// String holder for credentials; zeroized on drop, redacted when printed
/// or serialized.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
	pub fn new(secret: impl Into<String>) -> Self {
		Self(secret.into())
	}

	/// Raw value, for building outbound request headers only
	pub fn expose_secret(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString([REDACTED])")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl From<String> for SecretString {
	fn from(secret: String) -> Self {
		Self(secret)
	}
}

impl From<&str> for SecretString {
	fn from(secret: &str) -> Self {
		Self(secret.to_string())
	}
}

impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("[REDACTED]")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(SecretString)
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		let (a, b) = (self.0.as_bytes(), other.0.as_bytes());
		// constant time over the shorter input
		a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
	}
}

impl Eq for SecretString {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secret_is_redacted_everywhere() {
		let key = SecretString::new("lifi-key-123");
		assert_eq!(key.expose_secret(), "lifi-key-123");
		assert!(!format!("{:?}", key).contains("lifi"));
		assert_eq!(key.to_string(), "[REDACTED]");
		assert_eq!(serde_json::to_string(&key).unwrap(), "\"[REDACTED]\"");
	}

	#[test]
	fn test_secret_deserializes_raw_value() {
		let key: SecretString = serde_json::from_str("\"relay-key\"").unwrap();
		assert_eq!(key, SecretString::from("relay-key"));
		assert_ne!(key, SecretString::from("relay-kez"));
	}
}
