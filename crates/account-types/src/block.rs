//! Block selectors.
//!
//! A [`BlockTag`] is either an explicit height or one of the named tags a node
//! resolves on its side. Requests accept a JSON number, a decimal or
//! `0x`-prefixed string, or one of the tag names.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Block selector accepted by header and block lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockTag {
	/// An explicit block height.
	Number(u64),
	#[default]
	Latest,
	Safe,
	Finalized,
	Pending,
	Earliest,
}

impl BlockTag {
	/// Encodes the tag the way JSON-RPC block parameters expect it.
	///
	/// Heights become minimal `0x`-prefixed hex quantities (`0x0` for genesis).
	pub fn to_rpc_arg(&self) -> String {
		match self {
			BlockTag::Number(height) => format!("{:#x}", height),
			BlockTag::Latest => "latest".to_string(),
			BlockTag::Safe => "safe".to_string(),
			BlockTag::Finalized => "finalized".to_string(),
			BlockTag::Pending => "pending".to_string(),
			BlockTag::Earliest => "earliest".to_string(),
		}
	}
}

impl fmt::Display for BlockTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BlockTag::Number(height) => write!(f, "{}", height),
			other => f.write_str(&other.to_rpc_arg()),
		}
	}
}

impl From<u64> for BlockTag {
	fn from(height: u64) -> Self {
		BlockTag::Number(height)
	}
}

impl FromStr for BlockTag {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"latest" => Ok(BlockTag::Latest),
			"safe" => Ok(BlockTag::Safe),
			"finalized" => Ok(BlockTag::Finalized),
			"pending" => Ok(BlockTag::Pending),
			"earliest" => Ok(BlockTag::Earliest),
			other => {
				let parsed = match other.strip_prefix("0x") {
					Some(hex) => u64::from_str_radix(hex, 16),
					None => other.parse::<u64>(),
				};
				parsed
					.map(BlockTag::Number)
					.map_err(|_| format!("invalid block tag '{}'", other))
			},
		}
	}
}

impl Serialize for BlockTag {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			BlockTag::Number(height) => serializer.serialize_u64(*height),
			other => serializer.serialize_str(&other.to_rpc_arg()),
		}
	}
}

impl<'de> Deserialize<'de> for BlockTag {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Repr {
			Number(u64),
			Text(String),
		}

		match Repr::deserialize(deserializer)? {
			Repr::Number(height) => Ok(BlockTag::Number(height)),
			Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
		}
	}
}
