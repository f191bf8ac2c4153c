//! Hex string helpers shared by the adaptors.

/// Adds a "0x" prefix unless the string already carries one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Strips a leading "0x" or "0X" if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Returns true for the textual forms that mean "no contract".
///
/// Accepts the empty string, the `none` placeholder, the short `0x00`
/// sentinel and any all-zero hex string such as the zero address.
pub fn is_zero_address(address: &str) -> bool {
	let address = address.trim();
	if address.eq_ignore_ascii_case("none") {
		return true;
	}
	let trimmed = without_0x_prefix(address);
	trimmed.is_empty() || trimmed.chars().all(|c| c == '0')
}
