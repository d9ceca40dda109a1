use std::str;

use encoding_rs::{Encoding, WINDOWS_1252};

/// Decodes an archive entry to text.
///
/// A byte order mark wins; otherwise valid UTF-8 is taken as is and anything else is read as
/// Windows-1252, which is what legacy authoring tools emit for Latin text.
#[must_use]
pub fn decode_entry(input: &[u8]) -> String {
	if let Some((encoding, bom_len)) = Encoding::for_bom(input) {
		let (decoded, _) = encoding.decode_without_bom_handling(&input[bom_len..]);
		return decoded.into_owned();
	}
	if let Ok(s) = str::from_utf8(input) {
		return s.to_string();
	}
	let (decoded, _, _) = WINDOWS_1252.decode(input);
	decoded.into_owned()
}
