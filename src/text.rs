use std::sync::LazyLock;

use regex::Regex;

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid page number pattern"));

#[must_use]
pub fn remove_soft_hyphens(input: &str) -> String {
	input.replace('\u{00AD}', "")
}

#[must_use]
pub fn url_decode(input: &str) -> String {
	percent_encoding::percent_decode_str(input).decode_utf8_lossy().into_owned()
}

#[must_use]
pub fn collapse_whitespace(input: &str) -> String {
	let mut result = String::with_capacity(input.len());
	let mut prev_was_space = false;
	for ch in input.chars() {
		if is_space_like(ch) {
			if !prev_was_space {
				result.push(' ');
				prev_was_space = true;
			}
		} else {
			result.push(ch);
			prev_was_space = false;
		}
	}
	result
}

#[must_use]
pub fn trim_string(s: &str) -> String {
	s.trim_matches(is_space_like).to_string()
}

pub const fn is_space_like(ch: char) -> bool {
	ch.is_whitespace() || matches!(ch, '\u{00A0}' | '\u{200B}')
}

/// Collapses whitespace, trims, and cuts the result to at most `max_chars` characters.
#[must_use]
pub fn clean_label(raw: &str, max_chars: usize) -> String {
	let cleaned = trim_string(&collapse_whitespace(&remove_soft_hyphens(raw)));
	truncate_chars(&cleaned, max_chars)
}

#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
	match s.char_indices().nth(max_chars) {
		Some((byte_index, _)) => s[..byte_index].to_string(),
		None => s.to_string(),
	}
}

#[must_use]
pub fn char_len(s: &str) -> usize {
	s.chars().count()
}

/// First run of digits in `label`, e.g. `"Page 10"` gives 10.
#[must_use]
pub fn first_number(label: &str) -> Option<u32> {
	FIRST_NUMBER.find(label).and_then(|m| m.as_str().parse().ok())
}
