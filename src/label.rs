use std::sync::LazyLock;

use regex::Regex;

use crate::text::char_len;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").expect("valid non-word pattern"));
static CHAPTER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^(?:cap[ií]tulo|chapter|cap|parte|part|item|se[çc][aã]o|section|unidade|unit|ap[eê]ndice|appendix)\s+\d+[\s.\-—–:]*",
	)
	.expect("valid chapter prefix pattern")
});

/// Which normalization made a label match its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchTier {
	Spacing,
	PrefixStripped,
	AlphanumericOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelMatchStatus {
	Matched(MatchTier),
	NotFound,
	/// Too short to say anything useful; not a failure.
	SkippedShort,
	/// The entry is not a visual table of contents link, or its target did not resolve.
	NotApplicable,
}

/// Lowercases, collapses whitespace, then drops punctuation.
///
/// Punctuation standing between two spaces leaves both behind, so "a — b" becomes "a  b".
#[must_use]
pub fn normalize_spacing(text: &str) -> String {
	let lowered = text.to_lowercase();
	let collapsed = WHITESPACE.replace_all(&lowered, " ");
	PUNCTUATION.replace_all(&collapsed, "").trim().to_string()
}

/// Removes a leading "chapter 3"-style prefix from an already normalized label.
///
/// Returns `None` when there was no prefix or nothing would be left.
#[must_use]
pub fn strip_chapter_prefix(normalized: &str) -> Option<String> {
	let stripped = CHAPTER_PREFIX.replace(normalized, "");
	let stripped = stripped.trim();
	if stripped == normalized || stripped.is_empty() { None } else { Some(stripped.to_string()) }
}

/// Lowercased word characters only, so text split across inline spans compares equal.
#[must_use]
pub fn alphanumeric_only(text: &str) -> String {
	NON_WORD.replace_all(&text.to_lowercase(), "").into_owned()
}

/// Checks that a link label plausibly appears in the body text of its target.
///
/// Labels of `min_length` characters or fewer are skipped.
#[must_use]
pub fn match_label(label: &str, target_text: &str, min_length: usize) -> LabelMatchStatus {
	if char_len(label.trim()) <= min_length {
		return LabelMatchStatus::SkippedShort;
	}
	let normalized_label = normalize_spacing(label);
	let normalized_target = normalize_spacing(target_text);
	if !normalized_label.is_empty() && normalized_target.contains(&normalized_label) {
		return LabelMatchStatus::Matched(MatchTier::Spacing);
	}
	if let Some(shorter) = strip_chapter_prefix(&normalized_label) {
		if normalized_target.contains(&shorter) {
			return LabelMatchStatus::Matched(MatchTier::PrefixStripped);
		}
	}
	let compact_label = alphanumeric_only(label);
	if !compact_label.is_empty() && alphanumeric_only(target_text).contains(&compact_label) {
		return LabelMatchStatus::Matched(MatchTier::AlphanumericOnly);
	}
	LabelMatchStatus::NotFound
}
