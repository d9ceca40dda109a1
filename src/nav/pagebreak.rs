use std::{
	io::{Read, Seek},
	path::Path,
	sync::LazyLock,
};

use log::{debug, warn};
use regex::Regex;

use crate::{archive::EpubArchive, nav::PageEntry, text::clean_label};

static PAGEBREAK_TAG: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?i)<[a-z][^>]*?\s(?:epub:type|role)\s*=\s*["'](?:doc-)?pagebreak["'][^>]*>"#)
		.expect("valid pagebreak pattern")
});
static ID_ATTR: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?i)\sid\s*=\s*["']([^"']*)["']"#).expect("valid id pattern"));
static ARIA_LABEL_ATTR: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?i)\saria-label\s*=\s*["']([^"']*)["']"#).expect("valid aria-label pattern"));
static TITLE_ATTR: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?i)\stitle\s*=\s*["']([^"']*)["']"#).expect("valid title pattern"));

/// Rebuilds a page list from inline page-break markers, for books that declare none.
///
/// Content files are visited in archive order and markers in document order.
pub fn scan_archive<R: Read + Seek>(archive: &mut EpubArchive<R>, label_max_chars: usize) -> Vec<PageEntry> {
	let mut entries = Vec::new();
	for file in archive.content_files() {
		match archive.read_text(&file) {
			Ok(content) => entries.extend(scan_text(&content, &file, label_max_chars)),
			Err(err) => warn!("Skipping '{file}' while scanning for page breaks: {err:#}"),
		}
	}
	debug!("page-break scan found {} markers", entries.len());
	entries
}

/// Page-break markers of one content file. Hrefs are relative to `file`.
#[must_use]
pub fn scan_text(content: &str, file: &str, label_max_chars: usize) -> Vec<PageEntry> {
	let file_name = Path::new(file).file_name().map_or_else(|| file.to_string(), |name| name.to_string_lossy().into_owned());
	PAGEBREAK_TAG
		.find_iter(content)
		.map(|tag| {
			let tag = tag.as_str();
			let id = attribute(&ID_ATTR, tag);
			let label = attribute(&ARIA_LABEL_ATTR, tag)
				.or_else(|| attribute(&TITLE_ATTR, tag))
				.or_else(|| id.clone())
				.unwrap_or_else(|| "?".to_string());
			let href = id.map_or_else(|| file_name.clone(), |id| format!("{file_name}#{id}"));
			PageEntry::new(clean_label(&label, label_max_chars), href, file)
		})
		.collect()
}

fn attribute(pattern: &Regex, tag: &str) -> Option<String> {
	pattern.captures(tag).map(|caps| caps[1].to_string()).filter(|value| !value.trim().is_empty())
}
