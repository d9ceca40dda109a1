use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::{
	nav::{NavEntry, PAGE_LIST_TYPES, PageEntry, TocEntry, is_external_url, is_typed_as},
	text::{clean_label, collapse_whitespace, trim_string},
};

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("valid body selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));
// Page numbers, separators and bullets that legitimately sit outside links.
static UNLINKED_NOISE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[\d\s.\-–—•|]+").expect("valid unlinked text pattern"));

/// The human-facing table of contents page, as far as link checking cares.
#[derive(Clone, Debug, Default)]
pub struct VisualToc {
	/// Every internal `<a href>` of the page, in document order.
	pub anchors: Vec<TocEntry>,
	/// Hrefs pointing outside the book; not resolved.
	pub external: Vec<String>,
	/// Anchors inside the first element typed as a page list.
	pub page_entries: Vec<PageEntry>,
	/// Body text outside any link, with page numbers and separators collapsed out.
	pub unlinked_text: String,
}

#[must_use]
pub fn parse(content: &str, source: &str, label_max_chars: usize) -> VisualToc {
	let document = Html::parse_document(content);
	let mut toc = VisualToc::default();
	for anchor in document.select(&LINK) {
		let href = anchor.value().attr("href").unwrap_or_default();
		if is_external_url(href) {
			toc.external.push(href.to_string());
			continue;
		}
		toc.anchors.push(entry_from_anchor(anchor, source, label_max_chars));
	}
	let page_list = document
		.root_element()
		.descendants()
		.filter_map(ElementRef::wrap)
		.find(|element| is_typed_as(element.value().attrs(), &PAGE_LIST_TYPES));
	if let Some(page_list) = page_list {
		toc.page_entries = page_list
			.select(&LINK)
			.filter(|anchor| !is_external_url(anchor.value().attr("href").unwrap_or_default()))
			.map(|anchor| entry_from_anchor(anchor, source, label_max_chars))
			.collect();
	}
	toc.unlinked_text = unlinked_text(&document);
	toc
}

/// Text nodes of `<body>` joined by single spaces.
///
/// Joining with a separator keeps words apart across block elements; labels split over
/// several inline spans are matched by the alphanumeric-only comparison instead.
#[must_use]
pub fn body_text(content: &str) -> String {
	let document = Html::parse_document(content);
	let Some(body) = document.select(&BODY).next() else {
		return String::new();
	};
	body.descendants()
		.filter(|node| !inside_element(*node, &["script", "style"]))
		.filter_map(|node| match node.value() {
			Node::Text(text) => Some(text.text.to_string()),
			_ => None,
		})
		.collect::<Vec<_>>()
		.join(" ")
}

fn entry_from_anchor(anchor: ElementRef<'_>, source: &str, label_max_chars: usize) -> NavEntry {
	let href = anchor.value().attr("href").unwrap_or_default();
	let text: String = anchor.text().collect();
	NavEntry::new(clean_label(&text, label_max_chars), href, source)
}

fn unlinked_text(document: &Html) -> String {
	let Some(body) = document.select(&BODY).next() else {
		return String::new();
	};
	let parts: Vec<String> = body
		.descendants()
		.filter(|node| !inside_element(*node, &["a", "script", "style"]))
		.filter_map(|node| match node.value() {
			Node::Text(text) => Some(trim_string(&collapse_whitespace(&text.text))),
			_ => None,
		})
		.filter(|part| !part.is_empty())
		.collect();
	UNLINKED_NOISE.replace_all(&parts.join(" "), " ").trim().to_string()
}

fn inside_element(node: NodeRef<'_, Node>, names: &[&str]) -> bool {
	node.ancestors().any(|ancestor| ancestor.value().as_element().is_some_and(|element| names.contains(&element.name())))
}
