use std::sync::LazyLock;

use regex::Regex;
use roxmltree::{Node, NodeType, ParsingOptions};

pub mod locate;
pub mod nav3;
pub mod ncx;
pub mod pagebreak;
pub mod visual;

const TYPE_ATTRIBUTES: [&str; 3] = ["epub:type", "type", "role"];
pub const TOC_TYPES: [&str; 2] = ["toc", "doc-toc"];
pub const PAGE_LIST_TYPES: [&str; 2] = ["page-list", "doc-pagelist"];

static URI_SCHEME: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid URI scheme regex"));

/// One link declared by a navigation source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavEntry {
	/// Visible text, whitespace-collapsed and truncated.
	pub label: String,
	/// Raw href as written, fragment included.
	pub href: String,
	/// Archive path of the document the entry was read from.
	pub source: String,
}

impl NavEntry {
	#[must_use]
	pub fn new(label: impl Into<String>, href: impl Into<String>, source: impl Into<String>) -> Self {
		Self { label: label.into(), href: href.into(), source: source.into() }
	}
}

pub type TocEntry = NavEntry;
pub type PageEntry = NavEntry;

#[derive(Clone, Debug, Default)]
pub struct Extraction {
	pub toc: Vec<TocEntry>,
	pub pages: Vec<PageEntry>,
}

/// True when one of the `epub:type`, `type` or `role` attributes lists one of `types`.
pub fn is_typed_as<I, N, V>(attributes: I, types: &[&str]) -> bool
where
	I: IntoIterator<Item = (N, V)>,
	N: AsRef<str>,
	V: AsRef<str>,
{
	attributes.into_iter().any(|(name, value)| {
		let name = name.as_ref();
		TYPE_ATTRIBUTES.iter().any(|attr| name.eq_ignore_ascii_case(attr))
			&& value
				.as_ref()
				.split_ascii_whitespace()
				.any(|part| types.iter().any(|wanted| part.eq_ignore_ascii_case(wanted)))
	})
}

/// True when `href` starts with a URI scheme and so never points into the archive.
#[must_use]
pub fn is_external_url(href: &str) -> bool {
	URI_SCHEME.is_match(href.trim_start())
}

pub(crate) fn xml_parsing_options<'input>() -> ParsingOptions<'input> {
	ParsingOptions { allow_dtd: true, ..ParsingOptions::default() }
}

pub(crate) fn is_element_named(node: Node<'_, '_>, name: &str) -> bool {
	node.node_type() == NodeType::Element && node.tag_name().name() == name
}

pub(crate) fn find_child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
	node.children().find(|child| is_element_named(*child, name))
}

pub(crate) fn collect_text(node: Node<'_, '_>) -> String {
	node.descendants().filter(|desc| desc.node_type() == NodeType::Text).filter_map(|desc| desc.text()).collect()
}
