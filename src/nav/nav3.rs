use anyhow::{Context, Result};
use log::debug;
use roxmltree::{Document, Node, NodeType};

use crate::{
	nav::{Extraction, NavEntry, PAGE_LIST_TYPES, TOC_TYPES, collect_text, is_element_named, is_typed_as, xml_parsing_options},
	text::clean_label,
};

/// Reads the `toc` and `page-list` navs of an EPUB 3 navigation document.
///
/// # Errors
///
/// Returns an error if the document is not well-formed XML.
pub fn extract(content: &str, source: &str, label_max_chars: usize) -> Result<Extraction> {
	let document = Document::parse_with_options(content, xml_parsing_options())
		.with_context(|| format!("Failed to parse nav document '{source}'"))?;
	let toc = find_typed_nav(&document, &TOC_TYPES)
		.map(|nav| collect_anchors(nav, source, label_max_chars))
		.unwrap_or_default();
	let pages = find_typed_nav(&document, &PAGE_LIST_TYPES)
		.map(|nav| collect_anchors(nav, source, label_max_chars))
		.unwrap_or_default();
	debug!("{source}: {} toc anchors, {} page-list anchors", toc.len(), pages.len());
	Ok(Extraction { toc, pages })
}

fn find_typed_nav<'a, 'input>(document: &'a Document<'input>, types: &[&str]) -> Option<Node<'a, 'input>> {
	document.descendants().find(|node| {
		node.node_type() == NodeType::Element
			&& node.tag_name().name() == "nav"
			&& is_typed_as(node.attributes().map(|attr| (attr.name(), attr.value())), types)
	})
}

fn collect_anchors(nav: Node<'_, '_>, source: &str, label_max_chars: usize) -> Vec<NavEntry> {
	nav.descendants()
		.filter(|node| is_element_named(*node, "a"))
		.filter_map(|anchor| {
			let Some(href) =
				anchor.attribute("href").or_else(|| anchor.attribute(("http://www.w3.org/1999/xlink", "href")))
			else {
				debug!("{source}: skipping anchor without href");
				return None;
			};
			Some(NavEntry::new(clean_label(&collect_text(anchor), label_max_chars), href, source))
		})
		.collect()
}
