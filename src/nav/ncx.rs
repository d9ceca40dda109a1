use anyhow::{Context, Result};
use log::debug;
use roxmltree::{Document, Node};

use crate::{
	nav::{Extraction, NavEntry, collect_text, find_child_element, is_element_named, xml_parsing_options},
	text::clean_label,
};

/// Reads `navPoint` and `pageTarget` entries of an EPUB 2 NCX, in document order.
///
/// # Errors
///
/// Returns an error if the NCX is not well-formed XML.
pub fn extract(content: &str, source: &str, label_max_chars: usize) -> Result<Extraction> {
	let document = Document::parse_with_options(content, xml_parsing_options())
		.with_context(|| format!("Failed to parse NCX '{source}'"))?;
	let toc = collect_targets(&document, "navPoint", source, label_max_chars);
	let pages = collect_targets(&document, "pageTarget", source, label_max_chars);
	debug!("{source}: {} navPoints, {} pageTargets", toc.len(), pages.len());
	Ok(Extraction { toc, pages })
}

fn collect_targets(document: &Document<'_>, element: &str, source: &str, label_max_chars: usize) -> Vec<NavEntry> {
	document
		.descendants()
		.filter(|node| is_element_named(*node, element))
		.filter_map(|node| entry_from_target(node, source, label_max_chars))
		.collect()
}

fn entry_from_target(node: Node<'_, '_>, source: &str, label_max_chars: usize) -> Option<NavEntry> {
	let Some(href) = find_child_element(node, "content").and_then(|content| content.attribute("src")) else {
		debug!("{source}: skipping {} without content/@src", node.tag_name().name());
		return None;
	};
	let mut label = find_child_element(node, "navLabel")
		.and_then(|nav_label| find_child_element(nav_label, "text"))
		.map(|text| clean_label(&collect_text(text), label_max_chars))
		.unwrap_or_default();
	if label.is_empty() {
		if let Some(value) = node.attribute("value") {
			label = clean_label(value, label_max_chars);
		}
	}
	Some(NavEntry::new(label, href, source))
}
