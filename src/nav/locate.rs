use std::io::{Read, Seek};

use log::{debug, warn};

use crate::archive::EpubArchive;

const NAV_DOCUMENT_NAME: &str = "nav.xhtml";
const NCX_DOCUMENT_NAME: &str = "toc.ncx";
const VISUAL_PREFERRED_NAMES: [&str; 2] = ["sumario.xhtml", "sumário.xhtml"];
const VISUAL_FALLBACK_NAMES: [&str; 2] = ["toc.xhtml", "contents.xhtml"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
	Nav3,
	Ncx,
	VisualHtml,
}

impl SourceKind {
	#[must_use]
	pub const fn describe(self) -> &'static str {
		match self {
			Self::Nav3 => "nav document (EPUB 3)",
			Self::Ncx => "NCX (EPUB 2)",
			Self::VisualHtml => "visual table of contents",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationSource {
	pub kind: SourceKind,
	pub path: String,
}

/// At most one source of each kind; `None` means the kind is absent from the book.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationSources {
	pub nav: Option<NavigationSource>,
	pub ncx: Option<NavigationSource>,
	pub visual: Option<NavigationSource>,
}

impl NavigationSources {
	#[must_use]
	pub const fn is_empty(&self) -> bool {
		self.nav.is_none() && self.ncx.is_none() && self.visual.is_none()
	}
}

pub fn locate_sources<R: Read + Seek>(archive: &mut EpubArchive<R>, sniff_bytes: usize) -> NavigationSources {
	let nav = find_by_name(archive, &[NAV_DOCUMENT_NAME])
		.or_else(|| sniff_nav_document(archive, sniff_bytes))
		.map(|path| NavigationSource { kind: SourceKind::Nav3, path });
	let ncx = find_by_name(archive, &[NCX_DOCUMENT_NAME]).map(|path| NavigationSource { kind: SourceKind::Ncx, path });
	let visual = find_visual_page(archive).map(|path| NavigationSource { kind: SourceKind::VisualHtml, path });
	debug!("navigation sources: nav={nav:?} ncx={ncx:?} visual={visual:?}");
	NavigationSources { nav, ncx, visual }
}

fn find_by_name<R: Read + Seek>(archive: &EpubArchive<R>, needles: &[&str]) -> Option<String> {
	archive
		.names()
		.iter()
		.find(|name| {
			let lower = name.to_lowercase();
			needles.iter().any(|needle| lower.contains(needle))
		})
		.cloned()
}

fn find_visual_page<R: Read + Seek>(archive: &EpubArchive<R>) -> Option<String> {
	[&VISUAL_PREFERRED_NAMES, &VISUAL_FALLBACK_NAMES].into_iter().find_map(|needles| {
		archive
			.names()
			.iter()
			.find(|name| {
				let lower = name.to_lowercase();
				needles.iter().any(|needle| lower.contains(needle))
			})
			.cloned()
	})
}

fn sniff_nav_document<R: Read + Seek>(archive: &mut EpubArchive<R>, sniff_bytes: usize) -> Option<String> {
	let candidates: Vec<String> = archive
		.names()
		.iter()
		.filter(|name| {
			let lower = name.to_lowercase();
			lower.ends_with(".xhtml") || lower.ends_with(".html")
		})
		.cloned()
		.collect();
	candidates.into_iter().find(|name| match archive.read_prefix(name, sniff_bytes) {
		Ok(prefix) => String::from_utf8_lossy(&prefix).to_ascii_lowercase().contains("<nav"),
		Err(err) => {
			warn!("Skipping '{name}' while looking for a nav document: {err:#}");
			false
		}
	})
}
