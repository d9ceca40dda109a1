use std::{
	collections::HashMap,
	io::{Read, Seek},
	path::{Component, Path, PathBuf},
};

use anyhow::{Result, anyhow};
use log::{debug, warn};

use crate::{
	archive::EpubArchive,
	label::LabelMatchStatus,
	nav::{NavEntry, is_external_url, visual},
	text::url_decode,
};

/// Outcome of following one navigation entry into the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLink {
	pub entry: NavEntry,
	/// Archive path the href points at after joining with the entry's source.
	pub requested: String,
	/// Actual entry name, when the archive has one.
	pub target_path: Option<String>,
	pub anchor: Option<String>,
	/// `None` when there was no fragment or no target to look in.
	pub anchor_found: Option<bool>,
	pub label_match: LabelMatchStatus,
	pub external: bool,
}

impl ResolvedLink {
	#[must_use]
	pub const fn is_resolved(&self) -> bool {
		self.target_path.is_some()
	}

	#[must_use]
	pub fn is_missing_anchor(&self) -> bool {
		self.anchor_found == Some(false)
	}

	/// True for links that count as broken: unresolved, or resolved without their anchor.
	#[must_use]
	pub fn is_broken(&self) -> bool {
		!self.external && (!self.is_resolved() || self.is_missing_anchor())
	}
}

struct CachedTarget {
	raw: String,
	body: Option<String>,
}

/// Resolves hrefs against one archive, caching target documents for the length of a run.
pub struct LinkResolver<'a, R: Read + Seek> {
	archive: &'a mut EpubArchive<R>,
	cache: HashMap<String, CachedTarget>,
}

impl<'a, R: Read + Seek> LinkResolver<'a, R> {
	pub fn new(archive: &'a mut EpubArchive<R>) -> Self {
		Self { archive, cache: HashMap::new() }
	}

	pub fn archive(&mut self) -> &mut EpubArchive<R> {
		self.archive
	}

	pub fn resolve(&mut self, entry: &NavEntry) -> ResolvedLink {
		let mut link = ResolvedLink {
			entry: entry.clone(),
			requested: entry.href.clone(),
			target_path: None,
			anchor: None,
			anchor_found: None,
			label_match: LabelMatchStatus::NotApplicable,
			external: false,
		};
		if is_external_url(&entry.href) {
			link.external = true;
			return link;
		}
		let (path, fragment) = split_href(&entry.href);
		link.requested = if path.is_empty() { entry.source.clone() } else { join_target(&entry.source, path) };
		link.anchor = fragment.map(ToString::to_string);
		link.target_path = self.lookup(&link.requested);
		if let (Some(target), Some(anchor)) = (link.target_path.clone(), fragment) {
			link.anchor_found = Some(self.has_anchor(&target, anchor));
		}
		debug!("{} -> {:?} (anchor found: {:?})", entry.href, link.target_path, link.anchor_found);
		link
	}

	/// Decoded contents of an archive entry, read at most once per run.
	///
	/// # Errors
	///
	/// Returns an error if no entry matches `path` or it cannot be read.
	pub fn read_text(&mut self, path: &str) -> Result<&str> {
		Ok(self.cached(path)?.raw.as_str())
	}

	/// Lowercased text of the `<body>` of `path`.
	///
	/// # Errors
	///
	/// Same conditions as [`Self::read_text`].
	pub fn body_text(&mut self, path: &str) -> Result<&str> {
		let cached = self.cached(path)?;
		if cached.body.is_none() {
			cached.body = Some(visual::body_text(&cached.raw).to_lowercase());
		}
		Ok(cached.body.as_deref().unwrap_or_default())
	}

	fn cached(&mut self, path: &str) -> Result<&mut CachedTarget> {
		if !self.cache.contains_key(path) {
			let raw = self.archive.read_text(path)?;
			self.cache.insert(path.to_string(), CachedTarget { raw, body: None });
		}
		self.cache.get_mut(path).ok_or_else(|| anyhow!("Entry not cached: '{path}'"))
	}

	fn lookup(&self, requested: &str) -> Option<String> {
		if requested.is_empty() {
			return None;
		}
		let found = self.archive.resolve_actual_name(requested).map(ToString::to_string);
		found.or_else(|| {
			let decoded = url_decode(requested);
			if decoded == requested { None } else { self.archive.resolve_actual_name(&decoded).map(ToString::to_string) }
		})
	}

	fn has_anchor(&mut self, target: &str, anchor: &str) -> bool {
		let decoded = url_decode(anchor);
		match self.read_text(target) {
			Ok(content) => contains_id(content, anchor) || (decoded != anchor && contains_id(content, &decoded)),
			Err(err) => {
				warn!("Could not read '{target}' to look for '#{anchor}': {err:#}");
				false
			}
		}
	}
}

fn contains_id(content: &str, id: &str) -> bool {
	content.contains(&format!("id=\"{id}\"")) || content.contains(&format!("id='{id}'"))
}

/// Splits on the first `#`. An empty fragment counts as none.
#[must_use]
pub fn split_href(href: &str) -> (&str, Option<&str>) {
	match href.split_once('#') {
		Some((path, fragment)) => (path, Some(fragment).filter(|fragment| !fragment.is_empty())),
		None => (href, None),
	}
}

/// Archive path of `target` as referenced from the document at `source`.
#[must_use]
pub fn join_target(source: &str, target: &str) -> String {
	if let Some(absolute) = target.strip_prefix('/') {
		return normalize_path(Path::new(absolute));
	}
	let mut base = PathBuf::from(source);
	base.pop();
	normalize_path(&base.join(target))
}

fn normalize_path(path: &Path) -> String {
	let mut components = Vec::new();
	for component in path.components() {
		match component {
			Component::ParentDir => {
				components.pop();
			}
			Component::Normal(part) => components.push(part.to_string_lossy().into_owned()),
			_ => {}
		}
	}
	components.join("/")
}
