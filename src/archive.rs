use std::{
	fs::File,
	io::{BufReader, Read, Seek},
	path::Path,
};

use anyhow::{Context, Result, anyhow};
use zip::ZipArchive;

use crate::encoding::decode_entry;

const CONTENT_EXTENSIONS: [&str; 3] = [".xhtml", ".html", ".htm"];

/// Read-only view over an EPUB container.
///
/// Lookups are case-insensitive and permissive: a candidate path is present when it is
/// contained in some entry name, so `Text/ch1.xhtml` finds `OEBPS/Text/Ch1.xhtml`.
pub struct EpubArchive<R: Read + Seek = BufReader<File>> {
	zip: ZipArchive<R>,
	names: Vec<String>,
	lower_names: Vec<String>,
}

impl EpubArchive<BufReader<File>> {
	/// Opens the EPUB at `path`.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be opened or is not a readable zip container.
	pub fn open(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("Failed to open EPUB '{}'", path.display()))?;
		Self::new(BufReader::new(file)).with_context(|| format!("Failed to read EPUB '{}'", path.display()))
	}
}

impl<R: Read + Seek> EpubArchive<R> {
	/// # Errors
	///
	/// Returns an error if the reader does not hold a zip container.
	pub fn new(reader: R) -> Result<Self> {
		let zip = ZipArchive::new(reader).context("Failed to read zip central directory")?;
		let names: Vec<String> = zip.file_names().map(ToString::to_string).collect();
		let lower_names = names.iter().map(|name| name.to_lowercase()).collect();
		Ok(Self { zip, names, lower_names })
	}

	#[must_use]
	pub fn names(&self) -> &[String] {
		&self.names
	}

	/// Entries that are XHTML or HTML documents, in archive order.
	#[must_use]
	pub fn content_files(&self) -> Vec<String> {
		self.names
			.iter()
			.zip(&self.lower_names)
			.filter(|(_, lower)| CONTENT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)))
			.map(|(name, _)| name.clone())
			.collect()
	}

	#[must_use]
	pub fn exists(&self, path: &str) -> bool {
		let needle = path.to_lowercase();
		self.lower_names.iter().any(|name| name.contains(&needle))
	}

	/// Original-cased name of the entry matching `path`.
	///
	/// An exact case-insensitive match is preferred; otherwise the first entry containing the
	/// candidate is returned.
	#[must_use]
	pub fn resolve_actual_name(&self, path: &str) -> Option<&str> {
		let needle = path.to_lowercase();
		let index = self
			.lower_names
			.iter()
			.position(|name| *name == needle)
			.or_else(|| self.lower_names.iter().position(|name| name.contains(&needle)))?;
		Some(self.names[index].as_str())
	}

	/// # Errors
	///
	/// Returns an error if no entry matches `path` or the entry cannot be decompressed.
	pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
		let name = self.actual_name_owned(path)?;
		let mut entry = self.zip.by_name(&name).with_context(|| format!("Failed to get entry '{name}'"))?;
		let mut contents = Vec::new();
		entry.read_to_end(&mut contents).with_context(|| format!("Failed to read entry '{name}'"))?;
		Ok(contents)
	}

	/// # Errors
	///
	/// Same conditions as [`Self::read`].
	pub fn read_text(&mut self, path: &str) -> Result<String> {
		self.read(path).map(|bytes| decode_entry(&bytes))
	}

	/// Reads at most `limit` bytes from the start of the entry.
	///
	/// # Errors
	///
	/// Same conditions as [`Self::read`].
	pub fn read_prefix(&mut self, path: &str, limit: usize) -> Result<Vec<u8>> {
		let name = self.actual_name_owned(path)?;
		let entry = self.zip.by_name(&name).with_context(|| format!("Failed to get entry '{name}'"))?;
		let mut contents = Vec::with_capacity(limit);
		entry
			.take(u64::try_from(limit).unwrap_or(u64::MAX))
			.read_to_end(&mut contents)
			.with_context(|| format!("Failed to read entry '{name}'"))?;
		Ok(contents)
	}

	fn actual_name_owned(&self, path: &str) -> Result<String> {
		self.resolve_actual_name(path).map(ToString::to_string).ok_or_else(|| anyhow!("Entry not found: '{path}'"))
	}
}
