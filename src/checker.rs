use std::{
	io::{Read, Seek},
	path::Path,
};

use anyhow::{Error, Result};
use log::{debug, error, info};

use crate::{
	archive::EpubArchive,
	config::CheckerConfig,
	label::{LabelMatchStatus, match_label},
	nav::{
		Extraction, PageEntry, TocEntry,
		locate::{NavigationSource, NavigationSources, SourceKind, locate_sources},
		nav3, ncx, pagebreak,
		visual::{self, VisualToc},
	},
	report::{FindingKind, LogEntry, Severity, Stage, StructureReport, ValidationLog},
	resolve::{LinkResolver, ResolvedLink},
	sequence::{AnomalyKind, detect_anomalies, duplicate_hrefs},
	text::{char_len, truncate_chars},
};

const UNLINKED_EXCERPT_CHARS: usize = 100;

/// Checks the navigation structure of the EPUB at `path`.
///
/// Never fails: an unreadable archive yields a not-ok report with a single fatal entry.
#[must_use]
pub fn check_epub(path: &Path, config: &CheckerConfig) -> StructureReport {
	match EpubArchive::open(path) {
		Ok(mut archive) => check_archive(&mut archive, config),
		Err(err) => fatal_report(&err),
	}
}

/// Same as [`check_epub`] for an EPUB that is already in memory or otherwise open.
#[must_use]
pub fn check_reader<R: Read + Seek>(reader: R, config: &CheckerConfig) -> StructureReport {
	match EpubArchive::new(reader) {
		Ok(mut archive) => check_archive(&mut archive, config),
		Err(err) => fatal_report(&err),
	}
}

#[must_use]
pub fn check_archive<R: Read + Seek>(archive: &mut EpubArchive<R>, config: &CheckerConfig) -> StructureReport {
	StructureCheck::new(archive, config).run()
}

/// Report for a book whose archive could not be opened at all.
#[must_use]
pub fn fatal_report(err: &Error) -> StructureReport {
	error!("Structure check aborted: {err:#}");
	let mut log = ValidationLog::new();
	log.push(LogEntry::new(Severity::Fail, FindingKind::FatalArchiveError, format!("Could not open the EPUB archive: {err:#}")));
	StructureReport::failed(log)
}

struct StructureCheck<'a, R: Read + Seek> {
	resolver: LinkResolver<'a, R>,
	config: &'a CheckerConfig,
	log: ValidationLog,
	stage: Stage,
	broken: usize,
}

impl<'a, R: Read + Seek> StructureCheck<'a, R> {
	fn new(archive: &'a mut EpubArchive<R>, config: &'a CheckerConfig) -> Self {
		Self { resolver: LinkResolver::new(archive), config, log: ValidationLog::new(), stage: Stage::Init, broken: 0 }
	}

	fn run(mut self) -> StructureReport {
		self.enter(Stage::LocateSources);
		let sources = self.locate();
		self.enter(Stage::ExtractToc);
		let extraction = self.extract(&sources);
		self.enter(Stage::ResolveTocLinks);
		self.resolve_toc(&extraction.toc);
		self.enter(Stage::ExtractPageList);
		let visual_toc = sources.visual.as_ref().map(|source| self.parse_visual(source));
		let pages = self.page_entries(extraction.pages, visual_toc.as_ref());
		self.enter(Stage::ResolvePageList);
		self.resolve_pages(&pages);
		self.enter(Stage::ValidateSequence);
		self.validate_sequence(&pages);
		if let (Some(source), Some(visual_toc)) = (&sources.visual, &visual_toc) {
			self.enter(Stage::MatchLabels);
			self.check_visual(source, visual_toc);
		}
		self.enter(Stage::Aggregate);
		self.aggregate()
	}

	fn enter(&mut self, stage: Stage) {
		debug!("{:?} -> {stage:?}", self.stage);
		self.stage = stage;
	}

	fn push(&mut self, entry: LogEntry) {
		self.log.push(entry);
	}

	fn locate(&mut self) -> NavigationSources {
		let sources = locate_sources(self.resolver.archive(), self.config.nav_sniff_bytes);
		for (kind, found) in [
			(SourceKind::Nav3, &sources.nav),
			(SourceKind::Ncx, &sources.ncx),
			(SourceKind::VisualHtml, &sources.visual),
		] {
			let entry = match found {
				Some(source) => LogEntry::new(
					Severity::Info,
					FindingKind::SourceFound,
					format!("Found {}: {}", kind.describe(), source.path),
				)
				.with_source(&source.path),
				None => LogEntry::new(Severity::Info, FindingKind::SourceAbsent, format!("No {} found", kind.describe())),
			};
			self.push(entry);
		}
		if sources.is_empty() {
			self.push(LogEntry::new(
				Severity::Info,
				FindingKind::SourceAbsent,
				"No navigation source found; page breaks in the content files are the only page information",
			));
		}
		sources
	}

	fn extract(&mut self, sources: &NavigationSources) -> Extraction {
		let mut extraction = sources.nav.as_ref().map(|source| self.extract_source(source, nav3::extract)).unwrap_or_default();
		if extraction.toc.is_empty() {
			if let Some(source) = &sources.ncx {
				if sources.nav.is_some() {
					self.push(
						LogEntry::new(
							Severity::Info,
							FindingKind::SourceFound,
							format!("Nav document has no table of contents entries; using NCX {}", source.path),
						)
						.with_source(&source.path),
					);
				}
				let fallback = self.extract_source(source, ncx::extract);
				extraction.toc = fallback.toc;
				if extraction.pages.is_empty() {
					extraction.pages = fallback.pages;
				}
			}
		}
		info!("{} table of contents entries, {} page entries", extraction.toc.len(), extraction.pages.len());
		extraction
	}

	fn extract_source(
		&mut self,
		source: &NavigationSource,
		extract: fn(&str, &str, usize) -> Result<Extraction>,
	) -> Extraction {
		let label_max_chars = self.config.label_max_chars;
		let result =
			self.resolver.read_text(&source.path).and_then(|content| extract(content, &source.path, label_max_chars));
		match result {
			Ok(extraction) => extraction,
			Err(err) => {
				self.push(
					LogEntry::new(
						Severity::Fail,
						FindingKind::ParseFailure,
						format!("Could not read {} {}: {err:#}", source.kind.describe(), source.path),
					)
					.with_source(&source.path),
				);
				Extraction::default()
			}
		}
	}

	fn resolve_toc(&mut self, toc: &[TocEntry]) {
		let mut resolved = 0;
		let mut failed = 0;
		for entry in toc {
			let link = self.resolver.resolve(entry);
			if self.record_link(&link, true) {
				failed += 1;
			} else if !link.external {
				resolved += 1;
				self.push(
					LogEntry::new(
						Severity::Pass,
						FindingKind::LinkResolved,
						format!("\"{}\" -> {}", entry.label, link.requested),
					)
					.with_label(&entry.label)
					.with_href(&entry.href)
					.with_target(link.target_path.as_deref().unwrap_or_default()),
				);
			}
		}
		self.broken += failed;
		let checked = resolved + failed;
		if checked > 0 {
			let severity = if failed == 0 { Severity::Pass } else { Severity::Fail };
			self.push(
				LogEntry::new(
					severity,
					FindingKind::Summary,
					format!("Table of contents: {resolved} of {checked} links resolved"),
				)
				.with_count(checked),
			);
		}
		for duplicate in duplicate_hrefs(toc) {
			self.push(
				LogEntry::new(
					Severity::Info,
					FindingKind::DuplicateHref,
					format!("{} is linked {} times from the table of contents", duplicate.href, duplicate.count),
				)
				.with_href(&duplicate.href)
				.with_count(duplicate.count),
			);
		}
	}

	/// Logs a failed or external link. Returns true when the link is broken.
	fn record_link(&mut self, link: &ResolvedLink, announce_external: bool) -> bool {
		let entry = &link.entry;
		if link.external {
			if announce_external {
				self.push(
					LogEntry::new(Severity::Info, FindingKind::ExternalLink, format!("External link not checked: {}", entry.href))
						.with_label(&entry.label)
						.with_href(&entry.href),
				);
			}
			return false;
		}
		if !link.is_resolved() {
			self.push(
				LogEntry::new(
					Severity::Fail,
					FindingKind::UnresolvedLink,
					format!("\"{}\" -> {} not found", entry.label, link.requested),
				)
				.with_label(&entry.label)
				.with_href(&entry.href)
				.with_target(&link.requested)
				.with_source(&entry.source),
			);
			return true;
		}
		if link.is_missing_anchor() {
			let target = link.target_path.as_deref().unwrap_or_default();
			self.push(
				LogEntry::new(
					Severity::Fail,
					FindingKind::MissingAnchor,
					format!("#{} does not exist in {target}", link.anchor.as_deref().unwrap_or_default()),
				)
				.with_label(&entry.label)
				.with_href(&entry.href)
				.with_target(target)
				.with_source(&entry.source),
			);
			return true;
		}
		false
	}

	fn parse_visual(&mut self, source: &NavigationSource) -> VisualToc {
		let label_max_chars = self.config.label_max_chars;
		let parsed =
			self.resolver.read_text(&source.path).map(|content| visual::parse(content, &source.path, label_max_chars));
		match parsed {
			Ok(visual_toc) => visual_toc,
			Err(err) => {
				self.push(
					LogEntry::new(
						Severity::Fail,
						FindingKind::ParseFailure,
						format!("Could not read {} {}: {err:#}", source.kind.describe(), source.path),
					)
					.with_source(&source.path),
				);
				VisualToc::default()
			}
		}
	}

	fn page_entries(&mut self, technical: Vec<PageEntry>, visual_toc: Option<&VisualToc>) -> Vec<PageEntry> {
		if !technical.is_empty() {
			return technical;
		}
		if let Some(visual_toc) = visual_toc {
			if !visual_toc.page_entries.is_empty() {
				debug!("using the page list of the visual table of contents");
				return visual_toc.page_entries.clone();
			}
		}
		let label_max_chars = self.config.label_max_chars;
		pagebreak::scan_archive(self.resolver.archive(), label_max_chars)
	}

	fn resolve_pages(&mut self, pages: &[PageEntry]) {
		for entry in pages {
			let link = self.resolver.resolve(entry);
			if self.record_link(&link, false) {
				self.broken += 1;
			}
		}
	}

	fn validate_sequence(&mut self, pages: &[PageEntry]) {
		if pages.is_empty() {
			self.push(LogEntry::new(Severity::Info, FindingKind::PageList, "No page list found (optional for EPUB 3)"));
			return;
		}
		self.push(
			LogEntry::new(Severity::Pass, FindingKind::PageList, format!("Page list: {} pages mapped", pages.len()))
				.with_count(pages.len()),
		);
		for anomaly in detect_anomalies(pages) {
			let label = &pages[anomaly.item_index - 1].label;
			let entry = match anomaly.kind {
				AnomalyKind::Jump => LogEntry::new(
					Severity::Warning,
					FindingKind::SequenceJump,
					format!(
						"Page numbers jump from {} to {} at item {}",
						anomaly.from_value, anomaly.to_value, anomaly.item_index
					),
				),
				AnomalyKind::Duplicate => LogEntry::new(
					Severity::Fail,
					FindingKind::SequenceDuplicate,
					format!("Page {} appears twice in a row at item {}", anomaly.to_value, anomaly.item_index),
				),
			};
			self.push(entry.with_label(label));
		}
	}

	fn check_visual(&mut self, source: &NavigationSource, visual_toc: &VisualToc) {
		for href in &visual_toc.external {
			self.push(
				LogEntry::new(Severity::Info, FindingKind::ExternalLink, format!("External link not checked: {href}"))
					.with_href(href)
					.with_source(&source.path),
			);
		}
		let mut valid = 0;
		let mut missing_anchors = 0;
		let mut unresolved = 0;
		let mut matched = 0;
		let mut mismatched = 0;
		let mut skipped = 0;
		for entry in &visual_toc.anchors {
			let mut link = self.resolver.resolve(entry);
			if self.record_link(&link, false) {
				if link.is_missing_anchor() {
					missing_anchors += 1;
				} else {
					unresolved += 1;
				}
				continue;
			}
			valid += 1;
			link.label_match = self.match_link_label(&link);
			let target = link.target_path.as_deref().unwrap_or_default();
			let log_entry = match link.label_match {
				LabelMatchStatus::Matched(tier) => {
					matched += 1;
					LogEntry::new(
						Severity::Pass,
						FindingKind::LabelMatched,
						format!("\"{}\" -> {target} (text found, {tier:?})", entry.label),
					)
				}
				LabelMatchStatus::NotFound => {
					mismatched += 1;
					LogEntry::new(
						Severity::Warning,
						FindingKind::LabelMismatch,
						format!("Text \"{}\" not found in {target}", entry.label),
					)
				}
				LabelMatchStatus::SkippedShort | LabelMatchStatus::NotApplicable => {
					skipped += 1;
					LogEntry::new(
						Severity::Info,
						FindingKind::LabelSkipped,
						format!("\"{}\" -> {target} (label too short to compare)", entry.label),
					)
				}
			};
			self.push(log_entry.with_label(&entry.label).with_href(&entry.href).with_target(target));
		}
		let total = visual_toc.anchors.len();
		if total > 0 {
			let severity = if valid == total { Severity::Pass } else { Severity::Fail };
			self.push(
				LogEntry::new(
					severity,
					FindingKind::Summary,
					format!(
						"Visual table of contents: {valid} of {total} links valid ({unresolved} not found, \
						 {missing_anchors} missing anchors); labels {matched} found, {mismatched} not found, {skipped} skipped"
					),
				)
				.with_count(total)
				.with_source(&source.path),
			);
		}
		for duplicate in duplicate_hrefs(&visual_toc.anchors) {
			self.push(
				LogEntry::new(
					Severity::Info,
					FindingKind::DuplicateHref,
					format!("{} appears {} times in the visual table of contents", duplicate.href, duplicate.count),
				)
				.with_href(&duplicate.href)
				.with_count(duplicate.count)
				.with_source(&source.path),
			);
		}
		self.check_unlinked_text(source, &visual_toc.unlinked_text);
	}

	fn match_link_label(&mut self, link: &ResolvedLink) -> LabelMatchStatus {
		let min_length = self.config.min_label_length;
		let label = link.entry.label.as_str();
		if char_len(label.trim()) <= min_length {
			return LabelMatchStatus::SkippedShort;
		}
		let Some(target) = link.target_path.as_deref() else {
			return LabelMatchStatus::NotApplicable;
		};
		match self.resolver.body_text(target) {
			Ok(body) => match_label(label, body, min_length),
			Err(err) => {
				debug!("no body text for {target}: {err:#}");
				LabelMatchStatus::NotFound
			}
		}
	}

	fn check_unlinked_text(&mut self, source: &NavigationSource, unlinked: &str) {
		if char_len(unlinked) <= self.config.unlinked_text_threshold {
			return;
		}
		let excerpt = truncate_chars(unlinked, UNLINKED_EXCERPT_CHARS);
		self.push(
			LogEntry::new(
				Severity::Warning,
				FindingKind::UnlinkedText,
				format!("Text without a link in the visual table of contents, possible untagged table-of-contents entry: \"{excerpt}\""),
			)
			.with_source(&source.path),
		);
	}

	fn aggregate(mut self) -> StructureReport {
		let structure_ok = self.broken == 0;
		let entry = if structure_ok {
			LogEntry::new(Severity::Pass, FindingKind::Summary, "Navigation structure is consistent")
		} else {
			LogEntry::new(
				Severity::Fail,
				FindingKind::Summary,
				format!("{} broken table of contents or page list links", self.broken),
			)
			.with_count(self.broken)
		};
		self.push(entry);
		self.enter(Stage::Done);
		StructureReport { structure_ok, stage: self.stage, log: self.log }
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;
	use crate::test_support::{build_zip, xhtml};

	fn check(entries: &[(&str, &str)]) -> StructureReport {
		check_reader(Cursor::new(build_zip(entries)), &CheckerConfig::default())
	}

	fn nav_document(items: &str) -> String {
		xhtml(&format!(r#"<nav epub:type="toc"><ol>{items}</ol></nav>"#))
	}

	#[test]
	fn valid_nav_document_is_ok() {
		let nav = nav_document(
			r#"<li><a href="Text/ch1.xhtml">One</a></li><li><a href="Text/ch2.xhtml#s2">Two</a></li>"#,
		);
		let ch1 = xhtml("<h1>One</h1>");
		let ch2 = xhtml(r#"<h1 id="s2">Two</h1>"#);
		let report = check(&[
			("mimetype", "application/epub+zip"),
			("OEBPS/nav.xhtml", nav.as_str()),
			("OEBPS/Text/ch1.xhtml", ch1.as_str()),
			("OEBPS/Text/ch2.xhtml", ch2.as_str()),
		]);
		assert!(report.structure_ok);
		assert_eq!(report.stage, Stage::Done);
		assert_eq!(report.log.count_kind(FindingKind::UnresolvedLink), 0);
		assert_eq!(report.log.count_kind(FindingKind::LinkResolved), 2);
		let targets: Vec<_> =
			report.log.of_kind(FindingKind::LinkResolved).filter_map(|entry| entry.detail.target.as_deref()).collect();
		assert_eq!(targets, vec!["OEBPS/Text/ch1.xhtml", "OEBPS/Text/ch2.xhtml"]);
		assert_eq!(report.log.count_severity(Severity::Fail), 0);
	}

	#[test]
	fn missing_anchor_is_reported_once_and_not_as_unresolved() {
		let nav = nav_document(r#"<li><a href="chapter1.xhtml#sec2">Chapter 1</a></li>"#);
		let chapter = xhtml(r#"<h1 id="sec1">Chapter 1</h1>"#);
		let report = check(&[("nav.xhtml", nav.as_str()), ("chapter1.xhtml", chapter.as_str())]);
		assert_eq!(report.log.count_kind(FindingKind::MissingAnchor), 1);
		assert_eq!(report.log.count_kind(FindingKind::UnresolvedLink), 0);
		assert!(!report.structure_ok);
	}

	#[test]
	fn broken_toc_link_flips_the_flag() {
		let nav = nav_document(r#"<li><a href="missing.xhtml">Gone</a></li><li><a href="ch1.xhtml">One</a></li>"#);
		let ch1 = xhtml("<p>One</p>");
		let report = check(&[("OEBPS/nav.xhtml", nav.as_str()), ("OEBPS/ch1.xhtml", ch1.as_str())]);
		assert!(!report.structure_ok);
		let unresolved: Vec<_> = report.log.of_kind(FindingKind::UnresolvedLink).collect();
		assert_eq!(unresolved.len(), 1);
		assert_eq!(unresolved[0].detail.label.as_deref(), Some("Gone"));
		assert_eq!(unresolved[0].detail.target.as_deref(), Some("OEBPS/missing.xhtml"));
		let last = report.log.entries().last().expect("summary entry");
		assert_eq!((last.severity, last.kind), (Severity::Fail, FindingKind::Summary));
	}

	#[test]
	fn external_toc_links_are_informational() {
		let nav = nav_document(r#"<li><a href="https://example.com">Site</a></li>"#);
		let report = check(&[("nav.xhtml", nav.as_str())]);
		assert!(report.structure_ok);
		assert_eq!(report.log.count_kind(FindingKind::ExternalLink), 1);
		assert_eq!(report.log.count_kind(FindingKind::UnresolvedLink), 0);
	}

	#[test]
	fn page_break_scan_is_the_last_resort() {
		let report = check(&[
			("mimetype", "application/epub+zip"),
			("OEBPS/Text/part1.xhtml", r#"<html><body><p>a</p><span role="pagebreak" id="p5"/></body></html>"#),
			("OEBPS/Text/part2.xhtml", r#"<html><body><p>b</p><span role="pagebreak" id="p6"/></body></html>"#),
			("OEBPS/Text/part3.xhtml", r#"<html><body><p>c</p><span role="pagebreak" id="p7"/></body></html>"#),
		]);
		assert_eq!(report.log.count_kind(FindingKind::SourceAbsent), 4);
		let page_list: Vec<_> = report.log.of_kind(FindingKind::PageList).collect();
		assert_eq!(page_list.len(), 1);
		assert_eq!(page_list[0].severity, Severity::Pass);
		assert_eq!(page_list[0].detail.count, Some(3));
		assert_eq!(report.log.count_kind(FindingKind::UnresolvedLink), 0);
		assert_eq!(report.log.count_kind(FindingKind::MissingAnchor), 0);
		assert_eq!(report.log.count_kind(FindingKind::SequenceJump), 0);
		assert_eq!(report.log.count_kind(FindingKind::SequenceDuplicate), 0);
		assert!(report.structure_ok);
	}

	#[test]
	fn page_list_sequence_anomalies_are_logged_without_flipping_the_flag() {
		let nav = xhtml(
			r#"<nav epub:type="toc"><ol><li><a href="ch1.xhtml">Chapter one</a></li></ol></nav>
			<nav epub:type="page-list"><ol>
				<li><a href="ch1.xhtml#p1">1</a></li>
				<li><a href="ch1.xhtml#p2">2</a></li>
				<li><a href="ch1.xhtml#p2">2</a></li>
				<li><a href="ch1.xhtml#p4">4</a></li>
			</ol></nav>"#,
		);
		let ch1 = xhtml(r#"<span id="p1"/><span id="p2"/><span id="p4"/>"#);
		let report = check(&[("nav.xhtml", nav.as_str()), ("ch1.xhtml", ch1.as_str())]);
		assert_eq!(report.log.count_kind(FindingKind::SequenceDuplicate), 1);
		assert_eq!(report.log.count_kind(FindingKind::SequenceJump), 1);
		assert!(report.structure_ok);
	}

	#[test]
	fn broken_page_list_link_flips_the_flag() {
		let nav = xhtml(
			r#"<nav epub:type="toc"><ol><li><a href="ch1.xhtml">Chapter one</a></li></ol></nav>
			<nav epub:type="page-list"><ol><li><a href="ch1.xhtml#p9">9</a></li></ol></nav>"#,
		);
		let ch1 = xhtml("<p>text</p>");
		let report = check(&[("nav.xhtml", nav.as_str()), ("ch1.xhtml", ch1.as_str())]);
		assert_eq!(report.log.count_kind(FindingKind::MissingAnchor), 1);
		assert!(!report.structure_ok);
	}

	#[test]
	fn empty_nav_toc_falls_back_to_ncx() {
		let nav = nav_document("");
		let ncx = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1"><navMap>
	<navPoint id="n1" playOrder="1"><navLabel><text>Chapter 1</text></navLabel><content src="Text/ch1.xhtml"/></navPoint>
</navMap></ncx>"#;
		let ch1 = xhtml("<h1>Chapter 1</h1>");
		let report = check(&[("OEBPS/nav.xhtml", nav.as_str()), ("OEBPS/toc.ncx", ncx), ("OEBPS/Text/ch1.xhtml", ch1.as_str())]);
		let resolved: Vec<_> = report.log.of_kind(FindingKind::LinkResolved).collect();
		assert_eq!(resolved.len(), 1);
		assert_eq!(resolved[0].detail.label.as_deref(), Some("Chapter 1"));
		assert_eq!(resolved[0].detail.target.as_deref(), Some("OEBPS/Text/ch1.xhtml"));
		assert!(report.structure_ok);
	}

	#[test]
	fn malformed_nav_is_logged_and_the_run_continues() {
		let ncx = r#"<ncx><navMap><navPoint><navLabel><text>One</text></navLabel><content src="ch1.xhtml"/></navPoint></navMap></ncx>"#;
		let ch1 = xhtml("<p>One</p>");
		let report = check(&[
			("OEBPS/nav.xhtml", "<html><body><nav><ol><li>"),
			("OEBPS/toc.ncx", ncx),
			("OEBPS/ch1.xhtml", ch1.as_str()),
		]);
		assert_eq!(report.log.count_kind(FindingKind::ParseFailure), 1);
		assert_eq!(report.log.count_kind(FindingKind::LinkResolved), 1);
		assert_eq!(report.stage, Stage::Done);
		assert!(report.structure_ok);
	}

	#[test]
	fn case_mismatched_visual_link_resolves_and_is_label_matched() {
		let sumario = xhtml(r#"<h1>Sumário</h1><p><a href="ch2.xhtml">Capítulo 2 — A Viagem</a></p>"#);
		let ch2 = xhtml("<h1>Capítulo 2</h1><p>A viagem começa</p>");
		let report = check(&[("OEBPS/Text/sumario.xhtml", sumario.as_str()), ("OEBPS/Text/Ch2.xhtml", ch2.as_str())]);
		assert_eq!(report.log.count_kind(FindingKind::UnresolvedLink), 0);
		let matched: Vec<_> = report.log.of_kind(FindingKind::LabelMatched).collect();
		assert_eq!(matched.len(), 1);
		assert_eq!(matched[0].detail.target.as_deref(), Some("OEBPS/Text/Ch2.xhtml"));
		assert!(report.structure_ok);
	}

	#[test]
	fn duplicate_broken_visual_links_are_counted_and_do_not_flip_the_flag() {
		let sumario = xhtml(
			r#"<p><a href="ch3.xhtml">Capítulo 3</a></p><p><a href="ch3.xhtml">Capítulo 3 de novo</a></p>"#,
		);
		let report = check(&[("sumario.xhtml", sumario.as_str())]);
		let duplicates: Vec<_> = report.log.of_kind(FindingKind::DuplicateHref).collect();
		assert_eq!(duplicates.len(), 1);
		assert_eq!(duplicates[0].detail.href.as_deref(), Some("ch3.xhtml"));
		assert_eq!(duplicates[0].detail.count, Some(2));
		assert_eq!(report.log.count_kind(FindingKind::UnresolvedLink), 2);
		assert!(report.structure_ok);
	}

	#[test]
	fn visual_labels_are_matched_skipped_or_flagged() {
		let toc = xhtml(
			r#"<p><a href="ch1.xhtml">Bibliography</a></p><p><a href="ch1.xhtml#n">Cap 1</a></p>
			<p>Epilogue without any link</p>"#,
		);
		let ch1 = xhtml(r#"<h1 id="n">Index of names</h1>"#);
		let report = check(&[("toc.xhtml", toc.as_str()), ("ch1.xhtml", ch1.as_str())]);
		let mismatches: Vec<_> = report.log.of_kind(FindingKind::LabelMismatch).collect();
		assert_eq!(mismatches.len(), 1);
		assert_eq!(mismatches[0].severity, Severity::Warning);
		assert_eq!(mismatches[0].detail.label.as_deref(), Some("Bibliography"));
		assert_eq!(report.log.count_kind(FindingKind::LabelSkipped), 1);
		assert_eq!(report.log.count_kind(FindingKind::UnlinkedText), 1);
		assert!(report.structure_ok);
	}

	#[test]
	fn visual_missing_anchor_is_counted_apart_and_does_not_flip_the_flag() {
		let sumario = xhtml(
			r#"<p><a href="ch1.xhtml#s1">Primeira seção</a></p><p><a href="ch1.xhtml#s9">Seção perdida</a></p>
			<p><a href="ch9.xhtml">Capítulo ausente</a></p>"#,
		);
		let ch1 = xhtml(r#"<h2 id="s1">Primeira seção</h2>"#);
		let report = check(&[("OEBPS/sumario.xhtml", sumario.as_str()), ("OEBPS/ch1.xhtml", ch1.as_str())]);
		assert_eq!(report.log.count_kind(FindingKind::MissingAnchor), 1);
		assert_eq!(report.log.count_kind(FindingKind::UnresolvedLink), 1);
		let summary = report
			.log
			.of_kind(FindingKind::Summary)
			.find(|entry| entry.detail.source.as_deref() == Some("OEBPS/sumario.xhtml"))
			.expect("visual summary");
		assert_eq!(summary.severity, Severity::Fail);
		assert!(summary.message.starts_with("Visual table of contents: 1 of 3 links valid (1 not found, 1 missing anchors)"));
		assert!(report.structure_ok);
	}

	#[test]
	fn nav_document_named_like_a_visual_page_is_also_label_checked() {
		let sumario = nav_document(r#"<li><a href="ch1.xhtml">Capítulo 1 — A Origem</a></li>"#);
		let ch1 = xhtml("<h1>Outra coisa</h1><p>Texto sem relação</p>");
		let report = check(&[("OEBPS/Text/Sumario.xhtml", sumario.as_str()), ("OEBPS/Text/ch1.xhtml", ch1.as_str())]);
		let found: Vec<_> =
			report.log.of_kind(FindingKind::SourceFound).filter_map(|entry| entry.detail.source.as_deref()).collect();
		assert_eq!(found, vec!["OEBPS/Text/Sumario.xhtml", "OEBPS/Text/Sumario.xhtml"]);
		let mismatches: Vec<_> = report.log.of_kind(FindingKind::LabelMismatch).collect();
		assert_eq!(mismatches.len(), 1);
		assert_eq!(mismatches[0].detail.label.as_deref(), Some("Capítulo 1 — A Origem"));
		assert!(report.structure_ok);
	}

	#[test]
	fn ncx_page_targets_are_used_when_falling_back_from_an_empty_nav() {
		let nav = nav_document("");
		let ncx = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<navMap>
	<navPoint id="n1" playOrder="1"><navLabel><text>Chapter 1</text></navLabel><content src="ch1.xhtml"/></navPoint>
</navMap>
<pageList>
	<pageTarget id="pt1" type="normal" value="1"><navLabel><text>1</text></navLabel><content src="ch1.xhtml#p1"/></pageTarget>
	<pageTarget id="pt3" type="normal" value="3"><navLabel><text>3</text></navLabel><content src="ch1.xhtml#p3"/></pageTarget>
</pageList>
</ncx>"#;
		let ch1 = xhtml(r#"<h1>Chapter 1</h1><span id="p1"/>"#);
		let report = check(&[("OEBPS/nav.xhtml", nav.as_str()), ("OEBPS/toc.ncx", ncx), ("OEBPS/ch1.xhtml", ch1.as_str())]);
		let page_list: Vec<_> = report.log.of_kind(FindingKind::PageList).collect();
		assert_eq!(page_list[0].detail.count, Some(2));
		assert_eq!(report.log.count_kind(FindingKind::SequenceJump), 1);
		assert_eq!(report.log.count_kind(FindingKind::MissingAnchor), 1);
		assert!(!report.structure_ok);
	}

	#[test]
	fn visual_page_list_is_preferred_over_the_page_break_scan() {
		let sumario = xhtml(
			r#"<p><a href="ch1.xhtml">Capítulo 1</a></p>
			<div role="doc-pagelist"><a href="ch1.xhtml#p1">1</a> <a href="ch1.xhtml#p2">2</a></div>"#,
		);
		let ch1 = xhtml(
			r#"<h1>Capítulo 1</h1><span role="pagebreak" id="p1"/><span role="pagebreak" id="p2"/><span role="pagebreak" id="x9"/>"#,
		);
		let report = check(&[("OEBPS/sumario.xhtml", sumario.as_str()), ("OEBPS/ch1.xhtml", ch1.as_str())]);
		let page_list: Vec<_> = report.log.of_kind(FindingKind::PageList).collect();
		assert_eq!(page_list.len(), 1);
		assert_eq!(page_list[0].severity, Severity::Pass);
		assert_eq!(page_list[0].detail.count, Some(2));
		assert!(report.structure_ok);
	}

	#[test]
	fn non_web_schemes_in_the_toc_are_external() {
		let nav = nav_document(
			r#"<li><a href="tel:+5511999999999">Contato</a></li><li><a href="ftp://example.com/a">Arquivo</a></li>"#,
		);
		let report = check(&[("nav.xhtml", nav.as_str())]);
		assert_eq!(report.log.count_kind(FindingKind::ExternalLink), 2);
		assert_eq!(report.log.count_kind(FindingKind::UnresolvedLink), 0);
		assert!(report.structure_ok);
	}

	#[test]
	fn invalid_zip_is_a_single_fatal_entry() {
		let report = check_reader(Cursor::new(b"definitely not a zip".to_vec()), &CheckerConfig::default());
		assert!(!report.structure_ok);
		assert_eq!(report.stage, Stage::Failed);
		assert_eq!(report.log.len(), 1);
		assert_eq!(report.log.entries()[0].severity, Severity::Fail);
		assert_eq!(report.log.entries()[0].kind, FindingKind::FatalArchiveError);
	}

	#[test]
	fn missing_file_is_a_single_fatal_entry() {
		let report = check_epub(Path::new("/nonexistent/book.epub"), &CheckerConfig::default());
		assert!(!report.structure_ok);
		assert_eq!(report.log.count_kind(FindingKind::FatalArchiveError), 1);
		assert_eq!(report.log.len(), 1);
	}
}
