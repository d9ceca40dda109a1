use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
	Pass,
	Fail,
	Warning,
	Info,
}

impl Severity {
	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pass => "PASS",
			Self::Fail => "FAIL",
			Self::Warning => "WARNING",
			Self::Info => "INFO",
		}
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What a log entry is about, independent of how it is worded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FindingKind {
	SourceFound,
	SourceAbsent,
	ParseFailure,
	LinkResolved,
	UnresolvedLink,
	MissingAnchor,
	ExternalLink,
	LabelMatched,
	LabelMismatch,
	LabelSkipped,
	SequenceJump,
	SequenceDuplicate,
	DuplicateHref,
	UnlinkedText,
	PageList,
	Summary,
	FatalArchiveError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryDetail {
	pub label: Option<String>,
	pub href: Option<String>,
	pub target: Option<String>,
	pub source: Option<String>,
	pub count: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
	pub severity: Severity,
	pub kind: FindingKind,
	pub message: String,
	pub detail: EntryDetail,
}

impl LogEntry {
	#[must_use]
	pub fn new(severity: Severity, kind: FindingKind, message: impl Into<String>) -> Self {
		Self { severity, kind, message: message.into(), detail: EntryDetail::default() }
	}

	#[must_use]
	pub fn with_label(mut self, label: &str) -> Self {
		self.detail.label = Some(label.to_string());
		self
	}

	#[must_use]
	pub fn with_href(mut self, href: &str) -> Self {
		self.detail.href = Some(href.to_string());
		self
	}

	#[must_use]
	pub fn with_target(mut self, target: &str) -> Self {
		self.detail.target = Some(target.to_string());
		self
	}

	#[must_use]
	pub fn with_source(mut self, source: &str) -> Self {
		self.detail.source = Some(source.to_string());
		self
	}

	#[must_use]
	pub const fn with_count(mut self, count: usize) -> Self {
		self.detail.count = Some(count);
		self
	}
}

impl fmt::Display for LogEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}", self.severity, self.message)
	}
}

/// Append-only record of everything a run found.
#[derive(Clone, Debug, Default)]
pub struct ValidationLog {
	entries: Vec<LogEntry>,
}

impl ValidationLog {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, entry: LogEntry) {
		self.entries.push(entry);
	}

	#[must_use]
	pub fn entries(&self) -> &[LogEntry] {
		&self.entries
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	#[must_use]
	pub fn count_kind(&self, kind: FindingKind) -> usize {
		self.entries.iter().filter(|entry| entry.kind == kind).count()
	}

	#[must_use]
	pub fn count_severity(&self, severity: Severity) -> usize {
		self.entries.iter().filter(|entry| entry.severity == severity).count()
	}

	pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &LogEntry> {
		self.entries.iter().filter(move |entry| entry.kind == kind)
	}
}

/// Terminal stage of a run, plus the stages it passes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
	Init,
	LocateSources,
	ExtractToc,
	ResolveTocLinks,
	ExtractPageList,
	ResolvePageList,
	ValidateSequence,
	MatchLabels,
	Aggregate,
	Done,
	Failed,
}

#[derive(Clone, Debug)]
pub struct StructureReport {
	pub structure_ok: bool,
	pub stage: Stage,
	pub log: ValidationLog,
}

impl StructureReport {
	#[must_use]
	pub fn failed(log: ValidationLog) -> Self {
		Self { structure_ok: false, stage: Stage::Failed, log }
	}
}
