use std::collections::HashMap;

use crate::{
	nav::{NavEntry, PageEntry},
	text::first_number,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnomalyKind {
	Jump,
	Duplicate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceAnomaly {
	pub kind: AnomalyKind,
	pub from_value: u32,
	pub to_value: u32,
	/// 1-based position of the offending entry in the page list.
	pub item_index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateHref {
	pub href: String,
	pub count: usize,
}

/// Walks the page numbers of `entries` and reports repeats and gaps.
///
/// Entries whose label has no digits are skipped. The first numbered entry is never flagged,
/// wherever the numbering starts.
#[must_use]
pub fn detect_anomalies(entries: &[PageEntry]) -> Vec<SequenceAnomaly> {
	let mut anomalies = Vec::new();
	let mut last_value: Option<u32> = None;
	for (index, entry) in entries.iter().enumerate() {
		let Some(value) = first_number(&entry.label) else {
			continue;
		};
		if let Some(last) = last_value {
			let kind = if value == last {
				Some(AnomalyKind::Duplicate)
			} else if Some(value) != last.checked_add(1) {
				Some(AnomalyKind::Jump)
			} else {
				None
			};
			if let Some(kind) = kind {
				anomalies.push(SequenceAnomaly { kind, from_value: last, to_value: value, item_index: index + 1 });
			}
		}
		last_value = Some(value);
	}
	anomalies
}

/// Hrefs used by more than one entry, in order of first appearance.
#[must_use]
pub fn duplicate_hrefs(entries: &[NavEntry]) -> Vec<DuplicateHref> {
	let mut counts: HashMap<&str, usize> = HashMap::new();
	let mut order = Vec::new();
	for entry in entries {
		let count = counts.entry(entry.href.as_str()).or_insert(0);
		if *count == 0 {
			order.push(entry.href.as_str());
		}
		*count += 1;
	}
	order
		.into_iter()
		.filter_map(|href| {
			let count = counts[href];
			(count > 1).then(|| DuplicateHref { href: href.to_string(), count })
		})
		.collect()
}
