use std::{
	io::{Read, Seek},
	sync::LazyLock,
};

use anyhow::{Context, Result};
use log::warn;
use roxmltree::Document;
use scraper::{Html, Selector};

use crate::{
	archive::EpubArchive,
	nav::xml_parsing_options,
	text::{collapse_whitespace, trim_string},
};

const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
const CREDIT_FILE_HINTS: [&str; 4] = ["credito", "credit", "rosto", "copy"];
const CREDIT_TERMS: [&str; 5] = ["Editoração", "Produção digital", "Produção Digital", "Typesetting", "Digital production"];

static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").expect("valid paragraph selector"));

/// `dc:publisher` of the first package document in the archive.
pub fn publisher<R: Read + Seek>(archive: &mut EpubArchive<R>) -> Option<String> {
	let opf = archive.names().iter().find(|name| name.to_lowercase().ends_with(".opf")).cloned()?;
	match read_publisher(archive, &opf) {
		Ok(publisher) => publisher,
		Err(err) => {
			warn!("Could not read the publisher from '{opf}': {err:#}");
			None
		}
	}
}

fn read_publisher<R: Read + Seek>(archive: &mut EpubArchive<R>, opf: &str) -> Result<Option<String>> {
	let content = archive.read_text(opf)?;
	let document = Document::parse_with_options(&content, xml_parsing_options())
		.with_context(|| format!("Failed to parse package document '{opf}'"))?;
	Ok(document
		.descendants()
		.find(|node| {
			node.is_element() && node.tag_name().name() == "publisher" && node.tag_name().namespace() == Some(DC_NAMESPACE)
		})
		.and_then(|node| node.text())
		.map(str::trim)
		.filter(|text| !text.is_empty())
		.map(ToString::to_string))
}

/// Paragraphs of credit or title pages naming who typeset or produced the book, without repeats.
pub fn typesetting_credits<R: Read + Seek>(archive: &mut EpubArchive<R>) -> Vec<String> {
	let candidates: Vec<String> = archive
		.names()
		.iter()
		.filter(|name| {
			let lower = name.to_lowercase();
			CREDIT_FILE_HINTS.iter().any(|hint| lower.contains(hint))
		})
		.cloned()
		.collect();
	let mut credits: Vec<String> = Vec::new();
	for file in candidates {
		let content = match archive.read_text(&file) {
			Ok(content) => content,
			Err(err) => {
				warn!("Skipping '{file}' while looking for credits: {err:#}");
				continue;
			}
		};
		let document = Html::parse_document(&content);
		for paragraph in document.select(&PARAGRAPH) {
			let text = trim_string(&collapse_whitespace(&paragraph.text().collect::<String>()));
			if CREDIT_TERMS.iter().any(|term| text.contains(term)) && !credits.contains(&text) {
				credits.push(text);
			}
		}
	}
	credits
}
