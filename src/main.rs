#![warn(clippy::all, clippy::nursery, clippy::pedantic)]

use std::{
	env, fs,
	path::{Path, PathBuf},
	process::ExitCode,
};

use anyhow::{Context, Result};
use log::{info, warn};
use navcheck::{
	CheckerConfig, archive::EpubArchive, check_archive, checker::fatal_report, credits, report::StructureReport,
};

fn main() -> Result<ExitCode> {
	env_logger::init();
	let config = CheckerConfig::discover()?;
	let mut books: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
	if books.is_empty() {
		books = epubs_in(&config.input_dir)?;
	}
	if books.is_empty() {
		println!("No EPUB files to check in {}", config.input_dir.display());
		return Ok(ExitCode::SUCCESS);
	}
	let mut failures = 0;
	for book in &books {
		if !check_book(book, &config) {
			failures += 1;
		}
	}
	println!();
	println!("{} of {} books passed", books.len() - failures, books.len());
	Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn epubs_in(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut books = Vec::new();
	for entry in fs::read_dir(dir).with_context(|| format!("Failed to list '{}'", dir.display()))? {
		let path = entry?.path();
		if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("epub")) {
			books.push(path);
		}
	}
	books.sort();
	Ok(books)
}

fn check_book(path: &Path, config: &CheckerConfig) -> bool {
	let name = path.file_name().map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
	println!("{}", "=".repeat(50));
	println!("{name}");
	println!("{}", "=".repeat(50));
	let report = match EpubArchive::open(path) {
		Ok(mut archive) => {
			let publisher = credits::publisher(&mut archive);
			println!("Publisher: {}", publisher.as_deref().unwrap_or("unknown"));
			let typesetters = credits::typesetting_credits(&mut archive);
			if typesetters.is_empty() {
				println!("Typesetting: not identified");
			} else {
				println!("Typesetting: {}", typesetters.join(" | "));
			}
			check_archive(&mut archive, config)
		}
		Err(err) => {
			warn!("{name}: {err:#}");
			fatal_report(&err)
		}
	};
	print_report(&report);
	info!("{name}: finished at stage {:?}", report.stage);
	report.structure_ok
}

fn print_report(report: &StructureReport) {
	for entry in report.log.entries() {
		println!("{entry}");
	}
	println!("Navigation structure: {}", if report.structure_ok { "PASS" } else { "FAIL" });
}
