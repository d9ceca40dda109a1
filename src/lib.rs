#![warn(clippy::all, clippy::nursery, clippy::pedantic)]

pub mod archive;
pub mod checker;
pub mod config;
pub mod credits;
mod encoding;
pub mod label;
pub mod nav;
pub mod report;
pub mod resolve;
pub mod sequence;
pub mod text;
#[cfg(test)]
mod test_support;

pub use checker::{check_archive, check_epub, check_reader};
pub use config::CheckerConfig;
pub use report::{FindingKind, LogEntry, Severity, Stage, StructureReport, ValidationLog};
