use std::{
	env,
	path::{Path, PathBuf},
};

use anyhow::{Result, anyhow};
use configparser::ini::Ini;

const CONFIG_SECTION: &str = "checker";
const CONFIG_FILENAME: &str = "navcheck.ini";
const CONFIG_ENV_VAR: &str = "NAVCHECK_CONFIG";
const DEFAULT_MIN_LABEL_LENGTH: usize = 5;
const DEFAULT_UNLINKED_TEXT_THRESHOLD: usize = 10;
const DEFAULT_LABEL_MAX_CHARS: usize = 100;
const DEFAULT_NAV_SNIFF_BYTES: usize = 1024;
const DEFAULT_INPUT_DIR: &str = "input";

/// Tunables for a structure check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckerConfig {
	/// Labels at or below this many characters are not matched against their target.
	pub min_label_length: usize,
	/// Unlinked visual table of contents text longer than this is reported.
	pub unlinked_text_threshold: usize,
	pub label_max_chars: usize,
	/// How much of each content file is sniffed for `<nav` when no `nav.xhtml` exists.
	pub nav_sniff_bytes: usize,
	pub input_dir: PathBuf,
}

impl Default for CheckerConfig {
	fn default() -> Self {
		Self {
			min_label_length: DEFAULT_MIN_LABEL_LENGTH,
			unlinked_text_threshold: DEFAULT_UNLINKED_TEXT_THRESHOLD,
			label_max_chars: DEFAULT_LABEL_MAX_CHARS,
			nav_sniff_bytes: DEFAULT_NAV_SNIFF_BYTES,
			input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
		}
	}
}

impl CheckerConfig {
	/// Loads the INI file at `path`. Missing keys keep their defaults.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or is not valid INI.
	pub fn load(path: &Path) -> Result<Self> {
		let mut ini = Ini::new();
		ini.load(path).map_err(|err| anyhow!("Failed to load config '{}': {err}", path.display()))?;
		Ok(Self::from_ini(&ini))
	}

	/// # Errors
	///
	/// Returns an error if `contents` is not valid INI.
	pub fn parse(contents: &str) -> Result<Self> {
		let mut ini = Ini::new();
		ini.read(contents.to_string()).map_err(|err| anyhow!("Failed to parse config: {err}"))?;
		Ok(Self::from_ini(&ini))
	}

	/// Config named by `NAVCHECK_CONFIG`, else `navcheck.ini` in the working directory, else
	/// defaults.
	///
	/// # Errors
	///
	/// Returns an error if a config file exists but cannot be loaded.
	pub fn discover() -> Result<Self> {
		if let Ok(path) = env::var(CONFIG_ENV_VAR) {
			return Self::load(Path::new(&path));
		}
		let local = Path::new(CONFIG_FILENAME);
		if local.is_file() {
			return Self::load(local);
		}
		Ok(Self::default())
	}

	fn from_ini(ini: &Ini) -> Self {
		let defaults = Self::default();
		Self {
			min_label_length: get_usize(ini, "min_label_length", defaults.min_label_length),
			unlinked_text_threshold: get_usize(ini, "unlinked_text_threshold", defaults.unlinked_text_threshold),
			label_max_chars: get_usize(ini, "label_max_chars", defaults.label_max_chars),
			nav_sniff_bytes: get_usize(ini, "nav_sniff_bytes", defaults.nav_sniff_bytes),
			input_dir: ini
				.get(CONFIG_SECTION, "input_dir")
				.filter(|value| !value.trim().is_empty())
				.map_or(defaults.input_dir, |value| PathBuf::from(value.trim())),
		}
	}
}

fn get_usize(ini: &Ini, key: &str, default_value: usize) -> usize {
	ini.get(CONFIG_SECTION, key).and_then(|value| value.trim().parse::<usize>().ok()).unwrap_or(default_value)
}
