use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::BookletError;
use crate::BookletResult;
use crate::tree::DEFAULT_IGNORED;

/// Configuration loaded from a `booklet.toml` file at the repository root.
///
/// ```toml
/// [ignore]
/// names = [".git", "build"]
///
/// [templates]
/// paths = ["shared/templates"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct BuildConfig {
	/// Names skipped during tree scanning, in addition to the defaults.
	#[serde(default)]
	pub ignore: IgnoreConfig,
	/// Template search configuration.
	#[serde(default)]
	pub templates: TemplatesConfig,
}

/// Entry names excluded from scanning (exact, case-sensitive match).
#[derive(Debug, Default, Deserialize)]
pub struct IgnoreConfig {
	#[serde(default)]
	pub names: Vec<String>,
}

/// Where to look for templates.
#[derive(Debug, Default, Deserialize)]
pub struct TemplatesConfig {
	/// Additional directories searched for templates, relative to the root.
	#[serde(default)]
	pub paths: Vec<PathBuf>,
}

impl BuildConfig {
	/// Load `booklet.toml` from the given root directory. Returns `None`
	/// when the file does not exist.
	pub fn load(root: &Path) -> BookletResult<Option<BuildConfig>> {
		let config_path = root.join("booklet.toml");

		if !config_path.exists() {
			return Ok(None);
		}

		let content = std::fs::read_to_string(&config_path)?;
		let config: BuildConfig =
			toml::from_str(&content).map_err(|e| BookletError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// The full ignore list: built-in names plus configured ones.
	pub fn ignored_names(&self) -> Vec<String> {
		let mut names: Vec<String> = DEFAULT_IGNORED.iter().map(|s| (*s).to_string()).collect();
		for name in &self.ignore.names {
			if !names.contains(name) {
				names.push(name.clone());
			}
		}
		names
	}
}
