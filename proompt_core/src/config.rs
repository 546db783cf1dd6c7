use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::ProomptError;
use crate::ProomptResult;
use crate::SessionOptions;
use crate::ValueMap;

/// Default quiet window for live previews, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["proompt.toml", ".proompt.toml", ".config/proompt.toml"];

/// Configuration loaded from a `proompt.toml` file.
///
/// ```toml
/// [preview]
/// debounce_ms = 300
///
/// [values]
/// audience = "engineers"
/// tone = "friendly"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProomptConfig {
	/// Live preview settings.
	#[serde(default)]
	pub preview: PreviewConfig,
	/// Baseline values for template variables. Values files and `--var`
	/// arguments take precedence over these.
	#[serde(default)]
	pub values: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreviewConfig {
	/// Only the last edit within this many milliseconds is previewed.
	#[serde(default = "default_debounce_ms")]
	pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
	DEFAULT_DEBOUNCE_MS
}

impl Default for PreviewConfig {
	fn default() -> Self {
		Self {
			debounce_ms: DEFAULT_DEBOUNCE_MS,
		}
	}
}

impl PreviewConfig {
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}
}

impl ProomptConfig {
	/// Return the first config file that exists under `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from `root`. Returns `Ok(None)` when no config file
	/// exists.
	pub fn load(root: &Path) -> ProomptResult<Option<ProomptConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: ProomptConfig =
			toml::from_str(&content).map_err(|e| ProomptError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// Options for a preview session built from this config.
	pub fn session_options(&self) -> SessionOptions {
		SessionOptions {
			debounce: self.preview.debounce(),
		}
	}

	/// The `[values]` table as a value map.
	pub fn value_map(&self) -> ValueMap {
		self.values
			.iter()
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect()
	}
}
