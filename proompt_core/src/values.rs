use std::collections::HashMap;
use std::path::Path;

use crate::ProomptError;
use crate::ProomptResult;

/// Variable name to value. Absent keys and blank values both mean "no value".
pub type ValueMap = HashMap<String, String>;

/// Parse a `name=value` command line argument. Only the first `=` splits, so
/// values may themselves contain `=`.
pub fn parse_variable_argument(argument: &str) -> ProomptResult<(String, String)> {
	let Some((name, value)) = argument.split_once('=') else {
		return Err(ProomptError::InvalidVariableArgument(argument.to_string()));
	};

	let name = name.trim();
	if name.is_empty() {
		return Err(ProomptError::InvalidVariableArgument(argument.to_string()));
	}

	Ok((name.to_string(), value.to_string()))
}

/// Load a flat value map from a `.json` or `.toml` file.
///
/// Strings are taken as is, numbers and booleans are stringified and JSON
/// `null` entries are skipped. Nested tables and arrays are rejected.
pub fn load_values_file(path: &Path) -> ProomptResult<ValueMap> {
	let extension = path
		.extension()
		.and_then(|ext| ext.to_str())
		.unwrap_or_default()
		.to_ascii_lowercase();

	if !matches!(extension.as_str(), "json" | "toml") {
		return Err(ProomptError::UnsupportedValuesFormat(extension));
	}

	let content = std::fs::read_to_string(path)?;
	let values_error = |reason: String| {
		ProomptError::ValuesFile {
			path: path.display().to_string(),
			reason,
		}
	};

	match extension.as_str() {
		"json" => {
			let map: serde_json::Map<String, serde_json::Value> =
				serde_json::from_str(&content).map_err(|e| values_error(e.to_string()))?;
			let mut values = ValueMap::with_capacity(map.len());

			for (name, value) in map {
				let value = match value {
					serde_json::Value::Null => continue,
					serde_json::Value::String(s) => s,
					serde_json::Value::Bool(b) => b.to_string(),
					serde_json::Value::Number(n) => n.to_string(),
					serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
						return Err(values_error(format!("`{name}` must be a string")));
					}
				};
				values.insert(name, value);
			}

			Ok(values)
		}
		_ => {
			let table: toml::Table =
				toml::from_str(&content).map_err(|e| values_error(e.to_string()))?;
			let mut values = ValueMap::with_capacity(table.len());

			for (name, value) in table {
				let value = match value {
					toml::Value::String(s) => s,
					toml::Value::Integer(i) => i.to_string(),
					toml::Value::Float(f) => f.to_string(),
					toml::Value::Boolean(b) => b.to_string(),
					toml::Value::Datetime(d) => d.to_string(),
					toml::Value::Array(_) | toml::Value::Table(_) => {
						return Err(values_error(format!("`{name}` must be a string")));
					}
				};
				values.insert(name, value);
			}

			Ok(values)
		}
	}
}

/// Merge value maps in increasing precedence: later layers override earlier
/// ones.
pub fn merge_values<I>(layers: I) -> ValueMap
where
	I: IntoIterator<Item = ValueMap>,
{
	let mut merged = ValueMap::new();
	for layer in layers {
		merged.extend(layer);
	}
	merged
}
