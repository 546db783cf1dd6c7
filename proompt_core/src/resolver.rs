use std::collections::HashSet;

use serde::Serialize;

use crate::Placeholder;
use crate::PlaceholderKind;
use crate::Registry;
use crate::ResolveWarning;
use crate::ValueMap;
use crate::VariableDescriptor;
use crate::VariableStatus;
use crate::placeholder::scan;
use crate::registry::provided_value;

/// The marker substituted for a snippet reference. Snippet bodies are owned
/// by the snippet catalog, the engine only records the name.
pub fn snippet_marker(name: &str) -> String {
	format!("[Snippet: {name}]")
}

/// Output of one full resolution of a template against a value map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
	/// The template with every placeholder substituted.
	pub resolved_text: String,
	/// Unique variables in first-appearance order.
	pub variables: Vec<VariableDescriptor>,
	/// Human readable diagnostics ordered by the first appearance of the
	/// variable or snippet that triggered them.
	pub warnings: Vec<String>,
	/// Referenced snippet names, deduplicated, in first-appearance order.
	pub snippets: Vec<String>,
}

impl ResolutionResult {
	/// Names of variables that have neither a value nor a default.
	pub fn missing_variables(&self) -> Vec<&str> {
		self.variables
			.iter()
			.filter(|variable| variable.status == VariableStatus::Missing)
			.map(|variable| variable.name.as_str())
			.collect()
	}

	pub fn count(&self, status: VariableStatus) -> usize {
		self.variables
			.iter()
			.filter(|variable| variable.status == status)
			.count()
	}

	/// Share of variables that resolve to something, rounded to the nearest
	/// whole percent. A template without variables is 100% complete.
	pub fn completion_percentage(&self) -> u8 {
		completion_percentage(&self.variables)
	}

	/// Returns true when no variable is missing.
	pub fn is_complete(&self) -> bool {
		self.count(VariableStatus::Missing) == 0
	}
}

/// Everything known about a template without the substituted text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
	pub placeholders: Vec<Placeholder>,
	pub variables: Vec<VariableDescriptor>,
	pub snippets: Vec<String>,
	pub warnings: Vec<String>,
}

impl Analysis {
	pub fn completion_percentage(&self) -> u8 {
		completion_percentage(&self.variables)
	}
}

fn completion_percentage(variables: &[VariableDescriptor]) -> u8 {
	let total = variables.len();
	if total == 0 {
		return 100;
	}

	let resolved = variables
		.iter()
		.filter(|variable| variable.status != VariableStatus::Missing)
		.count();
	((resolved * 100 + total / 2) / total) as u8
}

/// Rebuild `template` in a single left-to-right pass, substituting every
/// placeholder.
///
/// - Provided variables become their trimmed value.
/// - Default variables become their default, which may be empty.
/// - Missing variables keep their raw text and warn once per name.
/// - Snippet references become [`snippet_marker`].
///
/// This is a pure function of its inputs. Placeholders whose spans do not fit
/// the template are skipped with a warning rather than causing a panic.
pub fn resolve(
	template: &str,
	placeholders: &[Placeholder],
	registry: &Registry,
	values: &ValueMap,
) -> ResolutionResult {
	let mut output = String::with_capacity(template.len());
	let mut warnings: Vec<ResolveWarning> = registry.warnings().to_vec();
	let mut warned_missing: HashSet<&str> = HashSet::new();
	let mut seen_snippets: HashSet<&str> = HashSet::new();
	let mut snippets: Vec<String> = Vec::new();
	let mut last_end = 0;

	for placeholder in placeholders {
		let malformed = || {
			ResolveWarning::MalformedPlaceholder {
				raw: placeholder.raw.clone(),
				offset: placeholder.span.start,
			}
		};

		let Some(literal) = template.get(last_end..placeholder.span.start) else {
			warnings.push(malformed());
			continue;
		};
		if template.get(placeholder.span.clone()).is_none() {
			warnings.push(malformed());
			continue;
		}

		output.push_str(literal);

		match &placeholder.kind {
			PlaceholderKind::Variable { name, .. } => {
				let Some(variable) = registry.get(name) else {
					output.push_str(&placeholder.raw);
					warnings.push(malformed());
					last_end = placeholder.span.end;
					continue;
				};

				match variable.status(values) {
					VariableStatus::Provided => {
						output.push_str(provided_value(values, name).unwrap_or_default());
					}
					VariableStatus::Default => {
						output.push_str(variable.default_value.as_deref().unwrap_or_default());
					}
					VariableStatus::Missing => {
						output.push_str(&placeholder.raw);
						if warned_missing.insert(variable.name.as_str()) {
							warnings.push(ResolveWarning::MissingValue {
								name: variable.name.clone(),
								offset: variable.first_offset,
							});
						}
					}
				}
			}
			PlaceholderKind::SnippetReference { name } if name.is_empty() => {
				output.push_str(&placeholder.raw);
				warnings.push(malformed());
			}
			PlaceholderKind::SnippetReference { name } => {
				output.push_str(&snippet_marker(name));
				if seen_snippets.insert(name.as_str()) {
					snippets.push(name.clone());
				}
			}
		}

		last_end = placeholder.span.end;
	}

	output.push_str(template.get(last_end..).unwrap_or_default());

	// Stable, so warnings sharing an offset keep discovery order.
	warnings.sort_by_key(ResolveWarning::offset);

	ResolutionResult {
		resolved_text: output,
		variables: registry.descriptors(values),
		warnings: warnings.iter().map(ToString::to_string).collect(),
		snippets,
	}
}

/// Scan, build the registry and resolve in one call.
pub fn resolve_template(template: &str, values: &ValueMap) -> ResolutionResult {
	let placeholders = scan(template);
	let registry = Registry::from_placeholders(&placeholders);
	resolve(template, &placeholders, &registry, values)
}

/// Inspect a template: its placeholders, variable states, referenced
/// snippets and warnings.
pub fn analyze_template(template: &str, values: &ValueMap) -> Analysis {
	let placeholders = scan(template);
	let registry = Registry::from_placeholders(&placeholders);
	let result = resolve(template, &placeholders, &registry, values);

	Analysis {
		placeholders,
		variables: result.variables,
		snippets: result.snippets,
		warnings: result.warnings,
	}
}
