use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::Placeholder;
use crate::PlaceholderKind;
use crate::ResolveWarning;
use crate::ValueMap;

/// How a variable's value is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableStatus {
	/// The value map has a non-blank entry for the variable.
	Provided,
	/// No usable value, but the template declares an inline default.
	Default,
	/// No usable value and no default.
	Missing,
}

impl VariableStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Provided => "provided",
			Self::Default => "default",
			Self::Missing => "missing",
		}
	}
}

/// One unique variable in a template. The status is not stored here, it is
/// derived from a value map on demand with [`Variable::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
	/// The trimmed, case-sensitive name.
	pub name: String,
	/// The inline default of the first occurrence that declared one.
	pub default_value: Option<String>,
	/// Byte offset of the first occurrence.
	pub first_offset: usize,
}

impl Variable {
	pub fn has_default(&self) -> bool {
		self.default_value.is_some()
	}

	pub fn status(&self, values: &ValueMap) -> VariableStatus {
		if provided_value(values, &self.name).is_some() {
			VariableStatus::Provided
		} else if self.has_default() {
			VariableStatus::Default
		} else {
			VariableStatus::Missing
		}
	}

	pub fn describe(&self, values: &ValueMap) -> VariableDescriptor {
		VariableDescriptor {
			name: self.name.clone(),
			default_value: self.default_value.clone(),
			status: self.status(values),
		}
	}
}

/// A variable together with its status for one particular value map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescriptor {
	pub name: String,
	pub default_value: Option<String>,
	pub status: VariableStatus,
}

impl VariableDescriptor {
	pub fn has_default(&self) -> bool {
		self.default_value.is_some()
	}
}

/// The trimmed value for `name`, or `None` when the entry is absent or blank.
pub fn provided_value<'a>(values: &'a ValueMap, name: &str) -> Option<&'a str> {
	values
		.get(name)
		.map(|value| value.trim())
		.filter(|value| !value.is_empty())
}

/// Deduplicated variables of a template in first-appearance order.
///
/// The registry depends only on the placeholders, so the same template always
/// yields the same order no matter how the value map changes.
#[derive(Debug, Clone, Default)]
pub struct Registry {
	variables: Vec<Variable>,
	index: HashMap<String, usize>,
	warnings: Vec<ResolveWarning>,
}

impl Registry {
	pub fn from_placeholders(placeholders: &[Placeholder]) -> Self {
		let mut registry = Self::default();

		for placeholder in placeholders {
			let PlaceholderKind::Variable { name, default } = &placeholder.kind else {
				continue;
			};

			if name.is_empty() {
				continue;
			}

			registry.insert(name, default.as_deref(), placeholder.span.start);
		}

		registry
	}

	fn insert(&mut self, name: &str, default: Option<&str>, offset: usize) {
		let Some(&position) = self.index.get(name) else {
			self.index.insert(name.to_string(), self.variables.len());
			self.variables.push(Variable {
				name: name.to_string(),
				default_value: default.map(ToString::to_string),
				first_offset: offset,
			});
			return;
		};

		let variable = &mut self.variables[position];
		let Some(default) = default else {
			return;
		};

		if variable.default_value.is_none() {
			variable.default_value = Some(default.to_string());
			return;
		}

		if default.is_empty() || variable.default_value.as_deref() == Some(default) {
			return;
		}

		let offset = variable.first_offset;
		let already_warned = self.warnings.iter().any(
			|warning| matches!(warning, ResolveWarning::ConflictingDefault { name: n, .. } if n == name),
		);

		if !already_warned {
			self.warnings.push(ResolveWarning::ConflictingDefault {
				name: name.to_string(),
				offset,
			});
		}
	}

	pub fn get(&self, name: &str) -> Option<&Variable> {
		self.index.get(name).map(|&position| &self.variables[position])
	}

	pub fn variables(&self) -> &[Variable] {
		&self.variables
	}

	/// Conflicting-default warnings collected while building.
	pub fn warnings(&self) -> &[ResolveWarning] {
		&self.warnings
	}

	pub fn len(&self) -> usize {
		self.variables.len()
	}

	pub fn is_empty(&self) -> bool {
		self.variables.is_empty()
	}

	/// Describe every variable against `values`, in first-appearance order.
	pub fn descriptors(&self, values: &ValueMap) -> Vec<VariableDescriptor> {
		self.variables
			.iter()
			.map(|variable| variable.describe(values))
			.collect()
	}
}

/// Build the variable list for a set of placeholders and a value map.
pub fn build_registry(placeholders: &[Placeholder], values: &ValueMap) -> Vec<VariableDescriptor> {
	Registry::from_placeholders(placeholders).descriptors(values)
}
