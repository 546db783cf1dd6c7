use std::ops::Range;

use serde::Serialize;

use crate::lexer::tokenize;

/// A single placeholder found in a template: either a variable (`{{ name }}`,
/// `{{ name : default }}`) or a snippet reference (`@name`, `@{name}`).
///
/// Placeholders are created fresh on every scan and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
	/// What kind of placeholder this is, together with its parsed parts.
	pub kind: PlaceholderKind,
	/// Byte range `[start, end)` of the full match in the original template.
	pub span: Range<usize>,
	/// The matched text including delimiters, e.g. `{{ name : friend }}`.
	pub raw: String,
	/// 1-indexed line of the first character of the match.
	pub line: usize,
	/// 1-indexed column (in characters) of the first character of the match.
	pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum PlaceholderKind {
	/// `{{ name }}` or `{{ name : default }}`. Both parts are trimmed.
	Variable {
		name: String,
		default: Option<String>,
	},
	/// `@name` or `@{name with spaces}`. The braces are removed and the name
	/// is trimmed.
	SnippetReference { name: String },
}

impl Placeholder {
	/// The variable or snippet name referenced by this placeholder.
	pub fn name(&self) -> &str {
		match &self.kind {
			PlaceholderKind::Variable { name, .. } | PlaceholderKind::SnippetReference { name } => {
				name
			}
		}
	}

	/// The inline default declared by a variable placeholder.
	pub fn inline_default(&self) -> Option<&str> {
		match &self.kind {
			PlaceholderKind::Variable { default, .. } => default.as_deref(),
			PlaceholderKind::SnippetReference { .. } => None,
		}
	}

	pub fn is_variable(&self) -> bool {
		matches!(self.kind, PlaceholderKind::Variable { .. })
	}

	pub fn is_snippet(&self) -> bool {
		matches!(self.kind, PlaceholderKind::SnippetReference { .. })
	}

	/// A terminated placeholder whose name is empty after trimming, such as
	/// `{{ }}`, `{{ : x }}` or `@{ }`. These are left untouched by the
	/// resolver and reported as warnings.
	pub fn is_malformed(&self) -> bool {
		self.name().is_empty()
	}
}

/// Scan a template into its placeholders, ordered by start offset.
///
/// Scanning is single pass and never fails. Unterminated `{{` or `@{`
/// openers and a bare `@` are treated as literal text.
pub fn scan(template: &str) -> Vec<Placeholder> {
	tokenize(template)
}
