use std::fmt;

/// A non-fatal diagnostic produced while building the registry or resolving
/// a template. Warnings never stop resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveWarning {
	/// A variable has no provided value and no default.
	MissingValue { name: String, offset: usize },
	/// A later occurrence of a variable declared a different, non-empty
	/// default. The first declared default is kept.
	ConflictingDefault { name: String, offset: usize },
	/// A placeholder that could not be resolved and was left untouched.
	MalformedPlaceholder { raw: String, offset: usize },
}

impl ResolveWarning {
	/// Byte offset used for ordering: the first appearance of the variable or
	/// snippet that triggered the warning.
	pub fn offset(&self) -> usize {
		match self {
			Self::MissingValue { offset, .. }
			| Self::ConflictingDefault { offset, .. }
			| Self::MalformedPlaceholder { offset, .. } => *offset,
		}
	}
}

impl fmt::Display for ResolveWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MissingValue { name, .. } => write!(f, "missing value for variable '{name}'"),
			Self::ConflictingDefault { name, .. } => {
				write!(f, "conflicting default for variable '{name}'")
			}
			Self::MalformedPlaceholder { raw, .. } => write!(f, "malformed placeholder '{raw}'"),
		}
	}
}
