use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ProomptError {
	#[error(transparent)]
	#[diagnostic(code(proompt::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(proompt::config_parse),
		help("check that proompt.toml is valid TOML with [preview] and/or [values] sections")
	)]
	ConfigParse(String),

	#[error("failed to load values file `{path}`: {reason}")]
	#[diagnostic(
		code(proompt::values_file),
		help("values files must be a flat map of variable names to strings")
	)]
	ValuesFile { path: String, reason: String },

	#[error("unsupported values file format: `{0}`")]
	#[diagnostic(
		code(proompt::unsupported_format),
		help("supported formats: json, toml")
	)]
	UnsupportedValuesFormat(String),

	#[error("invalid variable argument: `{0}`")]
	#[diagnostic(
		code(proompt::invalid_variable_argument),
		help("pass variables as `--var name=value`")
	)]
	InvalidVariableArgument(String),

	#[error("preview backend failed: {0}")]
	#[diagnostic(code(proompt::backend))]
	Backend(String),

	#[error("the preview session has shut down")]
	#[diagnostic(code(proompt::session_closed))]
	SessionClosed,
}

pub type ProomptResult<T> = Result<T, ProomptError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
