use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use proompt_core::parse_variable_argument;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Resolve prompt templates with variables and snippet references.",
	long_about = "proompt resolves prompt templates. Variables are written as `{{name}}` or \
	              `{{name:default}}` and snippet references as `@name` or `@{name with \
	              spaces}`.\n\nQuick start:\n  proompt resolve prompt.md --var name=Sam\n  \
	              proompt analyze prompt.md\n  proompt watch prompt.md"
)]
pub struct ProomptCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Directory searched for `proompt.toml`. Defaults to the current
	/// directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

/// Where variable values come from. Later sources win: config `[values]`,
/// then the `--values` file, then each `--var`.
#[derive(Args, Debug, Clone, Default)]
pub struct ValueArgs {
	/// Set a variable, e.g. `--var name=Sam`. May be repeated.
	#[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
	pub vars: Vec<(String, String)>,

	/// Load variable values from a JSON or TOML file.
	#[arg(long, value_name = "FILE")]
	pub values: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Resolve a template and print the result.
	///
	/// Provided values replace their placeholders, declared defaults fill in
	/// the rest and snippet references become `[Snippet: name]` markers.
	/// Variables with neither stay in the output verbatim and produce a
	/// warning on stderr.
	Resolve {
		/// Template file to resolve. Use `-` to read from stdin.
		file: PathBuf,

		#[command(flatten)]
		values: ValueArgs,

		/// Output format. `json` prints the same shape a preview backend
		/// returns.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,

		/// Exit with code 1 when any variable is left without a value.
		#[arg(long, default_value_t = false)]
		strict: bool,
	},
	/// List the placeholders, variables and snippets in a template.
	///
	/// Shows each variable with its default and fulfillment status, every
	/// snippet reference and the completion percentage for the given values.
	Analyze {
		/// Template file to analyze. Use `-` to read from stdin.
		file: PathBuf,

		#[command(flatten)]
		values: ValueArgs,

		/// Output format for the analysis.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Re-resolve a template every time it changes on disk.
	///
	/// Edits are debounced using `preview.debounce_ms` from `proompt.toml`
	/// and only the latest edit is ever printed.
	Watch {
		/// Template file to watch.
		file: PathBuf,

		#[command(flatten)]
		values: ValueArgs,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

fn parse_var(argument: &str) -> Result<(String, String), String> {
	parse_variable_argument(argument).map_err(|e| e.to_string())
}
