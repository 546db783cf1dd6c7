use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use proompt_cli::Commands;
use proompt_cli::OutputFormat;
use proompt_cli::ProomptCli;
use proompt_cli::ValueArgs;
use proompt_core::Analysis;
use proompt_core::AnyEmptyResult;
use proompt_core::AnyResult;
use proompt_core::LocalBackend;
use proompt_core::PreviewEvent;
use proompt_core::PreviewResponse;
use proompt_core::PreviewSession;
use proompt_core::ProomptConfig;
use proompt_core::ResolutionResult;
use proompt_core::ValueMap;
use proompt_core::VariableDescriptor;
use proompt_core::VariableStatus;
use proompt_core::analyze_template;
use proompt_core::load_values_file;
use proompt_core::merge_values;
use proompt_core::resolve_template;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply an `owo-colors` style only when color is enabled.
macro_rules! colored {
	($text:expr, $style:ident) => {
		if color_enabled() {
			format!("{}", $text.$style())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = ProomptCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Resolve {
			file,
			values,
			format,
			strict,
		}) => run_resolve(&args, file, values, *format, *strict),
		Some(Commands::Analyze {
			file,
			values,
			format,
		}) => run_analyze(&args, file, values, *format),
		Some(Commands::Watch { file, values }) => run_watch(&args, file, values),
		None => {
			eprintln!("No subcommand specified. Run `proompt --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<proompt_core::ProomptError>() {
			Ok(proompt_err) => {
				let report: miette::Report = (*proompt_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr so they never mix with resolved output. `RUST_LOG`
/// overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init();
}

fn resolve_root(args: &ProomptCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(args: &ProomptCli) -> AnyResult<ProomptConfig> {
	let root = resolve_root(args);
	let config = ProomptConfig::load(&root)?;

	if let Some(path) = ProomptConfig::resolve_path(&root) {
		tracing::debug!(path = %path.display(), "loaded config");
	}

	Ok(config.unwrap_or_default())
}

/// Layer config values, the values file and `--var` arguments.
fn collect_values(config: &ProomptConfig, value_args: &ValueArgs) -> AnyResult<ValueMap> {
	let mut layers = vec![config.value_map()];

	if let Some(path) = &value_args.values {
		layers.push(load_values_file(path)?);
	}

	layers.push(value_args.vars.iter().cloned().collect());

	Ok(merge_values(layers))
}

fn read_template(file: &Path) -> AnyResult<String> {
	let mut content = String::new();

	if file == Path::new("-") {
		std::io::stdin().read_to_string(&mut content)?;
	} else {
		content = std::fs::read_to_string(file)?;
	}

	Ok(content)
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_warnings(warnings: &[String]) {
	for warning in warnings {
		eprintln!("{} {warning}", colored!("warning:", yellow));
	}
}

fn colored_status(status: VariableStatus) -> String {
	let label = status.as_str();
	match status {
		VariableStatus::Provided => colored!(label, green),
		VariableStatus::Default => colored!(label, yellow),
		VariableStatus::Missing => colored!(label, red),
	}
}

fn run_resolve(
	args: &ProomptCli,
	file: &Path,
	value_args: &ValueArgs,
	format: OutputFormat,
	strict: bool,
) -> AnyEmptyResult {
	let config = load_config(args)?;
	let values = collect_values(&config, value_args)?;
	let template = read_template(file)?;
	let result = resolve_template(&template, &values);
	let is_complete = result.is_complete();

	match format {
		OutputFormat::Text => {
			print!("{}", result.resolved_text);
			print_warnings(&result.warnings);
		}
		OutputFormat::Json => {
			let response = PreviewResponse::from(result);
			println!("{}", serde_json::to_string_pretty(&response)?);
		}
	}

	if strict && !is_complete {
		process::exit(1);
	}

	Ok(())
}

fn run_analyze(
	args: &ProomptCli,
	file: &Path,
	value_args: &ValueArgs,
	format: OutputFormat,
) -> AnyEmptyResult {
	let config = load_config(args)?;
	let values = collect_values(&config, value_args)?;
	let template = read_template(file)?;
	let analysis = analyze_template(&template, &values);

	match format {
		OutputFormat::Text => print_analysis(&analysis),
		OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
	}

	Ok(())
}

fn print_analysis(analysis: &Analysis) {
	println!(
		"{}",
		colored!(format!("Variables ({})", analysis.variables.len()), bold)
	);
	if analysis.variables.is_empty() {
		println!("  (none)");
	}
	for variable in &analysis.variables {
		print_variable(analysis, variable);
	}

	print_section(&format!("Snippets ({})", analysis.snippets.len()));
	if analysis.snippets.is_empty() {
		println!("  (none)");
	}
	for snippet in &analysis.snippets {
		println!("  @{snippet}");
	}

	if !analysis.warnings.is_empty() {
		print_section(&format!("Warnings ({})", analysis.warnings.len()));
		for warning in &analysis.warnings {
			println!("  {warning}");
		}
	}

	println!();
	println!("Completion: {}%", analysis.completion_percentage());
}

fn print_variable(analysis: &Analysis, variable: &VariableDescriptor) {
	let location = analysis
		.placeholders
		.iter()
		.find(|placeholder| placeholder.is_variable() && placeholder.name() == variable.name)
		.map(|placeholder| format!("{}:{}", placeholder.line, placeholder.column))
		.unwrap_or_default();
	let default = variable
		.default_value
		.as_deref()
		.map(|value| format!("default {value:?}"))
		.unwrap_or_default();

	println!(
		"  {:<20} {:<8} {:<24} {location}",
		variable.name,
		colored_status(variable.status),
		default,
	);
}

fn run_watch(args: &ProomptCli, file: &Path, value_args: &ValueArgs) -> AnyEmptyResult {
	let config = load_config(args)?;
	let values = collect_values(&config, value_args)?;
	let rt = tokio::runtime::Runtime::new()?;

	rt.block_on(watch_template(file, values, &config))
}

async fn watch_template(file: &Path, values: ValueMap, config: &ProomptConfig) -> AnyEmptyResult {
	let (session, mut events) = PreviewSession::spawn(LocalBackend, config.session_options());
	let (tx, mut changes) = tokio::sync::mpsc::unbounded_channel();
	let file_name = file.file_name().map(ToOwned::to_owned);

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				let touches_file = event
					.paths
					.iter()
					.any(|path| path.file_name() == file_name.as_deref());
				if touches_file
					&& matches!(
						event.kind,
						notify::EventKind::Modify(_) | notify::EventKind::Create(_)
					) {
					let _ = tx.send(());
				}
			}
		})?;

	// Watch the parent directory so editors that replace the file on save
	// are still picked up.
	let watch_dir = file
		.parent()
		.filter(|parent| !parent.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new("."));

	use notify::Watcher;
	watcher.watch(watch_dir, notify::RecursiveMode::NonRecursive)?;

	session.submit(read_template(file)?, values.clone())?;
	println!(
		"Watching {} for changes... (press Ctrl+C to stop)",
		file.display()
	);

	loop {
		tokio::select! {
			change = changes.recv() => {
				if change.is_none() {
					break;
				}
				match read_template(file) {
					Ok(content) => session.submit(content, values.clone())?,
					Err(e) => eprintln!("{} {e}", colored!("error:", red)),
				}
			}
			event = events.recv() => {
				match event {
					Some(event) => print_preview_event(&event),
					None => break,
				}
			}
		}
	}

	session.shutdown().await;
	Ok(())
}

fn print_preview_event(event: &PreviewEvent) {
	match event {
		PreviewEvent::Resolving { request_id } => {
			tracing::debug!(request_id, "resolving");
		}
		PreviewEvent::Settled { result, .. } => print_preview(result),
		PreviewEvent::Failed { error, .. } => {
			eprintln!("{} {error}", colored!("error:", red));
		}
		_ => {}
	}
}

fn print_preview(result: &ResolutionResult) {
	print_section(&format!(
		"Preview ({}% complete, {} provided, {} default, {} missing)",
		result.completion_percentage(),
		result.count(VariableStatus::Provided),
		result.count(VariableStatus::Default),
		result.count(VariableStatus::Missing),
	));
	println!("{}", result.resolved_text);
	print_warnings(&result.warnings);
}
