use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use terralink_cli::Commands;
use terralink_cli::OutputFormat;
use terralink_cli::TerralinkCli;
use terralink_core::PathFilter;
use terralink_core::ScanReport;
use terralink_core::Scanner;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = TerralinkCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	let default_level = if args.verbose { "info" } else { "warn" };
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
		)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();

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

	let result = match args.command {
		Commands::Check { format } => run_check(&args, format),
		Commands::Load => run_load(&args),
		Commands::Unload => run_unload(&args),
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help
		// text and error codes.
		match e.downcast::<terralink_core::TerralinkError>() {
			Ok(core_err) => {
				let report: miette::Report = (*core_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn build_scanner(args: &TerralinkCli) -> Result<Scanner, Box<dyn std::error::Error>> {
	let filter = PathFilter::from_ignore_dir(&args.ignore_dir)?;
	Ok(Scanner::new(filter))
}

/// Render a path relative to the scan root when possible.
fn make_relative(path: &Path, root: &Path) -> PathBuf {
	path.strip_prefix(root)
		.map(Path::to_path_buf)
		.unwrap_or_else(|_| path.to_path_buf())
}

fn print_failures<T>(report: &ScanReport<T>, root: &Path) {
	for failure in &report.failures {
		eprintln!(
			"{} {}: {}",
			colored!("error:", red),
			make_relative(&failure.path, root).display(),
			failure.message
		);
	}
}

fn run_check(args: &TerralinkCli, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let scanner = build_scanner(args)?;
	let report = scanner.check(&args.dir)?;

	match format {
		OutputFormat::Json => {
			let loaded: Vec<serde_json::Value> = report
				.entries
				.iter()
				.flat_map(|(path, modules)| {
					let rel = make_relative(path, &args.dir);
					modules.iter().map(move |name| {
						serde_json::json!({
							"file": rel,
							"module": name,
						})
					})
				})
				.collect();
			let failures: Vec<serde_json::Value> = report
				.failures
				.iter()
				.map(|failure| {
					serde_json::json!({
						"file": make_relative(&failure.path, &args.dir),
						"message": failure.message,
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": report.is_clean(),
				"loaded": loaded,
				"failures": failures,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			print_failures(&report, &args.dir);

			if report.entries.is_empty() {
				if !report.has_failures() {
					println!(
						"{} all modules are configured for production.",
						colored!("success:", green)
					);
				}
			} else {
				eprintln!("{}", colored!("found loaded dev modules:", bold));
				for (path, modules) in &report.entries {
					let rel = make_relative(path, &args.dir);
					for name in modules {
						eprintln!("  - module `{name}` is loaded in {}", rel.display());
					}
				}
				eprintln!();
				eprintln!("Run `terralink unload` to restore the original sources.");
			}
		}
	}

	if report.has_failures() {
		process::exit(2);
	}
	if !report.entries.is_empty() {
		process::exit(1);
	}
	Ok(())
}

fn run_load(args: &TerralinkCli) -> Result<(), Box<dyn std::error::Error>> {
	let scanner = build_scanner(args)?;
	let report = scanner.dev_load(&args.dir)?;
	print_change_summary(&report, &args.dir, "loaded");

	if report.has_failures() {
		process::exit(2);
	}
	Ok(())
}

fn run_unload(args: &TerralinkCli) -> Result<(), Box<dyn std::error::Error>> {
	let scanner = build_scanner(args)?;
	let report = scanner.dev_unload(&args.dir)?;
	print_change_summary(&report, &args.dir, "unloaded");

	if report.has_failures() {
		process::exit(2);
	}
	Ok(())
}

fn print_change_summary(report: &ScanReport<usize>, root: &Path, verb: &str) {
	print_failures(report, root);

	if report.entries.is_empty() {
		println!("Nothing to do: no modules were {verb}.");
		return;
	}

	let total: usize = report.entries.values().sum();
	for (path, changes) in &report.entries {
		println!(
			"{} {} module(s) in {}",
			colored!(verb, green),
			changes,
			make_relative(path, root).display()
		);
	}
	println!(
		"{} {} module(s) across {} file(s).",
		colored!(verb, bold),
		total,
		report.entries.len()
	);
}
