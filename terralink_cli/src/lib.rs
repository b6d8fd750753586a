use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Seamlessly link local Terraform modules for development.",
	long_about = "terralink improves the Terraform development workflow by swapping remote \
	              module registry sources for local file paths and back.\n\nIt is driven by a \
	              one-line annotation in your .tf files:\n\n  # terralink: \
	              path=../modules/my-module\n\nQuick start:\n  terralink load    Point annotated \
	              modules at their local paths\n  terralink unload  Restore the original remote \
	              sources\n  terralink check   Verify nothing is left in dev mode"
)]
pub struct TerralinkCli {
	#[command(subcommand)]
	pub command: Commands,

	/// Directory to scan for .tf and .hcl files.
	#[arg(long, short, global = true, default_value = ".")]
	pub dir: PathBuf,

	/// Directory containing the optional .terralinkignore file.
	#[arg(long, global = true, default_value = ".")]
	pub ignore_dir: PathBuf,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Verify that no modules are in dev mode.
	///
	/// Scans for active `terralink-state` annotations. If any are
	/// found, lists the loaded modules and exits with status code 1.
	/// Never mutates a file. Ideal for pre-commit hooks and CI
	/// pipelines to keep dev configurations out of version control.
	Check {
		/// Output format for check results. Use `text` for
		/// human-readable output or `json` for programmatic
		/// consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Link modules to local paths for development.
	///
	/// Scans files for modules carrying a `terralink: path=...`
	/// annotation, replaces the remote `source` with the local path,
	/// and records the original source and version in a
	/// `terralink-state` comment for later restoration. Already-loaded
	/// modules are left untouched, so repeated runs are safe.
	Load,
	/// Unload local modules and restore the original remote sources.
	///
	/// Reads the `terralink-state` comment written by `load`, restores
	/// the original `source` (and `version`, if one was recorded), and
	/// removes the state comment, leaving the file clean for
	/// production.
	Unload,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
