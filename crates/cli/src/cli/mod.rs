#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::ConfigOverrides;
use crate::output::OutputFormat;
use crate::styles::cli_styles;

/// Root CLI for droid.
#[derive(Parser, Debug)]
#[command(name = "droid")]
#[command(about = "Install an Android app from the Play Store and verify its first screen")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: toon (default), json, ndjson, or text
	#[arg(short = 'f', long, global = true, value_enum, default_value = "toon")]
	pub format: OutputFormat,

	/// JSON workflow descriptor
	#[arg(long, global = true, value_name = "FILE", env = "DROID_CONFIG")]
	pub config: Option<PathBuf>,

	#[command(flatten)]
	pub overrides: ConfigOverrides,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Uninstall, install from the store, launch and verify.
	Install(InstallArgs),
	/// Only remove the app from the device.
	Uninstall,
	/// Print the capabilities a session would be opened with.
	Caps(CapsArgs),
	/// Print the effective configuration.
	Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
	/// Directory for page source dumps taken on failure.
	#[arg(long, value_name = "DIR")]
	pub artifacts_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CapsArgs {
	/// Which session's capabilities to print.
	#[arg(long, value_enum, default_value = "store")]
	pub target: CapsTarget,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CapsTarget {
	/// The store session used for installing
	#[default]
	Store,
	/// The session that launches the installed app
	App,
}
